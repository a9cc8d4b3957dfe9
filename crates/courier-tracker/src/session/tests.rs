use super::*;
use crate::order_id::extract_order_id;
use crate::provider::{OrderPhase, OrderStatus};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const ID: &str = "3f2b9c1e-8a4d-4e6f-9b2a-1c3d5e7f9a0b";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SinkCall {
    Publish { channel_id: String, text: String },
    Update { message_id: String, text: String },
}

/// Records every publish/update; can be told to fail upcoming calls.
#[derive(Default)]
struct MockSink {
    calls: Mutex<Vec<SinkCall>>,
    next_id: AtomicUsize,
    failures: Mutex<VecDeque<bool>>,
}

impl MockSink {
    fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| match c {
                SinkCall::Publish { text, .. } | SinkCall::Update { text, .. } => text,
            })
            .collect()
    }

    /// Script success (`false`) or failure (`true`) for the next calls.
    fn script_failures(&self, script: &[bool]) {
        self.failures.lock().unwrap().extend(script.iter().copied());
    }

    fn should_fail(&self) -> bool {
        self.failures.lock().unwrap().pop_front().unwrap_or(false)
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn publish(&self, channel_id: &str, text: &str) -> Result<MessageRef, CourierError> {
        if self.should_fail() {
            return Err(CourierError::Channel("sink down".into()));
        }
        self.calls.lock().unwrap().push(SinkCall::Publish {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageRef {
            channel_id: channel_id.to_string(),
            message_id: format!("m{id}"),
        })
    }

    async fn update(&self, message: &MessageRef, text: &str) -> Result<(), CourierError> {
        if self.should_fail() {
            return Err(CourierError::Channel("sink down".into()));
        }
        self.calls.lock().unwrap().push(SinkCall::Update {
            message_id: message.message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Replays a fixed script of poll results. Polling past the end is a test failure.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<OrderStatus, String>>>,
    polls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<OrderStatus, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            polls: AtomicUsize::new(0),
        }
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusProvider for ScriptedProvider {
    async fn fetch(&self, order: &OrderId) -> Result<OrderStatus, CourierError> {
        assert_eq!(order.as_str(), ID);
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("provider polled after the script ended");
        next.map_err(CourierError::Provider)
    }
}

/// Returns immediately and remembers how long it was asked to wait.
#[derive(Default)]
struct InstantPause {
    waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Pause for InstantPause {
    async fn pause(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

fn active(summary: &str) -> Result<OrderStatus, String> {
    Ok(OrderStatus {
        phase: OrderPhase::Active("EN_ROUTE".into()),
        summary: Some(summary.to_string()),
    })
}

fn completed() -> Result<OrderStatus, String> {
    Ok(OrderStatus {
        phase: OrderPhase::Completed,
        summary: None,
    })
}

fn failure(msg: &str) -> Result<OrderStatus, String> {
    Err(msg.to_string())
}

struct Harness {
    provider: Arc<ScriptedProvider>,
    sink: Arc<MockSink>,
    pause: Arc<InstantPause>,
}

impl Harness {
    fn new(script: Vec<Result<OrderStatus, String>>) -> Self {
        Self {
            provider: Arc::new(ScriptedProvider::new(script)),
            sink: Arc::new(MockSink::default()),
            pause: Arc::new(InstantPause::default()),
        }
    }

    fn session(&self, input: &str, mode: DestinationMode) -> TrackingSession {
        TrackingSession::new(
            extract_order_id(input),
            "chan-1",
            "@everyone",
            self.provider.clone(),
            self.sink.clone(),
        )
        .with_mode(mode)
        .with_interval(Duration::from_secs(10))
        .with_pause(self.pause.clone())
    }

    fn waits(&self) -> usize {
        self.pause.waits.lock().unwrap().len()
    }
}

#[tokio::test]
async fn test_missing_identifier_is_rejected_without_polling() {
    let h = Harness::new(vec![]);
    let session = h.session("not an order link", DestinationMode::Append);
    let outcome = session.run().await;

    assert!(matches!(
        outcome,
        SessionOutcome::Rejected(CourierError::InvalidInput(_))
    ));
    assert_eq!(h.provider.polls(), 0);
    assert!(h.sink.calls().is_empty(), "nothing should be published");
}

#[tokio::test]
async fn test_unchanged_status_notifies_once() {
    let h = Harness::new(vec![
        active("Preparing your order"),
        active("Preparing your order"),
        active("Preparing your order"),
        active("Preparing your order"),
        completed(),
    ]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(outcome, SessionOutcome::Completed));
    let texts = h.sink.texts();
    assert_eq!(texts.len(), 3, "announce + one update + completion: {texts:?}");
    assert!(texts[0].contains("Now tracking order"));
    assert_eq!(texts[1], "@everyone 📦 Preparing your order");
    assert!(texts[2].starts_with("@everyone ✅"));
}

#[tokio::test]
async fn test_terminal_phase_stops_polling() {
    let h = Harness::new(vec![
        active("Order confirmed"),
        active("Dasher is on the way"),
        completed(),
    ]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(outcome, SessionOutcome::Completed));
    assert_eq!(h.provider.polls(), 3, "no poll after the terminal one");
    let completions = h
        .sink
        .texts()
        .into_iter()
        .filter(|t| t.contains("has been delivered"))
        .count();
    assert_eq!(completions, 1);
    // One pause after each non-terminal poll, none after the last.
    assert_eq!(h.waits(), 2);
}

#[tokio::test]
async fn test_changes_published_in_observation_order() {
    let h = Harness::new(vec![
        active("A"),
        active("B"),
        active("B"),
        active("A"),
        completed(),
    ]);
    h.session(ID, DestinationMode::Append).run().await;

    let texts = h.sink.texts();
    assert_eq!(
        &texts[1..4],
        &[
            "@everyone 📦 A".to_string(),
            "@everyone 📦 B".to_string(),
            "@everyone 📦 A".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_single_failure_is_retried() {
    let h = Harness::new(vec![
        failure("connection reset"),
        active("Dasher is on the way"),
        completed(),
    ]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(outcome, SessionOutcome::Completed));
    let texts = h.sink.texts();
    assert_eq!(texts[1], "@everyone 📦 Dasher is on the way");
    assert!(
        !texts.iter().any(|t| t.contains("Stopped tracking")),
        "no error notice after a successful retry"
    );
    // Retry pause, then the regular pause after the retried poll.
    let waits = h.pause.waits.lock().unwrap().clone();
    assert_eq!(waits, vec![Duration::from_secs(10), Duration::from_secs(10)]);
}

#[tokio::test]
async fn test_two_consecutive_failures_end_session() {
    let h = Harness::new(vec![
        active("Order confirmed"),
        failure("timeout"),
        failure("503 service unavailable"),
    ]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    match outcome {
        SessionOutcome::Failed(CourierError::Provider(msg)) => {
            assert_eq!(msg, "503 service unavailable")
        }
        other => panic!("expected provider failure, got {other:?}"),
    }
    assert_eq!(h.provider.polls(), 3);

    let errors: Vec<String> = h
        .sink
        .texts()
        .into_iter()
        .filter(|t| t.contains("Stopped tracking"))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("@everyone ❌"));
    assert!(errors[0].contains("503 service unavailable"));
}

#[tokio::test]
async fn test_failure_budget_resets_after_success() {
    let h = Harness::new(vec![
        failure("blip"),
        active("Preparing"),
        failure("blip"),
        active("Preparing"),
        completed(),
    ]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(outcome, SessionOutcome::Completed));
    assert_eq!(h.provider.polls(), 5);
}

#[tokio::test]
async fn test_edit_mode_rewrites_announcement() {
    let h = Harness::new(vec![active("Preparing"), active("On the way"), completed()]);
    h.session(ID, DestinationMode::Edit).run().await;

    let calls = h.sink.calls();
    assert_eq!(calls.len(), 4);
    assert!(matches!(
        &calls[0],
        SinkCall::Publish { channel_id, .. } if channel_id == "chan-1"
    ));
    for call in &calls[1..] {
        assert!(
            matches!(call, SinkCall::Update { message_id, .. } if message_id == "m0"),
            "every later notice edits the announcement: {call:?}"
        );
    }
}

#[tokio::test]
async fn test_append_mode_never_edits() {
    let h = Harness::new(vec![active("Preparing"), completed()]);
    h.session(ID, DestinationMode::Append).run().await;

    assert!(h
        .sink
        .calls()
        .iter()
        .all(|c| matches!(c, SinkCall::Publish { .. })));
}

#[tokio::test]
async fn test_sink_failure_goes_through_retry() {
    let h = Harness::new(vec![active("Preparing"), active("Preparing"), completed()]);
    // Announcement ok, first update fails, retried update ok.
    h.sink.script_failures(&[false, true, false]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(outcome, SessionOutcome::Completed));
    let updates = h
        .sink
        .texts()
        .into_iter()
        .filter(|t| t.contains("📦"))
        .count();
    assert_eq!(updates, 1, "the retried poll publishes the missed update");
}

#[tokio::test]
async fn test_announcement_failure_fails_session() {
    let h = Harness::new(vec![]);
    h.sink.script_failures(&[true]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed(CourierError::Channel(_))
    ));
    assert_eq!(h.provider.polls(), 0);
}

#[tokio::test]
async fn test_missing_summary_counts_as_failure() {
    let h = Harness::new(vec![
        Ok(OrderStatus {
            phase: OrderPhase::Active("EN_ROUTE".into()),
            summary: None,
        }),
        active("Recovered"),
        completed(),
    ]);
    let outcome = h.session(ID, DestinationMode::Append).run().await;

    assert!(matches!(outcome, SessionOutcome::Completed));
    assert!(h.sink.texts().contains(&"@everyone 📦 Recovered".to_string()));
}

#[test]
fn test_new_session_starts_in_starting_state() {
    let h = Harness::new(vec![]);
    let session = h.session(ID, DestinationMode::Append);
    assert_eq!(session.state(), SessionState::Starting);
}
