//! Tracking session: poll an order until it completes or fails, publishing
//! one notice per observed status change.
//!
//! ```text
//! Starting -> Polling -> (Polling | Notifying | Completed | Failed)
//! ```
//!
//! A failed poll is retried exactly once after one interval. A second
//! consecutive failure publishes a single error notice and ends the session.

#[cfg(test)]
mod tests;

use crate::{
    order_id::OrderId,
    pause::{Pause, TokioPause},
    provider::StatusProvider,
};
use courier_core::{
    config::DestinationMode, error::CourierError, message::MessageRef, traits::NotificationSink,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Where a session's notices land. Fixed once the session has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Append a new message to this channel for every notice.
    Channel(String),
    /// Rewrite this message for every notice.
    Message(MessageRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Polling,
    Notifying,
    Completed,
    Failed,
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The order reached its terminal phase.
    Completed,
    /// The provider failed twice in a row, or the start announcement could not be sent.
    Failed(CourierError),
    /// The session never started polling.
    Rejected(CourierError),
}

/// What one poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Unchanged,
    Notified,
    Completed,
}

/// A single tracked order and everything it needs to report on it.
pub struct TrackingSession {
    order: Option<OrderId>,
    channel_id: String,
    target: String,
    mode: DestinationMode,
    interval: Duration,
    provider: Arc<dyn StatusProvider>,
    sink: Arc<dyn NotificationSink>,
    pause: Arc<dyn Pause>,
    state: SessionState,
    last_status: Option<String>,
    destination: Option<Destination>,
}

impl TrackingSession {
    /// Create a session for `order` reporting into `channel_id`.
    ///
    /// `target` is prefixed to every notice (e.g. `@everyone` or `<@123>`).
    pub fn new(
        order: Option<OrderId>,
        channel_id: impl Into<String>,
        target: impl Into<String>,
        provider: Arc<dyn StatusProvider>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            order,
            channel_id: channel_id.into(),
            target: target.into(),
            mode: DestinationMode::Append,
            interval: DEFAULT_POLL_INTERVAL,
            provider,
            sink,
            pause: Arc::new(TokioPause),
            state: SessionState::Starting,
            last_status: None,
            destination: None,
        }
    }

    pub fn with_mode(mut self, mode: DestinationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to completion or failure.
    pub async fn run(mut self) -> SessionOutcome {
        let Some(order) = self.order.clone() else {
            self.transition(SessionState::Failed);
            return SessionOutcome::Rejected(CourierError::InvalidInput(
                "no order identifier found".into(),
            ));
        };

        let announcement = format!("🔎 Now tracking order `{order}`. Updates will appear here.");
        let announced = match self.sink.publish(&self.channel_id, &announcement).await {
            Ok(message) => message,
            Err(e) => {
                error!("tracker: order {order} could not announce tracking: {e}");
                self.transition(SessionState::Failed);
                return SessionOutcome::Failed(e);
            }
        };

        self.destination = Some(match self.mode {
            DestinationMode::Append => Destination::Channel(self.channel_id.clone()),
            DestinationMode::Edit => Destination::Message(announced),
        });
        info!(
            "tracker: started order {order} in channel {} ({:?})",
            self.channel_id, self.mode
        );

        loop {
            self.transition(SessionState::Polling);

            let step = match self.poll_once(&order).await {
                Ok(step) => step,
                Err(first) => {
                    warn!(
                        "tracker: order {order} poll failed, retrying in {}s: {first}",
                        self.interval.as_secs()
                    );
                    self.pause.pause(self.interval).await;
                    self.transition(SessionState::Polling);

                    match self.poll_once(&order).await {
                        Ok(step) => step,
                        Err(second) => {
                            error!("tracker: order {order} retry failed, giving up: {second}");
                            self.notify_failure(&order, &second).await;
                            self.transition(SessionState::Failed);
                            return SessionOutcome::Failed(second);
                        }
                    }
                }
            };

            if step == Step::Completed {
                info!("tracker: order {order} completed");
                self.transition(SessionState::Completed);
                return SessionOutcome::Completed;
            }

            self.pause.pause(self.interval).await;
        }
    }

    /// One request plus whatever notice it calls for.
    async fn poll_once(&mut self, order: &OrderId) -> Result<Step, CourierError> {
        let status = self.provider.fetch(order).await?;

        if status.phase.is_terminal() {
            let notice = format!("{} ✅ Order `{order}` has been delivered!", self.target);
            self.publish(&notice).await?;
            return Ok(Step::Completed);
        }

        let summary = status
            .summary
            .ok_or_else(|| CourierError::Provider("status has no summary text".into()))?;

        if self.last_status.as_deref() == Some(summary.as_str()) {
            debug!("tracker: order {order} unchanged: {summary}");
            return Ok(Step::Unchanged);
        }

        self.transition(SessionState::Notifying);
        self.publish(&format!("{} 📦 {summary}", self.target)).await?;
        info!("tracker: order {order} status -> {summary}");
        self.last_status = Some(summary);
        Ok(Step::Notified)
    }

    async fn publish(&self, text: &str) -> Result<(), CourierError> {
        match &self.destination {
            Some(Destination::Channel(channel_id)) => {
                self.sink.publish(channel_id, text).await.map(|_| ())
            }
            Some(Destination::Message(message)) => self.sink.update(message, text).await,
            None => Err(CourierError::Channel("session has no destination".into())),
        }
    }

    async fn notify_failure(&self, order: &OrderId, err: &CourierError) {
        let notice = format!(
            "{} ❌ Stopped tracking order `{order}`: {err}",
            self.target
        );
        if let Err(e) = self.publish(&notice).await {
            error!("tracker: order {order} could not publish failure notice: {e}");
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!("tracker: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
