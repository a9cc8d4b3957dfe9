//! Sleep abstraction so the polling loop can be driven without real time.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current session between polls.
///
/// The session is a plain future, so aborting its task interrupts a pause
/// immediately.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Real-time pause backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
