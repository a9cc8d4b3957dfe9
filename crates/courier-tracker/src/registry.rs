//! Per-channel registry of running tracking sessions.
//!
//! At most one session runs per channel. The slot is claimed and the task
//! spawned under one lock, so an active slot always carries its abort handle.
//! A guard handed to the task releases the slot on completion, failure, panic,
//! or abort alike.

use courier_core::error::CourierError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

struct Slot {
    generation: u64,
    abort: AbortHandle,
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

/// Shared set of channels with an active tracking session.
#[derive(Clone, Default)]
pub struct ActiveSessions {
    slots: Slots,
    generation: Arc<AtomicU64>,
}

/// Releases a channel's slot when dropped, unless a newer session owns it.
struct SlotGuard {
    channel_id: String,
    generation: u64,
    slots: Slots,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        if slots
            .get(&self.channel_id)
            .is_some_and(|s| s.generation == self.generation)
        {
            slots.remove(&self.channel_id);
            debug!("tracker: released channel {}", self.channel_id);
        }
    }
}

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ActiveSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `channel_id` has a running session.
    pub fn is_active(&self, channel_id: &str) -> bool {
        lock(&self.slots).contains_key(channel_id)
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `session` as the channel's tracking task.
    ///
    /// Fails with `AlreadyTracking` if the channel already has one; the
    /// running session is left untouched.
    pub fn spawn<F>(&self, channel_id: &str, session: F) -> Result<JoinHandle<F::Output>, CourierError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let mut slots = lock(&self.slots);
        if slots.contains_key(channel_id) {
            return Err(CourierError::AlreadyTracking(channel_id.to_string()));
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let (guard_tx, guard_rx) = oneshot::channel::<SlotGuard>();
        let handle = tokio::spawn(async move {
            let _guard = guard_rx.await;
            session.await
        });
        slots.insert(
            channel_id.to_string(),
            Slot {
                generation,
                abort: handle.abort_handle(),
            },
        );
        drop(slots);

        // Handed over outside the lock. If the task is already gone the guard drops here.
        let _ = guard_tx.send(SlotGuard {
            channel_id: channel_id.to_string(),
            generation,
            slots: self.slots.clone(),
        });

        Ok(handle)
    }

    /// Abort the channel's session. Returns `false` if none was running.
    pub fn cancel(&self, channel_id: &str) -> bool {
        let abort = lock(&self.slots)
            .get(channel_id)
            .map(|slot| slot.abort.clone());
        match abort {
            Some(handle) => {
                info!("tracker: cancelling session in channel {channel_id}");
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Abort every running session.
    pub fn cancel_all(&self) {
        let handles: Vec<AbortHandle> = lock(&self.slots)
            .values()
            .map(|slot| slot.abort.clone())
            .collect();
        for handle in handles {
            handle.abort();
        }
    }
}
