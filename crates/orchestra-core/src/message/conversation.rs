//! Correlation tracking: one-shot watch/resolve slots keyed by correlation id.
//!
//! A caller `watch`es a key to obtain a [`PendingReply`], then awaits it. Any
//! component holding the same key may `resolve` it; only the first resolution
//! of a live slot is delivered, everything else is a silent no-op. Dropping a
//! [`PendingReply`] before it resolves discards its slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use orchestra_types::message::Payload;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::router::MessageError;

/// One open watch. `generation` tells a slot apart from a later watch that
/// reused its key.
#[derive(Debug)]
struct Slot {
    generation: u64,
    tx: oneshot::Sender<Payload>,
}

type Slots = Arc<DashMap<String, Slot>>;

/// Table of pending single-shot reply slots.
#[derive(Debug, Default)]
pub struct Conversation {
    /// Pending slots (correlation key -> slot).
    slots: Slots,
    generations: AtomicU64,
}

/// The waiting half of a watch.
///
/// Awaiting it suspends until the key is resolved. There is no timeout unless
/// one is layered on with [`Conversation::wait_for`].
#[derive(Debug)]
pub struct PendingReply {
    key: String,
    generation: u64,
    rx: oneshot::Receiver<Payload>,
    slots: Slots,
}

impl PendingReply {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the resolution of this watch.
    ///
    /// Fails with [`MessageError::Superseded`] if a newer watch on the same key
    /// replaced this one before it was resolved.
    pub async fn wait(mut self) -> Result<Payload, MessageError> {
        match (&mut self.rx).await {
            Ok(value) => Ok(value),
            Err(_) => Err(MessageError::Superseded(self.key.clone())),
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        let generation = self.generation;
        if self
            .slots
            .remove_if(&self.key, |_, slot| slot.generation == generation)
            .is_some()
        {
            debug!(key = %self.key, "watch abandoned before resolution");
        }
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a slot for `key` and return its waiting half.
    ///
    /// An unresolved slot already present for `key` is replaced (last watch
    /// wins); its waiter is woken with [`MessageError::Superseded`].
    pub fn watch(&self, key: impl Into<String>) -> PendingReply {
        let key = key.into();
        let (tx, rx) = oneshot::channel();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        if self
            .slots
            .insert(key.clone(), Slot { generation, tx })
            .is_some()
        {
            warn!(%key, "watch replaced an unresolved watch on the same key");
        }
        PendingReply {
            key,
            generation,
            rx,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Fill the slot for `key` with `value`.
    ///
    /// Returns `true` if a waiter received the value. Resolving a key that was
    /// never watched, was already resolved, or whose waiter has gone away is a
    /// no-op returning `false`.
    pub fn resolve(&self, key: &str, value: Payload) -> bool {
        let Some((_, slot)) = self.slots.remove(key) else {
            debug!(key, "no pending watch, resolution ignored");
            return false;
        };
        if slot.tx.send(value).is_err() {
            debug!(key, "waiter dropped before resolution");
            return false;
        }
        true
    }

    /// Discard the slot for `key` without resolving it.
    pub fn forget(&self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    /// Wait for `pending`, failing with [`MessageError::Timeout`] after
    /// `timeout` when one is given.
    ///
    /// A timed-out slot is removed from the table unless a newer watch has
    /// already taken its key.
    pub async fn wait_for(
        &self,
        pending: PendingReply,
        timeout: Option<Duration>,
    ) -> Result<Payload, MessageError> {
        let Some(after) = timeout else {
            return pending.wait().await;
        };

        let key = pending.key.clone();
        tokio::time::timeout(after, pending.wait())
            .await
            .map_err(|_| MessageError::Timeout { key, after })?
    }

    pub fn is_watching(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of unresolved slots.
    pub fn pending_count(&self) -> usize {
        self.slots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
