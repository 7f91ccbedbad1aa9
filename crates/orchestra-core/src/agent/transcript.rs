//! Per-participant log of notable events.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Ordered log lines written by one participant.
///
/// Every line is also emitted as a `tracing` event tagged with the owner.
/// Cloning produces a shared view (backed by `Arc<Mutex<...>>`).
#[derive(Debug, Clone)]
pub struct Transcript {
    owner: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn record(&self, line: impl Into<String>) {
        let line = line.into();
        info!(agent = %self.owner, "{line}");
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    /// Snapshot of every line recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
