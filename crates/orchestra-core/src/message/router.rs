//! Address-based envelope router with delivery-completion semantics.
//!
//! The `Router` maps an address name to one asynchronous handler. `send`
//! invokes the recipient's handler and waits for it to finish, so once `send`
//! returns the recipient has processed the envelope up to completion --
//! including any replies it sent back through the same router.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt};
use orchestra_types::intent::Intent;
use orchestra_types::message::Envelope;
use thiserror::Error;
use tracing::debug;

use crate::agent::Agent;

/// Errors that can occur while routing or awaiting messages.
#[derive(Debug, Error)]
pub enum MessageError {
    /// No handler is registered for the recipient address.
    #[error("no handler registered for address '{0}'")]
    NotRegistered(String),

    /// A watched reply did not arrive within the configured timeout.
    #[error("no reply for '{key}' within {after:?}")]
    Timeout { key: String, after: Duration },

    /// The watch was replaced by a newer watch on the same key before it
    /// resolved.
    #[error("watch for '{0}' was superseded before it resolved")]
    Superseded(String),

    /// A reply arrived but its payload could not be interpreted.
    #[error("invalid {intent} payload from '{sender}': {reason}")]
    InvalidPayload {
        intent: Intent,
        sender: String,
        reason: String,
    },
}

/// Future returned by a registered handler.
pub type HandlerFuture = BoxFuture<'static, Result<(), MessageError>>;

/// A registered message handler.
pub type Handler = Arc<dyn Fn(Envelope) -> HandlerFuture + Send + Sync>;

/// In-memory dispatch table from address name to handler.
///
/// Handlers may call [`Router::send`] from inside their own execution; the
/// handler is cloned out of the table before it runs, so no map guard is held
/// across the await.
#[derive(Default)]
pub struct Router {
    handlers: DashMap<String, Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `address`, replacing any earlier registration.
    pub fn register<F, Fut>(&self, address: impl Into<String>, handler: F)
    where
        F: Fn(Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), MessageError>> + Send + 'static,
    {
        let address = address.into();
        let handler: Handler = Arc::new(move |envelope| handler(envelope).boxed());
        if self.handlers.insert(address.clone(), handler).is_some() {
            debug!(%address, "replaced handler");
        } else {
            debug!(%address, "registered handler");
        }
    }

    /// Register an [`Agent`] under its own address.
    pub fn register_agent<A: Agent + 'static>(&self, agent: Arc<A>) {
        let address = agent.address().name().to_string();
        self.register(address, move |envelope| {
            let agent = Arc::clone(&agent);
            async move { agent.on_message(envelope).await }
        });
    }

    /// Remove the handler for `address`.
    ///
    /// Returns `true` if one was registered.
    pub fn unregister(&self, address: &str) -> bool {
        self.handlers.remove(address).is_some()
    }

    /// Drop every handler.
    ///
    /// Handlers usually hold the agents that hold this router; clearing the
    /// table breaks that cycle when a mesh is torn down.
    pub fn clear(&self) {
        self.handlers.clear();
    }

    pub fn is_registered(&self, address: &str) -> bool {
        self.handlers.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver `envelope` to its recipient and wait for the handler to finish.
    ///
    /// Fails with [`MessageError::NotRegistered`] when the recipient has no
    /// handler, and propagates any error the handler returns.
    pub async fn send(&self, envelope: Envelope) -> Result<(), MessageError> {
        let handler = self
            .handlers
            .get(envelope.recipient())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MessageError::NotRegistered(envelope.recipient().to_string()))?;

        debug!(
            intent = %envelope.intent(),
            sender = envelope.sender(),
            recipient = envelope.recipient(),
            message_id = %envelope.message_id(),
            correlation_id = envelope.correlation_id().unwrap_or("-"),
            "delivering envelope"
        );

        handler(envelope).await
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registered_addresses", &self.handlers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
