//! Participants on the A2A bus.
//!
//! - `AgentContext`: address, display name, shared router/conversation/id allocator
//! - `Transcript`: per-participant log lines
//! - `Responder`: generic specialist agent driven by a pure reaction function
//! - `specialist`: the six specialists hired by the orchestrator
//! - `Orchestrator`: discovery, RFP -> accept -> task exchanges, plan aggregation
//! - `AgentMesh`: wires every participant onto one router

pub mod context;
pub mod mesh;
pub mod orchestrator;
pub mod responder;
pub mod specialist;
pub mod transcript;

use std::future::Future;

use orchestra_types::address::Address;
use orchestra_types::card::AgentCard;
use orchestra_types::message::Envelope;

use crate::message::MessageError;

pub use context::AgentContext;
pub use mesh::{AgentMesh, Roster};
pub use orchestrator::Orchestrator;
pub use responder::{Reaction, Responder, Specialist};
pub use transcript::Transcript;

/// A participant that can be registered on a [`Router`](crate::message::Router).
pub trait Agent: Send + Sync {
    /// The address this agent receives messages on.
    fn address(&self) -> &Address;

    /// Describe this agent for discovery.
    fn card(&self) -> AgentCard;

    /// Process one incoming envelope.
    ///
    /// Replies are sent through the router before the returned future
    /// completes. Errors from those sends are returned to whoever delivered
    /// the envelope.
    fn on_message(
        &self,
        envelope: Envelope,
    ) -> impl Future<Output = Result<(), MessageError>> + Send;
}
