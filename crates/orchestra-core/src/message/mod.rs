//! In-process A2A message bus with address routing and reply correlation.
//!
//! This module provides the runtime messaging infrastructure for agent-to-agent
//! communication:
//! - `registry` -- `AddressRegistry`, idempotent name -> `Address` lookup
//! - `router` -- `Router` delivering envelopes to registered async handlers
//! - `conversation` -- `Conversation` watch/resolve slots keyed by correlation id

pub mod conversation;
pub mod registry;
pub mod router;

pub use conversation::{Conversation, PendingReply};
pub use registry::AddressRegistry;
pub use router::{MessageError, Router};
