//! Shared domain types for Orchestra.
//!
//! This crate contains the vocabulary of the agent-to-agent (A2A) simulation:
//! addresses, intents, message envelopes, agent cards, the insight records
//! returned by specialists, and the plan request/report pair.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod address;
pub mod card;
pub mod config;
pub mod error;
pub mod insight;
pub mod intent;
pub mod message;
pub mod plan;
