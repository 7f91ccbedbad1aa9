//! Messaging substrate and coordination logic for Orchestra.
//!
//! This crate defines the in-process A2A bus (address registry, router,
//! conversation tracker), the agents that talk over it, and the "port"
//! ([`insight::InsightSource`]) the infrastructure layer implements. It
//! depends only on `orchestra-types` -- never on `orchestra-infra`.

pub mod agent;
pub mod insight;
pub mod message;
