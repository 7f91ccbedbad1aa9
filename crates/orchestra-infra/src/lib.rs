//! Infrastructure layer for Orchestra.
//!
//! Contains the implementations of the ports defined in `orchestra-core`
//! (the seeded mock [`insight::SeededInsightSource`]) and the configuration
//! loader.

pub mod config;
pub mod insight;
