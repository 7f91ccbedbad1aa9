//! The closed set of A2A intents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a message is being sent.
///
/// The taxonomy is fixed for this protocol: discovery (`Discover`/`Card`),
/// negotiation (`Rfp`/`Propose`/`Accept`/`Reject`), execution
/// (`Task`/`Result`) and out-of-band notices (`Info`/`Error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Request an agent card.
    Discover,
    /// Response carrying an agent card.
    Card,
    /// Request for proposal.
    Rfp,
    /// Proposal returned by a responder.
    Propose,
    /// Accept a proposal.
    Accept,
    /// Reject a proposal.
    Reject,
    /// Task assignment.
    Task,
    /// Task result.
    Result,
    /// Informational message or status update.
    Info,
    /// Error report.
    Error,
}

impl Intent {
    /// Upper-case wire name (e.g. `"RFP"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Discover => "DISCOVER",
            Intent::Card => "CARD",
            Intent::Rfp => "RFP",
            Intent::Propose => "PROPOSE",
            Intent::Accept => "ACCEPT",
            Intent::Reject => "REJECT",
            Intent::Task => "TASK",
            Intent::Result => "RESULT",
            Intent::Info => "INFO",
            Intent::Error => "ERROR",
        }
    }

    /// Whether a message with this intent answers an earlier request.
    ///
    /// These are the intents a coordinator resolves pending watches with.
    pub fn is_reply(&self) -> bool {
        matches!(self, Intent::Card | Intent::Propose | Intent::Result)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
