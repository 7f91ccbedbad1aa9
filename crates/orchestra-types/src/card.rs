//! Agent cards and the capabilities they advertise.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::message::{into_payload, Payload};

/// A capability a specialist responder can be hired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    MarketInsight,
    CustomerInsight,
    Partnerships,
    ComplianceEsg,
    DesignArchitecture,
    GoToMarket,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::MarketInsight,
        Capability::CustomerInsight,
        Capability::Partnerships,
        Capability::ComplianceEsg,
        Capability::DesignArchitecture,
        Capability::GoToMarket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::MarketInsight => "market_insight",
            Capability::CustomerInsight => "customer_insight",
            Capability::Partnerships => "partnerships",
            Capability::ComplianceEsg => "compliance_esg",
            Capability::DesignArchitecture => "design_architecture",
            Capability::GoToMarket => "go_to_market",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-description a participant returns on discovery.
///
/// Cards are produced on demand by each responder and are not canonical
/// state; a coordinator caches the ones it fetched, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub supported_intents: BTreeSet<Intent>,
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl AgentCard {
    /// Whether this card advertises `capability`.
    pub fn offers(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability.as_str())
    }

    /// Whether this participant declares support for `intent`.
    pub fn supports(&self, intent: Intent) -> bool {
        self.supported_intents.contains(&intent)
    }

    /// Render the card as a CARD payload.
    pub fn to_payload(&self) -> Payload {
        // A struct of strings and sets always serializes to an object.
        serde_json::to_value(self).map(into_payload).unwrap_or_default()
    }

    /// Parse a card out of a CARD payload.
    pub fn from_payload(payload: &Payload) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(payload.clone()))
    }
}
