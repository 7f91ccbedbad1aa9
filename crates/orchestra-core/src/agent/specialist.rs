//! The six specialists the orchestrator hires.
//!
//! Each one bids a fixed `eta_days`/`cost_units` and, on TASK, turns data
//! from an [`InsightSource`] (or the task payload alone, for go-to-market)
//! into a RESULT payload.

use std::sync::Arc;

use orchestra_types::card::Capability;
use orchestra_types::message::{into_payload, Payload};
use serde::Serialize;
use serde_json::{json, Value};

use crate::insight::InsightSource;

use super::responder::{Specialist, Work};

const DEFAULT_REGION: &str = "global";
const DEFAULT_PRODUCT: &str = "unknown product";

/// Fixed steps appended to every customer journey after the user needs.
const JOURNEY_STEPS: [&str; 3] = [
    "AI recommends sustainable options",
    "User compares footprint & cost",
    "Purchase & onboarding",
];

fn str_field<'a>(payload: &'a Payload, key: &str, default: &'a str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn region(payload: &Payload) -> &str {
    str_field(payload, "region", DEFAULT_REGION)
}

fn product(payload: &Payload) -> &str {
    str_field(payload, "product", DEFAULT_PRODUCT)
}

fn proposal(capability: Capability, eta_days: u32, cost_units: u32) -> Payload {
    into_payload(json!({
        "capability": capability.as_str(),
        "eta_days": eta_days,
        "cost_units": cost_units,
    }))
}

fn proposal_echoing(
    capability: Capability,
    eta_days: u32,
    cost_units: u32,
    key: &str,
    value: &str,
) -> Payload {
    let mut payload = proposal(capability, eta_days, cost_units);
    payload.insert(key.to_string(), Value::from(value));
    payload
}

fn record_payload<T: Serialize>(record: &T) -> serde_json::Result<Payload> {
    serde_json::to_value(record).map(into_payload)
}

fn render(payload: &Payload) -> String {
    Value::Object(payload.clone()).to_string()
}

/// Market trends and competitor intelligence for a region.
pub struct MarketInsight {
    source: Arc<dyn InsightSource>,
}

impl MarketInsight {
    pub fn new(source: Arc<dyn InsightSource>) -> Self {
        Self { source }
    }
}

impl Specialist for MarketInsight {
    fn capability(&self) -> Capability {
        Capability::MarketInsight
    }

    fn description(&self) -> &'static str {
        "Collects market trends and competitor intelligence."
    }

    fn propose(&self, request: &Payload) -> Payload {
        proposal_echoing(self.capability(), 1, 2, "region", region(request))
    }

    fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
        let region = region(task);
        let result = record_payload(&self.source.market_trends(region))?;
        Ok(Work {
            note: format!("Market trends for {region}: {}", render(&result)),
            result,
        })
    }
}

/// Customer sentiment and top requests for a product.
pub struct CustomerInsight {
    source: Arc<dyn InsightSource>,
}

impl CustomerInsight {
    pub fn new(source: Arc<dyn InsightSource>) -> Self {
        Self { source }
    }
}

impl Specialist for CustomerInsight {
    fn capability(&self) -> Capability {
        Capability::CustomerInsight
    }

    fn description(&self) -> &'static str {
        "Analyzes customer sentiment and top requests."
    }

    fn propose(&self, request: &Payload) -> Payload {
        proposal_echoing(self.capability(), 1, 2, "product", product(request))
    }

    fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
        let product = product(task);
        let result = record_payload(&self.source.customer_signals(product))?;
        Ok(Work {
            note: format!("Customer signals for {product}: {}", render(&result)),
            result,
        })
    }
}

/// Supplier and distributor scouting for a region.
pub struct Partnership {
    source: Arc<dyn InsightSource>,
}

impl Partnership {
    pub fn new(source: Arc<dyn InsightSource>) -> Self {
        Self { source }
    }
}

impl Specialist for Partnership {
    fn capability(&self) -> Capability {
        Capability::Partnerships
    }

    fn description(&self) -> &'static str {
        "Finds suppliers and distributors for partnerships."
    }

    fn propose(&self, request: &Payload) -> Payload {
        proposal_echoing(self.capability(), 2, 3, "region", region(request))
    }

    fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
        let region = region(task);
        let result = record_payload(&self.source.partners(region))?;
        Ok(Work {
            note: format!("Partners for {region}: {}", render(&result)),
            result,
        })
    }
}

/// Regulatory and ESG checks for a region.
pub struct ComplianceSustainability {
    source: Arc<dyn InsightSource>,
}

impl ComplianceSustainability {
    pub fn new(source: Arc<dyn InsightSource>) -> Self {
        Self { source }
    }
}

impl Specialist for ComplianceSustainability {
    fn capability(&self) -> Capability {
        Capability::ComplianceEsg
    }

    fn description(&self) -> &'static str {
        "Checks regional regulations and ESG frameworks."
    }

    fn propose(&self, request: &Payload) -> Payload {
        proposal_echoing(self.capability(), 1, 2, "region", region(request))
    }

    fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
        let region = region(task);
        let result = record_payload(&self.source.regulations(region))?;
        Ok(Work {
            note: format!("Regulations for {region}: {}", render(&result)),
            result,
        })
    }
}

/// Customer journey and visual direction built from top requests.
pub struct DesignArchitect {
    source: Arc<dyn InsightSource>,
}

impl DesignArchitect {
    pub fn new(source: Arc<dyn InsightSource>) -> Self {
        Self { source }
    }
}

impl Specialist for DesignArchitect {
    fn capability(&self) -> Capability {
        Capability::DesignArchitecture
    }

    fn description(&self) -> &'static str {
        "Creates user journeys and design prototypes."
    }

    fn propose(&self, _request: &Payload) -> Payload {
        proposal(self.capability(), 2, 3)
    }

    fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
        let needs = task
            .get("top_requests")
            .and_then(Value::as_array)
            .map(|requests| requests.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .unwrap_or_default();

        let journey: Vec<String> = needs
            .iter()
            .map(|need| format!("User need → '{need}'"))
            .chain(JOURNEY_STEPS.iter().map(|step| step.to_string()))
            .collect();

        let assets = self.source.design_assets();
        Ok(Work {
            note: format!(
                "Created design with style {} and palette {}",
                assets.style, assets.palette
            ),
            result: into_payload(json!({
                "style": assets.style,
                "palette": assets.palette,
                "journey": journey,
            })),
        })
    }
}

/// Campaign timeline, assets and channels for a launch.
#[derive(Debug, Default)]
pub struct GoToMarket;

impl Specialist for GoToMarket {
    fn capability(&self) -> Capability {
        Capability::GoToMarket
    }

    fn description(&self) -> &'static str {
        "Builds go-to-market campaign plans and assets."
    }

    fn propose(&self, _request: &Payload) -> Payload {
        proposal(self.capability(), 2, 4)
    }

    fn execute(&self, task: &Payload) -> serde_json::Result<Work> {
        let region = region(task);
        let partners = task
            .get("partners")
            .cloned()
            .unwrap_or_else(|| Value::Object(Payload::new()));

        Ok(Work {
            note: format!("Compiled go-to-market plan for {region}"),
            result: into_payload(json!({
                "timeline": [
                    ["Month 1", "Finalize partnerships and approvals"],
                    ["Month 2", "Pilot with key suppliers/distributors"],
                    ["Month 3", "Full campaign rollout"],
                ],
                "assets": {
                    "pitch_deck": format!("Opportunity in {region}"),
                    "brochure": "Sustainability-first value prop",
                },
                "channels": ["Online", "Retail", "B2B partner marketing"],
                "key_partners": partners,
            })),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
