//! Records returned by the insight source and carried in RESULT payloads.

use serde::{Deserialize, Serialize};

/// Market growth and competitive landscape for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrends {
    pub region: String,
    pub growth_rate: f64,
    pub competitors: Vec<String>,
    pub trends: Vec<String>,
}

/// Customer sentiment and most requested improvements for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSignals {
    pub product: String,
    pub average_sentiment: String,
    pub top_requests: Vec<String>,
}

/// Regulatory readiness and ESG frameworks for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryProfile {
    pub region: String,
    pub regulatory_ready: bool,
    pub esg_frameworks: Vec<String>,
    pub co2_intensity_cap: String,
}

/// Candidate suppliers and distributors in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerDirectory {
    pub region: String,
    pub suppliers: Vec<String>,
    pub distributors: Vec<String>,
}

/// Visual building blocks for a product concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignAssets {
    pub palette: String,
    pub style: String,
    pub components: Vec<String>,
}
