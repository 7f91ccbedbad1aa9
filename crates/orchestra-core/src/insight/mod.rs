//! Port for the data the specialists draw on.
//!
//! Implementations live outside core (see `orchestra-infra` for the seeded
//! mock). [`FixedInsightSource`] returns constant records and is meant for
//! tests and offline demos.

use orchestra_types::insight::{
    CustomerSignals, DesignAssets, MarketTrends, PartnerDirectory, RegulatoryProfile,
};

/// Provider of market, customer, regulatory, partner and design data.
pub trait InsightSource: Send + Sync {
    fn market_trends(&self, region: &str) -> MarketTrends;

    fn customer_signals(&self, product: &str) -> CustomerSignals;

    fn regulations(&self, region: &str) -> RegulatoryProfile;

    fn partners(&self, region: &str) -> PartnerDirectory;

    fn design_assets(&self) -> DesignAssets;
}

/// Deterministic source that ignores randomness entirely.
#[derive(Debug, Clone)]
pub struct FixedInsightSource {
    pub top_requests: Vec<String>,
}

impl Default for FixedInsightSource {
    fn default() -> Self {
        Self {
            top_requests: vec!["Lower cost".into(), "Transparent sourcing".into()],
        }
    }
}

impl InsightSource for FixedInsightSource {
    fn market_trends(&self, region: &str) -> MarketTrends {
        MarketTrends {
            region: region.to_string(),
            growth_rate: 1.1,
            competitors: vec!["Contoso".into(), "Fabrikam".into()],
            trends: vec!["Circular economy".into()],
        }
    }

    fn customer_signals(&self, product: &str) -> CustomerSignals {
        CustomerSignals {
            product: product.to_string(),
            average_sentiment: "positive".into(),
            top_requests: self.top_requests.clone(),
        }
    }

    fn regulations(&self, region: &str) -> RegulatoryProfile {
        RegulatoryProfile {
            region: region.to_string(),
            regulatory_ready: true,
            esg_frameworks: vec!["GRI".into(), "CSRD".into()],
            co2_intensity_cap: "0.9 kg/pack".into(),
        }
    }

    fn partners(&self, region: &str) -> PartnerDirectory {
        PartnerDirectory {
            region: region.to_string(),
            suppliers: vec![format!("Supplier 1 ({region})")],
            distributors: vec![format!("Distributor 1 ({region})")],
        }
    }

    fn design_assets(&self) -> DesignAssets {
        DesignAssets {
            palette: "green/blue".into(),
            style: "modern".into(),
            components: vec!["icon set".into()],
        }
    }
}
