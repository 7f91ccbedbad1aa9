//! Seeded mock of the external data the specialists consult.
//!
//! Every lookup draws from one shared `StdRng`, so the sequence of values a
//! run produces depends only on the seed and on the order of the calls.

use std::sync::{Mutex, PoisonError};

use orchestra_core::insight::InsightSource;
use orchestra_types::insight::{
    CustomerSignals, DesignAssets, MarketTrends, PartnerDirectory, RegulatoryProfile,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

const COMPETITORS: [&str; 4] = ["Contoso", "Fabrikam", "Globex", "Initech"];
const TRENDS: [&str; 4] = [
    "Circular economy",
    "Eco-packaging",
    "Blockchain tracking",
    "Reverse logistics",
];
const SENTIMENTS: [&str; 3] = ["positive", "neutral", "negative"];
const CUSTOMER_NEEDS: [&str; 4] = [
    "Lower cost",
    "More sustainability",
    "Better usability",
    "Transparent sourcing",
];
/// How many of [`CUSTOMER_NEEDS`] a customer signal reports.
const TOP_REQUEST_COUNT: usize = 3;
const ESG_FRAMEWORKS: [&str; 3] = ["GRI", "SASB", "CSRD"];
const PALETTES: [&str; 3] = ["green/blue", "teal/charcoal", "navy/lime"];
const DESIGN_COMPONENTS: [&str; 3] = ["icon set", "illustrations", "presentation template"];

/// Probability threshold below which a region is reported as not ready.
const NOT_READY_BELOW: f64 = 0.15;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Reproducible [`InsightSource`] backed by a seeded RNG.
pub struct SeededInsightSource {
    rng: Mutex<StdRng>,
}

impl SeededInsightSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw(&mut *rng)
    }
}

impl InsightSource for SeededInsightSource {
    fn market_trends(&self, region: &str) -> MarketTrends {
        let growth_rate = self.with_rng(|rng| round_to(1.05 + rng.random::<f64>() * 0.1, 3));
        MarketTrends {
            region: region.to_string(),
            growth_rate,
            competitors: owned(&COMPETITORS),
            trends: owned(&TRENDS),
        }
    }

    fn customer_signals(&self, product: &str) -> CustomerSignals {
        let (sentiment, top_requests) = self.with_rng(|rng| {
            let sentiment = SENTIMENTS.choose(rng).copied().unwrap_or("neutral");
            let requests: Vec<String> = CUSTOMER_NEEDS
                .choose_multiple(rng, TOP_REQUEST_COUNT)
                .map(|need| need.to_string())
                .collect();
            (sentiment, requests)
        });
        CustomerSignals {
            product: product.to_string(),
            average_sentiment: sentiment.to_string(),
            top_requests,
        }
    }

    fn regulations(&self, region: &str) -> RegulatoryProfile {
        let (ready, cap) = self.with_rng(|rng| {
            let ready = rng.random::<f64>() > NOT_READY_BELOW;
            let cap = round_to(0.8 + rng.random::<f64>() * 0.3, 2);
            (ready, cap)
        });
        RegulatoryProfile {
            region: region.to_string(),
            regulatory_ready: ready,
            esg_frameworks: owned(&ESG_FRAMEWORKS),
            co2_intensity_cap: format!("{cap} kg/pack"),
        }
    }

    fn partners(&self, region: &str) -> PartnerDirectory {
        PartnerDirectory {
            region: region.to_string(),
            suppliers: (1..=3).map(|i| format!("Supplier {i}")).collect(),
            distributors: (1..=2).map(|i| format!("Distributor {i}")).collect(),
        }
    }

    fn design_assets(&self) -> DesignAssets {
        let palette = self.with_rng(|rng| PALETTES.choose(rng).copied().unwrap_or(PALETTES[0]));
        DesignAssets {
            palette: palette.to_string(),
            style: "modern".to_string(),
            components: owned(&DESIGN_COMPONENTS),
        }
    }
}

impl std::fmt::Debug for SeededInsightSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededInsightSource").finish_non_exhaustive()
    }
}
