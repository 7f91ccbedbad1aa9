//! Plan request and the aggregated plan report.

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::message::Payload;

/// What to plan for: a target region and a high-level product description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRequest {
    region: String,
    product: String,
}

/// Shape of the JSON input file. Missing keys read as empty strings.
#[derive(Debug, Deserialize)]
struct RawPlanInput {
    #[serde(default)]
    region: String,
    #[serde(default)]
    product: String,
}

impl PlanRequest {
    /// Validate and build a request. Both fields are trimmed and must be
    /// non-empty.
    pub fn new(region: impl AsRef<str>, product: impl AsRef<str>) -> Result<Self, InputError> {
        let region = region.as_ref().trim();
        let product = product.as_ref().trim();
        if region.is_empty() {
            return Err(InputError::MissingRegion);
        }
        if product.is_empty() {
            return Err(InputError::MissingProduct);
        }
        Ok(Self {
            region: region.to_string(),
            product: product.to_string(),
        })
    }

    /// Parse `{"region": ..., "product": ...}`.
    pub fn from_json(input: &str) -> Result<Self, InputError> {
        let raw: RawPlanInput =
            serde_json::from_str(input).map_err(|e| InputError::Malformed(e.to_string()))?;
        Self::new(raw.region, raw.product)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn product(&self) -> &str {
        &self.product
    }
}

/// Aggregated output of one coordination run.
///
/// Each section is the RESULT payload of the exchange that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub region: String,
    pub product: String,
    pub market_insights: Payload,
    pub customer_insights: Payload,
    pub compliance: Payload,
    pub partners: Payload,
    pub design: Payload,
    pub go_to_market: Payload,
}

impl PlanReport {
    /// Section names in report order, paired with their payloads.
    pub fn sections(&self) -> [(&'static str, &Payload); 6] {
        [
            ("market_insights", &self.market_insights),
            ("customer_insights", &self.customer_insights),
            ("compliance", &self.compliance),
            ("partners", &self.partners),
            ("design", &self.design),
            ("go_to_market", &self.go_to_market),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_fields() {
        let req = PlanRequest::new("  LATAM ", "EcoWidget\n").unwrap();
        assert_eq!(req.region(), "LATAM");
        assert_eq!(req.product(), "EcoWidget");
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert!(matches!(PlanRequest::new("", "EcoWidget"), Err(InputError::MissingRegion)));
        assert!(matches!(PlanRequest::new("LATAM", "   "), Err(InputError::MissingProduct)));
    }

    #[test]
    fn from_json_reads_both_keys() {
        let req = PlanRequest::from_json(r#"{"region": "APAC", "product": "Solar kit"}"#).unwrap();
        assert_eq!(req.region(), "APAC");
        assert_eq!(req.product(), "Solar kit");
    }

    #[test]
    fn from_json_missing_key_is_empty_field() {
        let err = PlanRequest::from_json(r#"{"region": "EMEA"}"#).unwrap_err();
        assert!(matches!(err, InputError::MissingProduct));
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = PlanRequest::from_json("not json").unwrap_err();
        assert!(matches!(err, InputError::Malformed(_)));
    }

    #[test]
    fn report_serializes_all_sections() {
        let report = PlanReport {
            region: "LATAM".to_string(),
            product: "EcoWidget".to_string(),
            market_insights: Payload::new(),
            customer_insights: Payload::new(),
            compliance: Payload::new(),
            partners: Payload::new(),
            design: Payload::new(),
            go_to_market: Payload::new(),
        };
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 8);
        for (name, _) in report.sections() {
            assert!(object.contains_key(name), "missing {name}");
        }
    }
}
