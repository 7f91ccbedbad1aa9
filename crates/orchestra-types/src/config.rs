//! Global configuration types for Orchestra.
//!
//! `OrchestraConfig` represents the top-level `config.toml` that controls
//! reply timeouts and the mock insight seed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for a simulation run.
///
/// Loaded from `~/.orchestra/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestraConfig {
    /// Seconds to wait for any single reply before failing the exchange.
    /// `None` waits indefinitely.
    #[serde(default)]
    pub reply_timeout_secs: Option<u64>,

    /// Seed for the deterministic insight source.
    #[serde(default = "default_data_seed")]
    pub data_seed: u64,
}

fn default_data_seed() -> u64 {
    42
}

impl OrchestraConfig {
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for OrchestraConfig {
    fn default() -> Self {
        Self {
            reply_timeout_secs: None,
            data_seed: default_data_seed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = OrchestraConfig::default();
        assert_eq!(config.reply_timeout_secs, None);
        assert_eq!(config.reply_timeout(), None);
        assert_eq!(config.data_seed, 42);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: OrchestraConfig = toml::from_str("").unwrap();
        assert_eq!(config, OrchestraConfig::default());
    }

    #[test]
    fn test_deserialize_with_values() {
        let toml_str = r#"
reply_timeout_secs = 5
data_seed = 7
"#;
        let config: OrchestraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.reply_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.data_seed, 7);
    }
}
