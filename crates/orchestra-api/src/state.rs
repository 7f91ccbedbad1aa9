//! Application state: resolved configuration and mesh construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use orchestra_core::agent::AgentMesh;
use orchestra_infra::config::{load_config_file, resolve_config_dir, CONFIG_FILE};
use orchestra_infra::insight::SeededInsightSource;
use orchestra_types::config::OrchestraConfig;

/// Per-invocation overrides taken from command-line flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub reply_timeout_secs: Option<u64>,
    pub data_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: OrchestraConfig,
    pub config_path: PathBuf,
}

impl AppState {
    /// Load configuration from `explicit` if given, else from the config
    /// directory.
    pub async fn init(explicit: Option<&Path>) -> Self {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => resolve_config_dir().join(CONFIG_FILE),
        };
        let config = load_config_file(&config_path).await;
        tracing::debug!(path = %config_path.display(), ?config, "configuration loaded");
        Self {
            config,
            config_path,
        }
    }

    /// Configuration with command-line overrides applied.
    pub fn effective_config(&self, overrides: Overrides) -> OrchestraConfig {
        let mut config = self.config.clone();
        if let Some(secs) = overrides.reply_timeout_secs {
            config.reply_timeout_secs = Some(secs);
        }
        if let Some(seed) = overrides.data_seed {
            config.data_seed = seed;
        }
        config
    }

    /// Assemble a fresh mesh backed by the seeded insight source.
    pub fn mesh(&self, overrides: Overrides) -> AgentMesh {
        let config = self.effective_config(overrides);
        let source = Arc::new(SeededInsightSource::new(config.data_seed));
        AgentMesh::assemble(source, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState {
            config: OrchestraConfig {
                reply_timeout_secs: Some(10),
                data_seed: 42,
            },
            config_path: PathBuf::from("config.toml"),
        }
    }

    #[test]
    fn flags_override_config() {
        let config = state().effective_config(Overrides {
            reply_timeout_secs: Some(2),
            data_seed: Some(9),
        });
        assert_eq!(config.reply_timeout_secs, Some(2));
        assert_eq!(config.data_seed, 9);
    }

    #[test]
    fn absent_flags_keep_config() {
        let config = state().effective_config(Overrides::default());
        assert_eq!(config.reply_timeout_secs, Some(10));
        assert_eq!(config.data_seed, 42);
    }

    #[tokio::test]
    async fn init_with_missing_explicit_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("absent.toml");
        let state = AppState::init(Some(&path)).await;
        assert_eq!(state.config, OrchestraConfig::default());
        assert_eq!(state.config_path, path);
    }
}
