//! Configuration loader for Orchestra.
//!
//! Reads `config.toml` from the config directory (`~/.orchestra/` in
//! production) or from an explicit path, and deserializes it into
//! [`OrchestraConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};

use orchestra_types::config::OrchestraConfig;

/// File name looked up inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the config directory.
///
/// Uses `ORCHESTRA_CONFIG_DIR` when set, otherwise `~/.orchestra`, otherwise
/// `.orchestra` in the current directory.
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ORCHESTRA_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".orchestra");
    }

    PathBuf::from(".orchestra")
}

/// Load configuration from `{config_dir}/config.toml`.
pub async fn load_config(config_dir: &Path) -> OrchestraConfig {
    load_config_file(&config_dir.join(CONFIG_FILE)).await
}

/// Load configuration from an explicit file path.
///
/// - Missing file: returns [`OrchestraConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config_file(config_path: &Path) -> OrchestraConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", config_path.display());
            return OrchestraConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return OrchestraConfig::default();
        }
    };

    match toml::from_str::<OrchestraConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            OrchestraConfig::default()
        }
    }
}
