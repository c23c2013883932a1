//! Application configuration loader for cadet.
//!
//! Reads `config.toml` from the data directory (`~/.cadet/` by default) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed.

use std::path::{Path, PathBuf};

use cadet_types::config::AppConfig;

use crate::env::read_var;

/// Overrides the data directory.
pub const HOME_VAR: &str = "CADET_HOME";

/// Overrides `backend.base_url`.
pub const BACKEND_URL_VAR: &str = "CADET_BACKEND_URL";

/// Resolve the data directory.
///
/// Priority:
/// 1. `CADET_HOME` environment variable
/// 2. `~/.cadet`
pub fn data_dir() -> PathBuf {
    if let Some(dir) = read_var(HOME_VAR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".cadet");
    }

    // Last resort: current directory
    PathBuf::from(".cadet")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file cannot be read or parsed, logs a warning and returns the default.
/// - Otherwise returns the parsed config; absent keys keep their defaults.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply environment overrides on top of the file configuration.
pub fn apply_env_overrides(config: &mut AppConfig) {
    override_backend_url(config, read_var(BACKEND_URL_VAR));
}

fn override_backend_url(config: &mut AppConfig, url: Option<String>) {
    if let Some(url) = url {
        tracing::debug!(url = %url, "backend URL overridden from environment");
        config.backend.base_url = url.trim_end_matches('/').to_string();
    }
}
