//! Runtime configuration
//!
//! The gateway base URL is injected at process start instead of being a
//! compiled-in literal. Precedence: CLI `--url` flag, then the
//! `PNLVIEW_BACKEND_URL` environment variable, then `backend_url` in the
//! config file under the platform config directory, then a localhost
//! default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Environment variable overriding the gateway base URL
pub const BACKEND_URL_ENV: &str = "PNLVIEW_BACKEND_URL";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the gateway serving the snapshot endpoint
    pub backend_url: String,
}

/// On-disk layout of `config.toml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_url: Option<String>,
}

impl Config {
    /// Load configuration, applying the documented precedence order.
    pub fn load(cli_url: Option<&str>) -> Result<Self> {
        let env_url = std::env::var(BACKEND_URL_ENV).ok();
        let file_url = match config_file_path() {
            Some(path) if path.exists() => read_file_config(&path)?.backend_url,
            _ => None,
        };
        Ok(Self::resolve(cli_url, env_url.as_deref(), file_url.as_deref()))
    }

    /// Pure precedence resolution, separated from the environment for tests.
    fn resolve(cli_url: Option<&str>, env_url: Option<&str>, file_url: Option<&str>) -> Self {
        let backend_url = [cli_url, env_url, file_url]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BACKEND_URL)
            .to_string();

        debug!("Using gateway URL {}", backend_url);
        Config { backend_url }
    }
}

fn read_file_config(path: &PathBuf) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn config_file_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("pnlview").join("config.toml"))
}
