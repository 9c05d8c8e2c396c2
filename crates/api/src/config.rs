use std::path::PathBuf;

use scenegen_core::config::{env_parse, env_string, split_list};
use scenegen_core::error::CoreError;
use scenegen_core::naming::DEFAULT_ASSET_ORIGIN;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `9983`).
    pub port: u16,
    /// Root holding the batch directories.
    pub data_dir: PathBuf,
    /// Origin that scheme-less image URLs are resolved against.
    pub asset_origin: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds for the browse routes (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-image download timeout in seconds (default: `60`).
    pub fetch_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `9983`                   |
    /// | `DATA_DIR`             | `.`                      |
    /// | `ASSET_ORIGIN`         | `https://res.theact.ai/` |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `FETCH_TIMEOUT_SECS`   | `60`                     |
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            host: env_string("HOST", "0.0.0.0"),
            port: env_parse("PORT", 9983)?,
            data_dir: PathBuf::from(env_string("DATA_DIR", ".")),
            asset_origin: env_string("ASSET_ORIGIN", DEFAULT_ASSET_ORIGIN),
            cors_origins: split_list(&env_string("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30)?,
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS", 60)?,
        })
    }
}
