//! Server Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `BIOSENSOR__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use synthesis::{SynthesisConfig, DEFAULT_HARD_CAP};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "biosensor.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BIOSENSOR";

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub synthesis: SynthesisSettings,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    pub listen_addr: SocketAddr,
    /// Origins allowed by CORS; empty allows none
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Storage backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite URL such as `sqlite://biosensor.db`; in-memory storage when unset
    pub database_url: Option<String>,
    /// Pool size for the SQLite backend
    pub max_connections: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
        }
    }
}

/// Synthesis endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Tuples examined per run regardless of the requested maximum
    pub hard_cap: usize,
    /// `max_combinations` when the request omits it
    pub default_request: usize,
    /// Largest accepted `max_combinations`
    pub max_request: usize,
    /// Fixed seed for reproducible scores
    pub seed: Option<u64>,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            hard_cap: DEFAULT_HARD_CAP,
            default_request: 10_000,
            max_request: 50_000,
            seed: None,
        }
    }
}

impl SynthesisSettings {
    pub fn service_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            hard_cap: self.hard_cap,
            seed: self.seed,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings, layering `path` (or [`DEFAULT_CONFIG_FILE`]) and the
    /// environment over the defaults. A missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?
            .try_deserialize()
    }

    /// Settings for tests: in-memory storage, fixed seed, no rate limiting
    pub fn for_tests() -> Self {
        Self {
            synthesis: SynthesisSettings {
                seed: Some(7),
                ..SynthesisSettings::default()
            },
            rate_limit: RateLimitConfig::disabled(),
            ..Settings::default()
        }
    }
}
