// crates/propdesk-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: TOML-backed server settings with environment overrides.
// Purpose: Resolve bind address, provider selection, and seeding policy.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration loads from a TOML file (explicit path, `PROPDESK_CONFIG`,
//! or `propdesk.toml` in the working directory) and falls back to defaults
//! when no file is present. Environment variables override individual
//! fields: `PROPDESK_BIND` for the listen address and `PROPDESK_PROVIDER`
//! for the reasoning-provider name. API keys are never part of the file;
//! the provider layer reads them from the environment at startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use propdesk_agent::ProviderSettings;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable pointing at the config file.
pub const CONFIG_ENV: &str = "PROPDESK_CONFIG";

/// Environment variable overriding the bind address.
pub const BIND_ENV: &str = "PROPDESK_BIND";

/// Default config filename probed in the working directory.
const DEFAULT_CONFIG_FILE: &str = "propdesk.toml";

/// Default listen address.
const DEFAULT_BIND: &str = "127.0.0.1:3000";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config file unreadable: {path}: {reason}")]
    Io {
        /// Offending file path.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },
    /// The config file is not valid TOML for this schema.
    #[error("config file invalid: {0}")]
    Parse(String),
    /// A field value fails validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Reasoning-provider section of the server config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Registered provider name (`anthropic` or `minimax`).
    #[serde(default = "default_provider_name")]
    pub name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
        }
    }
}

/// Top-level server configuration.
///
/// # Invariants
/// - `bind` parses as a socket address after `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address for the HTTP server.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Reasoning-provider selection.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Whether to pre-populate the store with demo tickets.
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            provider: ProviderConfig::default(),
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

/// Default listen address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default provider name.
fn default_provider_name() -> String {
    "anthropic".to_string()
}

/// Demo seeding default.
const fn default_seed_demo_data() -> bool {
    true
}

impl ServerConfig {
    /// Loads configuration with environment overrides applied.
    ///
    /// Resolution order for the file: explicit `path`, `PROPDESK_CONFIG`,
    /// then `propdesk.toml` if present. With no file, defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, malformed, or
    /// fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let resolved = path.map(Path::to_path_buf).or(env_path).or_else(|| {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.exists().then_some(fallback)
        });

        let mut config = match resolved {
            Some(file) => {
                let raw = std::fs::read_to_string(&file).map_err(|err| ConfigError::Io {
                    path: file.clone(),
                    reason: err.to_string(),
                })?;
                toml::from_str(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?
            }
            None => Self::default(),
        };

        if let Ok(bind) = std::env::var(BIND_ENV) {
            config.bind = bind;
        }
        if let Ok(name) = std::env::var(propdesk_agent::PROVIDER_ENV) {
            config.provider.name = name;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unparseable bind address or
    /// an unregistered provider name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        ProviderSettings::named(&self.provider.name)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }

    /// Returns the parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("bind address unparseable: {}", self.bind)))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
