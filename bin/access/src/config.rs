//! Command-line configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `ASSET_PORTAL__`, nested with `__`. For example:
//!
//! ```text
//! ASSET_PORTAL__IMS__ORG_ID=ABC123@AdobeOrg
//! ASSET_PORTAL__IMS__ENVIRONMENT=stg1
//! ASSET_PORTAL__ACCESS_TOKEN=eyJ...
//! ```
//!
//! See [`ImsConfig`] for the identity service settings.

use asset_portal_platform_access::ImsConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ASSET_PORTAL";

/// Configuration of the access tool.
#[derive(Debug, Deserialize)]
pub struct AccessConfig {
    /// Identity service and access policy settings.
    #[serde(default)]
    pub ims: ImsConfig,

    /// File holding cached tokens.
    #[serde(default = "default_token_store_path")]
    pub token_store_path: PathBuf,

    /// Token the non-interactive provider signs in with when nothing is cached.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_token_store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".config")
        .join("asset-portal")
        .join("tokens.json")
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            ims: ImsConfig::default(),
            token_store_path: default_token_store_path(),
            access_token: None,
        }
    }
}

impl AccessConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}
