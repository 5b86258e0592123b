//! IMS (identity management service) configuration.
//!
//! This module provides the configuration types for connecting to the
//! identity provider and for the access policy enforced by the guard.
//! Configuration can be deserialized directly (environment, files) or built
//! from the portal's site configuration entries.

use asset_portal_core::ImsOrgId;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderSettings;

/// Site configuration property selecting the IMS environment.
pub const SITE_PROPERTY_ENVIRONMENT: &str = "imsEnvironment";
/// Site configuration property holding the IMS organization ID.
pub const SITE_PROPERTY_ORG: &str = "imsOrg";
/// Site configuration property holding the required security group.
pub const SITE_PROPERTY_USER_GROUP: &str = "imsUserGroup";

/// IMS deployment the portal talks to.
///
/// Every source of the environment name follows the same rule: `"stage"` or
/// `"stg1"` selects staging, any other value selects production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ImsEnvironment {
    /// Staging (`stg1`).
    #[serde(rename = "stg1")]
    Stage,
    /// Production (`prod`).
    #[default]
    #[serde(rename = "prod")]
    Production,
}

impl ImsEnvironment {
    /// Maps an environment name to an environment.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "stage" | "stg1" => Self::Stage,
            _ => Self::Production,
        }
    }

    /// Maps the site configuration value. A missing value selects production.
    #[must_use]
    pub fn from_site_value(value: Option<&str>) -> Self {
        value.map_or(Self::Production, Self::from_name)
    }

    /// Returns the environment name understood by the provider client.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stage => "stg1",
            Self::Production => "prod",
        }
    }

    /// Returns the URL of the provider client library for this environment.
    #[must_use]
    pub fn script_url(&self) -> &'static str {
        match self {
            Self::Stage => "https://auth-stg1.services.adobe.com/imslib/imslib.js",
            Self::Production => "https://auth.services.adobe.com/imslib/imslib.min.js",
        }
    }

    /// Returns the base URL of the IMS REST API for this environment.
    #[must_use]
    pub fn ims_base_url(&self) -> &'static str {
        match self {
            Self::Stage => "https://ims-na1-stg1.adobelogin.com",
            Self::Production => "https://ims-na1.adobelogin.com",
        }
    }
}

impl From<String> for ImsEnvironment {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl std::fmt::Display for ImsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `configProperty`/`value` pair of the portal's site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigEntry {
    /// Property name (e.g. `imsOrg`).
    pub config_property: String,
    /// Property value; absent or null values are treated as unset.
    #[serde(default)]
    pub value: Option<String>,
}

impl SiteConfigEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(config_property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            config_property: config_property.into(),
            value: Some(value.into()),
        }
    }
}

fn site_value<'a>(entries: &'a [SiteConfigEntry], property: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| entry.config_property == property)
        .and_then(|entry| entry.value.as_deref())
}

/// Configuration for the IMS client and the access policy.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImsConfig {
    /// The IMS client ID, also sent as the API key.
    /// Default: "assets-distribution-portal"
    #[serde(default = "default_client_id")]
    client_id: String,
    /// Scopes to request as a comma-separated string.
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Locale passed to the provider client.
    /// Default: "en_US"
    #[serde(default = "default_locale")]
    locale: String,
    /// IMS deployment.
    #[serde(default)]
    environment: ImsEnvironment,
    /// The organization whose groups gate access. Without it no user has access.
    #[serde(default)]
    org_id: Option<ImsOrgId>,
    /// The group a user must belong to.
    /// Default: "assets-distribution-portal-users"
    #[serde(default = "default_user_group")]
    user_group: String,
    /// Overrides the environment's IMS REST base URL.
    #[serde(default)]
    ims_base_url: Option<String>,
    /// Upper bound on waiting for provider readiness. Unbounded when unset.
    #[serde(default)]
    ready_timeout_secs: Option<u64>,
    /// How long organization data is reused before being fetched again.
    /// Default: 300
    #[serde(default = "default_org_cache_ttl_secs")]
    org_cache_ttl_secs: u64,
}

fn default_client_id() -> String {
    "assets-distribution-portal".to_string()
}

fn default_scopes() -> String {
    "openid,AdobeID,additional_info.projectedProductContext,read_organizations".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_user_group() -> String {
    "assets-distribution-portal-users".to_string()
}

fn default_org_cache_ttl_secs() -> u64 {
    300
}

impl Default for ImsConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            scopes: default_scopes(),
            locale: default_locale(),
            environment: ImsEnvironment::default(),
            org_id: None,
            user_group: default_user_group(),
            ims_base_url: None,
            ready_timeout_secs: None,
            org_cache_ttl_secs: default_org_cache_ttl_secs(),
        }
    }
}

impl ImsConfig {
    /// Creates a configuration for the given organization with defaults for
    /// everything else.
    #[must_use]
    pub fn new(org_id: ImsOrgId) -> Self {
        Self {
            org_id: Some(org_id),
            ..Self::default()
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder() -> ImsConfigBuilder {
        ImsConfigBuilder::new()
    }

    /// Builds the configuration from site configuration entries.
    ///
    /// Reads `imsEnvironment`, `imsOrg` and `imsUserGroup`; an empty or
    /// missing group falls back to the default group.
    #[must_use]
    pub fn from_site_config(entries: &[SiteConfigEntry]) -> Self {
        let environment =
            ImsEnvironment::from_site_value(site_value(entries, SITE_PROPERTY_ENVIRONMENT));
        let org_id = site_value(entries, SITE_PROPERTY_ORG)
            .filter(|value| !value.is_empty())
            .map(ImsOrgId::from);
        let user_group = site_value(entries, SITE_PROPERTY_USER_GROUP)
            .filter(|value| !value.is_empty())
            .map_or_else(default_user_group, str::to_string);

        Self {
            environment,
            org_id,
            user_group,
            ..Self::default()
        }
    }

    /// Returns the IMS client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the scopes to request, parsed from the comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes.split(',').map(str::trim).collect()
    }

    /// Returns the raw scopes string.
    #[must_use]
    pub fn scopes_raw(&self) -> &str {
        &self.scopes
    }

    /// Returns the provider locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns the IMS environment.
    #[must_use]
    pub fn environment(&self) -> ImsEnvironment {
        self.environment
    }

    /// Returns the configured organization, if any.
    #[must_use]
    pub fn org_id(&self) -> Option<&ImsOrgId> {
        self.org_id.as_ref()
    }

    /// Returns the group required for access.
    #[must_use]
    pub fn user_group(&self) -> &str {
        &self.user_group
    }

    /// Returns the IMS REST base URL, without a trailing slash.
    #[must_use]
    pub fn ims_base_url(&self) -> &str {
        self.ims_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.ims_base_url())
            .trim_end_matches('/')
    }

    /// Returns the readiness timeout, if one is configured.
    #[must_use]
    pub fn ready_timeout(&self) -> Option<std::time::Duration> {
        self.ready_timeout_secs.map(std::time::Duration::from_secs)
    }

    /// Returns how long organization data may be reused.
    ///
    /// Values beyond what `chrono::Duration` can hold saturate at its maximum.
    #[must_use]
    pub fn org_cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.org_cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Returns the settings handed to the provider client when it is loaded.
    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            client_id: self.client_id.clone(),
            scope: self.scopes.clone(),
            locale: self.locale.clone(),
            auto_validate_token: true,
            uses_redirect_mode: true,
            environment: self.environment,
            script_url: self.environment.script_url().to_string(),
        }
    }
}

/// Builder for `ImsConfig`.
#[derive(Debug, Default)]
pub struct ImsConfigBuilder {
    config: ImsConfig,
}

impl ImsConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client ID.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = client_id.into();
        self
    }

    /// Adds a scope to the list of scopes to request.
    #[must_use]
    pub fn add_scope(mut self, scope: &str) -> Self {
        if !self.config.scopes().contains(&scope) {
            self.config.scopes = format!("{},{scope}", self.config.scopes);
        }
        self
    }

    /// Sets the IMS environment.
    #[must_use]
    pub fn environment(mut self, environment: ImsEnvironment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Sets the organization.
    #[must_use]
    pub fn org_id(mut self, org_id: impl Into<ImsOrgId>) -> Self {
        self.config.org_id = Some(org_id.into());
        self
    }

    /// Sets the group required for access.
    #[must_use]
    pub fn user_group(mut self, group: impl Into<String>) -> Self {
        self.config.user_group = group.into();
        self
    }

    /// Overrides the IMS REST base URL.
    #[must_use]
    pub fn ims_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.ims_base_url = Some(url.into());
        self
    }

    /// Bounds the wait for provider readiness.
    #[must_use]
    pub fn ready_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ready_timeout_secs = Some(secs);
        self
    }

    /// Sets how long organization data is reused.
    #[must_use]
    pub fn org_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.org_cache_ttl_secs = secs;
        self
    }

    /// Builds the `ImsConfig`.
    #[must_use]
    pub fn build(self) -> ImsConfig {
        self.config
    }
}
