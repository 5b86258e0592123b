//! Identity provider abstraction.
//!
//! The guard never talks to the provider runtime directly. A
//! [`ProviderLoader`] brings up the provider client once per session, and the
//! resulting [`IdentityProvider`] answers token and sign-in questions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::ImsClient;
use crate::credential::BearerCredential;
use crate::error::AuthenticationError;
use crate::ims::ImsEnvironment;

/// Settings handed to the provider client when it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Client ID registered with IMS.
    pub client_id: String,
    /// Comma-separated scopes.
    pub scope: String,
    /// UI locale.
    pub locale: String,
    /// Whether the provider validates tokens on load.
    pub auto_validate_token: bool,
    /// Whether sign-in uses full-page redirects rather than popups.
    pub uses_redirect_mode: bool,
    /// IMS deployment.
    pub environment: ImsEnvironment,
    /// Location of the provider client library.
    pub script_url: String,
}

/// A token as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    /// The raw token.
    pub token: String,
    /// When the token expires, if known.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenDetails {
    /// Creates token details without expiry information.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Returns the token if it is non-empty.
    #[must_use]
    pub fn usable_token(&self) -> Option<&str> {
        Some(self.token.as_str()).filter(|token| !token.is_empty())
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// IMS user ID.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Remaining fields returned by the provider.
    #[serde(flatten)]
    pub raw: serde_json::Map<String, JsonValue>,
}

impl UserProfile {
    /// Decodes a profile document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object.
    pub fn from_json(value: JsonValue) -> Result<Self, Report<AuthenticationError>> {
        serde_json::from_value(value).map_err(|e| {
            AuthenticationError::Profile {
                reason: format!("unexpected profile document: {e}"),
            }
            .into()
        })
    }
}

/// A loaded identity provider client.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves once the provider has signaled readiness.
    ///
    /// Readiness is latched: once signaled, later calls return immediately.
    async fn ready(&self);

    /// Returns true if a user is signed in.
    fn is_signed_in_user(&self) -> bool;

    /// Returns the primary access token.
    fn access_token(&self) -> Option<TokenDetails>;

    /// Returns the token obtained by the last reauthentication.
    fn reauth_access_token(&self) -> Option<TokenDetails>;

    /// Starts interactive reauthentication.
    ///
    /// In a browser this navigates away; the current flow never resumes.
    async fn reauthenticate(&self) -> Result<(), Report<AuthenticationError>>;

    /// Returns the signed-in user's profile.
    async fn profile(&self) -> Result<UserProfile, Report<AuthenticationError>>;
}

/// Returns the first non-empty token: the access token, then the reauth token.
pub fn live_token(provider: &dyn IdentityProvider) -> Option<String> {
    provider
        .access_token()
        .and_then(|details| details.usable_token().map(str::to_string))
        .or_else(|| {
            provider
                .reauth_access_token()
                .and_then(|details| details.usable_token().map(str::to_string))
        })
}

/// Brings up the identity provider client.
#[async_trait]
pub trait ProviderLoader: Send + Sync {
    /// Loads and configures the provider client.
    async fn load(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn IdentityProvider>, Report<AuthenticationError>>;
}

/// A non-interactive provider for command-line and service use.
///
/// It is ready immediately and signed in exactly when a token was supplied.
/// It cannot run an interactive sign-in.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    token: Option<String>,
    client: ImsClient,
}

impl StaticProvider {
    /// Creates a provider holding `token`; empty tokens count as absent.
    #[must_use]
    pub fn new(token: Option<String>, client: ImsClient) -> Self {
        Self {
            token: token.filter(|token| !token.is_empty()),
            client,
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    async fn ready(&self) {}

    fn is_signed_in_user(&self) -> bool {
        self.token.is_some()
    }

    fn access_token(&self) -> Option<TokenDetails> {
        self.token.as_deref().map(TokenDetails::new)
    }

    fn reauth_access_token(&self) -> Option<TokenDetails> {
        None
    }

    async fn reauthenticate(&self) -> Result<(), Report<AuthenticationError>> {
        warn!("interactive sign-in requested but not available");
        Err(AuthenticationError::InteractiveSignInUnavailable.into())
    }

    async fn profile(&self) -> Result<UserProfile, Report<AuthenticationError>> {
        let token = self
            .token
            .as_deref()
            .ok_or(AuthenticationError::ReauthenticationRequired)?;

        let document = self
            .client
            .profile(&BearerCredential::new(token))
            .await
            .map_err(|report| {
                report.context(AuthenticationError::Profile {
                    reason: "identity service request failed".to_string(),
                })
            })?;

        UserProfile::from_json(document)
    }
}

/// Loader producing a [`StaticProvider`].
#[derive(Debug, Clone)]
pub struct StaticProviderLoader {
    token: Option<String>,
    client: ImsClient,
}

impl StaticProviderLoader {
    /// Creates a loader for a provider holding `token`.
    #[must_use]
    pub fn new(token: Option<String>, client: ImsClient) -> Self {
        Self { token, client }
    }
}

#[async_trait]
impl ProviderLoader for StaticProviderLoader {
    async fn load(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn IdentityProvider>, Report<AuthenticationError>> {
        info!(
            client_id = %settings.client_id,
            environment = %settings.environment,
            "using static identity provider"
        );
        Ok(Arc::new(StaticProvider::new(
            self.token.clone(),
            self.client.clone(),
        )))
    }
}
