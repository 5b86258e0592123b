//! HTTP client for the IMS REST API.

use reqwest::header::AUTHORIZATION;
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::credential::BearerCredential;
use crate::error::AuthorizationError;
use crate::fetch_cache::{FetchCache, RequestKey};
use crate::ims::ImsConfig;

/// Path of the organizations endpoint.
pub const ORGANIZATIONS_PATH: &str = "/ims/organizations/v6";
/// Path of the profile endpoint.
pub const PROFILE_PATH: &str = "/ims/profile/v1";

/// Client for the identity service endpoints used by the portal.
///
/// Organization lookups are memoized per request key; profile lookups are not.
#[derive(Clone)]
pub struct ImsClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    cache: Arc<FetchCache>,
}

impl ImsClient {
    /// Creates a client for the configured environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ImsConfig) -> Result<Self, Report<AuthorizationError>> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthorizationError::RequestFailed {
                url: config.ims_base_url().to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self::with_http_client(http, config))
    }

    /// Creates a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(http: reqwest::Client, config: &ImsConfig) -> Self {
        Self {
            http,
            base_url: config.ims_base_url().to_string(),
            client_id: config.client_id().to_string(),
            cache: Arc::new(FetchCache::new(config.org_cache_ttl())),
        }
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}?client_id={}", self.base_url, self.client_id)
    }

    /// Fetches the organization membership data of the credential's owner.
    ///
    /// The result is the raw JSON document; callers decide how to interpret
    /// shapes other than an array of records.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, non-success status, or a body
    /// that is not JSON.
    #[instrument(skip(self, credential))]
    pub async fn organizations(
        &self,
        credential: &BearerCredential,
    ) -> Result<JsonValue, Report<AuthorizationError>> {
        let url = self.endpoint(ORGANIZATIONS_PATH);
        let authorization = credential.header_value();
        let key = RequestKey::get(url.clone(), Some(authorization.clone()));

        self.cache
            .get_or_fetch(key, || self.get_json(url, authorization))
            .await
    }

    /// Fetches the profile of the credential's owner.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, non-success status, or a body
    /// that is not JSON.
    #[instrument(skip(self, credential))]
    pub async fn profile(
        &self,
        credential: &BearerCredential,
    ) -> Result<JsonValue, Report<AuthorizationError>> {
        let url = self.endpoint(PROFILE_PATH);
        self.get_json(url, credential.header_value()).await
    }

    /// Drops memoized organization data.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    async fn get_json(
        &self,
        url: String,
        authorization: String,
    ) -> Result<JsonValue, Report<AuthorizationError>> {
        debug!(url = %url, "requesting identity service");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| AuthorizationError::RequestFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorizationError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        response.json::<JsonValue>().await.map_err(|e| {
            AuthorizationError::InvalidResponse {
                url,
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl std::fmt::Debug for ImsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImsClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
