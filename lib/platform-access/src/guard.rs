//! The access guard.
//!
//! `AccessGuard` produces bearer credentials on demand and answers whether the
//! current user belongs to the configured security group.
//!
//! Credential lookup order:
//! 1. the persistent token store (`bearerToken`);
//! 2. the live tokens of an already loaded provider (access, then reauth);
//! 3. loading the provider once, waiting for readiness, and reading the token
//!    of the signed-in user, or starting interactive reauthentication.

use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::client::ImsClient;
use crate::credential::{BearerCredential, CredentialOutcome};
use crate::error::{AuthenticationError, AuthorizationError};
use crate::ims::ImsConfig;
use crate::org::{GroupRecord, groups_for_org, is_member, parse_organizations};
use crate::provider::{IdentityProvider, ProviderLoader, UserProfile, live_token};
use crate::session::{ProviderSession, SessionState};
use crate::token_store::{BEARER_TOKEN_KEY, TokenStore};

/// Guards access to the portal.
///
/// Cloning is cheap; clones share the session, store and organization cache.
#[derive(Clone)]
pub struct AccessGuard {
    config: Arc<ImsConfig>,
    session: Arc<ProviderSession>,
    store: Arc<dyn TokenStore>,
    loader: Arc<dyn ProviderLoader>,
    client: ImsClient,
}

impl AccessGuard {
    /// Creates a guard.
    ///
    /// Pass the same `session` to every guard of a process so the provider is
    /// loaded only once.
    #[must_use]
    pub fn new(
        config: ImsConfig,
        session: Arc<ProviderSession>,
        store: Arc<dyn TokenStore>,
        loader: Arc<dyn ProviderLoader>,
        client: ImsClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            session,
            store,
            loader,
            client,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ImsConfig {
        &self.config
    }

    /// Returns the shared provider session.
    #[must_use]
    pub fn session(&self) -> &Arc<ProviderSession> {
        &self.session
    }

    /// Returns the persistent token store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Acquires a bearer credential.
    ///
    /// Suspends until the provider is ready. Without a configured readiness
    /// timeout, a provider that never becomes ready suspends the caller
    /// indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the token store fails, the provider cannot be
    /// loaded, readiness times out, a signed-in provider yields no token, or
    /// reauthentication cannot be started.
    #[instrument(skip(self))]
    pub async fn acquire_credential(
        &self,
    ) -> Result<CredentialOutcome, Report<AuthenticationError>> {
        if let Some(token) = self.stored_token().await? {
            debug!("using stored bearer token");
            return Ok(CredentialOutcome::Resolved(BearerCredential::new(token)));
        }

        if let Some(provider) = self.session.provider()
            && let Some(token) = live_token(provider.as_ref())
        {
            debug!("using live provider token");
            return Ok(CredentialOutcome::Resolved(BearerCredential::new(token)));
        }

        let session = &self.session;
        let provider = session
            .initialize(self.loader.as_ref(), &self.config.provider_settings())
            .await?;

        session.advance(SessionState::AwaitingReadiness);
        self.await_ready(provider.as_ref()).await?;

        if provider.is_signed_in_user() {
            session.advance(SessionState::Authenticated);
            let token = live_token(provider.as_ref()).ok_or(AuthenticationError::MissingToken)?;
            session.advance(SessionState::Resolved);
            Ok(CredentialOutcome::Resolved(BearerCredential::new(token)))
        } else {
            session.advance(SessionState::AwaitingInteractiveReauth);
            info!("user is not signed in, starting reauthentication");
            provider.reauthenticate().await?;
            Ok(CredentialOutcome::ReauthenticationStarted)
        }
    }

    /// Acquires a bearer credential, treating reauthentication as an error.
    ///
    /// # Errors
    ///
    /// Returns `ReauthenticationRequired` when the user is not signed in, and
    /// every error of [`acquire_credential`](Self::acquire_credential).
    pub async fn bearer_token(&self) -> Result<BearerCredential, Report<AuthenticationError>> {
        match self.acquire_credential().await? {
            CredentialOutcome::Resolved(credential) => Ok(credential),
            CredentialOutcome::ReauthenticationStarted => {
                Err(AuthenticationError::ReauthenticationRequired.into())
            }
        }
    }

    /// Returns the groups the user holds in the configured organization.
    ///
    /// Empty when no organization is configured, the data is not a list, the
    /// organization is absent, or it has no groups.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential can be obtained or the organization
    /// data cannot be fetched.
    #[instrument(skip(self))]
    pub async fn security_group_memberships(
        &self,
    ) -> Result<Vec<GroupRecord>, Report<AuthorizationError>> {
        let credential = self
            .bearer_token()
            .await
            .map_err(|report| report.context(AuthorizationError::CredentialUnavailable))?;

        let document = self.client.organizations(&credential).await?;

        let Some(org_id) = self.config.org_id() else {
            debug!("no organization configured");
            return Ok(Vec::new());
        };

        let groups = groups_for_org(&parse_organizations(&document), org_id);
        debug!(org = %org_id, groups = groups.len(), "resolved group memberships");
        Ok(groups)
    }

    /// Returns true if the user belongs to `group_name` in the configured
    /// organization.
    ///
    /// # Errors
    ///
    /// See [`security_group_memberships`](Self::security_group_memberships).
    pub async fn is_user_in_security_group(
        &self,
        group_name: &str,
    ) -> Result<bool, Report<AuthorizationError>> {
        let groups = self.security_group_memberships().await?;
        Ok(is_member(&groups, group_name))
    }

    /// Returns true if the user belongs to the configured access group.
    ///
    /// # Errors
    ///
    /// See [`security_group_memberships`](Self::security_group_memberships).
    #[instrument(skip(self), fields(group = %self.config.user_group()))]
    pub async fn check_user_access(&self) -> Result<bool, Report<AuthorizationError>> {
        let allowed = self
            .is_user_in_security_group(self.config.user_group())
            .await?;
        debug!(allowed, "access check result");
        Ok(allowed)
    }

    /// Returns the signed-in user's profile, loading the provider if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be loaded or the profile
    /// cannot be retrieved.
    pub async fn user_profile(&self) -> Result<UserProfile, Report<AuthenticationError>> {
        let provider = self
            .session
            .initialize(self.loader.as_ref(), &self.config.provider_settings())
            .await?;
        self.await_ready(provider.as_ref()).await?;
        provider.profile().await
    }

    async fn stored_token(&self) -> Result<Option<String>, Report<AuthenticationError>> {
        Ok(self
            .store
            .get(BEARER_TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    async fn await_ready(
        &self,
        provider: &dyn IdentityProvider,
    ) -> Result<(), Report<AuthenticationError>> {
        match self.config.ready_timeout() {
            Some(limit) => tokio::time::timeout(limit, provider.ready())
                .await
                .map_err(|_| {
                    AuthenticationError::ReadinessTimeout {
                        waited_secs: limit.as_secs(),
                    }
                    .into()
                }),
            None => {
                provider.ready().await;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
