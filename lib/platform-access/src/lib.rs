//! Session and access guard for the asset portal.
//!
//! This crate provides:
//! - Bearer credential acquisition (`AccessGuard::acquire_credential`)
//! - A shared identity provider session with a single in-flight load
//!   (`ProviderSession`, `SessionState`)
//! - Persistent token storage (`TokenStore`, `MemoryTokenStore`, `FileTokenStore`)
//! - Organization membership lookups against IMS (`ImsClient`)
//! - Security group checks (`AccessGuard::check_user_access`)
//!
//! # Access Control Model
//!
//! A user may use the portal when the IMS organization data for their token
//! lists the configured security group under the configured organization.
//! Without a configured organization, access is denied.
//!
//! # Example
//!
//! ```
//! use asset_portal_platform_access::{
//!     AccessGuard, ImsClient, ImsConfig, MemoryTokenStore, ProviderSession,
//!     StaticProviderLoader,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ImsConfig::builder().org_id("ABC123@AdobeOrg").build();
//! let client = ImsClient::new(&config).map_err(|e| e.to_string())?;
//! let guard = AccessGuard::new(
//!     config,
//!     Arc::new(ProviderSession::new()),
//!     Arc::new(MemoryTokenStore::with_bearer_token("token")),
//!     Arc::new(StaticProviderLoader::new(None, client.clone())),
//!     client,
//! );
//!
//! let credential = guard.bearer_token().await.map_err(|e| e.to_string())?;
//! assert_eq!(credential.header_value(), "Bearer token");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credential;
pub mod error;
pub mod fetch_cache;
pub mod guard;
pub mod ims;
pub mod org;
pub mod provider;
pub mod session;
pub mod token_store;

pub use client::ImsClient;
pub use credential::{BearerCredential, CredentialOutcome};
pub use error::{AuthenticationError, AuthorizationError};
pub use fetch_cache::{FetchCache, RequestKey};
pub use guard::AccessGuard;
pub use ims::{ImsConfig, ImsConfigBuilder, ImsEnvironment, SiteConfigEntry};
pub use org::{GroupRecord, OrgRef, OrganizationRecord};
pub use provider::{
    IdentityProvider, ProviderLoader, ProviderSettings, StaticProvider, StaticProviderLoader,
    TokenDetails, UserProfile,
};
pub use session::{ProviderSession, SessionState};
pub use token_store::{BEARER_TOKEN_KEY, FileTokenStore, MemoryTokenStore, TokenStore};
