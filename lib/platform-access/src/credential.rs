//! Bearer credentials.

use secrecy::{ExposeSecret, SecretString};

/// Authorization scheme prefixed to every token.
pub const BEARER_SCHEME: &str = "Bearer";

/// An opaque bearer token ready to be presented in an `Authorization` header.
///
/// The token is kept in a `SecretString`, so `Debug` output never reveals it.
#[derive(Debug, Clone)]
pub struct BearerCredential {
    token: SecretString,
}

impl BearerCredential {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Returns the `Authorization` header value, `"Bearer <token>"`.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("{BEARER_SCHEME} {}", self.token.expose_secret())
    }
}

/// Outcome of a credential acquisition.
#[derive(Debug, Clone)]
pub enum CredentialOutcome {
    /// A credential is available.
    Resolved(BearerCredential),
    /// The user is not signed in; the provider has started interactive
    /// reauthentication and this flow will not produce a credential.
    ReauthenticationStarted,
}

impl CredentialOutcome {
    /// Returns the credential, if one was resolved.
    #[must_use]
    pub fn credential(&self) -> Option<&BearerCredential> {
        match self {
            Self::Resolved(credential) => Some(credential),
            Self::ReauthenticationStarted => None,
        }
    }

    /// Returns true if interactive reauthentication was started.
    #[must_use]
    pub fn is_reauthenticating(&self) -> bool {
        matches!(self, Self::ReauthenticationStarted)
    }
}
