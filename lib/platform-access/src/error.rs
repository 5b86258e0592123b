//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticationError`: failures while obtaining a bearer credential
//! - `AuthorizationError`: failures while checking group membership

use std::fmt;

/// Errors from credential acquisition.
///
/// These errors represent failures in establishing the user's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The persistent token store could not be read or written.
    TokenStore { reason: String },
    /// The identity provider client could not be loaded.
    ProviderLoad { script_url: String, reason: String },
    /// The identity provider did not signal readiness in time.
    ReadinessTimeout { waited_secs: u64 },
    /// The provider reports a signed-in user but yields no token.
    MissingToken,
    /// The user is not signed in and interactive reauthentication has started.
    ReauthenticationRequired,
    /// The provider failed to start reauthentication.
    Reauthentication { reason: String },
    /// The provider cannot run an interactive sign-in in this environment.
    InteractiveSignInUnavailable,
    /// The user profile could not be retrieved.
    Profile { reason: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenStore { reason } => {
                write!(f, "token store error: {reason}")
            }
            Self::ProviderLoad { script_url, reason } => {
                write!(f, "failed to load identity provider from '{script_url}': {reason}")
            }
            Self::ReadinessTimeout { waited_secs } => {
                write!(f, "identity provider not ready after {waited_secs}s")
            }
            Self::MissingToken => {
                write!(f, "identity provider reported a signed-in user without a token")
            }
            Self::ReauthenticationRequired => {
                write!(f, "user is not signed in, reauthentication started")
            }
            Self::Reauthentication { reason } => {
                write!(f, "reauthentication failed: {reason}")
            }
            Self::InteractiveSignInUnavailable => {
                write!(f, "interactive sign-in is not available")
            }
            Self::Profile { reason } => {
                write!(f, "failed to fetch user profile: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from authorization operations.
///
/// These errors represent failures in fetching or reading organization data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No bearer credential could be obtained for the request.
    CredentialUnavailable,
    /// The request to the identity service failed.
    RequestFailed { url: String, reason: String },
    /// The identity service answered with a non-success status.
    UnexpectedStatus { url: String, status: u16 },
    /// The response body could not be decoded.
    InvalidResponse { url: String, reason: String },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialUnavailable => {
                write!(f, "no bearer credential available")
            }
            Self::RequestFailed { url, reason } => {
                write!(f, "request to {url} failed: {reason}")
            }
            Self::UnexpectedStatus { url, status } => {
                write!(f, "request to {url} returned status {status}")
            }
            Self::InvalidResponse { url, reason } => {
                write!(f, "invalid response from {url}: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_load_display() {
        let err = AuthenticationError::ProviderLoad {
            script_url: "https://auth.example.com/imslib.js".to_string(),
            reason: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("imslib.js"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn readiness_timeout_display() {
        let err = AuthenticationError::ReadinessTimeout { waited_secs: 30 };
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn reauthentication_required_display() {
        let err = AuthenticationError::ReauthenticationRequired;
        assert!(err.to_string().contains("not signed in"));
    }

    #[test]
    fn unexpected_status_display() {
        let err = AuthorizationError::UnexpectedStatus {
            url: "https://ims.example.com/ims/organizations/v6".to_string(),
            status: 401,
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("organizations"));
    }

    #[test]
    fn credential_unavailable_display() {
        let err = AuthorizationError::CredentialUnavailable;
        assert!(err.to_string().contains("no bearer credential"));
    }
}
