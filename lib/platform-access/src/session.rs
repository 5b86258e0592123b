//! Identity provider session state.
//!
//! A `ProviderSession` is shared by every guard of a process (or page). It
//! owns the single provider client and tracks how far the provider flow has
//! come. Loading goes through one in-flight initialization future, so
//! concurrent callers never load the provider twice.
//!
//! The state only moves forward. Credentials taken from the token store or
//! from an already loaded provider leave it untouched.

use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info};

use crate::error::AuthenticationError;
use crate::provider::{IdentityProvider, ProviderLoader, ProviderSettings};

/// How far the provider flow has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The provider flow has not started.
    NoToken,
    /// The provider client is being loaded.
    AwaitingProviderInit,
    /// The provider is loaded; waiting for its readiness signal.
    AwaitingReadiness,
    /// Readiness reported a signed-in user.
    Authenticated,
    /// Readiness reported no signed-in user; interactive reauthentication
    /// has been started. Terminal for the current flow.
    AwaitingInteractiveReauth,
    /// A credential was handed to the caller.
    Resolved,
}

impl SessionState {
    /// Returns true if the state ends an acquisition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::AwaitingInteractiveReauth)
    }

    fn rank(self) -> u8 {
        match self {
            Self::NoToken => 0,
            Self::AwaitingProviderInit => 1,
            Self::AwaitingReadiness => 2,
            Self::Authenticated => 3,
            Self::AwaitingInteractiveReauth | Self::Resolved => 4,
        }
    }

    /// Returns true if moving from `current` to `self` is progress.
    ///
    /// A terminal state replaces another terminal state, so the latest
    /// outcome of the flow is the one observed.
    fn supersedes(self, current: Self) -> bool {
        self.rank() > current.rank()
            || (self.is_terminal() && current.is_terminal() && self != current)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NoToken => "no_token",
            Self::AwaitingProviderInit => "awaiting_provider_init",
            Self::AwaitingReadiness => "awaiting_readiness",
            Self::Authenticated => "authenticated",
            Self::AwaitingInteractiveReauth => "awaiting_interactive_reauth",
            Self::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// Process-wide identity provider session.
pub struct ProviderSession {
    provider: OnceCell<Arc<dyn IdentityProvider>>,
    state: watch::Sender<SessionState>,
}

impl ProviderSession {
    /// Creates a session with no provider loaded.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::NoToken);
        Self {
            provider: OnceCell::new(),
            state,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Returns true once the provider client has been loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.provider.initialized()
    }

    /// Returns the provider if it has already been loaded.
    #[must_use]
    pub fn provider(&self) -> Option<Arc<dyn IdentityProvider>> {
        self.provider.get().cloned()
    }

    /// Returns the provider, loading it on first use.
    ///
    /// Concurrent callers wait on the same load. A failed load leaves the
    /// session uninitialized so a later call can try again.
    ///
    /// # Errors
    ///
    /// Returns the loader's error.
    pub async fn initialize(
        &self,
        loader: &dyn ProviderLoader,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn IdentityProvider>, Report<AuthenticationError>> {
        self.provider
            .get_or_try_init(|| async {
                self.advance(SessionState::AwaitingProviderInit);
                info!(
                    script_url = %settings.script_url,
                    environment = %settings.environment,
                    "loading identity provider"
                );
                loader.load(settings).await
            })
            .await
            .cloned()
    }

    /// Moves the state to `next` unless the session is already further along.
    ///
    /// Returns true if the state changed.
    pub(crate) fn advance(&self, next: SessionState) -> bool {
        let mut previous = next;
        let changed = self.state.send_if_modified(|current| {
            if !next.supersedes(*current) {
                return false;
            }
            previous = std::mem::replace(current, next);
            true
        });
        if changed {
            debug!(from = %previous, to = %next, "session state changed");
        }
        changed
    }
}

impl Default for ProviderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("initialized", &self.is_initialized())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ims::ImsConfig;
    use crate::provider::{TokenDetails, UserProfile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ReadyProvider;

    #[async_trait]
    impl IdentityProvider for ReadyProvider {
        async fn ready(&self) {}

        fn is_signed_in_user(&self) -> bool {
            true
        }

        fn access_token(&self) -> Option<TokenDetails> {
            Some(TokenDetails::new("t"))
        }

        fn reauth_access_token(&self) -> Option<TokenDetails> {
            None
        }

        async fn reauthenticate(&self) -> Result<(), Report<AuthenticationError>> {
            Ok(())
        }

        async fn profile(&self) -> Result<UserProfile, Report<AuthenticationError>> {
            Err(AuthenticationError::Profile {
                reason: "unused".to_string(),
            }
            .into())
        }
    }

    #[derive(Default)]
    struct SlowLoader {
        loads: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl ProviderLoader for SlowLoader {
        async fn load(
            &self,
            settings: &ProviderSettings,
        ) -> Result<Arc<dyn IdentityProvider>, Report<AuthenticationError>> {
            let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail_first && attempt == 0 {
                return Err(AuthenticationError::ProviderLoad {
                    script_url: settings.script_url.clone(),
                    reason: "script blocked".to_string(),
                }
                .into());
            }
            Ok(Arc::new(ReadyProvider))
        }
    }

    #[test]
    fn new_session_is_uninitialized() {
        let session = ProviderSession::new();
        assert_eq!(session.state(), SessionState::NoToken);
        assert!(!session.is_initialized());
        assert!(session.provider().is_none());
    }

    #[tokio::test]
    async fn concurrent_initialization_loads_once() {
        let session = Arc::new(ProviderSession::new());
        let loader = Arc::new(SlowLoader::default());
        let settings = ImsConfig::default().provider_settings();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = Arc::clone(&session);
            let loader = Arc::clone(&loader);
            let settings = settings.clone();
            handles.push(tokio::spawn(async move {
                session
                    .initialize(loader.as_ref(), &settings)
                    .await
                    .map(|_| ())
                    .is_ok()
            }));
        }

        for handle in handles {
            assert!(handle.await.expect("join"));
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(session.is_initialized());
        assert_eq!(session.state(), SessionState::AwaitingProviderInit);
    }

    #[tokio::test]
    async fn failed_load_can_be_retried() {
        let session = ProviderSession::new();
        let loader = SlowLoader {
            fail_first: true,
            ..SlowLoader::default()
        };
        let settings = ImsConfig::default().provider_settings();

        assert!(session.initialize(&loader, &settings).await.is_err());
        assert!(!session.is_initialized());

        assert!(session.initialize(&loader, &settings).await.is_ok());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let session = ProviderSession::new();
        let mut receiver = session.subscribe();

        assert!(session.advance(SessionState::AwaitingReadiness));

        receiver.changed().await.expect("changed");
        assert_eq!(*receiver.borrow(), SessionState::AwaitingReadiness);
    }

    #[test]
    fn state_never_moves_backwards() {
        let session = ProviderSession::new();
        assert!(session.advance(SessionState::AwaitingReadiness));
        assert!(session.advance(SessionState::Resolved));

        assert!(!session.advance(SessionState::NoToken));
        assert!(!session.advance(SessionState::AwaitingProviderInit));
        assert!(!session.advance(SessionState::AwaitingReadiness));
        assert!(!session.advance(SessionState::Authenticated));
        assert!(!session.advance(SessionState::Resolved));
        assert_eq!(session.state(), SessionState::Resolved);
    }

    #[test]
    fn terminal_outcome_can_be_replaced() {
        let session = ProviderSession::new();
        assert!(session.advance(SessionState::AwaitingInteractiveReauth));
        assert!(!session.advance(SessionState::Authenticated));

        assert!(session.advance(SessionState::Resolved));
        assert_eq!(session.state(), SessionState::Resolved);

        assert!(session.advance(SessionState::AwaitingInteractiveReauth));
        assert_eq!(session.state(), SessionState::AwaitingInteractiveReauth);
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let session = ProviderSession::new();
        session.advance(SessionState::Resolved);
        let receiver = session.subscribe();

        session.advance(SessionState::AwaitingReadiness);

        assert!(!receiver.has_changed().expect("sender alive"));
    }

    #[test]
    fn terminal_states() {
        assert!(SessionState::Resolved.is_terminal());
        assert!(SessionState::AwaitingInteractiveReauth.is_terminal());
        assert!(!SessionState::AwaitingReadiness.is_terminal());
        assert_eq!(
            SessionState::AwaitingInteractiveReauth.to_string(),
            "awaiting_interactive_reauth"
        );
    }
}
