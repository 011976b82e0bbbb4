//! Authentication state and the login/logout lifecycle

use crate::api_client::ApiClient;
use crate::storage::TokenStore;
use callreview_core::{Error, Result, User};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    /// Checking persisted credentials
    Loading,
    /// A user is signed in
    Authenticated(User),
    /// Nobody is signed in
    Unauthenticated,
}

/// Process-wide auth state, cheap to clone
#[derive(Debug, Clone)]
pub struct AuthState {
    phase: Arc<RwLock<AuthPhase>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthState {
    /// Fresh state in [`AuthPhase::Loading`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Arc::new(RwLock::new(AuthPhase::Loading)),
        }
    }

    /// Snapshot of the current phase
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.phase.read().clone()
    }

    /// Signed-in user, if any
    #[must_use]
    pub fn user(&self) -> Option<User> {
        match &*self.phase.read() {
            AuthPhase::Authenticated(user) => Some(user.clone()),
            AuthPhase::Loading | AuthPhase::Unauthenticated => None,
        }
    }

    /// Whether the initial credential check is still running
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*self.phase.read(), AuthPhase::Loading)
    }

    pub(crate) fn set_user(&self, user: User) {
        *self.phase.write() = AuthPhase::Authenticated(user);
    }

    /// Drop the signed-in user
    pub fn sign_out(&self) {
        *self.phase.write() = AuthPhase::Unauthenticated;
    }
}

/// Login, logout and start-up credential check
#[derive(Debug, Clone)]
pub struct AuthContext {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: AuthState,
}

impl AuthContext {
    /// Bind the context to a client and shared state
    #[must_use]
    pub fn new(api: ApiClient, state: AuthState) -> Self {
        let tokens = Arc::clone(api.tokens());
        Self { api, tokens, state }
    }

    /// Shared state handle
    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// Resolve the loading phase from the persisted token
    ///
    /// Without a token the session is unauthenticated. With one, the backend
    /// is asked who it belongs to; any failure discards the token.
    pub async fn initialize(&self, cancel: &CancellationToken) -> AuthPhase {
        if self.tokens.token().is_none() {
            self.state.sign_out();
            return self.state.phase();
        }

        match self.api.current_user(cancel).await {
            Ok(user) => {
                info!("Restored session for {}", user.username);
                self.state.set_user(user);
            }
            Err(Error::Cancelled) => {
                // Torn down mid-check; leave the phase alone.
                return self.state.phase();
            }
            Err(e) => {
                warn!("Stored session is no longer valid: {}", e);
                self.tokens.clear_token();
                self.state.sign_out();
            }
        }

        self.state.phase()
    }

    /// Sign in with a username and password
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if the backend rejects the
    /// credentials; other failures are returned unchanged. Nothing is retried.
    pub async fn login(&self, username: &str, password: &str, cancel: &CancellationToken) -> Result<User> {
        let response = match self.api.login(username, password, cancel).await {
            Ok(response) => response,
            Err(Error::Unauthorized) => {
                warn!("Login rejected for {}", username);
                return Err(Error::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        self.tokens.set_token(&response.access_token)?;
        self.state.set_user(response.user.clone());
        info!("Logged in as {} ({})", response.user.username, response.user.role);

        Ok(response.user)
    }

    /// Sign out locally; no backend round trip
    pub fn logout(&self) {
        self.tokens.clear_token();
        self.state.sign_out();
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use callreview_core::Role;
    use pretty_assertions::assert_eq;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "sarah".to_string(),
            rep_name: "Sarah Johnson".to_string(),
            role: Role::Rep,
        }
    }

    #[test]
    fn test_state_starts_loading() {
        let state = AuthState::new();
        assert!(state.is_loading());
        assert_eq!(state.user(), None);
    }

    #[test]
    fn test_state_transitions() {
        let state = AuthState::new();
        let shared = state.clone();

        state.set_user(user());
        assert_eq!(shared.user(), Some(user()));
        assert_eq!(shared.phase(), AuthPhase::Authenticated(user()));

        shared.sign_out();
        assert_eq!(state.phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_initialize_without_token_skips_backend() {
        // Unroutable root: any request would fail, proving none is made.
        let api = ApiClient::new("http://127.0.0.1:9/api", Arc::new(MemoryTokenStore::new()));
        let auth = AuthContext::new(api, AuthState::new());

        let phase = auth.initialize(&CancellationToken::new()).await;

        assert_eq!(phase, AuthPhase::Unauthenticated);
    }

    #[test]
    fn test_logout_clears_token_and_state() {
        let tokens = Arc::new(MemoryTokenStore::with_token("abc"));
        let api = ApiClient::new("http://127.0.0.1:9/api", tokens.clone());
        let state = AuthState::new();
        state.set_user(user());
        let auth = AuthContext::new(api, state.clone());

        auth.logout();

        assert_eq!(tokens.token(), None);
        assert_eq!(state.phase(), AuthPhase::Unauthenticated);
    }
}
