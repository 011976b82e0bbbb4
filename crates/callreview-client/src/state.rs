//! Application state management

use crate::api_client::{ApiClient, ResponsePolicy, UnauthorizedHandler};
use crate::auth::{AuthContext, AuthState};
use crate::routes::{Navigator, Route};
use crate::storage::{LocalStorage, TokenStore};
use callreview_core::{Config, Result};
use std::sync::Arc;
use tracing::warn;

/// Ends the session when the backend rejects the token
///
/// Clears the stored token, signs the user out and sends the navigator to
/// the login view.
#[derive(Debug, Clone)]
pub struct SessionExpiry {
    tokens: Arc<dyn TokenStore>,
    auth: AuthState,
    navigator: Navigator,
}

impl SessionExpiry {
    /// Handler acting on the given session pieces
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStore>, auth: AuthState, navigator: Navigator) -> Self {
        Self {
            tokens,
            auth,
            navigator,
        }
    }
}

impl UnauthorizedHandler for SessionExpiry {
    fn on_unauthorized(&self) {
        warn!("Session expired; returning to login");
        self.tokens.clear_token();
        self.auth.sign_out();
        self.navigator.navigate(Route::Login);
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Persisted bearer token
    pub tokens: Arc<dyn TokenStore>,
    /// API client with the session-expiry policy installed
    pub api: ApiClient,
    /// Login, logout and session restore
    pub auth: AuthContext,
    /// Current route
    pub navigator: Navigator,
}

impl AppState {
    /// Create state backed by the token file named in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(LocalStorage::open(config.session.storage_path.clone()));
        Self::with_tokens(config, tokens)
    }

    /// Create state over an explicit token store
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_tokens(config: Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let auth_state = AuthState::new();
        let navigator = Navigator::default();
        let expiry = SessionExpiry::new(Arc::clone(&tokens), auth_state.clone(), navigator.clone());

        let api = ApiClient::from_config(&config, Arc::clone(&tokens))?
            .with_policy(ResponsePolicy::new().on_unauthorized(Arc::new(expiry)));
        let auth = AuthContext::new(api.clone(), auth_state);

        Ok(Self {
            config,
            tokens,
            api,
            auth,
            navigator,
        })
    }
}
