//! Login page

use crate::auth::AuthContext;
use callreview_core::{Error, User};
use colored::Colorize;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Shown when the backend rejects the credentials
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login form state
#[derive(Debug, Clone, Default)]
pub struct LoginPage {
    error: Option<String>,
    submitting: bool,
}

impl LoginPage {
    /// Blank form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline error from the last attempt
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// An attempt is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Try to sign in
    ///
    /// Returns the user on success. Failures become the inline error; blank
    /// fields are rejected without a request.
    pub async fn submit(
        &mut self,
        auth: &AuthContext,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Option<User> {
        if username.trim().is_empty() || password.is_empty() {
            self.error = Some("Username and password are required".to_string());
            return None;
        }

        self.submitting = true;
        let outcome = auth.login(username.trim(), password, cancel).await;
        self.submitting = false;

        match outcome {
            Ok(user) => {
                self.error = None;
                Some(user)
            }
            Err(Error::Cancelled) => None,
            Err(Error::InvalidCredentials) => {
                self.error = Some(INVALID_CREDENTIALS.to_string());
                None
            }
            Err(e) => {
                error!("Login failed: {}", e);
                self.error = Some(format!("Login failed: {e}"));
                None
            }
        }
    }
}

impl fmt::Display for LoginPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Sales Call Review".bold())?;
        writeln!(f, "Sign in to your account")?;
        if let Some(error) = &self.error {
            writeln!(f, "  {}", error.red())?;
        }
        if self.submitting {
            writeln!(f, "Signing in...")?;
        }
        writeln!(f, "Run `callreview login <USERNAME>` to sign in.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiClient;
    use crate::auth::AuthState;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_blank_fields_rejected_without_request() {
        colored::control::set_override(false);
        let api = ApiClient::new("http://127.0.0.1:9/api", Arc::new(MemoryTokenStore::new()));
        let auth = AuthContext::new(api, AuthState::new());
        let mut page = LoginPage::new();

        let user = page.submit(&auth, "  ", "secret", &CancellationToken::new()).await;

        assert_eq!(user, None);
        assert_eq!(page.error(), Some("Username and password are required"));
        assert!(page.to_string().contains("Username and password are required"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_shown_inline() {
        let api = ApiClient::new("http://127.0.0.1:9/api", Arc::new(MemoryTokenStore::new()));
        let auth = AuthContext::new(api, AuthState::new());
        let mut page = LoginPage::new();

        let user = page.submit(&auth, "sarah", "secret", &CancellationToken::new()).await;

        assert_eq!(user, None);
        assert!(page.error().is_some_and(|e| e.starts_with("Login failed")));
        assert!(!page.is_submitting());
    }
}
