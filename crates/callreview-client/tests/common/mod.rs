//! Common test utilities for integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use callreview_client::{App, AppState, MemoryTokenStore, TokenStore};
use callreview_core::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub mod fixtures;

pub use fixtures::*;

/// Token used by signed-in fixtures
pub const TEST_TOKEN: &str = "test-token";

/// Mock backend plus an application wired to it
pub struct TestApp {
    pub server: MockServer,
    pub tokens: Arc<MemoryTokenStore>,
    pub app: App,
}

impl TestApp {
    /// Application with no stored session
    pub async fn signed_out() -> Self {
        Self::build(MemoryTokenStore::new()).await
    }

    /// Application holding [`TEST_TOKEN`] that `/auth/me` resolves to `user`
    pub async fn signed_in(user: serde_json::Value) -> Self {
        let test = Self::build(MemoryTokenStore::with_token(TEST_TOKEN)).await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user))
            .mount(&test.server)
            .await;
        test.app.start().await;
        test
    }

    async fn build(tokens: MemoryTokenStore) -> Self {
        let server = MockServer::start().await;
        let tokens = Arc::new(tokens);
        let store: Arc<dyn TokenStore> = tokens.clone();

        let mut config = Config::default();
        config.api.base_url = server.uri();
        let state = AppState::with_tokens(config, store).unwrap();

        Self {
            server,
            tokens,
            app: App::new(state, CancellationToken::new()),
        }
    }

    /// The wired API client
    pub fn api(&self) -> &callreview_client::ApiClient {
        &self.app.state().api
    }
}

/// Route logs to the test harness
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("callreview_client=debug")
        .try_init();
}
