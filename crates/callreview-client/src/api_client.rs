//! HTTP client for communicating with the sales call review API
//!
//! Every request carries the stored bearer token. What happens on a 401 is
//! not decided here: the caller hands in a [`ResponsePolicy`] and the client
//! invokes its unauthorized handler before returning [`Error::Unauthorized`].

use crate::storage::TokenStore;
use callreview_core::types::{
    Call, CallAnalysisSubmission, ChatExchange, ChatReply, ChatRequest, LoginRequest,
    LoginResponse, ManagerAnalytics, RepSummary, SubmissionReceipt, User,
};
use callreview_core::{Config, Error, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Reaction to a 401 from any endpoint
pub trait UnauthorizedHandler: Send + Sync + fmt::Debug {
    /// Called once per unauthorized response, before the error reaches the caller
    fn on_unauthorized(&self);
}

/// Response-handling policy passed into the client
#[derive(Debug, Clone, Default)]
pub struct ResponsePolicy {
    on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ResponsePolicy {
    /// Policy that only reports errors
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `handler` whenever the backend answers 401
    #[must_use]
    pub fn on_unauthorized(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    fn unauthorized(&self) {
        if let Some(handler) = &self.on_unauthorized {
            handler.on_unauthorized();
        }
    }
}

/// Filters for the call list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallQuery {
    /// Only calls owned by this rep (honoured for managers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_id: Option<String>,
    /// Maximum number of calls, most recent first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl CallQuery {
    /// Most recent `limit` calls
    #[must_use]
    pub const fn recent(limit: u32) -> Self {
        Self {
            rep_id: None,
            limit: Some(limit),
        }
    }

    /// Restrict to one rep
    #[must_use]
    pub fn for_rep(mut self, rep_id: impl Into<String>) -> Self {
        self.rep_id = Some(rep_id.into());
        self
    }
}

#[derive(Serialize)]
struct HistoryQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    call_id: Option<&'a str>,
}

/// API client for making HTTP requests to the sales call review backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    api_root: String,
    tokens: Arc<dyn TokenStore>,
    policy: ResponsePolicy,
}

impl ApiClient {
    /// Create a client for `api_root` (e.g. `http://localhost:8001/api`)
    pub fn new(api_root: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client: Client::new(),
            api_root: api_root.into().trim_end_matches('/').to_string(),
            tokens,
            policy: ResponsePolicy::default(),
        }
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_root: config.api_root(),
            tokens,
            policy: ResponsePolicy::default(),
        })
    }

    /// Install the response policy
    #[must_use]
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Token store the client reads the bearer token from
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Exchange credentials for a user and bearer token
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] for rejected credentials, or any transport error.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.request(Method::POST, "auth/login").json(&body);
        self.send(request, "log in", cancel).await
    }

    /// Fetch the user the stored token belongs to
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn current_user(&self, cancel: &CancellationToken) -> Result<User> {
        let request = self.request(Method::GET, "auth/me");
        self.send(request, "fetch current user", cancel).await
    }

    /// Get a list of calls, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn list_calls(&self, query: &CallQuery, cancel: &CancellationToken) -> Result<Vec<Call>> {
        let request = self.request(Method::GET, "calls").query(query);
        self.send(request, "fetch calls", cancel).await
    }

    /// Get one call with its analysis
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or any transport error.
    pub async fn get_call(&self, call_id: &str, cancel: &CancellationToken) -> Result<Call> {
        let path = format!("calls/{}", urlencoding::encode(call_id));
        let request = self.request(Method::GET, &path);
        self.send(request, &format!("fetch call {call_id}"), cancel).await
    }

    /// List reps for the manager's filter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn list_reps(&self, cancel: &CancellationToken) -> Result<Vec<RepSummary>> {
        let request = self.request(Method::GET, "reps");
        self.send(request, "fetch reps", cancel).await
    }

    /// Get the backend-computed manager analytics
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn manager_analytics(&self, cancel: &CancellationToken) -> Result<ManagerAnalytics> {
        let request = self.request(Method::GET, "dashboard/manager/analytics");
        self.send(request, "fetch manager analytics", cancel).await
    }

    /// Ask the assistant a question, optionally about one call
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn send_chat(
        &self,
        message: &str,
        call_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ChatReply> {
        let body = ChatRequest {
            message: message.to_string(),
            call_id: call_id.map(str::to_string),
        };
        let request = self.request(Method::POST, "chat").json(&body);
        self.send(request, "send chat message", cancel).await
    }

    /// Fetch stored chat exchanges, optionally for one call
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn chat_history(
        &self,
        call_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ChatExchange>> {
        let request = self
            .request(Method::GET, "chat/history")
            .query(&HistoryQuery { call_id });
        self.send(request, "fetch chat history", cancel).await
    }

    /// Push an analysed call the way the analysis pipeline does
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response cannot be parsed.
    pub async fn submit_call_analysis(
        &self,
        submission: &CallAnalysisSubmission,
        cancel: &CancellationToken,
    ) -> Result<SubmissionReceipt> {
        let request = self
            .request(Method::POST, "webhook/call-analysis")
            .json(submission);
        self.send(request, "submit call analysis", cancel).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.api_root, path);
        let request = self.client.request(method, url);

        match self.tokens.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Cancelled request to {}", action);
                Err(Error::Cancelled)
            }
            result = self.execute(request, action) => result,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("Failed to {action}: {e}")))?;

        let status = response.status();
        debug!("{} -> {}", action, status);

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::network(format!("Failed to read response to {action}: {e}")))?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Backend rejected session while trying to {}", action);
                self.policy.unauthorized();
                Error::Unauthorized
            }
            StatusCode::FORBIDDEN => Error::Forbidden { message },
            StatusCode::NOT_FOUND => Error::NotFound {
                resource: action.trim_start_matches("fetch ").to_string(),
            },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Pull the `detail` message out of a backend error body
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}
