//! Sales call review client
//!
//! HTTP client, session handling and terminal views for the sales call
//! review service.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod app;
pub mod auth;
pub mod components;
pub mod pages;
pub mod routes;
pub mod state;
pub mod storage;

pub use api_client::{ApiClient, CallQuery, ResponsePolicy, UnauthorizedHandler};
pub use app::{App, Mounted, Screen};
pub use auth::{AuthContext, AuthPhase, AuthState};
pub use routes::{Navigator, Resolution, Route};
pub use state::AppState;
pub use storage::{LocalStorage, MemoryTokenStore, TokenStore};
