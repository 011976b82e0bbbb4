//! Route definitions and auth gating

use crate::auth::AuthPhase;
use callreview_core::Role;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Path of the dashboard route
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Path of the login route
pub const LOGIN_PATH: &str = "/login";

/// A location in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Root,
    /// `/login`
    Login,
    /// `/dashboard`
    Dashboard,
    /// `/call/:callId`
    CallDetail(String),
    /// Anything else
    Unknown(String),
}

impl Route {
    /// Parse a path; query strings and trailing slashes are ignored
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Self::Root,
            LOGIN_PATH => Self::Login,
            DASHBOARD_PATH => Self::Dashboard,
            other => match other.strip_prefix("/call/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::CallDetail(id.to_string()),
                _ => Self::Unknown(path.to_string()),
            },
        }
    }

    /// Canonical path
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Root => "/".to_string(),
            Self::Login => LOGIN_PATH.to_string(),
            Self::Dashboard => DASHBOARD_PATH.to_string(),
            Self::CallDetail(id) => format!("/call/{id}"),
            Self::Unknown(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What to show for a route in the current auth phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Credentials are still being checked
    Loading,
    /// Go somewhere else instead
    Redirect(Route),
    /// The login form
    LoginPage,
    /// The rep's own dashboard
    RepDashboard,
    /// The team dashboard
    ManagerDashboard,
    /// One call's analysis
    CallDetail(String),
    /// No such page
    NotFound,
}

/// Gate a route on the auth phase
#[must_use]
pub fn resolve(route: &Route, phase: &AuthPhase) -> Resolution {
    let user = match phase {
        AuthPhase::Loading => return Resolution::Loading,
        AuthPhase::Authenticated(user) => Some(user),
        AuthPhase::Unauthenticated => None,
    };

    match (route, user) {
        (Route::Root, _) => Resolution::Redirect(Route::Dashboard),
        (Route::Login, Some(_)) => Resolution::Redirect(Route::Dashboard),
        (Route::Login, None) => Resolution::LoginPage,
        (Route::Dashboard | Route::CallDetail(_), None) => Resolution::Redirect(Route::Login),
        (Route::Dashboard, Some(user)) => match user.role {
            Role::Manager => Resolution::ManagerDashboard,
            Role::Rep => Resolution::RepDashboard,
        },
        (Route::CallDetail(id), Some(_)) => Resolution::CallDetail(id.clone()),
        (Route::Unknown(_), _) => Resolution::NotFound,
    }
}

/// Shared current-route handle
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Arc<RwLock<Route>>,
}

impl Navigator {
    /// Start at `route`
    #[must_use]
    pub fn new(route: Route) -> Self {
        Self {
            current: Arc::new(RwLock::new(route)),
        }
    }

    /// Current route
    #[must_use]
    pub fn current(&self) -> Route {
        self.current.read().clone()
    }

    /// Move to `route`
    pub fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route);
        *self.current.write() = route;
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Root)
    }
}
