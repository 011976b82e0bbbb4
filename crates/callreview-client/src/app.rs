//! Application shell: resolves routes against the session and mounts pages
//!
//! Each mounted page owns a child of the application's cancellation token.
//! Dropping the [`Mounted`] page cancels whatever it still has in flight.

use crate::auth::AuthPhase;
use crate::components::{ChatWidget, Loading};
use crate::pages::{CallDetail, LoginPage, ManagerDashboard, NotFound, RepDashboard};
use crate::routes::{Resolution, Route, resolve};
use crate::state::AppState;
use callreview_core::User;
use chrono::{DateTime, Utc};
use std::fmt;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// Upper bound on redirects followed for one navigation
const MAX_HOPS: usize = 4;

/// The page currently on screen
#[derive(Debug, Clone)]
pub enum Screen {
    /// Session check still running
    Loading,
    /// Login form
    Login(LoginPage),
    /// Rep's own dashboard
    RepDashboard(RepDashboard),
    /// Team dashboard
    ManagerDashboard(ManagerDashboard),
    /// One call's analysis
    CallDetail(CallDetail),
    /// Unmatched path
    NotFound(NotFound),
}

impl Screen {
    /// Chat widget embedded in the page, if it has one
    pub fn chat_mut(&mut self) -> Option<&mut ChatWidget> {
        match self {
            Self::RepDashboard(page) => Some(page.chat_mut()),
            Self::CallDetail(page) => Some(page.chat_mut()),
            Self::Loading | Self::Login(_) | Self::ManagerDashboard(_) | Self::NotFound(_) => None,
        }
    }
}

/// A page mounted at a route
#[derive(Debug)]
pub struct Mounted {
    route: Route,
    screen: Screen,
    user: Option<User>,
    now: DateTime<Utc>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl Mounted {
    fn new(route: Route, screen: Screen, user: Option<User>, cancel: CancellationToken) -> Self {
        Self {
            route,
            screen,
            user,
            now: Utc::now(),
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    /// Route the page is mounted at
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// The page
    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The page, mutably
    pub const fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Signed-in user at mount time
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Token cancelled when the page is dropped
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl fmt::Display for Mounted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self.user.as_ref();
        match &self.screen {
            Screen::Loading => write!(f, "{Loading}"),
            Screen::Login(page) => write!(f, "{page}"),
            Screen::RepDashboard(page) => write!(f, "{}", page.view(user, self.now)),
            Screen::ManagerDashboard(page) => write!(f, "{}", page.view(user)),
            Screen::CallDetail(page) => write!(f, "{}", page.view(user)),
            Screen::NotFound(page) => write!(f, "{page}"),
        }
    }
}

/// The terminal application
#[derive(Debug, Clone)]
pub struct App {
    state: AppState,
    shutdown: CancellationToken,
}

impl App {
    /// Wrap shared state; `shutdown` cancels every mounted page
    #[must_use]
    pub const fn new(state: AppState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    /// Shared state
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Resolve the session from the persisted token
    pub async fn start(&self) -> AuthPhase {
        self.state.auth.initialize(&self.shutdown).await
    }

    /// Navigate to `route` and mount whatever it resolves to
    ///
    /// Redirects are followed. If loading the page ends the session (a 401
    /// moves the navigator), the new route is resolved in its place.
    pub async fn open(&self, route: Route) -> Mounted {
        let navigator = &self.state.navigator;
        navigator.navigate(route);

        for _ in 0..MAX_HOPS {
            let route = navigator.current();
            let resolution = resolve(&route, &self.state.auth.state().phase());
            debug!("{} resolved to {:?}", route, resolution);

            let screen = match resolution {
                Resolution::Redirect(to) => {
                    navigator.navigate(to);
                    continue;
                }
                Resolution::Loading => Screen::Loading,
                Resolution::LoginPage => Screen::Login(LoginPage::new()),
                Resolution::NotFound => Screen::NotFound(NotFound::new(route.path())),
                Resolution::RepDashboard => Screen::RepDashboard(RepDashboard::new(
                    &self.state.config.dashboard,
                    ChatWidget::new(None).with_history_limit(self.state.config.chat.history_limit),
                )),
                Resolution::ManagerDashboard => {
                    Screen::ManagerDashboard(ManagerDashboard::new(&self.state.config.dashboard))
                }
                Resolution::CallDetail(id) => {
                    Screen::CallDetail(CallDetail::new(id, self.state.config.chat.history_limit))
                }
            };

            let cancel = self.shutdown.child_token();
            let mut mounted = Mounted::new(route.clone(), screen, self.state.auth.state().user(), cancel);
            self.load(&mut mounted).await;

            if navigator.current() == route {
                return mounted;
            }
            debug!("Navigation changed while loading {}", route);
        }

        warn!("Too many redirects; giving up");
        let route = navigator.current();
        let cancel = self.shutdown.child_token();
        Mounted::new(route.clone(), Screen::NotFound(NotFound::new(route.path())), None, cancel)
    }

    async fn load(&self, mounted: &mut Mounted) {
        let api = &self.state.api;
        let cancel = mounted.cancel.clone();
        match &mut mounted.screen {
            Screen::RepDashboard(page) => page.load(api, &cancel).await,
            Screen::ManagerDashboard(page) => page.load(api, &cancel).await,
            Screen::CallDetail(page) => page.load(api, &cancel).await,
            Screen::Loading | Screen::Login(_) | Screen::NotFound(_) => {}
        }
    }

    /// Token for work outside a mounted page, cancelled on shutdown
    pub fn child_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Cancel every in-flight request
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use callreview_core::Config;
    use std::sync::Arc;

    fn app() -> App {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9".to_string();
        let state = AppState::with_tokens(config, Arc::new(MemoryTokenStore::new())).unwrap();
        App::new(state, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_before_start_everything_is_loading() {
        let app = app();
        let mounted = app.open(Route::Dashboard).await;
        assert!(matches!(mounted.screen(), Screen::Loading));
    }

    #[tokio::test]
    async fn test_signed_out_dashboard_redirects_to_login() {
        let app = app();
        app.start().await;

        let mounted = app.open(Route::parse("/")).await;

        assert_eq!(mounted.route(), &Route::Login);
        assert!(matches!(mounted.screen(), Screen::Login(_)));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        colored::control::set_override(false);
        let app = app();
        app.start().await;

        let mounted = app.open(Route::parse("/nowhere")).await;

        assert!(matches!(mounted.screen(), Screen::NotFound(_)));
        assert!(mounted.to_string().contains("/nowhere"));
    }

    #[tokio::test]
    async fn test_dropping_page_cancels_its_token() {
        let app = app();
        app.start().await;
        let mounted = app.open(Route::Login).await;
        let token = mounted.cancel_token().clone();

        drop(mounted);

        assert!(token.is_cancelled());
    }
}
