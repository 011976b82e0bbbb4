//! Rep dashboard: the signed-in rep's recent calls and headline stats

use crate::api_client::{ApiClient, CallQuery};
use crate::components::{CallList, ChatWidget, Header, Loading};
use callreview_core::config::DashboardConfig;
use callreview_core::stats::RepDashboardStats;
use callreview_core::{Call, Error, User};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Inline message shown when the call list cannot be fetched
pub const FETCH_ERROR: &str = "Failed to fetch calls";

/// Rep dashboard state
#[derive(Debug, Clone)]
pub struct RepDashboard {
    calls: Vec<Call>,
    loading: bool,
    error: Option<String>,
    chat: ChatWidget,
    page_size: u32,
    recent_window_days: i64,
}

impl RepDashboard {
    /// Empty dashboard in the loading state
    #[must_use]
    pub fn new(config: &DashboardConfig, chat: ChatWidget) -> Self {
        Self {
            calls: Vec::new(),
            loading: true,
            error: None,
            chat,
            page_size: config.rep_page_size,
            recent_window_days: config.recent_window_days,
        }
    }

    /// Fetch the most recent page of the rep's calls
    pub async fn load(&mut self, api: &ApiClient, cancel: &CancellationToken) {
        match api.list_calls(&CallQuery::recent(self.page_size), cancel).await {
            Ok(calls) => {
                info!("Loaded {} call(s) for rep dashboard", calls.len());
                self.calls = calls;
            }
            Err(Error::Cancelled) => return,
            Err(e) => {
                error!("Error fetching calls: {}", e);
                self.error = Some(FETCH_ERROR.to_string());
            }
        }
        self.loading = false;
    }

    /// Loaded calls, most recent first
    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Inline error, if the fetch failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Still waiting on the first fetch
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Headline figures for the loaded page
    #[must_use]
    pub fn stats(&self, now: DateTime<Utc>) -> RepDashboardStats {
        RepDashboardStats::with_window(&self.calls, now, self.recent_window_days)
    }

    /// The embedded chat widget
    #[must_use]
    pub const fn chat(&self) -> &ChatWidget {
        &self.chat
    }

    /// The embedded chat widget, mutably
    pub const fn chat_mut(&mut self) -> &mut ChatWidget {
        &mut self.chat
    }

    /// Textual rendering for `user` at `now`
    #[must_use]
    pub const fn view<'a>(&'a self, user: Option<&'a User>, now: DateTime<Utc>) -> RepDashboardView<'a> {
        RepDashboardView {
            page: self,
            user,
            now,
        }
    }
}

/// Rendered rep dashboard
#[derive(Debug)]
pub struct RepDashboardView<'a> {
    page: &'a RepDashboard,
    user: Option<&'a User>,
    now: DateTime<Utc>,
}

impl fmt::Display for RepDashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.page;
        write!(f, "{}", Header::new("Sales Rep Dashboard", self.user))?;

        if page.loading {
            return write!(f, "{Loading}");
        }

        let stats = page.stats(self.now);
        writeln!(
            f,
            "Total Calls: {}   Avg Score: {}%   This Week: {}   Buying Signals: {}",
            stats.total_calls, stats.average_score, stats.recent_calls, stats.buying_signals
        )?;
        writeln!(f)?;

        writeln!(f, "{}", "Recent Call Analyses".bold())?;
        if let Some(error) = &page.error {
            writeln!(f, "  {}", error.red())?;
        }
        write!(
            f,
            "{}",
            CallList::new(&page.calls, "No call analyses yet")
                .with_empty_hint("Your call analyses will appear here once processed")
        )?;
        writeln!(f)?;

        write!(f, "{}", page.chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    #[test]
    fn test_new_dashboard_is_loading() {
        colored::control::set_override(false);
        let page = RepDashboard::new(&DashboardConfig::default(), ChatWidget::new(None));

        assert!(page.is_loading());
        let text = page.view(None, Utc::now()).to_string();
        assert!(text.contains("Sales Rep Dashboard"));
        assert!(text.contains("Loading..."));
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_inline_error() {
        colored::control::set_override(false);
        let api = ApiClient::new("http://127.0.0.1:9/api", Arc::new(MemoryTokenStore::new()));
        let mut page = RepDashboard::new(&DashboardConfig::default(), ChatWidget::new(None));

        page.load(&api, &CancellationToken::new()).await;

        assert!(!page.is_loading());
        assert_eq!(page.error(), Some(FETCH_ERROR));
        let text = page.view(None, Utc::now()).to_string();
        assert!(text.contains("Failed to fetch calls"));
        assert!(text.contains("No call analyses yet"));
        assert!(text.contains("Total Calls: 0   Avg Score: 0%"));
    }

    #[tokio::test]
    async fn test_cancelled_load_stays_loading() {
        let api = ApiClient::new("http://127.0.0.1:9/api", Arc::new(MemoryTokenStore::new()));
        let mut page = RepDashboard::new(&DashboardConfig::default(), ChatWidget::new(None));
        let cancel = CancellationToken::new();
        cancel.cancel();

        page.load(&api, &cancel).await;

        assert!(page.is_loading());
        assert_eq!(page.error(), None);
    }
}
