//! Call detail page: one call's analysis and a chat scoped to it

use crate::api_client::ApiClient;
use crate::components::call_list::format_long_date;
use crate::components::{ChatWidget, Header, Loading};
use crate::routes::Route;
use callreview_core::{Call, Error, ScoreBand, User, call_score};
use colored::Colorize;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Message shown when the call cannot be loaded
pub const FETCH_ERROR: &str = "Failed to fetch call details";

/// Where the page stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallDetailState {
    /// Fetch in flight
    Loading,
    /// Call fetched
    Loaded(Box<Call>),
    /// Fetch failed; terminal until the route changes
    NotFound {
        /// Why the call is missing
        message: String,
    },
}

/// Call detail page
#[derive(Debug, Clone)]
pub struct CallDetail {
    call_id: String,
    state: CallDetailState,
    chat: ChatWidget,
}

impl CallDetail {
    /// Page for `call_id`, with a chat scoped to the same call
    #[must_use]
    pub fn new(call_id: impl Into<String>, history_limit: usize) -> Self {
        let call_id = call_id.into();
        Self {
            chat: ChatWidget::new(Some(call_id.clone())).with_history_limit(history_limit),
            call_id,
            state: CallDetailState::Loading,
        }
    }

    /// Fetch the call, then the chat history for it
    ///
    /// Any failure is final; the page is not retried.
    pub async fn load(&mut self, api: &ApiClient, cancel: &CancellationToken) {
        match api.get_call(&self.call_id, cancel).await {
            Ok(call) => {
                info!("Loaded call {}", call.id);
                self.state = CallDetailState::Loaded(Box::new(call));
                self.chat.mount(api, cancel).await;
            }
            Err(Error::Cancelled) => {}
            Err(e) => {
                error!("Error fetching call {}: {}", self.call_id, e);
                self.state = CallDetailState::NotFound {
                    message: FETCH_ERROR.to_string(),
                };
            }
        }
    }

    /// Id from the route
    #[must_use]
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &CallDetailState {
        &self.state
    }

    /// Loaded call, if any
    #[must_use]
    pub fn call(&self) -> Option<&Call> {
        match &self.state {
            CallDetailState::Loaded(call) => Some(&**call),
            CallDetailState::Loading | CallDetailState::NotFound { .. } => None,
        }
    }

    /// Target of the "Back to Dashboard" link
    #[must_use]
    pub const fn back_link(&self) -> Route {
        Route::Dashboard
    }

    /// The call-scoped chat
    #[must_use]
    pub const fn chat(&self) -> &ChatWidget {
        &self.chat
    }

    /// The call-scoped chat, mutably
    pub const fn chat_mut(&mut self) -> &mut ChatWidget {
        &mut self.chat
    }

    /// Textual rendering for `user`
    #[must_use]
    pub const fn view<'a>(&'a self, user: Option<&'a User>) -> CallDetailView<'a> {
        CallDetailView { page: self, user }
    }
}

/// Rendered call detail page
#[derive(Debug)]
pub struct CallDetailView<'a> {
    page: &'a CallDetail,
    user: Option<&'a User>,
}

impl CallDetailView<'_> {
    fn write_call(&self, f: &mut fmt::Formatter<'_>, call: &Call) -> fmt::Result {
        let back = self.page.back_link();
        writeln!(f, "< Back to Dashboard -> {back}")?;
        writeln!(f)?;

        writeln!(f, "{}", call.call_title.bold())?;
        write!(f, "{}  |  {}", call.rep_name, format_long_date(&call.call_date))?;
        if let Some(url) = &call.transcript_url {
            write!(f, "  |  View Transcript: {url}")?;
        }
        writeln!(f)?;

        let score = call_score(call.analysis.as_ref());
        let badge = format!("Call Score: {score}% ({})", ScoreBand::of(score));
        let badge = match ScoreBand::of(score) {
            ScoreBand::Strong => badge.green(),
            ScoreBand::Fair => badge.yellow(),
            ScoreBand::Weak => badge.red(),
        };
        writeln!(f, "{badge}")?;
        writeln!(f)?;

        let analysis = call.analysis.clone().unwrap_or_default();

        section(f, "Call Summary")?;
        writeln!(f, "  {}", call.summary().unwrap_or("No summary available for this call."))?;
        writeln!(f)?;

        section(f, "Key Objections Raised")?;
        numbered(f, &analysis.key_objections, "No objections were identified in this call.")?;

        section(f, "Buying Signals")?;
        if analysis.buying_signals.is_empty() {
            writeln!(f, "  No buying signals were identified in this call.")?;
        } else {
            for signal in &analysis.buying_signals {
                writeln!(f, "  + {signal}")?;
            }
        }
        writeln!(f)?;

        section(f, "Recommended Improvements")?;
        numbered(
            f,
            &analysis.recommendations,
            "No specific recommendations were provided for this call.",
        )?;

        if let Some(feedback) = analysis.overall_feedback.as_deref().filter(|s| !s.trim().is_empty()) {
            section(f, "Overall Feedback")?;
            writeln!(f, "  \"{feedback}\"")?;
            writeln!(f)?;
        }

        write!(f, "{}", self.page.chat)
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", title.bold())
}

fn numbered(f: &mut fmt::Formatter<'_>, items: &[String], empty: &str) -> fmt::Result {
    if items.is_empty() {
        writeln!(f, "  {empty}")?;
    } else {
        for (index, item) in items.iter().enumerate() {
            writeln!(f, "  {}. {item}", index + 1)?;
        }
    }
    writeln!(f)
}

impl fmt::Display for CallDetailView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Header::new("Call Details", self.user))?;

        match &self.page.state {
            CallDetailState::Loading => write!(f, "{Loading}"),
            CallDetailState::Loaded(call) => self.write_call(f, call),
            CallDetailState::NotFound { message } => {
                writeln!(f, "{}", "Call Not Found".bold())?;
                writeln!(f, "{message}")?;
                writeln!(f, "Back to Dashboard -> {}", self.page.back_link())
            }
        }
    }
}
