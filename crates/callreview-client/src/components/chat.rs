//! Chat widget: a short conversation with the sales coach assistant
//!
//! The widget can stand alone on a dashboard or be scoped to one call. A send
//! happens in two halves, [`ChatWidget::begin_send`] and
//! [`ChatWidget::complete_send`], so the pending flag is observable while the
//! request is in flight. [`ChatWidget::send`] runs both halves.

use crate::api_client::ApiClient;
use callreview_core::types::{ChatExchange, ChatReply};
use callreview_core::{ChatMessage, ChatRole, Error, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Shown in place of a reply when sending fails
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Messages kept when history is loaded
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

const CALL_QUESTIONS: [&str; 4] = [
    "What did I do well in this call?",
    "What objections could I have handled better?",
    "Did I miss any buying signals?",
    "How can I improve for next time?",
];

const GENERAL_QUESTIONS: [&str; 4] = [
    "How can I handle price objections better?",
    "What are some effective closing techniques?",
    "How do I identify buying signals?",
    "Tips for building rapport with prospects",
];

/// A message accepted for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Text as typed
    pub text: String,
    /// Call the question is about
    pub call_id: Option<String>,
}

/// Chat widget state
#[derive(Debug, Clone)]
pub struct ChatWidget {
    call_id: Option<String>,
    messages: Vec<ChatMessage>,
    input: String,
    pending: bool,
    expanded: bool,
    history_limit: usize,
}

impl ChatWidget {
    /// Widget for general questions, or about one call when `call_id` is set
    #[must_use]
    pub const fn new(call_id: Option<String>) -> Self {
        Self {
            call_id,
            messages: Vec::new(),
            input: String::new(),
            pending: false,
            expanded: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep `limit` messages when history is loaded
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Call the widget is scoped to
    #[must_use]
    pub fn call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }

    /// Conversation in display order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Current input text
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Copy a suggested question into the input
    pub fn use_suggestion(&mut self, index: usize) {
        if let Some(question) = self.suggested_questions().get(index) {
            self.input = (*question).to_string();
        }
    }

    /// A request is in flight
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Message list is visible
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Show or hide the message list
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Whether [`Self::begin_send`] would accept the current input
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.pending && !self.input.trim().is_empty()
    }

    /// Questions offered while the conversation is empty
    #[must_use]
    pub fn suggested_questions(&self) -> &'static [&'static str] {
        if self.call_id.is_some() {
            &CALL_QUESTIONS
        } else {
            &GENERAL_QUESTIONS
        }
    }

    /// Load earlier exchanges for a call-scoped widget
    ///
    /// Unscoped widgets start empty. A failed load is logged and leaves the
    /// conversation empty.
    pub async fn mount(&mut self, api: &ApiClient, cancel: &CancellationToken) {
        let Some(call_id) = self.call_id.clone() else {
            return;
        };

        match api.chat_history(Some(&call_id), cancel).await {
            Ok(history) => self.load_history(history),
            Err(Error::Cancelled) => {}
            Err(e) => error!("Error fetching chat history for call {}: {}", call_id, e),
        }
    }

    /// Replace the conversation with the newest messages of `history`
    pub fn load_history(&mut self, history: Vec<ChatExchange>) {
        let mut messages: Vec<ChatMessage> = history
            .into_iter()
            .flat_map(ChatExchange::into_messages)
            .collect();

        let excess = messages.len().saturating_sub(self.history_limit);
        messages.drain(..excess);
        self.messages = messages;
    }

    /// Accept the current input for sending
    ///
    /// Returns `None`, changing nothing, when the input is blank or a request
    /// is already in flight. Otherwise the user's message is appended, the
    /// input cleared and the widget marked pending.
    pub fn begin_send(&mut self, now: DateTime<Utc>) -> Option<OutgoingMessage> {
        if !self.can_send() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(text.clone(), now));
        self.pending = true;

        Some(OutgoingMessage {
            text,
            call_id: self.call_id.clone(),
        })
    }

    /// Record the outcome of a send started with [`Self::begin_send`]
    pub fn complete_send(&mut self, outcome: Result<ChatReply>, now: DateTime<Utc>) {
        self.pending = false;

        match outcome {
            Ok(reply) => self
                .messages
                .push(ChatMessage::assistant(reply.response, reply.timestamp)),
            Err(Error::Cancelled) => {
                warn!("Chat request cancelled before a reply arrived");
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                self.messages.push(ChatMessage::assistant(FALLBACK_REPLY, now));
            }
        }
    }

    /// Send the current input and wait for the reply
    ///
    /// Returns whether a request was issued.
    pub async fn send(&mut self, api: &ApiClient, cancel: &CancellationToken) -> bool {
        let Some(outgoing) = self.begin_send(Utc::now()) else {
            return false;
        };

        let outcome = api
            .send_chat(&outgoing.text, outgoing.call_id.as_deref(), cancel)
            .await;
        self.complete_send(outcome, Utc::now());
        true
    }
}

impl fmt::Display for ChatWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.expanded { "▲" } else { "▼" };
        writeln!(f, "{} {}", "AI Sales Coach".bold(), arrow)?;
        if !self.expanded {
            return Ok(());
        }

        if self.messages.is_empty() {
            writeln!(f, "  Hi! I'm your AI sales coach.")?;
            if self.call_id.is_some() {
                writeln!(f, "  Ask me about this specific call!")?;
            } else {
                writeln!(f, "  Ask me any sales-related questions!")?;
            }
            writeln!(f, "  Try asking:")?;
            for question in self.suggested_questions().iter().take(2) {
                writeln!(f, "    \"{question}\"")?;
            }
        } else {
            for message in &self.messages {
                match message.role {
                    ChatRole::User => writeln!(f, "  {} {}", "You:".cyan(), message.content)?,
                    ChatRole::Assistant => writeln!(f, "  {} {}", "Coach:".green(), message.content)?,
                }
            }
        }

        if self.pending {
            writeln!(f, "  Coach is typing...")?;
        }
        Ok(())
    }
}
