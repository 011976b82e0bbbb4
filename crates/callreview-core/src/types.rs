//! Core types shared between the API client and the views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Call identifier as issued by the backend
pub type CallId = String;

/// Rep (user) identifier as issued by the backend
pub type RepId = String;

/// User role, gating which dashboard is shown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sales representative
    Rep,
    /// Sales manager
    Manager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rep => write!(f, "Rep"),
            Self::Manager => write!(f, "Manager"),
        }
    }
}

/// Authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// User identifier
    pub id: RepId,
    /// Login name
    pub username: String,
    /// Display name
    pub rep_name: String,
    /// Role
    pub role: Role,
}

impl User {
    /// Whether this user sees the manager dashboard
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub access_token: String,
    /// Token type, always `bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// The user the token was issued for
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// AI-generated analysis attached to a call
///
/// Every field is optional on the wire; `null` lists decode as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Analysis {
    /// Call summary
    #[serde(default)]
    pub summary: Option<String>,
    /// Objections raised by the prospect, in call order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key_objections: Vec<String>,
    /// Buying signals detected, in call order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub buying_signals: Vec<String>,
    /// Recommended improvements
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: Vec<String>,
    /// Free-form overall feedback
    #[serde(default)]
    pub overall_feedback: Option<String>,
}

/// A recorded, transcribed sales call with its analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Call {
    /// Backend record identifier
    pub id: CallId,
    /// Identifier assigned by the analysis pipeline
    #[serde(default)]
    pub call_id: Option<String>,
    /// Owning rep
    #[serde(default)]
    pub rep_id: Option<RepId>,
    /// Owning rep's display name
    pub rep_name: String,
    /// Call title
    pub call_title: String,
    /// When the call took place
    #[serde(with = "flexible_timestamp")]
    pub call_date: DateTime<Utc>,
    /// Link to the full transcript
    #[serde(default)]
    pub transcript_url: Option<String>,
    /// When the analysis was stored
    #[serde(default, with = "flexible_timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    /// Attached analysis
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

impl Call {
    /// Number of objections in the attached analysis
    #[must_use]
    pub fn objection_count(&self) -> usize {
        self.analysis.as_ref().map_or(0, |a| a.key_objections.len())
    }

    /// Number of buying signals in the attached analysis
    #[must_use]
    pub fn signal_count(&self) -> usize {
        self.analysis.as_ref().map_or(0, |a| a.buying_signals.len())
    }

    /// Summary text, if any
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.analysis
            .as_ref()
            .and_then(|a| a.summary.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Webhook payload pushed by the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAnalysisSubmission {
    /// Pipeline call identifier
    pub call_id: String,
    /// Owning rep
    pub rep_id: RepId,
    /// Owning rep's display name
    pub rep_name: String,
    /// Call title
    pub call_title: String,
    /// Call date as sent by the pipeline
    pub call_date: String,
    /// Transcript link
    pub transcript_url: String,
    /// Analysis body
    pub analysis: Analysis,
}

/// Webhook acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Human-readable status
    pub message: String,
    /// Stored record identifier
    pub id: CallId,
}

/// Rep entry for the manager's filter list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepSummary {
    /// User identifier
    pub id: RepId,
    /// Display name
    pub rep_name: String,
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
}

/// Frequency of one objection across all calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectionCount {
    /// Objection text
    pub objection: String,
    /// Number of occurrences
    pub count: u64,
}

/// Backend-computed analytics for the manager dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerAnalytics {
    /// All calls on record
    #[serde(default)]
    pub total_calls: u64,
    /// Distinct reps with calls
    #[serde(default)]
    pub total_reps: u64,
    /// Calls in the last seven days
    #[serde(default)]
    pub recent_calls: u64,
    /// Most frequent objections, most common first
    #[serde(default, deserialize_with = "null_as_empty")]
    pub common_objections: Vec<ObjectionCount>,
    /// Names of the reps with calls
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rep_names: Vec<String>,
}

/// Chat request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// User message
    pub message: String,
    /// Call the question is about, if any
    pub call_id: Option<CallId>,
}

/// Assistant reply to a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant text
    pub response: String,
    /// When the reply was produced
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// One stored question/answer pair from the chat history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatExchange {
    /// User message
    pub message: String,
    /// Assistant reply
    pub response: String,
    /// When the exchange happened
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Call the exchange was scoped to
    #[serde(default)]
    pub call_id: Option<CallId>,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Typed by the user
    User,
    /// Produced by the assistant
    Assistant,
}

/// A message shown in the chat widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author
    pub role: ChatRole,
    /// Text
    pub content: String,
    /// When it was written
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Message typed by the user
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp,
        }
    }

    /// Message produced by the assistant
    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

impl ChatExchange {
    /// Split the exchange into its user and assistant messages
    #[must_use]
    pub fn into_messages(self) -> [ChatMessage; 2] {
        [
            ChatMessage::user(self.message, self.timestamp),
            ChatMessage::assistant(self.response, self.timestamp),
        ]
    }
}

/// Per-rep performance derived from a page of calls
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RepPerformance {
    /// Rep display name
    pub name: String,
    /// Rounded average call score
    pub avg_score: u8,
    /// Calls in the page
    pub calls: usize,
    /// Objections across those calls
    pub objections: usize,
    /// Buying signals across those calls
    pub signals: usize,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps as the backend emits them: RFC 3339, ISO 8601 with or without
/// an offset, or a bare date. Naive values are taken as UTC.
pub mod flexible_timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parse a backend timestamp
    ///
    /// # Errors
    ///
    /// Returns the RFC 3339 error if no accepted format matches.
    pub fn parse(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        let text = text.trim();
        let rfc3339 = match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => return Ok(dt.with_timezone(&Utc)),
            Err(e) => e,
        };
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, format) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or(rfc3339)
    }

    pub(crate) fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(D::Error::custom)
    }

    pub(crate) mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

        #[allow(clippy::ref_option)]
        pub(crate) fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| super::parse(&text).map_err(D::Error::custom))
                .transpose()
        }
    }
}
