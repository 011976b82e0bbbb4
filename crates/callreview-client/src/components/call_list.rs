//! Call list component for displaying analysed calls

use callreview_core::{Call, call_score};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt;

/// Short date used in lists, e.g. `Jan 15, 2024, 10:30 AM`
#[must_use]
pub fn format_short_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Long date used on the detail page, e.g. `January 15, 2024 at 10:30 AM`
#[must_use]
pub fn format_long_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y at %I:%M %p").to_string()
}

/// List of calls, each linking to its detail page
#[derive(Debug, Clone, Copy)]
pub struct CallList<'a> {
    calls: &'a [Call],
    show_rep: bool,
    empty_title: &'a str,
    empty_hint: Option<&'a str>,
}

impl<'a> CallList<'a> {
    /// List `calls` with the given empty-state title
    #[must_use]
    pub const fn new(calls: &'a [Call], empty_title: &'a str) -> Self {
        Self {
            calls,
            show_rep: false,
            empty_title,
            empty_hint: None,
        }
    }

    /// Show the rep's name next to each title
    #[must_use]
    pub const fn with_rep_names(mut self) -> Self {
        self.show_rep = true;
        self
    }

    /// Second line of the empty state
    #[must_use]
    pub const fn with_empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = Some(hint);
        self
    }
}

impl fmt::Display for CallList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.calls.is_empty() {
            writeln!(f, "  {}", self.empty_title)?;
            if let Some(hint) = self.empty_hint {
                writeln!(f, "  {hint}")?;
            }
            return Ok(());
        }

        for call in self.calls {
            write!(f, "{}", CallRow { call, show_rep: self.show_rep })?;
        }
        Ok(())
    }
}

/// Individual call row
#[derive(Debug, Clone, Copy)]
struct CallRow<'a> {
    call: &'a Call,
    show_rep: bool,
}

impl fmt::Display for CallRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let call = self.call;

        if self.show_rep {
            writeln!(f, "- {}  {}", call.call_title.bold(), call.rep_name.blue())?;
        } else {
            writeln!(f, "- {}", call.call_title.bold())?;
        }
        writeln!(f, "  {}", format_short_date(&call.call_date))?;
        writeln!(f, "  {}", call.summary().unwrap_or("No summary available"))?;

        let mut badges = vec![format!("Score: {}%", call_score(call.analysis.as_ref()))];
        let objections = call.objection_count();
        if objections > 0 {
            badges.push(format!("{objections} Objections"));
        }
        let signals = call.signal_count();
        if signals > 0 {
            let label = if self.show_rep { "Buying Signals" } else { "Signals" };
            badges.push(format!("{signals} {label}"));
        }
        writeln!(f, "  [{}]  -> /call/{}", badges.join("] ["), call.id)
    }
}
