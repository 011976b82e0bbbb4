//! Aggregates derived from a loaded page of calls
//!
//! Nothing here sees more than the calls it is handed. Dashboard figures
//! therefore describe the current page, not the whole dataset.

use crate::score::call_score;
use crate::types::{Call, RepPerformance};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Default look-back for "this week" counters
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Headline figures on the rep dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepDashboardStats {
    /// Calls in the page
    pub total_calls: usize,
    /// Rounded mean score, 0 for an empty page
    pub average_score: u8,
    /// Calls newer than the recent window
    pub recent_calls: usize,
    /// Buying signals across the page
    pub buying_signals: usize,
}

impl RepDashboardStats {
    /// Compute the stats for a page of calls using the default window
    #[must_use]
    pub fn from_calls(calls: &[Call], now: DateTime<Utc>) -> Self {
        Self::with_window(calls, now, RECENT_WINDOW_DAYS)
    }

    /// Compute the stats for a page of calls with an explicit recent window
    #[must_use]
    pub fn with_window(calls: &[Call], now: DateTime<Utc>, window_days: i64) -> Self {
        let cutoff = now - Duration::days(window_days);
        let total_score: u64 = calls
            .iter()
            .map(|call| u64::from(call_score(call.analysis.as_ref())))
            .sum();

        Self {
            total_calls: calls.len(),
            average_score: rounded_mean(total_score, calls.len()),
            recent_calls: calls.iter().filter(|call| call.call_date > cutoff).count(),
            buying_signals: calls.iter().map(Call::signal_count).sum(),
        }
    }
}

/// Group a page of calls by rep name and rank reps by average score
///
/// Ties keep the order in which reps first appear in the page.
#[must_use]
pub fn rep_performance(calls: &[Call]) -> Vec<RepPerformance> {
    #[derive(Default)]
    struct Tally {
        calls: usize,
        total_score: u64,
        objections: usize,
        signals: usize,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, Tally> = HashMap::new();

    for call in calls {
        let tally = tallies.entry(call.rep_name.as_str()).or_insert_with(|| {
            order.push(call.rep_name.as_str());
            Tally::default()
        });
        tally.calls += 1;
        tally.total_score += u64::from(call_score(call.analysis.as_ref()));
        tally.objections += call.objection_count();
        tally.signals += call.signal_count();
    }

    let mut ranking: Vec<RepPerformance> = order
        .into_iter()
        .filter_map(|name| {
            tallies.remove(name).map(|tally| RepPerformance {
                name: name.to_string(),
                avg_score: rounded_mean(tally.total_score, tally.calls),
                calls: tally.calls,
                objections: tally.objections,
                signals: tally.signals,
            })
        })
        .collect();

    // sort_by is stable, so equal averages stay in first-seen order
    ranking.sort_by(|a, b| b.avg_score.cmp(&a.avg_score));
    ranking
}

/// Width of an objection's bar as a percentage of the most common one
#[must_use]
pub fn objection_bar_width(count: u64, max: u64) -> u8 {
    if max == 0 {
        return 0;
    }
    let percent = count.saturating_mul(100) / max;
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Mean rounded half up, 0 when there is nothing to average
fn rounded_mean(total: u64, count: usize) -> u8 {
    let count = u64::try_from(count).unwrap_or(u64::MAX);
    if count == 0 {
        return 0;
    }
    let mean = (total.saturating_mul(2) + count) / (count.saturating_mul(2));
    u8::try_from(mean).unwrap_or(u8::MAX)
}
