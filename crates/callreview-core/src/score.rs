//! Call score heuristic
//!
//! Every view scores calls through [`call_score`]; the formula lives nowhere else.

use crate::types::Analysis;
use serde::Serialize;
use std::fmt;

/// Score of a call with no signals, objections, or recommendations
pub const BASE_SCORE: i64 = 60;
/// Points added per buying signal
pub const SIGNAL_WEIGHT: i64 = 15;
/// Points removed per objection
pub const OBJECTION_WEIGHT: i64 = 10;
/// Points removed per recommendation
pub const RECOMMENDATION_WEIGHT: i64 = 5;
/// Lowest score a call can get
pub const MIN_SCORE: i64 = 10;
/// Highest score a call can get
pub const MAX_SCORE: i64 = 100;

/// Score a call from its analysis
///
/// `clamp(60 + 15*signals - 10*objections - 5*recommendations, 10, 100)`.
/// A missing analysis scores as if every list were empty.
#[must_use]
pub fn call_score(analysis: Option<&Analysis>) -> u8 {
    let (signals, objections, recommendations) = analysis.map_or((0, 0, 0), |a| {
        (
            a.buying_signals.len(),
            a.key_objections.len(),
            a.recommendations.len(),
        )
    });
    score_from_counts(signals, objections, recommendations)
}

/// Score from raw list lengths
#[must_use]
pub fn score_from_counts(signals: usize, objections: usize, recommendations: usize) -> u8 {
    let weighted = |count: usize, weight: i64| {
        i64::try_from(count)
            .unwrap_or(i64::MAX)
            .saturating_mul(weight)
    };

    let raw = BASE_SCORE
        .saturating_add(weighted(signals, SIGNAL_WEIGHT))
        .saturating_sub(weighted(objections, OBJECTION_WEIGHT))
        .saturating_sub(weighted(recommendations, RECOMMENDATION_WEIGHT));

    // Clamped into 10..=100, so the conversion cannot fail.
    u8::try_from(raw.clamp(MIN_SCORE, MAX_SCORE)).unwrap_or(u8::MAX)
}

/// Quality band used to colour a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// 80 and above
    Strong,
    /// 60 to 79
    Fair,
    /// Below 60
    Weak,
}

impl ScoreBand {
    /// Band for a score
    #[must_use]
    pub const fn of(score: u8) -> Self {
        if score >= 80 {
            Self::Strong
        } else if score >= 60 {
            Self::Fair
        } else {
            Self::Weak
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Fair => write!(f, "fair"),
            Self::Weak => write!(f, "needs work"),
        }
    }
}
