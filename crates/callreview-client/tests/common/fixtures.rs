//! Test fixtures and sample backend payloads

use chrono::{Duration, Utc};
use serde_json::{Value, json};

/// Rep user as returned by `/auth/me`
pub fn rep_user() -> Value {
    json!({
        "id": "rep-1",
        "username": "sarah",
        "rep_name": "Sarah Johnson",
        "role": "rep"
    })
}

/// Manager user as returned by `/auth/me`
pub fn manager_user() -> Value {
    json!({
        "id": "mgr-1",
        "username": "dana",
        "rep_name": "Dana Lee",
        "role": "manager"
    })
}

/// A call with the given analysis counts, `days_ago` days old
pub fn call_json(
    id: &str,
    rep_name: &str,
    signals: usize,
    objections: usize,
    recommendations: usize,
    days_ago: i64,
) -> Value {
    let date = (Utc::now() - Duration::days(days_ago)).format("%Y-%m-%dT%H:%M:%S%.6f");
    json!({
        "id": id,
        "call_id": format!("pipeline-{id}"),
        "rep_id": format!("rep-{}", rep_name.to_lowercase().replace(' ', "-")),
        "rep_name": rep_name,
        "call_title": format!("Call {id}"),
        "call_date": date.to_string(),
        "transcript_url": format!("https://transcripts.example.com/{id}"),
        "created_at": date.to_string(),
        "analysis": {
            "summary": format!("Summary of {id}"),
            "key_objections": vec!["Price is too high"; objections],
            "buying_signals": vec!["Asked about onboarding"; signals],
            "recommendations": vec!["Follow up sooner"; recommendations],
            "overall_feedback": null
        }
    })
}

/// A 20-call page spread over three reps
///
/// Page-local averages: Sarah 90 (8 calls), Mike 50 (7 calls), Emma 60 (5 calls).
pub fn team_page() -> Value {
    let mut calls = Vec::new();
    for i in 0..8 {
        calls.push(call_json(&format!("s{i}"), "Sarah Johnson", 2, 0, 0, i));
    }
    for i in 0..7 {
        calls.push(call_json(&format!("m{i}"), "Mike Chen", 0, 1, 0, i));
    }
    for i in 0..5 {
        calls.push(call_json(&format!("e{i}"), "Emma Davis", 0, 0, 0, i));
    }
    Value::Array(calls)
}

/// Backend analytics for the manager dashboard
pub fn analytics_json() -> Value {
    json!({
        "total_calls": 57,
        "total_reps": 3,
        "recent_calls": 12,
        "common_objections": [
            {"objection": "Price is too high", "count": 14},
            {"objection": "Bad timing", "count": 7},
            {"objection": "Need approval", "count": 5},
            {"objection": "Using a competitor", "count": 3},
            {"objection": "No budget", "count": 2},
            {"objection": "Not a priority", "count": 1}
        ],
        "rep_names": ["Sarah Johnson", "Mike Chen", "Emma Davis"]
    })
}

/// Reps offered by the manager filter
pub fn reps_json() -> Value {
    json!([
        {"id": "rep-sarah-johnson", "rep_name": "Sarah Johnson", "username": "sarah"},
        {"id": "rep-mike-chen", "rep_name": "Mike Chen", "username": "mike"},
        {"id": "rep-emma-davis", "rep_name": "Emma Davis", "username": "emma"}
    ])
}

/// `count` chat exchanges about `call_id`, oldest first
pub fn history_json(call_id: &str, count: usize) -> Value {
    let start = Utc::now() - Duration::hours(2);
    Value::Array(
        (0..count)
            .map(|i| {
                let minutes = i64::try_from(i).unwrap_or(0);
                json!({
                    "message": format!("question {i}"),
                    "response": format!("answer {i}"),
                    "timestamp": (start + Duration::minutes(minutes)).to_rfc3339(),
                    "call_id": call_id
                })
            })
            .collect(),
    )
}
