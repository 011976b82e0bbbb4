//! Manager dashboard: team analytics, rep ranking and report export

use crate::api_client::{ApiClient, CallQuery};
use crate::components::{CallList, Header, Loading};
use callreview_core::config::DashboardConfig;
use callreview_core::stats::{objection_bar_width, rep_performance};
use callreview_core::types::{ManagerAnalytics, ObjectionCount, RepPerformance, RepSummary};
use callreview_core::{Call, Error, Result, User};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Inline message shown when the initial fetch fails
pub const FETCH_ERROR: &str = "Failed to fetch dashboard data";

const BAR_CELLS: u64 = 20;

/// Manager dashboard state
#[derive(Debug, Clone)]
pub struct ManagerDashboard {
    analytics: Option<ManagerAnalytics>,
    reps: Vec<RepSummary>,
    calls: Vec<Call>,
    selected_rep: Option<String>,
    loading: bool,
    error: Option<String>,
    config: DashboardConfig,
}

impl ManagerDashboard {
    /// Empty dashboard in the loading state
    #[must_use]
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            analytics: None,
            reps: Vec::new(),
            calls: Vec::new(),
            selected_rep: None,
            loading: true,
            error: None,
            config: config.clone(),
        }
    }

    /// Fetch analytics, reps and the first page of calls together
    ///
    /// The three requests run concurrently and the page fails as a whole.
    pub async fn load(&mut self, api: &ApiClient, cancel: &CancellationToken) {
        let query = self.query();
        let fetched = tokio::try_join!(
            api.manager_analytics(cancel),
            api.list_reps(cancel),
            api.list_calls(&query, cancel),
        );

        match fetched {
            Ok((analytics, reps, calls)) => {
                info!(
                    "Loaded manager dashboard: {} rep(s), {} call(s)",
                    reps.len(),
                    calls.len()
                );
                self.analytics = Some(analytics);
                self.reps = reps;
                self.calls = calls;
            }
            Err(Error::Cancelled) => return,
            Err(e) => {
                error!("Error fetching dashboard data: {}", e);
                self.error = Some(FETCH_ERROR.to_string());
            }
        }
        self.loading = false;
    }

    /// Filter the call list to one rep, or clear the filter with `None`
    ///
    /// Only the call list is refetched. A failure is logged and the
    /// previous list stays.
    pub async fn select_rep(&mut self, rep_id: Option<String>, api: &ApiClient, cancel: &CancellationToken) {
        self.selected_rep = rep_id;

        match api.list_calls(&self.query(), cancel).await {
            Ok(calls) => self.calls = calls,
            Err(Error::Cancelled) => {}
            Err(e) => error!("Error fetching calls: {}", e),
        }
    }

    fn query(&self) -> CallQuery {
        let query = CallQuery::recent(self.config.manager_page_size);
        match &self.selected_rep {
            Some(rep_id) => query.for_rep(rep_id.clone()),
            None => query,
        }
    }

    /// Backend analytics, once loaded
    #[must_use]
    pub const fn analytics(&self) -> Option<&ManagerAnalytics> {
        self.analytics.as_ref()
    }

    /// Reps offered by the filter
    #[must_use]
    pub fn reps(&self) -> &[RepSummary] {
        &self.reps
    }

    /// Loaded page of calls
    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Inline error, if the initial fetch failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Still waiting on the initial fetch
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Rep id the call list is filtered to
    #[must_use]
    pub fn selected_rep(&self) -> Option<&str> {
        self.selected_rep.as_deref()
    }

    /// Display name of the selected rep
    #[must_use]
    pub fn selected_rep_name(&self) -> Option<&str> {
        let selected = self.selected_rep.as_deref()?;
        self.reps
            .iter()
            .find(|rep| rep.id == selected)
            .map(|rep| rep.rep_name.as_str())
    }

    /// Reps ranked by average score over the loaded page
    #[must_use]
    pub fn rep_performance(&self) -> Vec<RepPerformance> {
        rep_performance(&self.calls)
    }

    /// Most common objections, capped at the configured count
    #[must_use]
    pub fn common_objections(&self) -> &[ObjectionCount] {
        let all = self
            .analytics
            .as_ref()
            .map_or(&[][..], |analytics| analytics.common_objections.as_slice());
        all.get(..self.config.top_objections.min(all.len()))
            .unwrap_or(all)
    }

    /// Point-in-time snapshot of the analytics and loaded calls
    #[must_use]
    pub fn export_report(&self, now: DateTime<Utc>) -> Report {
        Report {
            analytics: self.analytics.clone(),
            calls: self
                .calls
                .iter()
                .take(self.config.export_call_limit)
                .cloned()
                .collect(),
            generated_at: now,
        }
    }

    /// Textual rendering for `user`
    #[must_use]
    pub const fn view<'a>(&'a self, user: Option<&'a User>) -> ManagerDashboardView<'a> {
        ManagerDashboardView { page: self, user }
    }
}

/// Exported dashboard snapshot
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Analytics as loaded
    pub analytics: Option<ManagerAnalytics>,
    /// Leading calls of the loaded page
    pub calls: Vec<Call>,
    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// `sales-report-YYYY-MM-DD.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("sales-report-{}.json", self.generated_at.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report into `dir` under [`Self::file_name`]
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file written.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_json()?).await?;
        info!("Exported report to {}", path.display());
        Ok(path)
    }
}

/// Rendered manager dashboard
#[derive(Debug)]
pub struct ManagerDashboardView<'a> {
    page: &'a ManagerDashboard,
    user: Option<&'a User>,
}

impl ManagerDashboardView<'_> {
    fn write_ranking(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Rep Performance".bold())?;
        for (rank, rep) in self.page.rep_performance().iter().enumerate() {
            writeln!(
                f,
                "  {}. {:<24} {:>3}%  {} calls, {} signals, {} objections",
                rank + 1,
                rep.name,
                rep.avg_score,
                rep.calls,
                rep.signals,
                rep.objections
            )?;
        }
        writeln!(f)
    }

    fn write_objections(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Common Objections".bold())?;
        let objections = self.page.common_objections();
        if objections.is_empty() {
            writeln!(f, "  No objection data available")?;
            return writeln!(f);
        }

        let max = self
            .page
            .analytics
            .as_ref()
            .and_then(|analytics| analytics.common_objections.iter().map(|o| o.count).max())
            .unwrap_or(0);
        for objection in objections {
            let width = u64::from(objection_bar_width(objection.count, max));
            let filled = usize::try_from(width * BAR_CELLS / 100).unwrap_or(0);
            let empty = usize::try_from(BAR_CELLS).unwrap_or(0).saturating_sub(filled);
            writeln!(
                f,
                "  {:<40} {}{} {}",
                objection.objection,
                "#".repeat(filled).red(),
                ".".repeat(empty),
                objection.count
            )?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ManagerDashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.page;
        write!(f, "{}", Header::new("Manager Dashboard", self.user))?;

        if page.loading {
            return write!(f, "{Loading}");
        }

        let analytics = page.analytics.clone().unwrap_or_default();
        writeln!(
            f,
            "Total Calls: {}   Sales Reps: {}   This Week: {}   Common Objections: {}",
            analytics.total_calls,
            analytics.total_reps,
            analytics.recent_calls,
            analytics.common_objections.len()
        )?;
        writeln!(f)?;

        let filter = page.selected_rep_name().unwrap_or("All Sales Reps");
        writeln!(f, "Filter: {filter}")?;
        writeln!(f)?;

        self.write_ranking(f)?;
        self.write_objections(f)?;

        match page.selected_rep_name() {
            Some(name) => writeln!(f, "{}", format!("Recent Team Calls - {name}").bold())?,
            None => writeln!(f, "{}", "Recent Team Calls".bold())?,
        }
        if let Some(error) = &page.error {
            writeln!(f, "  {}", error.red())?;
        }
        let shown = page
            .calls
            .get(..page.config.list_display_limit.min(page.calls.len()))
            .unwrap_or(&page.calls);
        write!(f, "{}", CallList::new(shown, "No calls found").with_rep_names())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn analytics(objections: &[(&str, u64)]) -> ManagerAnalytics {
        ManagerAnalytics {
            total_calls: 42,
            total_reps: 3,
            recent_calls: 5,
            common_objections: objections
                .iter()
                .map(|(objection, count)| ObjectionCount {
                    objection: (*objection).to_string(),
                    count: *count,
                })
                .collect(),
            rep_names: Vec::new(),
        }
    }

    fn loaded(analytics: ManagerAnalytics) -> ManagerDashboard {
        let mut page = ManagerDashboard::new(&DashboardConfig::default());
        page.analytics = Some(analytics);
        page.reps = vec![RepSummary {
            id: "r1".to_string(),
            rep_name: "Sarah Johnson".to_string(),
            username: None,
        }];
        page.loading = false;
        page
    }

    #[test]
    fn test_common_objections_capped_at_five() {
        let page = loaded(analytics(&[
            ("Price", 9),
            ("Timing", 7),
            ("Budget", 5),
            ("Authority", 4),
            ("Need", 2),
            ("Competitor", 1),
        ]));

        let names: Vec<&str> = page
            .common_objections()
            .iter()
            .map(|o| o.objection.as_str())
            .collect();
        assert_eq!(names, vec!["Price", "Timing", "Budget", "Authority", "Need"]);
    }

    #[test]
    fn test_render_empty_team() {
        colored::control::set_override(false);
        let page = loaded(analytics(&[]));

        let text = page.view(None).to_string();

        assert!(text.contains("Total Calls: 42   Sales Reps: 3   This Week: 5   Common Objections: 0"));
        assert!(text.contains("Filter: All Sales Reps"));
        assert!(text.contains("No objection data available"));
        assert!(text.contains("No calls found"));
    }

    #[test]
    fn test_objection_bars_scale_to_most_common() {
        colored::control::set_override(false);
        let page = loaded(analytics(&[("Price", 10), ("Timing", 5)]));

        let text = page.view(None).to_string();

        assert!(text.contains(&format!("{} 10", "#".repeat(20))));
        assert!(text.contains(&format!("{}{} 5", "#".repeat(10), ".".repeat(10))));
    }

    #[test]
    fn test_selected_rep_name_heads_the_list() {
        colored::control::set_override(false);
        let mut page = loaded(analytics(&[]));
        page.selected_rep = Some("r1".to_string());

        assert_eq!(page.selected_rep_name(), Some("Sarah Johnson"));
        assert!(page.view(None).to_string().contains("Recent Team Calls - Sarah Johnson"));

        page.selected_rep = Some("unknown".to_string());
        assert_eq!(page.selected_rep_name(), None);
    }

    #[test]
    fn test_report_file_name() {
        let page = loaded(analytics(&[]));
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).single().unwrap_or_default();

        let report = page.export_report(now);

        assert_eq!(report.file_name(), "sales-report-2024-03-09.json");
        assert!(report.calls.is_empty());
    }

    #[tokio::test]
    async fn test_report_written_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let page = loaded(analytics(&[("Price", 1)]));
        let report = page.export_report(Utc::now());

        let path = report.write_to(dir.path()).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["analytics"]["total_calls"], 42);
        assert_eq!(written["calls"], serde_json::json!([]));
        assert!(written["generated_at"].is_string());
    }
}
