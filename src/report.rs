//! Run reports
//!
//! Per-browser summaries plus the full outcome list, written as JSON.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::browser::BrowserKind;
use crate::common::Result;
use crate::engine::TestOutcome;

/// Counts for one browser group
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub browser: BrowserKind,
    /// Cases assigned to this browser
    pub total: usize,
    /// Cases that produced an outcome
    pub executed: usize,
    pub passed: usize,
    /// Why the group stopped early, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandoned: Option<String>,
}

impl GroupSummary {
    pub fn new(browser: BrowserKind, total: usize) -> Self {
        Self {
            browser,
            total,
            executed: 0,
            passed: 0,
            abandoned: None,
        }
    }

    pub fn record(&mut self, outcome: &TestOutcome) {
        self.executed += 1;
        if outcome.verdict.is_success() {
            self.passed += 1;
        }
    }

    /// Share of all assigned cases that succeeded, in percent
    pub fn pass_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.passed as f64 * 100.0 / self.total as f64)
    }

    pub fn pass_rate_label(&self) -> String {
        match self.pass_rate() {
            Some(rate) => format!("{:.1}%", rate),
            None => "0%".to_string(),
        }
    }

    /// Cases skipped because the group was abandoned
    pub fn missing(&self) -> usize {
        self.total.saturating_sub(self.executed)
    }
}

/// Everything produced by one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub groups: Vec<GroupSummary>,
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    pub fn new(groups: Vec<GroupSummary>, outcomes: Vec<TestOutcome>) -> Self {
        Self {
            generated_at: Utc::now(),
            groups,
            outcomes,
        }
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.total).sum()
    }

    pub fn passed(&self) -> usize {
        self.groups.iter().map(|g| g.passed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.groups.iter().map(GroupSummary::missing).sum()
    }

    /// Outcomes whose verdict contradicts a stated expectation
    pub fn unexpected(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.matches_expectation() == Some(false))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
