use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::identifiers::{CategoryCode, GroupId};

/// Lifecycle of one run: `idle -> running -> {completed | error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Error)
    }
}

/// Committed assignment counts, per group and per category code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySummary {
    groups: BTreeMap<GroupId, BTreeMap<CategoryCode, usize>>,
}

impl CategorySummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, group: &GroupId, code: &CategoryCode) {
        *self
            .groups
            .entry(group.clone())
            .or_default()
            .entry(code.clone())
            .or_insert(0) += 1;
    }

    pub fn count(&self, group: &GroupId, code: &CategoryCode) -> usize {
        self.groups
            .get(group)
            .and_then(|codes| codes.get(code))
            .copied()
            .unwrap_or(0)
    }

    /// Number of records counted for `group`.
    pub fn total(&self, group: &GroupId) -> usize {
        self.groups
            .get(group)
            .map(|codes| codes.values().sum())
            .unwrap_or(0)
    }

    pub fn merge(&mut self, other: &CategorySummary) {
        for (group, codes) in &other.groups {
            let target = self.groups.entry(group.clone()).or_default();
            for (code, n) in codes {
                *target.entry(code.clone()).or_insert(0) += n;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupId, &BTreeMap<CategoryCode, usize>)> {
        self.groups.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Snapshot of one batch run.
///
/// Callers only ever see clones of this value; the owning runner is the
/// single writer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunProgress {
    pub total_records: usize,
    pub processed_records: usize,
    pub pages_committed: usize,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// `sha256:` fingerprint of each rule set used by the run, keyed by group.
    pub rules_fingerprints: BTreeMap<GroupId, String>,
    pub summary: CategorySummary,
}

impl RunProgress {
    pub fn idle() -> Self {
        Self::default()
    }

    /// A fresh progress value already in the `running` state.
    pub fn started(at: DateTime<Utc>) -> Self {
        RunProgress {
            status: RunStatus::Running,
            started_at: Some(at),
            ..Self::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn record_page(&mut self, records: usize, page_summary: &CategorySummary) {
        debug_assert_eq!(self.status, RunStatus::Running);
        self.processed_records += records;
        self.pages_committed += 1;
        self.summary.merge(page_summary);
        debug_assert!(self.processed_records <= self.total_records);
    }

    pub(crate) fn complete(&mut self, at: DateTime<Utc>) {
        debug_assert_eq!(self.status, RunStatus::Running);
        self.status = RunStatus::Completed;
        self.ended_at = Some(at);
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        debug_assert_eq!(self.status, RunStatus::Running);
        self.status = RunStatus::Error;
        self.last_error = Some(message.into());
        self.ended_at = Some(at);
    }

    /// Share of records processed, in `0.0..=100.0`.
    ///
    /// An empty record set reads as 100% once the run has completed.
    pub fn percent_complete(&self) -> f32 {
        if self.total_records == 0 {
            return if self.status == RunStatus::Completed { 100.0 } else { 0.0 };
        }
        let pct = self.processed_records as f32 / self.total_records as f32 * 100.0;
        debug_assert!((0.0..=100.0).contains(&pct), "percent {pct} out of range");
        pct
    }

    /// Wall-clock duration so far, or of the whole run once it has ended.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let start = self.started_at?;
        Some(self.ended_at.unwrap_or(now) - start)
    }
}
