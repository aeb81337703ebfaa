//! Persisted performance reports.
//!
//! A stored report is always the complete [`PerformanceReport`], messages
//! included, stamped with the inputs it was computed from, the time it was
//! computed and a format version. A report whose inputs differ from the
//! current ones, or that is stale or from another version, is ignored and
//! recomputed, never patched up from the fields that happen to be present.

use crate::calculator::compute_performance_report;
use crate::error::SnapshotError;
use crate::types::{PerformanceReport, ProgressSnapshot};
use chrono::NaiveDateTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const SNAPSHOT_VERSION: u32 = 1;
pub const DEFAULT_MAX_AGE_DAYS: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub version: u32,
    pub computed_at: NaiveDateTime,
    pub input: ProgressSnapshot,
    pub report: PerformanceReport,
}

impl StoredReport {
    pub fn new(input: ProgressSnapshot, report: PerformanceReport, computed_at: NaiveDateTime) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            computed_at,
            input,
            report,
        }
    }

    /// Whole days elapsed since the report was computed.
    pub fn age_days(&self, now: NaiveDateTime) -> i64 {
        (now - self.computed_at).num_days()
    }

    pub fn is_stale(&self, now: NaiveDateTime, max_age_days: i64) -> bool {
        self.age_days(now) > max_age_days
    }

    pub fn is_usable(&self, input: &ProgressSnapshot, now: NaiveDateTime, max_age_days: i64) -> bool {
        self.version == SNAPSHOT_VERSION
            && self.input == *input
            && !self.is_stale(now, max_age_days)
    }
}

/// Reports keyed by project id. Owned by whoever evaluates projects; there is
/// no process-wide instance.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    entries: BTreeMap<String, StoredReport>,
    max_age_days: i64,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_DAYS)
    }
}

impl SnapshotStore {
    pub fn new(max_age_days: i64) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_age_days,
        }
    }

    /// Load a store from a JSON file. A missing file yields an empty store.
    pub fn load(path: &Path, max_age_days: i64) -> Result<Self, SnapshotError> {
        if !path.exists() {
            debug!("no snapshot file at {}", path.display());
            return Ok(Self::new(max_age_days));
        }
        let raw = fs::read_to_string(path)?;
        let entries: BTreeMap<String, StoredReport> = serde_json::from_str(&raw)?;
        info!("loaded {} stored reports from {}", entries.len(), path.display());
        Ok(Self {
            entries,
            max_age_days,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let s = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, s)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, project_id: &str) -> Option<&StoredReport> {
        self.entries.get(project_id)
    }

    /// The stored report for `project_id` if it was computed from `input`
    /// and is current as of `now`.
    pub fn get_fresh(
        &self,
        project_id: &str,
        input: &ProgressSnapshot,
        now: NaiveDateTime,
    ) -> Option<&PerformanceReport> {
        let stored = self.entries.get(project_id)?;
        if stored.is_usable(input, now, self.max_age_days) {
            Some(&stored.report)
        } else {
            debug!(
                "stored report for {} unusable (version {}, {} days old, inputs changed: {})",
                project_id,
                stored.version,
                stored.age_days(now),
                stored.input != *input
            );
            None
        }
    }

    pub fn put(
        &mut self,
        project_id: &str,
        input: &ProgressSnapshot,
        report: PerformanceReport,
        now: NaiveDateTime,
    ) {
        self.entries.insert(
            project_id.to_string(),
            StoredReport::new(input.clone(), report, now),
        );
    }

    pub fn invalidate(&mut self, project_id: &str) -> bool {
        self.entries.remove(project_id).is_some()
    }

    /// Return the current stored report, or compute, store and return a new
    /// one.
    pub fn get_or_compute(
        &mut self,
        project_id: &str,
        input: &ProgressSnapshot,
        now: NaiveDateTime,
    ) -> PerformanceReport {
        if let Some(report) = self.get_fresh(project_id, input, now) {
            debug!("using stored report for {}", project_id);
            return report.clone();
        }
        let report = compute_performance_report(input);
        info!(
            "computed report for {}: global={:.1}% financial={:.1}% schedule={:.1}%",
            project_id,
            report.global_performance,
            report.financial_performance,
            report.schedule_performance
        );
        self.put(project_id, input, report.clone(), now);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn input(physical: f64) -> ProgressSnapshot {
        ProgressSnapshot {
            physical_progress_pct: physical,
            total_budget: 1_000.0,
            amount_spent: 400.0,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            planned_duration_months: 6,
            as_of_date: Some(now().date()),
        }
    }

    #[test]
    fn stale_after_more_than_max_age() {
        let report = compute_performance_report(&input(40.0));
        let stored = StoredReport::new(input(40.0), report, now());
        assert!(!stored.is_stale(now() + Duration::hours(47), 1));
        assert!(stored.is_stale(now() + Duration::days(2), 1));
    }

    #[test]
    fn get_or_compute_reuses_report_for_same_inputs() {
        let mut store = SnapshotStore::new(1);
        let first = store.get_or_compute("p1", &input(40.0), now());
        let second = store.get_or_compute("p1", &input(40.0), now() + Duration::hours(3));
        assert_eq!(first, second);
        assert_eq!(store.get("p1").unwrap().computed_at, now());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn changed_inputs_are_recomputed_while_fresh() {
        let mut store = SnapshotStore::new(1);
        let mut edited = input(20.0);
        edited.amount_spent = 800.0;
        store.get_or_compute("p1", &edited, now());

        edited.physical_progress_pct = 90.0;
        edited.amount_spent = 100.0;
        let later = now() + Duration::hours(1);
        let second = store.get_or_compute("p1", &edited, later);
        assert_eq!(second, compute_performance_report(&edited));
        assert_eq!(store.get("p1").unwrap().computed_at, later);
        assert_eq!(store.get("p1").unwrap().input, edited);
    }

    #[test]
    fn changed_evaluation_date_is_recomputed() {
        let mut store = SnapshotStore::new(1);
        let first = store.get_or_compute("p1", &input(40.0), now());
        let mut next_day = input(40.0);
        next_day.as_of_date = next_day.as_of_date.map(|d| d + Duration::days(1));
        assert!(store.get_fresh("p1", &next_day, now()).is_none());
        let second = store.get_or_compute("p1", &next_day, now());
        assert_ne!(first.elapsed_days, second.elapsed_days);
    }

    #[test]
    fn stale_report_is_recomputed() {
        let mut store = SnapshotStore::new(1);
        let first = store.get_or_compute("p1", &input(40.0), now());
        let later = now() + Duration::days(3);
        assert!(store.get_fresh("p1", &input(40.0), later).is_none());
        let second = store.get_or_compute("p1", &input(40.0), later);
        assert_eq!(first, second);
        assert_eq!(store.get("p1").unwrap().computed_at, later);
    }

    #[test]
    fn other_versions_are_ignored() {
        let mut store = SnapshotStore::new(1);
        store.put("p1", &input(40.0), compute_performance_report(&input(40.0)), now());
        store.entries.get_mut("p1").unwrap().version = 0;
        assert!(store.get_fresh("p1", &input(40.0), now()).is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut store = SnapshotStore::default();
        store.put("p1", &input(40.0), compute_performance_report(&input(40.0)), now());
        assert!(store.invalidate("p1"));
        assert!(!store.invalidate("p1"));
        assert!(store.is_empty());
    }

    #[test]
    fn save_and_load_keep_complete_report() {
        let path = std::env::temp_dir().join(format!("prograin_snapshots_{}.json", std::process::id()));
        let mut store = SnapshotStore::new(1);
        let report = compute_performance_report(&input(40.0));
        store.put("p1", &input(40.0), report.clone(), now());
        store.save(&path).unwrap();

        let loaded = SnapshotStore::load(&path, 1).unwrap();
        fs::remove_file(&path).ok();
        let back = loaded.get_fresh("p1", &input(40.0), now()).unwrap();
        assert_eq!(back, &report);
        assert!(!back.financial_message.is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = std::env::temp_dir().join("prograin_snapshots_missing.json");
        let store = SnapshotStore::load(&path, 1).unwrap();
        assert!(store.is_empty());
    }
}
