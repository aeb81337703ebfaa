use crate::types::{LedgerEntry, ProgressSnapshot, ProjectRecord, RawLedgerRow, RawProjectRow};
use crate::util::{parse_bool_loose, parse_date_safe, parse_f64_safe, parse_i32_safe};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub defaulted_start_dates: usize,
    pub defaulted_durations: usize,
    pub spend_from_ledger: usize,
}

/// How to fill cells the projects file leaves empty.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub as_of: NaiveDate,
    pub default_duration_months: i32,
}

pub fn load_projects(
    path: &Path,
    options: &LoadOptions,
    spent_by_project: Option<&HashMap<String, f64>>,
) -> Result<(Vec<ProjectRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open projects file {}", path.display()))?;
    let mut report = LoadReport::default();
    let mut records: Vec<ProjectRecord> = Vec::new();

    for result in rdr.deserialize::<RawProjectRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };

        let project_id = match row.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };
        let physical = match parse_f64_safe(row.physical_progress.as_deref()) { Some(v) => v, None => { report.parse_errors += 1; continue; } };
        let budget = match parse_f64_safe(row.budget.as_deref()) { Some(v) => v, None => { report.parse_errors += 1; continue; } };

        let start_date = match parse_date_safe(row.start_date.as_deref()) {
            Some(d) => d,
            None => {
                warn!("project {}: unreadable start date {:?}, using {}", project_id, row.start_date, options.as_of);
                report.defaulted_start_dates += 1;
                options.as_of
            }
        };
        let duration = match parse_i32_safe(row.duration_months.as_deref()) {
            Some(m) => m,
            None => {
                report.defaulted_durations += 1;
                options.default_duration_months
            }
        };

        // An explicit spend column wins; otherwise fall back to the ledger.
        let amount_spent = match parse_f64_safe(row.amount_spent.as_deref()) {
            Some(v) => v,
            None => match spent_by_project.and_then(|m| m.get(&project_id)) {
                Some(v) => {
                    report.spend_from_ledger += 1;
                    *v
                }
                None => 0.0,
            },
        };

        let name = row.name.unwrap_or_else(|| project_id.clone()).trim().to_string();

        records.push(ProjectRecord {
            project_id,
            name,
            snapshot: ProgressSnapshot {
                physical_progress_pct: physical,
                total_budget: budget,
                amount_spent,
                start_date,
                planned_duration_months: duration,
                as_of_date: Some(options.as_of),
            },
        });
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Read the transaction ledger. Rows without a project id or a readable
/// amount are dropped; the second value is how many were dropped.
pub fn load_ledger(path: &Path) -> Result<(Vec<LedgerEntry>, usize)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open ledger file {}", path.display()))?;
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize::<RawLedgerRow>() {
        let row = match result {
            Ok(r) => r,
            Err(_) => { skipped += 1; continue; }
        };
        let project_id = match row.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => { skipped += 1; continue; }
        };
        let amount = match parse_f64_safe(row.amount.as_deref()) { Some(v) => v, None => { skipped += 1; continue; } };

        entries.push(LedgerEntry {
            project_id,
            kind: row.kind.unwrap_or_default().trim().to_string(),
            status: row.status.unwrap_or_else(|| "activa".to_string()).trim().to_string(),
            is_transfer: parse_bool_loose(row.is_transfer.as_deref()),
            amount,
        });
    }

    Ok((entries, skipped))
}
