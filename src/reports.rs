use crate::types::{PerformanceReport, PortfolioSummary, ProjectRecord, ProjectReportRow, Status};
use crate::util::{average, format_number};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One evaluated project, ready for tabulation.
#[derive(Debug, Clone)]
pub struct EvaluatedProject {
    pub project_id: String,
    pub name: String,
    pub report: PerformanceReport,
}

/// Evaluate every record with `evaluate` (usually
/// [`crate::calculator::compute_performance_report`] or a snapshot store).
pub fn evaluate_projects<F>(records: &[ProjectRecord], mut evaluate: F) -> Vec<EvaluatedProject>
where
    F: FnMut(&ProjectRecord) -> PerformanceReport,
{
    records
        .iter()
        .map(|r| EvaluatedProject {
            project_id: r.project_id.clone(),
            name: r.name.clone(),
            report: evaluate(r),
        })
        .collect()
}

/// Table rows sorted by global performance, best first; ties by name.
pub fn generate_project_rows(projects: &[EvaluatedProject]) -> Vec<ProjectReportRow> {
    let mut sorted: Vec<&EvaluatedProject> = projects.iter().collect();
    sorted.sort_by(|a, b| {
        b.report
            .global_performance
            .partial_cmp(&a.report.global_performance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    sorted
        .into_iter()
        .map(|p| {
            let r = &p.report;
            ProjectReportRow {
                project_id: p.project_id.clone(),
                name: p.name.clone(),
                physical_pct: format_number(r.physical_progress_pct, 2),
                financial_pct: format_number(r.financial_progress_pct, 2),
                time_pct: format_number(r.elapsed_time_pct, 2),
                financial_performance: format_number(r.financial_performance, 2),
                schedule_performance: format_number(r.schedule_performance, 2),
                global_performance: format_number(r.global_performance, 2),
                status: format!("{} {}", r.global_status.emoji(), r.global_status),
                projected_cost: format_number(r.projected_final_cost, 2),
                projected_delay_months: format_number(r.projected_delay_months, 1),
            }
        })
        .collect()
}

pub fn generate_summary(projects: &[EvaluatedProject]) -> PortfolioSummary {
    let mut status_counts: BTreeMap<String, usize> = Status::ALL
        .iter()
        .map(|s| (s.label().to_string(), 0))
        .collect();
    for p in projects {
        *status_counts
            .entry(p.report.global_status.label().to_string())
            .or_insert(0) += 1;
    }

    let globals: Vec<f64> = projects.iter().map(|p| p.report.global_performance).collect();
    let critical_projects = projects
        .iter()
        .filter(|p| p.report.global_status == Status::Critical)
        .map(|p| p.project_id.clone())
        .collect();

    PortfolioSummary {
        total_projects: projects.len(),
        status_counts,
        avg_global_performance: average(&globals),
        total_budget: projects.iter().map(|p| p.report.total_budget).sum(),
        total_spent: projects.iter().map(|p| p.report.amount_spent).sum(),
        total_projected_overrun: projects.iter().map(|p| p.report.projected_overrun).sum(),
        critical_projects,
    }
}
