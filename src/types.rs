use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawProjectRow {
    #[serde(rename = "ProjectId")]
    pub project_id: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "PhysicalProgress")]
    pub physical_progress: Option<String>,
    #[serde(rename = "Budget")]
    pub budget: Option<String>,
    #[serde(rename = "AmountSpent", default)]
    pub amount_spent: Option<String>,
    #[serde(rename = "StartDate")]
    pub start_date: Option<String>,
    #[serde(rename = "DurationMonths")]
    pub duration_months: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawLedgerRow {
    #[serde(rename = "ProjectId")]
    pub project_id: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "IsTransfer")]
    pub is_transfer: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<String>,
}

/// One ledger movement, reduced to the fields that decide whether it counts
/// as spending.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub project_id: String,
    /// `gasto` for expenses, `ingreso` for income.
    pub kind: String,
    /// `activa` unless the movement was voided (`anulada`).
    pub status: String,
    pub is_transfer: bool,
    pub amount: f64,
}

/// Raw inputs for one evaluation of a project's performance.
///
/// Nothing here is range-checked: out-of-range values flow through the
/// arithmetic. Use [`crate::calculator::validate_inputs`] to flag them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Percentage of physical work completed, 0-100.
    pub physical_progress_pct: f64,
    pub total_budget: f64,
    pub amount_spent: f64,
    pub start_date: NaiveDate,
    pub planned_duration_months: i32,
    /// Evaluation date; `None` means today.
    pub as_of_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub project_id: String,
    pub name: String,
    pub snapshot: ProgressSnapshot,
}

/// Qualitative band for a performance ratio. Variants are declared worst to
/// best so that `Ord` follows the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Critical,
    Fair,
    Acceptable,
    Good,
    Excellent,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Excellent,
        Status::Good,
        Status::Acceptable,
        Status::Fair,
        Status::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::Excellent => "Excellent",
            Status::Good => "Good",
            Status::Acceptable => "Acceptable",
            Status::Fair => "Fair",
            Status::Critical => "Critical",
        }
    }

    /// Severity colour as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            Status::Excellent | Status::Good => "#16A34A",
            Status::Acceptable | Status::Fair => "#CA8A04",
            Status::Critical => "#DC2626",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Status::Excellent | Status::Good => "🟢",
            Status::Acceptable | Status::Fair => "🟡",
            Status::Critical => "🔴",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete result of one performance evaluation.
///
/// Floating-point fields are already rounded to two decimals. The serde names
/// match the keys stored on the project document so a persisted report reads
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(rename = "avance_fisico")]
    pub physical_progress_pct: f64,
    #[serde(rename = "avance_financiero")]
    pub financial_progress_pct: f64,
    #[serde(rename = "porcentaje_tiempo")]
    pub elapsed_time_pct: f64,

    #[serde(rename = "rendimiento_financiero")]
    pub financial_performance: f64,
    #[serde(rename = "rendimiento_temporal")]
    pub schedule_performance: f64,
    #[serde(rename = "rendimiento_global")]
    pub global_performance: f64,

    #[serde(rename = "estado_financiero")]
    pub financial_status: Status,
    #[serde(rename = "estado_temporal")]
    pub schedule_status: Status,
    #[serde(rename = "estado_global")]
    pub global_status: Status,

    #[serde(rename = "dias_transcurridos")]
    pub elapsed_days: i64,
    #[serde(rename = "meses_transcurridos")]
    pub elapsed_months: f64,
    #[serde(rename = "meses_transcurridos_int")]
    pub elapsed_months_rounded: i64,
    #[serde(rename = "duracion_total_meses")]
    pub planned_duration_months: i32,
    #[serde(rename = "meses_esperados")]
    pub expected_months: f64,
    #[serde(rename = "diferencia_meses")]
    pub months_difference: f64,
    #[serde(rename = "diferencia_meses_int")]
    pub months_difference_rounded: i64,

    #[serde(rename = "presupuesto_total")]
    pub total_budget: f64,
    #[serde(rename = "gastado_total")]
    pub amount_spent: f64,
    #[serde(rename = "saldo_disponible")]
    pub remaining_budget: f64,
    #[serde(rename = "proyeccion_gasto_final")]
    pub projected_final_cost: f64,
    #[serde(rename = "sobrecosto_estimado")]
    pub projected_overrun: f64,
    #[serde(rename = "porcentaje_sobrecosto")]
    pub projected_overrun_pct: f64,
    #[serde(rename = "meses_proyectados_totales")]
    pub projected_total_months: f64,
    #[serde(rename = "retraso_estimado_meses")]
    pub projected_delay_months: f64,

    #[serde(rename = "mensaje_financiero")]
    pub financial_message: String,
    #[serde(rename = "mensaje_temporal")]
    pub schedule_message: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectReportRow {
    #[serde(rename = "ProjectId")]
    #[tabled(rename = "ProjectId")]
    pub project_id: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "PhysicalPct")]
    #[tabled(rename = "PhysicalPct")]
    pub physical_pct: String,
    #[serde(rename = "FinancialPct")]
    #[tabled(rename = "FinancialPct")]
    pub financial_pct: String,
    #[serde(rename = "TimePct")]
    #[tabled(rename = "TimePct")]
    pub time_pct: String,
    #[serde(rename = "FinancialPerf")]
    #[tabled(rename = "FinancialPerf")]
    pub financial_performance: String,
    #[serde(rename = "SchedulePerf")]
    #[tabled(rename = "SchedulePerf")]
    pub schedule_performance: String,
    #[serde(rename = "GlobalPerf")]
    #[tabled(rename = "GlobalPerf")]
    pub global_performance: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "ProjectedCost")]
    #[tabled(rename = "ProjectedCost")]
    pub projected_cost: String,
    #[serde(rename = "ProjectedDelayMonths")]
    #[tabled(rename = "ProjectedDelayMonths")]
    pub projected_delay_months: String,
}

#[derive(Debug, Serialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub avg_global_performance: f64,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_projected_overrun: f64,
    pub critical_projects: Vec<String>,
}
