//! Financial and schedule performance of a construction project.
//!
//! Every function here is pure. Divisions that could hit zero are guarded and
//! fall back to `0.0`, so a report is always fully populated with finite
//! numbers for finite inputs.

use crate::error::InputIssue;
use crate::types::{PerformanceReport, ProgressSnapshot, Status};
use crate::util::{days_diff, round_to};
use chrono::{Local, NaiveDate};

/// Average Gregorian month length in days.
pub const DAYS_PER_MONTH: f64 = 30.44;

pub const FINANCIAL_WEIGHT: f64 = 0.6;
pub const SCHEDULE_WEIGHT: f64 = 0.4;

/// Lower bounds (inclusive) of each band, best first.
const STATUS_BANDS: [(f64, Status); 4] = [
    (110.0, Status::Excellent),
    (100.0, Status::Good),
    (90.0, Status::Acceptable),
    (75.0, Status::Fair),
];

/// Map a performance ratio to its status band. NaN falls through to
/// `Critical`.
pub fn classify_status(ratio: f64) -> Status {
    STATUS_BANDS
        .iter()
        .find(|(floor, _)| ratio >= *floor)
        .map(|(_, status)| *status)
        .unwrap_or(Status::Critical)
}

/// `numerator / denominator * 100`, or `0.0` unless the denominator is
/// strictly positive.
fn pct_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Weighted blend of the two ratios. A component that is not positive is left
/// out and its weight is not redistributed.
fn blend_global(financial: f64, schedule: f64) -> f64 {
    match (financial > 0.0, schedule > 0.0) {
        (true, true) => financial * FINANCIAL_WEIGHT + schedule * SCHEDULE_WEIGHT,
        (true, false) => financial * FINANCIAL_WEIGHT,
        (false, true) => schedule * SCHEDULE_WEIGHT,
        (false, false) => 0.0,
    }
}

/// Compute the full performance report for one snapshot.
///
/// When `as_of_date` is `None` the local date is read once; otherwise the
/// result depends only on the snapshot.
pub fn compute_performance_report(input: &ProgressSnapshot) -> PerformanceReport {
    let as_of = input
        .as_of_date
        .unwrap_or_else(|| Local::now().date_naive());
    let physical = input.physical_progress_pct;
    let budget = input.total_budget;
    let spent = input.amount_spent;
    let duration = input.planned_duration_months;
    let duration_f = f64::from(duration);

    let financial_progress = pct_of(spent, budget);

    let elapsed_days = days_diff(input.start_date, as_of);
    let elapsed_months = elapsed_days as f64 / DAYS_PER_MONTH;
    let elapsed_time_pct = if duration > 0 {
        elapsed_months / duration_f * 100.0
    } else {
        0.0
    };

    let financial_performance = pct_of(physical, financial_progress);
    let schedule_performance = pct_of(physical, elapsed_time_pct);
    let global_performance = blend_global(financial_performance, schedule_performance);

    let expected_months = physical / 100.0 * duration_f;
    let months_difference = elapsed_months - expected_months;

    // Linear extrapolation from spend and time per point of physical progress.
    let (projected_final_cost, projected_overrun, projected_overrun_pct) = if physical > 0.0 {
        let projected = spent / physical * 100.0;
        let overrun = projected - budget;
        (projected, overrun, pct_of(overrun, budget))
    } else {
        (budget, 0.0, 0.0)
    };
    let (projected_total_months, projected_delay_months) = if physical > 0.0 {
        let total = elapsed_months / physical * 100.0;
        (total, total - duration_f)
    } else {
        (duration_f, 0.0)
    };

    // Bands are decided on full precision; only the reported figures are rounded.
    let financial_status = classify_status(financial_performance);
    let schedule_status = classify_status(schedule_performance);
    let global_status = classify_status(global_performance);

    let physical_progress_pct = round_to(physical, 2);
    let financial_progress_pct = round_to(financial_progress, 2);
    let elapsed_time_pct = round_to(elapsed_time_pct, 2);
    let financial_performance = round_to(financial_performance, 2);
    let schedule_performance = round_to(schedule_performance, 2);

    PerformanceReport {
        physical_progress_pct,
        financial_progress_pct,
        elapsed_time_pct,
        financial_performance,
        schedule_performance,
        global_performance: round_to(global_performance, 2),
        financial_status,
        schedule_status,
        global_status,
        elapsed_days,
        elapsed_months: round_to(elapsed_months, 2),
        elapsed_months_rounded: elapsed_months.round_ties_even() as i64,
        planned_duration_months: duration,
        expected_months: round_to(expected_months, 2),
        months_difference: round_to(months_difference, 2),
        months_difference_rounded: months_difference.round_ties_even() as i64,
        total_budget: round_to(budget, 2),
        amount_spent: round_to(spent, 2),
        remaining_budget: round_to(budget - spent, 2),
        projected_final_cost: round_to(projected_final_cost, 2),
        projected_overrun: round_to(projected_overrun, 2),
        projected_overrun_pct: round_to(projected_overrun_pct, 2),
        projected_total_months: round_to(projected_total_months, 2),
        projected_delay_months: round_to(projected_delay_months, 2),
        financial_message: describe_financial_performance(
            financial_performance,
            physical_progress_pct,
            financial_progress_pct,
        ),
        schedule_message: describe_schedule_performance(
            schedule_performance,
            physical_progress_pct,
            elapsed_time_pct,
        ),
    }
}

/// One-line reading of the financial ratio.
pub fn describe_financial_performance(ratio: f64, physical_pct: f64, financial_pct: f64) -> String {
    if financial_pct == 0.0 {
        return "No expenditures recorded".to_string();
    }
    if ratio > 100.0 {
        format!(
            "Efficient: {:.1}% more progress than spending",
            physical_pct - financial_pct
        )
    } else if ratio == 100.0 {
        "On par: progress proportional to spending".to_string()
    } else {
        format!(
            "Inefficient: {:.1}% more spending than progress",
            financial_pct - physical_pct
        )
    }
}

/// One-line reading of the schedule ratio.
pub fn describe_schedule_performance(ratio: f64, physical_pct: f64, elapsed_pct: f64) -> String {
    if elapsed_pct == 0.0 {
        return "Just started".to_string();
    }
    if ratio > 100.0 {
        format!(
            "Ahead of schedule: {:.1}% more progress than time elapsed",
            physical_pct - elapsed_pct
        )
    } else if ratio == 100.0 {
        "On schedule: progress matches the timeline".to_string()
    } else {
        format!(
            "Behind schedule: {:.1}% less progress than time elapsed",
            elapsed_pct - physical_pct
        )
    }
}

/// Opt-in sanity check of a snapshot. Returns every issue found; an empty
/// list means the inputs are plausible. `as_of` is used when the snapshot has
/// no evaluation date of its own.
pub fn validate_inputs(input: &ProgressSnapshot, as_of: NaiveDate) -> Vec<InputIssue> {
    let mut issues = Vec::new();
    let physical = input.physical_progress_pct;
    if !(0.0..=100.0).contains(&physical) {
        issues.push(InputIssue::ProgressOutOfRange { value: physical });
    }
    if input.total_budget < 0.0 {
        issues.push(InputIssue::NegativeBudget {
            value: input.total_budget,
        });
    }
    if input.amount_spent < 0.0 {
        issues.push(InputIssue::NegativeSpend {
            value: input.amount_spent,
        });
    }
    if input.planned_duration_months <= 0 {
        issues.push(InputIssue::NonPositiveDuration {
            months: input.planned_duration_months,
        });
    }
    let as_of = input.as_of_date.unwrap_or(as_of);
    if input.start_date > as_of {
        issues.push(InputIssue::StartInFuture {
            start: input.start_date,
            as_of,
        });
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Months};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn snapshot(physical: f64, budget: f64, spent: f64, start: NaiveDate, months: i32) -> ProgressSnapshot {
        ProgressSnapshot {
            physical_progress_pct: physical,
            total_budget: budget,
            amount_spent: spent,
            start_date: start,
            planned_duration_months: months,
            as_of_date: Some(as_of()),
        }
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }

    #[test]
    fn on_budget_slightly_ahead_of_schedule() {
        let start = as_of() - Duration::days(90);
        let r = compute_performance_report(&snapshot(50.0, 1_000_000.0, 500_000.0, start, 6));

        assert_eq!(r.financial_progress_pct, 50.0);
        assert_eq!(r.financial_performance, 100.0);
        assert_eq!(r.financial_status, Status::Good);
        assert_eq!(r.elapsed_days, 90);
        assert_close(r.elapsed_months, 2.96, 0.005);
        assert_eq!(r.elapsed_months_rounded, 3);
        assert_close(r.elapsed_time_pct, 49.3, 0.05);
        assert_close(r.schedule_performance, 101.4, 0.1);
        assert_eq!(r.schedule_status, Status::Good);
        assert_close(r.global_performance, 100.59, 0.01);
        assert_eq!(r.global_status, Status::Good);
        assert_eq!(r.remaining_budget, 500_000.0);
        assert_eq!(r.projected_final_cost, 1_000_000.0);
        assert_eq!(r.projected_overrun, 0.0);
        assert_eq!(r.expected_months, 3.0);
        assert_eq!(r.financial_message, "On par: progress proportional to spending");
        assert!(r.schedule_message.starts_with("Ahead of schedule: 0.7%"));
    }

    #[test]
    fn fresh_project_with_no_data() {
        let r = compute_performance_report(&snapshot(0.0, 1_000_000.0, 0.0, as_of(), 6));

        assert_eq!(r.financial_performance, 0.0);
        assert_eq!(r.schedule_performance, 0.0);
        assert_eq!(r.global_performance, 0.0);
        assert_eq!(r.financial_status, Status::Critical);
        assert_eq!(r.schedule_status, Status::Critical);
        assert_eq!(r.global_status, Status::Critical);
        assert_eq!(r.financial_message, "No expenditures recorded");
        assert_eq!(r.schedule_message, "Just started");
        assert_eq!(r.projected_final_cost, 1_000_000.0);
        assert_eq!(r.projected_total_months, 6.0);
        assert_eq!(r.projected_delay_months, 0.0);
    }

    #[test]
    fn overspent_and_late() {
        let start = as_of().checked_sub_months(Months::new(8)).unwrap();
        let r = compute_performance_report(&snapshot(80.0, 1_000_000.0, 1_200_000.0, start, 6));

        assert_eq!(r.financial_progress_pct, 120.0);
        assert_close(r.financial_performance, 66.67, 0.001);
        assert_eq!(r.financial_status, Status::Critical);
        assert_eq!(r.projected_final_cost, 1_500_000.0);
        assert_eq!(r.projected_overrun, 500_000.0);
        assert_eq!(r.projected_overrun_pct, 50.0);
        assert_eq!(r.remaining_budget, -200_000.0);
        assert!(r.projected_delay_months > 0.0);
        assert!(r.months_difference > 0.0);
        assert_eq!(r.financial_message, "Inefficient: 40.0% more spending than progress");
        assert!(r.schedule_message.starts_with("Behind schedule"));
    }

    #[test]
    fn zero_budget_does_not_divide() {
        let start = as_of() - Duration::days(30);
        let r = compute_performance_report(&snapshot(10.0, 0.0, 0.0, start, 6));

        assert_eq!(r.financial_progress_pct, 0.0);
        assert_eq!(r.financial_performance, 0.0);
        assert_eq!(r.projected_overrun_pct, 0.0);
        // only the schedule component contributes, at its 40% weight
        assert_close(r.global_performance, r.schedule_performance * 0.4, 0.01);
    }

    #[test]
    fn zero_duration_does_not_divide() {
        let start = as_of() - Duration::days(45);
        let r = compute_performance_report(&snapshot(30.0, 100.0, 30.0, start, 0));

        assert_eq!(r.elapsed_time_pct, 0.0);
        assert_eq!(r.schedule_performance, 0.0);
        assert_eq!(r.schedule_message, "Just started");
        assert_eq!(r.global_performance, 60.0);
    }

    #[test]
    fn spent_equals_budget() {
        let start = as_of() - Duration::days(60);
        let r = compute_performance_report(&snapshot(100.0, 250_000.0, 250_000.0, start, 12));
        assert_eq!(r.financial_progress_pct, 100.0);
        assert_eq!(r.remaining_budget, 0.0);
    }

    #[test]
    fn future_start_flows_through() {
        let start = as_of() + Duration::days(31);
        let r = compute_performance_report(&snapshot(5.0, 100.0, 1.0, start, 6));
        assert_eq!(r.elapsed_days, -31);
        assert!(r.elapsed_time_pct < 0.0);
        assert_eq!(r.schedule_performance, 0.0);
        assert!(r.global_performance.is_finite());
    }

    #[test]
    fn status_uses_unrounded_ratio() {
        let start = as_of() - Duration::days(90);
        let r = compute_performance_report(&snapshot(50.0, 1_000_000.0, 500_025.0, start, 6));

        // 99.995... is shown as 100.00 but still sits in the band below
        assert_eq!(r.financial_performance, 100.0);
        assert_eq!(r.financial_status, Status::Acceptable);
    }

    #[test]
    fn whole_month_fields_round_half_to_even() {
        let r = compute_performance_report(&snapshot(50.0, 100.0, 10.0, as_of(), 5));
        assert_eq!(r.expected_months, 2.5);
        assert_eq!(r.months_difference, -2.5);
        assert_eq!(r.months_difference_rounded, -2);
        assert_eq!(r.elapsed_months_rounded, 0);
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        assert_eq!(classify_status(110.0), Status::Excellent);
        assert_eq!(classify_status(109.99), Status::Good);
        assert_eq!(classify_status(100.0), Status::Good);
        assert_eq!(classify_status(99.999), Status::Acceptable);
        assert_eq!(classify_status(90.0), Status::Acceptable);
        assert_eq!(classify_status(75.0), Status::Fair);
        assert_eq!(classify_status(74.99), Status::Critical);
        assert_eq!(classify_status(-5.0), Status::Critical);
        assert_eq!(classify_status(f64::NAN), Status::Critical);
        assert_eq!(classify_status(f64::INFINITY), Status::Excellent);
    }

    #[test]
    fn classification_is_monotonic() {
        let mut previous = classify_status(-50.0);
        let mut ratio = -50.0;
        while ratio <= 200.0 {
            let current = classify_status(ratio);
            assert!(current >= previous, "{ratio} dropped from {previous} to {current}");
            previous = current;
            ratio += 0.25;
        }
    }

    #[test]
    fn identical_inputs_give_identical_reports() {
        let start = as_of() - Duration::days(123);
        let input = snapshot(42.5, 880_000.0, 410_000.0, start, 9);
        let a = serde_json::to_string(&compute_performance_report(&input)).unwrap();
        let b = serde_json::to_string(&compute_performance_report(&input)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn outputs_stay_finite_over_a_grid() {
        let start = as_of() - Duration::days(200);
        for physical in [-10.0, 0.0, 0.01, 50.0, 100.0, 150.0] {
            for (budget, spent) in [(0.0, 0.0), (0.0, 10.0), (100.0, 0.0), (100.0, 300.0)] {
                for months in [-3, 0, 1, 24] {
                    let r = compute_performance_report(&snapshot(physical, budget, spent, start, months));
                    for v in [
                        r.financial_progress_pct,
                        r.elapsed_time_pct,
                        r.financial_performance,
                        r.schedule_performance,
                        r.global_performance,
                        r.projected_final_cost,
                        r.projected_overrun_pct,
                        r.projected_total_months,
                    ] {
                        assert!(v.is_finite());
                    }
                }
            }
        }
    }

    #[test]
    fn messages_cover_every_branch() {
        assert_eq!(
            describe_financial_performance(150.0, 60.0, 40.0),
            "Efficient: 20.0% more progress than spending"
        );
        assert_eq!(describe_financial_performance(0.0, 10.0, 0.0), "No expenditures recorded");
        assert_eq!(
            describe_schedule_performance(100.0, 50.0, 50.0),
            "On schedule: progress matches the timeline"
        );
        assert_eq!(
            describe_schedule_performance(80.0, 40.0, 50.0),
            "Behind schedule: 10.0% less progress than time elapsed"
        );
    }

    #[test]
    fn validation_collects_every_issue() {
        let mut input = snapshot(120.0, -1.0, -2.0, as_of() + Duration::days(1), 0);
        input.as_of_date = None;
        let issues = validate_inputs(&input, as_of());
        assert_eq!(issues.len(), 5);
        assert!(matches!(issues[0], InputIssue::ProgressOutOfRange { .. }));
        assert!(matches!(issues[4], InputIssue::StartInFuture { .. }));

        let ok = snapshot(50.0, 10.0, 5.0, as_of() - Duration::days(1), 6);
        assert!(validate_inputs(&ok, as_of()).is_empty());
    }
}
