use crate::types::LedgerEntry;
use std::collections::HashMap;

pub const EXPENSE_KIND: &str = "gasto";
pub const VOIDED_STATUS: &str = "anulada";

/// An entry counts towards spending when it is an expense, has not been
/// voided, and is not one leg of a transfer between accounts.
pub fn counts_as_expense(entry: &LedgerEntry) -> bool {
    entry.kind.trim().eq_ignore_ascii_case(EXPENSE_KIND)
        && !entry.status.trim().eq_ignore_ascii_case(VOIDED_STATUS)
        && !entry.is_transfer
}

pub fn sum_expenses(entries: &[LedgerEntry]) -> f64 {
    entries
        .iter()
        .filter(|e| counts_as_expense(e))
        .map(|e| e.amount)
        .sum()
}

pub fn sum_expenses_by_project(entries: &[LedgerEntry]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for e in entries.iter().filter(|e| counts_as_expense(e)) {
        *totals.entry(e.project_id.clone()).or_insert(0.0) += e.amount;
    }
    totals
}
