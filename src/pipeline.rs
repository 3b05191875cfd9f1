use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    account_totals, monthly_totals, pivot_by_account_and_month, summary_metrics, total_by_account,
    AccountTotal, MonthTotal, PivotTable, SummaryMetrics,
};
use crate::filter::{filter, year_subset, Selection};
use crate::models::Transaction;

/// Everything one run produces for a given selection.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub selection: Selection,
    pub summary: SummaryMetrics,
    pub pivot: PivotTable,
    pub monthly: Vec<MonthTotal>,
    pub accounts: Vec<AccountTotal>,
    /// The filtered rows, kept for the optional data sheet on export.
    #[serde(skip)]
    pub filtered: Vec<Transaction>,
}

/// Filter and aggregate `records` for one selection. Pure; recomputes
/// everything from scratch.
pub fn analyze(records: &[Transaction], selection: &Selection) -> Analysis {
    let filtered = filter(records, selection);
    let year_rows = year_subset(records, selection.year, &selection.accounts);
    debug!(
        total = records.len(),
        filtered = filtered.len(),
        year_rows = year_rows.len(),
        "running pipeline"
    );

    let totals = total_by_account(&year_rows, &selection.accounts);
    let pivot = pivot_by_account_and_month(&filtered, &selection.months).with_totals(&totals);

    Analysis {
        selection: selection.clone(),
        summary: summary_metrics(&filtered),
        pivot,
        monthly: monthly_totals(&filtered),
        accounts: account_totals(&filtered),
        filtered,
    }
}
