//! Aggregations over filtered transactions: summary metrics, the
//! account × month pivot with its full-year `Total` column, and the two
//! chart series.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::{month_label, Transaction};

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub count: usize,
    pub total: f64,
    /// None when there are no records.
    pub average: Option<f64>,
}

pub fn summary_metrics(subset: &[Transaction]) -> SummaryMetrics {
    let count = subset.len();
    let total: f64 = subset.iter().map(|t| t.amount).sum();
    let average = (count > 0).then(|| total / count as f64);
    SummaryMetrics { count, total, average }
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub account_code: String,
    /// One cell per month of the owning table, same order.
    pub cells: Vec<f64>,
    /// Full-year sum for the account, regardless of the month filter.
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    /// Month numbers in calendar order.
    pub months: Vec<u32>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn month_labels(&self) -> Vec<&'static str> {
        self.months.iter().map(|m| month_label(*m)).collect()
    }

    #[cfg(test)]
    pub fn row(&self, account_code: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.account_code == account_code)
    }

    /// Fill the `Total` column from per-account totals; accounts without an
    /// entry get 0.
    pub fn with_totals(mut self, totals: &BTreeMap<String, f64>) -> Self {
        for row in &mut self.rows {
            row.total = totals.get(&row.account_code).copied().unwrap_or(0.0);
        }
        self
    }
}

/// Sum amounts by account (rows) and month (columns). Columns are exactly
/// `months` in calendar order; missing combinations are 0. Rows are the
/// account codes present in `subset`, sorted.
pub fn pivot_by_account_and_month(subset: &[Transaction], months: &BTreeSet<u32>) -> PivotTable {
    let months: Vec<u32> = months.iter().copied().collect();
    let mut grid: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in subset {
        let cells = grid
            .entry(t.account_code.as_str())
            .or_insert_with(|| vec![0.0; months.len()]);
        if let Some(col) = months.iter().position(|m| *m == t.month) {
            cells[col] += t.amount;
        }
    }
    let rows = grid
        .into_iter()
        .map(|(account, cells)| PivotRow {
            account_code: account.to_string(),
            cells,
            total: 0.0,
        })
        .collect();
    PivotTable { months, rows }
}

/// Per-account sums over every month of `year_subset`, restricted to
/// `accounts`. Accounts with no records yield 0.
pub fn total_by_account(year_subset: &[Transaction], accounts: &BTreeSet<String>) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = accounts.iter().map(|a| (a.clone(), 0.0)).collect();
    for t in year_subset {
        if let Some(total) = totals.get_mut(&t.account_code) {
            *total += t.amount;
        }
    }
    totals
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: u32,
    pub label: &'static str,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTotal {
    pub account_code: String,
    pub total: f64,
}

/// Sum per month present in `subset`, ordered by month number.
pub fn monthly_totals(subset: &[Transaction]) -> Vec<MonthTotal> {
    let mut by_month: BTreeMap<u32, f64> = BTreeMap::new();
    for t in subset {
        *by_month.entry(t.month).or_default() += t.amount;
    }
    by_month
        .into_iter()
        .map(|(month, total)| MonthTotal {
            month,
            label: month_label(month),
            total,
        })
        .collect()
}

/// Sum per account code present in `subset`.
pub fn account_totals(subset: &[Transaction]) -> Vec<AccountTotal> {
    let mut by_account: BTreeMap<&str, f64> = BTreeMap::new();
    for t in subset {
        *by_account.entry(t.account_code.as_str()).or_default() += t.amount;
    }
    by_account
        .into_iter()
        .map(|(account, total)| AccountTotal {
            account_code: account.to_string(),
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::txn;

    fn set<T: Ord + Clone>(items: &[T]) -> BTreeSet<T> {
        items.iter().cloned().collect()
    }

    fn accounts(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_summary_metrics() {
        let rows = vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-02-10", "A100", 30.0),
            txn("2024-01-20", "B200", 20.0),
        ];
        let s = summary_metrics(&rows);
        assert_eq!(s.count, 3);
        assert!((s.total - 100.0).abs() < 1e-9);
        assert!((s.average.unwrap() - 33.333_333).abs() < 1e-5);
    }

    #[test]
    fn test_summary_metrics_empty_has_no_average() {
        let s = summary_metrics(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.total, 0.0);
        assert_eq!(s.average, None);
    }

    #[test]
    fn test_pivot_columns_follow_calendar_order() {
        let rows = vec![
            txn("2024-03-01", "A100", 5.0),
            txn("2024-01-01", "A100", 7.0),
        ];
        // BTreeSet ordering puts Jan before Mar regardless of insertion order
        let mut months = BTreeSet::new();
        months.insert(3);
        months.insert(1);
        let pivot = pivot_by_account_and_month(&rows, &months);
        assert_eq!(pivot.month_labels(), vec!["Jan", "Mar"]);
        assert_eq!(pivot.row("A100").unwrap().cells, vec![7.0, 5.0]);
    }

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let rows = vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-02-10", "A100", 30.0),
            txn("2024-01-20", "B200", 20.0),
        ];
        let pivot = pivot_by_account_and_month(&rows, &set(&[1, 2]));
        assert_eq!(pivot.rows.len(), 2);
        assert_eq!(pivot.row("B200").unwrap().cells, vec![20.0, 0.0]);
    }

    #[test]
    fn test_pivot_includes_selected_months_without_data() {
        let rows = vec![txn("2024-01-05", "A100", 50.0)];
        let pivot = pivot_by_account_and_month(&rows, &set(&[1, 6]));
        assert_eq!(pivot.months, vec![1, 6]);
        assert_eq!(pivot.row("A100").unwrap().cells, vec![50.0, 0.0]);
    }

    #[test]
    fn test_total_by_account_ignores_month_filter() {
        let year = vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-02-10", "A100", 30.0),
            txn("2024-07-01", "A100", 100.0),
            txn("2024-01-20", "B200", 20.0),
        ];
        let totals = total_by_account(&year, &accounts(&["A100", "B200", "C300"]));
        assert_eq!(totals["A100"], 180.0);
        assert_eq!(totals["B200"], 20.0);
        assert_eq!(totals["C300"], 0.0);

        let only_a = total_by_account(&year, &accounts(&["A100"]));
        assert!(!only_a.contains_key("B200"));
    }

    #[test]
    fn test_with_totals_joins_by_account() {
        let subset = vec![txn("2024-01-05", "A100", 50.0)];
        let year = vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-09-05", "A100", 25.0),
        ];
        let pivot = pivot_by_account_and_month(&subset, &set(&[1]))
            .with_totals(&total_by_account(&year, &accounts(&["A100"])));
        assert_eq!(pivot.row("A100").unwrap().total, 75.0);
    }

    #[test]
    fn test_monthly_totals_sorted_by_month() {
        let rows = vec![
            txn("2024-11-05", "A100", 1.0),
            txn("2024-02-10", "A100", 2.0),
            txn("2024-02-11", "B200", 3.0),
        ];
        let m = monthly_totals(&rows);
        let labels: Vec<_> = m.iter().map(|x| x.label).collect();
        assert_eq!(labels, vec!["Feb", "Nov"]);
        assert_eq!(m[0].total, 5.0);
    }

    #[test]
    fn test_account_totals() {
        let rows = vec![
            txn("2024-01-05", "B200", 1.5),
            txn("2024-02-10", "A100", 2.0),
            txn("2024-03-11", "B200", -0.5),
        ];
        let a = account_totals(&rows);
        assert_eq!(a.len(), 2);
        let b = a.iter().find(|x| x.account_code == "B200").unwrap();
        assert_eq!(b.total, 1.0);
    }
}
