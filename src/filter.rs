use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{AnalyzerError, Result};
use crate::models::{month_label, parse_month, Transaction};

/// The per-run filter configuration: one year, a set of account codes and a
/// set of months (1–12).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub year: i32,
    pub accounts: BTreeSet<String>,
    pub months: BTreeSet<u32>,
}

impl Selection {
    /// Everything available for `year`, or for the most recent year when none is given.
    /// Returns None when there are no records for the year.
    pub fn default_for(records: &[Transaction], year: Option<i32>) -> Option<Self> {
        let options = FilterOptions::from_records(records, year)?;
        Some(Self {
            year: options.year,
            accounts: options.accounts.into_iter().collect(),
            months: options.months.into_iter().collect(),
        })
    }

    /// Apply CLI-style overrides: empty lists keep the defaults.
    pub fn with_overrides(mut self, accounts: &[String], months: &[String]) -> Result<Self> {
        if !accounts.is_empty() {
            self.accounts = accounts.iter().map(|a| a.trim().to_string()).collect();
        }
        if !months.is_empty() {
            self.months = parse_months(months)?;
        }
        Ok(self)
    }

    pub fn month_labels(&self) -> Vec<&'static str> {
        self.months.iter().map(|m| month_label(*m)).collect()
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        t.year == self.year && self.accounts.contains(&t.account_code) && self.months.contains(&t.month)
    }
}

pub fn parse_months(raw: &[String]) -> Result<BTreeSet<u32>> {
    raw.iter()
        .map(|m| {
            parse_month(m).ok_or_else(|| AnalyzerError::Selection(format!("unknown month '{m}'")))
        })
        .collect()
}

/// The values a user can pick from: every year in the data, and the account
/// codes and months present in the chosen year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub year: i32,
    /// Descending, most recent first.
    pub years: Vec<i32>,
    /// Sorted.
    pub accounts: Vec<String>,
    /// Calendar order.
    pub months: Vec<u32>,
}

impl FilterOptions {
    pub fn from_records(records: &[Transaction], year: Option<i32>) -> Option<Self> {
        let years: BTreeSet<i32> = records.iter().map(|t| t.year).collect();
        let year = match year {
            Some(y) if years.contains(&y) => y,
            Some(_) => return None,
            None => *years.iter().next_back()?,
        };
        let in_year = records.iter().filter(|t| t.year == year);
        let accounts: BTreeSet<&str> = in_year.clone().map(|t| t.account_code.as_str()).collect();
        let months: BTreeSet<u32> = in_year.map(|t| t.month).collect();
        Some(Self {
            year,
            years: years.into_iter().rev().collect(),
            accounts: accounts.into_iter().map(str::to_string).collect(),
            months: months.into_iter().collect(),
        })
    }
}

/// Records matching the year, account and month filters.
pub fn filter(records: &[Transaction], selection: &Selection) -> Vec<Transaction> {
    records.iter().filter(|t| selection.matches(t)).cloned().collect()
}

/// Records of `year` restricted to `accounts`, across every month.
pub fn year_subset(records: &[Transaction], year: i32, accounts: &BTreeSet<String>) -> Vec<Transaction> {
    records
        .iter()
        .filter(|t| t.year == year && accounts.contains(&t.account_code))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::txn;

    fn sample() -> Vec<Transaction> {
        vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-02-10", "A100", 30.0),
            txn("2024-01-20", "B200", 20.0),
            txn("2024-03-02", "C300", 7.0),
            txn("2023-12-31", "A100", 99.0),
            txn("2023-06-15", "Z900", 1.0),
        ]
    }

    fn selection(year: i32, accounts: &[&str], months: &[u32]) -> Selection {
        Selection {
            year,
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            months: months.iter().copied().collect(),
        }
    }

    #[test]
    fn test_filter_by_year_account_month() {
        let rows = sample();
        let out = filter(&rows, &selection(2024, &["A100", "B200"], &[1]));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.year == 2024 && t.month == 1));
    }

    #[test]
    fn test_filter_is_subset_and_idempotent() {
        let rows = sample();
        let sel = selection(2024, &["A100", "C300"], &[1, 2, 3]);
        let once = filter(&rows, &sel);
        assert!(once.iter().all(|t| rows.contains(t)));
        let twice = filter(&once, &sel);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_selections_yield_empty_subset() {
        let rows = sample();
        assert!(filter(&rows, &selection(2024, &[], &[1, 2, 3])).is_empty());
        assert!(filter(&rows, &selection(2024, &["A100"], &[])).is_empty());
        assert!(filter(&[], &selection(2024, &["A100"], &[1])).is_empty());
    }

    #[test]
    fn test_year_subset_ignores_months() {
        let rows = sample();
        let accounts = ["A100".to_string()].into_iter().collect();
        let out = year_subset(&rows, 2024, &accounts);
        assert_eq!(out.len(), 2);
        assert_eq!(out.iter().map(|t| t.amount).sum::<f64>(), 80.0);
    }

    #[test]
    fn test_options_default_to_latest_year() {
        let rows = sample();
        let opts = FilterOptions::from_records(&rows, None).unwrap();
        assert_eq!(opts.year, 2024);
        assert_eq!(opts.years, vec![2024, 2023]);
        assert_eq!(opts.accounts, vec!["A100", "B200", "C300"]);
        assert_eq!(opts.months, vec![1, 2, 3]);

        let opts = FilterOptions::from_records(&rows, Some(2023)).unwrap();
        assert_eq!(opts.accounts, vec!["A100", "Z900"]);
        assert_eq!(opts.months, vec![6, 12]);

        assert!(FilterOptions::from_records(&rows, Some(1999)).is_none());
        assert!(FilterOptions::from_records(&[], None).is_none());
    }

    #[test]
    fn test_default_selection_selects_everything() {
        let rows = sample();
        let sel = Selection::default_for(&rows, None).unwrap();
        assert_eq!(sel.year, 2024);
        assert_eq!(filter(&rows, &sel).len(), 4);
        assert_eq!(sel.month_labels(), vec!["Jan", "Feb", "Mar"]);
    }

    #[test]
    fn test_overrides() {
        let rows = sample();
        let sel = Selection::default_for(&rows, Some(2024))
            .unwrap()
            .with_overrides(&["B200".to_string()], &["Mar".to_string(), "jan".to_string()])
            .unwrap();
        assert_eq!(sel.accounts.len(), 1);
        assert_eq!(sel.months.iter().copied().collect::<Vec<_>>(), vec![1, 3]);

        let err = Selection::default_for(&rows, None)
            .unwrap()
            .with_overrides(&[], &["Smarch".to_string()])
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Selection(_)));
    }
}
