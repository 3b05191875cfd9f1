use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Three-letter label for a month number (1–12). Out-of-range numbers yield "?".
pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_LABELS.get(i as usize))
        .copied()
        .unwrap_or("?")
}

/// Parse a month given as `Jan`, `January` or `1`/`01`. Case-insensitive.
pub fn parse_month(raw: &str) -> Option<u32> {
    let s = raw.trim().to_lowercase();
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTH_NAMES
        .iter()
        .position(|name| *name == s || (s.len() == 3 && name.starts_with(&s)))
        .map(|i| i as u32 + 1)
}

/// One loaded transaction row, with calendar fields derived from `date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDateTime,
    pub account_code: String,
    pub amount: f64,
    pub year: i32,
    pub month: u32,
}

impl Transaction {
    pub fn new(date: NaiveDateTime, account_code: impl Into<String>, amount: f64) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            date,
            account_code: account_code.into(),
            amount,
        }
    }

    pub fn month_label(&self) -> &'static str {
        month_label(self.month)
    }
}

#[cfg(test)]
pub(crate) fn txn(date: &str, account: &str, amount: f64) -> Transaction {
    let d = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Transaction::new(d.and_hms_opt(0, 0, 0).unwrap(), account, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields() {
        let t = txn("2024-02-10", "A100", 30.0);
        assert_eq!(t.year, 2024);
        assert_eq!(t.month, 2);
        assert_eq!(t.month_label(), "Feb");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("Jan"), Some(1));
        assert_eq!(parse_month("mar"), Some(3));
        assert_eq!(parse_month("September"), Some(9));
        assert_eq!(parse_month("12"), Some(12));
        assert_eq!(parse_month("07"), Some(7));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("0"), None);
        assert_eq!(parse_month("Ju"), None);
        assert_eq!(parse_month("Smarch"), None);
    }

    #[test]
    fn test_month_label_out_of_range() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(0), "?");
        assert_eq!(month_label(13), "?");
    }
}
