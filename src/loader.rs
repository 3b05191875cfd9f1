use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::error::{AnalyzerError, Result};
use crate::models::Transaction;

pub const DEFAULT_SHEET: &str = "Sheet1";

pub const COL_DATE: &str = "Transaction Date";
pub const COL_ACCOUNT: &str = "Account Code";
pub const COL_AMOUNT: &str = "Base Amount";

static EMPTY_CELL: Data = Data::Empty;

// ---------------------------------------------------------------------------
// Cell parsing helpers
// ---------------------------------------------------------------------------

/// Parse an amount string. Strips `$`, commas and quotes; `(50.00)` is negative.
/// Returns None for empty or non-numeric input so the row gets dropped.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => inner.trim().parse::<f64>().ok().map(|v| -v),
        None => s.parse::<f64>().ok(),
    };
    value.filter(|v| v.is_finite())
}

/// Parse a date or date-time string: ISO forms first, then `MM/DD/YYYY`.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Convert an Excel serial (1900 date system) to a date-time, keeping the time fraction.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    base.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn parse_account(raw: &str) -> Option<String> {
    let s = raw.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn date_from_cell(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64()),
        Data::Float(f) => excel_serial_to_datetime(*f),
        Data::Int(i) => excel_serial_to_datetime(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_datetime(s),
        _ => None,
    }
}

fn account_from_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => parse_account(s),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn amount_from_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Header lookup
// ---------------------------------------------------------------------------

struct ColumnMap {
    date: usize,
    account: usize,
    amount: usize,
}

impl ColumnMap {
    fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let find = |name: &str| headers.iter().position(|h| h == name);
        match (find(COL_DATE), find(COL_ACCOUNT), find(COL_AMOUNT)) {
            (Some(date), Some(account), Some(amount)) => Ok(Self { date, account, amount }),
            _ => {
                let missing: Vec<&str> = [COL_DATE, COL_ACCOUNT, COL_AMOUNT]
                    .into_iter()
                    .filter(|c| find(c).is_none())
                    .collect();
                Err(AnalyzerError::Format(format!(
                    "missing required column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Load transactions from a file on disk. `.csv` files go through the CSV
/// reader; everything else is handed to calamine's format detection.
pub fn load_path(path: &Path, sheet: &str) -> Result<Vec<Transaction>> {
    let bytes = std::fs::read(path)?;
    let rows = if is_csv(path) {
        load_csv(bytes.as_slice())?
    } else {
        load_workbook_bytes(bytes, sheet)?
    };
    info!(file = %path.display(), rows = rows.len(), "loaded transactions");
    Ok(rows)
}

/// Load transactions from workbook bytes held in memory.
pub fn load_workbook_bytes(bytes: Vec<u8>, sheet: &str) -> Result<Vec<Transaction>> {
    let workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AnalyzerError::Format(format!("unreadable workbook: {e}")))?;
    load_sheet(workbook, sheet)
}

fn load_sheet<RS: Read + Seek>(mut workbook: Sheets<RS>, sheet: &str) -> Result<Vec<Transaction>> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(AnalyzerError::Format(format!(
            "sheet '{sheet}' not found (available: {})",
            workbook.sheet_names().join(", ")
        )));
    }
    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Err(AnalyzerError::Format(format!("sheet '{sheet}' is empty")));
    };
    let header_text: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    let cols = ColumnMap::from_headers(header_text.iter().map(String::as_str))?;

    let mut out = Vec::new();
    let mut dropped = 0usize;
    for row in rows {
        let cell = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);
        let parsed = date_from_cell(cell(cols.date)).zip(account_from_cell(cell(cols.account)));
        match (parsed, amount_from_cell(cell(cols.amount))) {
            (Some((date, account)), Some(amount)) => {
                out.push(Transaction::new(date, account, amount))
            }
            _ => dropped += 1,
        }
    }
    debug!(kept = out.len(), dropped, "parsed sheet '{sheet}'");
    Ok(out)
}

/// Load transactions from CSV text with a header row.
pub fn load_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let cols = ColumnMap::from_headers(rdr.headers()?.iter())?;

    let mut out = Vec::new();
    let mut dropped = 0usize;
    for result in rdr.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("");
        let date = parse_datetime(field(cols.date));
        let account = parse_account(field(cols.account));
        let amount = parse_amount(field(cols.amount));
        match (date, account, amount) {
            (Some(date), Some(account), Some(amount)) => {
                out.push(Transaction::new(date, account, amount))
            }
            _ => dropped += 1,
        }
    }
    debug!(kept = out.len(), dropped, "parsed csv");
    Ok(out)
}
