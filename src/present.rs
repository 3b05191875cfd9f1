//! Maps an [`Analysis`] to display shapes: formatted KPI strings, pivot rows,
//! raw chart series, and the plain-text report.

use std::io::IsTerminal;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use serde::Serialize;

use crate::aggregate::SummaryMetrics;
use crate::error::Result;
use crate::fmt::{amount, money, number};
use crate::pipeline::Analysis;

pub const NO_DATA: &str = "no data";

const BAR_WIDTH: usize = 30;

/// What the output surface can do. Decided once by the caller and passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Chart rendering is available.
    pub charts: bool,
    /// Stdout is an interactive terminal.
    pub interactive: bool,
}

impl Capabilities {
    pub fn detect(disable_charts: bool) -> Self {
        Self {
            charts: cfg!(feature = "tui") && !disable_charts,
            interactive: std::io::stdout().is_terminal(),
        }
    }
}

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct KpiView {
    pub count: String,
    pub total: String,
    pub average: String,
}

impl KpiView {
    pub fn new(summary: &SummaryMetrics) -> Self {
        Self {
            count: number(summary.count as i64),
            total: money(summary.total),
            average: summary.average.map(money).unwrap_or_else(|| NO_DATA.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotView {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PivotView {
    pub fn new(analysis: &Analysis) -> Self {
        let pivot = &analysis.pivot;
        let mut header = vec!["Account Code".to_string()];
        header.extend(pivot.month_labels().into_iter().map(str::to_string));
        header.push("Total".to_string());

        let rows = pivot
            .rows
            .iter()
            .map(|r| {
                let mut row = vec![r.account_code.clone()];
                row.extend(r.cells.iter().map(|v| amount(*v)));
                row.push(amount(r.total));
                row
            })
            .collect();
        Self { header, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountShare {
    pub account_code: String,
    pub amount: f64,
    /// Share of the summed absolute amounts, 0–100.
    pub pct: f64,
}

/// Raw, unformatted series for the bar chart (per month) and the
/// distribution chart (per account code).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub monthly: Vec<(&'static str, f64)>,
    pub accounts: Vec<AccountShare>,
}

impl ChartData {
    pub fn new(analysis: &Analysis) -> Self {
        let monthly = analysis.monthly.iter().map(|m| (m.label, m.total)).collect();
        let denom: f64 = analysis.accounts.iter().map(|a| a.total.abs()).sum();
        let accounts = analysis
            .accounts
            .iter()
            .map(|a| AccountShare {
                account_code: a.account_code.clone(),
                amount: a.total,
                pct: if denom != 0.0 { a.total.abs() / denom * 100.0 } else { 0.0 },
            })
            .collect();
        Self { monthly, accounts }
    }

    pub fn max_monthly(&self) -> f64 {
        self.monthly.iter().map(|(_, v)| v.abs()).fold(0.0, f64::max)
    }
}

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let n = ((value.abs() / max) * width as f64).round() as usize;
    "\u{2588}".repeat(n.min(width))
}

/// Environment details shown in place of charts when they are unavailable.
pub fn diagnostics(caps: &Capabilities) -> Vec<(String, String)> {
    let mut features = Vec::new();
    if cfg!(feature = "tui") {
        features.push("tui");
    }
    vec![
        ("Version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
        (
            "Features".to_string(),
            if features.is_empty() { "none".to_string() } else { features.join(", ") },
        ),
        ("Charts".to_string(), if caps.charts { "available" } else { "unavailable" }.to_string()),
        ("Interactive terminal".to_string(), if caps.interactive { "yes" } else { "no" }.to_string()),
        ("TERM".to_string(), std::env::var("TERM").unwrap_or_else(|_| "(unset)".to_string())),
        ("OS".to_string(), std::env::consts::OS.to_string()),
    ]
}

// ---------------------------------------------------------------------------
// Text and JSON rendering
// ---------------------------------------------------------------------------

pub fn format_kpis(kpi: &KpiView) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Total Transactions", "Total Amount", "Avg per Transaction"]);
    table.add_row(vec![
        Cell::new(&kpi.count),
        Cell::new(&kpi.total),
        Cell::new(&kpi.average),
    ]);
    format!("{}\n{table}", "Key Metrics".bold())
}

pub fn format_pivot(view: &PivotView, year: i32) -> String {
    let title = format!("Pivot Table for {year}");
    if view.rows.is_empty() {
        return format!("{}\nNo transactions match the current filters.", title.bold());
    }
    let mut table = Table::new();
    table.set_header(view.header.clone());
    for row in &view.rows {
        let cells: Vec<Cell> = row
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let cell = Cell::new(v);
                if i == 0 { cell } else { cell.set_alignment(CellAlignment::Right) }
            })
            .collect();
        table.add_row(cells);
    }
    format!("{}\n{table}", title.bold())
}

pub fn format_monthly(charts: &ChartData, caps: &Capabilities) -> String {
    let mut table = Table::new();
    let mut header = vec!["Month", "Amount"];
    if caps.charts {
        header.push("");
    }
    table.set_header(header);
    let max = charts.max_monthly();
    for (label, total) in &charts.monthly {
        let amt = if *total < 0.0 { money(*total).red().to_string() } else { money(*total) };
        let mut row = vec![Cell::new(label), Cell::new(amt).set_alignment(CellAlignment::Right)];
        if caps.charts {
            row.push(Cell::new(bar(*total, max, BAR_WIDTH)));
        }
        table.add_row(row);
    }
    format!("{}\n{table}", "Monthly Total Amount".bold())
}

pub fn format_distribution(charts: &ChartData, caps: &Capabilities) -> String {
    let mut table = Table::new();
    let mut header = vec!["Account Code", "Amount", "Share"];
    if caps.charts {
        header.push("");
    }
    table.set_header(header);
    for share in &charts.accounts {
        let mut row = vec![
            Cell::new(&share.account_code),
            Cell::new(money(share.amount)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", share.pct)).set_alignment(CellAlignment::Right),
        ];
        if caps.charts {
            row.push(Cell::new(bar(share.pct, 100.0, BAR_WIDTH)));
        }
        table.add_row(row);
    }
    format!("{}\n{table}", "Amount Distribution by Account Code".bold())
}

pub fn format_diagnostics(caps: &Capabilities) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Environment", "Value"]);
    for (k, v) in diagnostics(caps) {
        table.add_row(vec![Cell::new(k), Cell::new(v)]);
    }
    format!(
        "{}\n{table}",
        "Charts are unavailable; showing environment details instead.".yellow()
    )
}

/// The full plain-text report for one analysis.
pub fn render_text(analysis: &Analysis, caps: &Capabilities) -> String {
    let kpi = KpiView::new(&analysis.summary);
    let pivot = PivotView::new(analysis);
    let charts = ChartData::new(analysis);

    let mut sections = vec![
        format!(
            "{} ({} \u{00b7} {} account(s) \u{00b7} {})",
            "Transaction Analyzer".bold(),
            analysis.selection.year,
            analysis.selection.accounts.len(),
            analysis.selection.month_labels().join(", ")
        ),
        format_kpis(&kpi),
        format_pivot(&pivot, analysis.selection.year),
    ];
    if !charts.monthly.is_empty() {
        sections.push(format_monthly(&charts, caps));
        sections.push(format_distribution(&charts, caps));
    }
    if !caps.charts {
        sections.push(format_diagnostics(caps));
    }
    sections.join("\n\n")
}

pub fn render_json(analysis: &Analysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use crate::models::txn;
    use crate::pipeline::analyze;

    fn scenario(accounts: &[&str]) -> Analysis {
        let rows = vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-02-10", "A100", 30.0),
            txn("2024-01-20", "B200", 20.0),
        ];
        let sel = Selection {
            year: 2024,
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            months: [1, 2].into_iter().collect(),
        };
        analyze(&rows, &sel)
    }

    const WITH_CHARTS: Capabilities = Capabilities { charts: true, interactive: false };
    const NO_CHARTS: Capabilities = Capabilities { charts: false, interactive: false };

    #[test]
    fn test_kpi_view() {
        let kpi = KpiView::new(&scenario(&["A100", "B200"]).summary);
        assert_eq!(kpi.count, "3");
        assert_eq!(kpi.total, "$100.00");
        assert_eq!(kpi.average, "$33.33");
    }

    #[test]
    fn test_kpi_view_without_data() {
        let kpi = KpiView::new(&scenario(&[]).summary);
        assert_eq!(kpi.count, "0");
        assert_eq!(kpi.total, "$0.00");
        assert_eq!(kpi.average, NO_DATA);
    }

    #[test]
    fn test_pivot_view() {
        let view = PivotView::new(&scenario(&["A100", "B200"]));
        assert_eq!(view.header, vec!["Account Code", "Jan", "Feb", "Total"]);
        assert_eq!(view.rows[0], vec!["A100", "50.00", "30.00", "80.00"]);
        assert_eq!(view.rows[1], vec!["B200", "20.00", "0.00", "20.00"]);
    }

    #[test]
    fn test_chart_data_is_unformatted() {
        let charts = ChartData::new(&scenario(&["A100", "B200"]));
        assert_eq!(charts.monthly, vec![("Jan", 70.0), ("Feb", 30.0)]);
        assert_eq!(charts.accounts.len(), 2);
        assert_eq!(charts.accounts[0].amount, 80.0);
        assert!((charts.accounts[0].pct - 80.0).abs() < 1e-9);
        assert_eq!(charts.max_monthly(), 70.0);
    }

    #[test]
    fn test_bar_scales_to_width() {
        assert_eq!(bar(50.0, 100.0, 10).chars().count(), 5);
        assert_eq!(bar(-100.0, 100.0, 10).chars().count(), 10);
        assert_eq!(bar(1.0, 0.0, 10), "");
    }

    #[test]
    fn test_render_text_with_charts() {
        let out = render_text(&scenario(&["A100", "B200"]), &WITH_CHARTS);
        assert!(out.contains("Key Metrics"));
        assert!(out.contains("Pivot Table for 2024"));
        assert!(out.contains("80.00"));
        assert!(out.contains("Monthly Total Amount"));
        assert!(out.contains("\u{2588}"));
        assert!(!out.contains("Charts are unavailable"));
    }

    #[test]
    fn test_render_text_degrades_without_charts() {
        let out = render_text(&scenario(&["A100", "B200"]), &NO_CHARTS);
        assert!(out.contains("Pivot Table for 2024"));
        assert!(out.contains("Charts are unavailable"));
        assert!(out.contains(env!("CARGO_PKG_VERSION")));
        assert!(!out.contains("\u{2588}"));
    }

    #[test]
    fn test_render_text_empty_selection() {
        let out = render_text(&scenario(&[]), &WITH_CHARTS);
        assert!(out.contains(NO_DATA));
        assert!(out.contains("No transactions match"));
        assert!(!out.contains("Monthly Total Amount"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&scenario(&["A100", "B200"])).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["summary"]["count"], 3);
        assert_eq!(v["pivot"]["rows"][0]["total"], 80.0);
        assert_eq!(v["selection"]["year"], 2024);
        assert!(v.get("filtered").is_none());

        let empty = render_json(&scenario(&[])).unwrap();
        let v: serde_json::Value = serde_json::from_str(&empty).unwrap();
        assert!(v["summary"]["average"].is_null());
    }
}
