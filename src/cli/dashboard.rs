use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use tracing::warn;

use crate::cli::display_name;
use crate::error::Result;
use crate::export::{default_file_name, export_to, ExportFormat};
use crate::filter::{FilterOptions, Selection};
use crate::fmt::{amount, compact};
use crate::models::{month_label, Transaction};
use crate::pipeline::{analyze, Analysis};
use crate::present::{ChartData, KpiView, PivotView};
use crate::tui::{
    money_span, run_view, View, ViewAction, AMOUNT_NEG_STYLE, AMOUNT_POS_STYLE, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE, TITLE_STYLE,
};

const SIDEBAR_WIDTH: u16 = 26;
const CHART_HEIGHT: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Years,
    Accounts,
    Months,
}

impl Panel {
    fn index(self) -> usize {
        match self {
            Self::Years => 0,
            Self::Accounts => 1,
            Self::Months => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Years => Self::Accounts,
            Self::Accounts => Self::Months,
            Self::Months => Self::Years,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Years => Self::Months,
            Self::Accounts => Self::Years,
            Self::Months => Self::Accounts,
        }
    }
}

/// Interactive dashboard: filter sidebar on the left, KPIs, pivot table and
/// charts on the right. Every selection change reruns the pipeline.
pub struct Dashboard {
    records: Vec<Transaction>,
    source: String,
    options: FilterOptions,
    selection: Selection,
    analysis: Analysis,
    panel: Panel,
    cursor: [usize; 3],
    export_dir: PathBuf,
    status_message: Option<String>,
}

impl Dashboard {
    /// None when there are no transactions to show.
    pub fn new(records: Vec<Transaction>, source: impl Into<String>, export_dir: PathBuf) -> Option<Self> {
        let options = FilterOptions::from_records(&records, None)?;
        let selection = Selection::default_for(&records, Some(options.year))?;
        let analysis = analyze(&records, &selection);
        Some(Self {
            records,
            source: source.into(),
            options,
            selection,
            analysis,
            panel: Panel::Accounts,
            cursor: [0; 3],
            export_dir,
            status_message: None,
        })
    }

    fn recompute(&mut self) {
        self.analysis = analyze(&self.records, &self.selection);
    }

    /// Switching year resets accounts and months to everything available in it.
    fn select_year(&mut self, year: i32) {
        let Some(options) = FilterOptions::from_records(&self.records, Some(year)) else {
            return;
        };
        if let Some(selection) = Selection::default_for(&self.records, Some(year)) {
            self.selection = selection;
        }
        self.options = options;
        self.cursor[Panel::Accounts.index()] = 0;
        self.cursor[Panel::Months.index()] = 0;
        self.recompute();
    }

    fn panel_len(&self, panel: Panel) -> usize {
        match panel {
            Panel::Years => self.options.years.len(),
            Panel::Accounts => self.options.accounts.len(),
            Panel::Months => self.options.months.len(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.panel_len(self.panel);
        let cur = &mut self.cursor[self.panel.index()];
        if len == 0 {
            *cur = 0;
            return;
        }
        *cur = cur.saturating_add_signed(delta).min(len - 1);
    }

    fn activate(&mut self) {
        let idx = self.cursor[self.panel.index()];
        match self.panel {
            Panel::Years => {
                if let Some(year) = self.options.years.get(idx).copied() {
                    self.select_year(year);
                }
            }
            Panel::Accounts => {
                if let Some(code) = self.options.accounts.get(idx) {
                    if !self.selection.accounts.remove(code) {
                        self.selection.accounts.insert(code.clone());
                    }
                    self.recompute();
                }
            }
            Panel::Months => {
                if let Some(month) = self.options.months.get(idx).copied() {
                    if !self.selection.months.remove(&month) {
                        self.selection.months.insert(month);
                    }
                    self.recompute();
                }
            }
        }
    }

    fn set_all(&mut self, on: bool) {
        match self.panel {
            Panel::Years => return,
            Panel::Accounts => {
                self.selection.accounts = if on {
                    self.options.accounts.iter().cloned().collect()
                } else {
                    Default::default()
                };
            }
            Panel::Months => {
                self.selection.months = if on {
                    self.options.months.iter().copied().collect()
                } else {
                    Default::default()
                };
            }
        }
        self.recompute();
    }

    fn export(&mut self, format: ExportFormat) {
        let path = self
            .export_dir
            .join(default_file_name(self.selection.year, format));
        self.status_message = Some(match export_to(&self.analysis, format, false, &path) {
            Ok(p) => format!("Exported {}", p.display()),
            Err(e) => {
                warn!("export failed: {e}");
                format!("Export failed: {e}")
            }
        });
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn push_section(&self, lines: &mut Vec<Line<'static>>, panel: Panel, title: &str, items: Vec<(String, bool)>) {
        let focused = self.panel == panel;
        let title_style = if focused { HEADER_STYLE } else { TITLE_STYLE };
        lines.push(Line::from(Span::styled(format!(" {title}"), title_style)));
        for (i, (label, on)) in items.into_iter().enumerate() {
            let mark = if on { "[x]" } else { "[ ]" };
            let text = format!(" {mark} {label}");
            if focused && self.cursor[panel.index()] == i {
                lines.push(Line::from(Span::styled(text, SELECTED_STYLE)));
            } else {
                lines.push(Line::from(text));
            }
        }
        lines.push(Line::from(""));
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line<'static>> = Vec::new();

        let years = self
            .options
            .years
            .iter()
            .map(|y| (y.to_string(), *y == self.selection.year))
            .collect();
        self.push_section(&mut lines, Panel::Years, "Year", years);

        let accounts = self
            .options
            .accounts
            .iter()
            .map(|a| (a.clone(), self.selection.accounts.contains(a)))
            .collect();
        self.push_section(&mut lines, Panel::Accounts, "Account Codes", accounts);

        let months = self
            .options
            .months
            .iter()
            .map(|m| (month_label(*m).to_string(), self.selection.months.contains(m)))
            .collect();
        self.push_section(&mut lines, Panel::Months, "Months", months);

        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_kpis(&self, frame: &mut Frame, area: Rect) {
        let kpi = KpiView::new(&self.analysis.summary);
        let [a, b, c] = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);
        let total_span = money_span(self.analysis.summary.total);
        let avg_span = match self.analysis.summary.average {
            Some(avg) => money_span(avg),
            None => Span::styled(kpi.average.clone(), FOOTER_STYLE),
        };
        for (rect, title, value) in [
            (a, "Total Transactions", Span::raw(kpi.count.clone())),
            (b, "Total Amount", total_span),
            (c, "Avg per Transaction", avg_span),
        ] {
            let lines = vec![
                Line::from(Span::styled(format!(" {title}"), FOOTER_STYLE)),
                Line::from(vec![Span::raw(" "), value]),
            ];
            frame.render_widget(Paragraph::new(lines), rect);
        }
    }

    fn draw_pivot(&self, frame: &mut Frame, area: Rect) {
        let view = PivotView::new(&self.analysis);
        let block = Block::default()
            .title(format!(" Pivot Table for {}", self.selection.year))
            .title_style(TITLE_STYLE)
            .borders(Borders::NONE);

        if view.rows.is_empty() {
            frame.render_widget(
                Paragraph::new(" No transactions match the current filters.")
                    .style(FOOTER_STYLE)
                    .block(block),
                area,
            );
            return;
        }

        let header = Row::new(
            view.header
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let line = Line::from(h.clone());
                    Cell::from(if i == 0 { line } else { line.right_aligned() })
                })
                .collect::<Vec<_>>(),
        )
        .style(TITLE_STYLE);

        let rows: Vec<Row> = self
            .analysis
            .pivot
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![Cell::from(r.account_code.clone())];
                cells.extend(r.cells.iter().map(|v| Cell::from(amount_line(*v))));
                cells.push(Cell::from(amount_line(r.total).style(TITLE_STYLE)));
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Length(14)];
        widths.extend(std::iter::repeat(Constraint::Length(12)).take(view.header.len() - 1));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(block);
        frame.render_widget(table, area);
    }

    fn draw_charts(&self, frame: &mut Frame, area: Rect) {
        let charts = ChartData::new(&self.analysis);
        let [left, right] = Layout::horizontal([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .areas(area);

        let bars: Vec<Bar> = charts
            .monthly
            .iter()
            .map(|(label, total)| {
                let style = if *total < 0.0 { AMOUNT_NEG_STYLE } else { AMOUNT_POS_STYLE };
                Bar::default()
                    .value(total.abs().round() as u64)
                    .text_value(compact(*total))
                    .label(Line::from(*label))
                    .style(style)
            })
            .collect();
        let block = Block::default()
            .title(" Monthly Total Amount")
            .title_style(TITLE_STYLE)
            .borders(Borders::NONE);
        let chart = BarChart::default()
            .block(block)
            .bar_width(5)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, left);

        let name_width = charts
            .accounts
            .iter()
            .map(|a| a.account_code.len())
            .max()
            .unwrap_or(8);
        let bar_room = (right.width as usize).saturating_sub(name_width + 12).max(1);
        let mut lines = vec![Line::from(Span::styled(
            " Amount Distribution by Account Code",
            TITLE_STYLE,
        ))];
        for share in &charts.accounts {
            let filled = ((share.pct / 100.0) * bar_room as f64).round() as usize;
            let style = if share.amount < 0.0 { AMOUNT_NEG_STYLE } else { AMOUNT_POS_STYLE };
            lines.push(Line::from(vec![
                Span::raw(format!(" {:<width$} {:>5.1}% ", share.account_code, share.pct, width = name_width)),
                Span::styled("\u{2588}".repeat(filled.min(bar_room)), style),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), right);
    }
}

fn amount_line(v: f64) -> Line<'static> {
    let style = if v < 0.0 { AMOUNT_NEG_STYLE } else { Style::default() };
    Line::from(Span::styled(amount(v), style)).right_aligned()
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep_area, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" Transaction Analyzer \u{00b7} {}", self.source)).style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        let [sidebar_area, main_area] = Layout::horizontal([
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .areas(body_area);
        self.draw_sidebar(frame, sidebar_area);

        let [kpi_area, pivot_area, chart_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(CHART_HEIGHT),
        ])
        .areas(main_area);
        self.draw_kpis(frame, kpi_area);
        self.draw_pivot(frame, pivot_area);
        self.draw_charts(frame, chart_area);

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                hints_area,
            );
        } else {
            frame.render_widget(
                Paragraph::new(
                    " Tab=panel  Up/Down=move  Space=toggle  a/n=all/none  e=export xlsx  c=export csv  q=quit",
                )
                .style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Tab | KeyCode::Right => self.panel = self.panel.next(),
            KeyCode::BackTab | KeyCode::Left => self.panel = self.panel.prev(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(),
            KeyCode::Char('a') => self.set_all(true),
            KeyCode::Char('n') => self.set_all(false),
            KeyCode::Char('e') => self.export(ExportFormat::Xlsx),
            KeyCode::Char('c') => self.export(ExportFormat::Csv),
            _ => {}
        }
        ViewAction::Continue
    }
}

pub fn run(records: Vec<Transaction>, source: &Path, export_dir: PathBuf) -> Result<()> {
    match Dashboard::new(records, display_name(source), export_dir) {
        Some(mut dashboard) => run_view(&mut dashboard),
        None => {
            println!("No transactions found in {}.", source.display());
            Ok(())
        }
    }
}
