pub mod analyze;
pub mod config;
#[cfg(feature = "tui")]
pub mod dashboard;
pub mod deps;
pub mod export;
pub mod options;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::error::{AnalyzerError, Result};
use crate::export::ExportFormat;
use crate::filter::Selection;
use crate::loader::load_path;
use crate::models::Transaction;
use crate::present::Capabilities;
#[cfg(feature = "tui")]
use crate::settings::shellexpand_path;
use crate::settings::load_settings;

#[derive(Parser)]
#[command(
    name = "txn-analyzer",
    version,
    about = "Filter spreadsheet transactions by year, account and month, then pivot, chart and export them."
)]
pub struct Cli {
    /// Log level written to stderr: error, warn, info, debug, trace
    #[arg(long = "log-level", global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input file and worksheet shared by every command that reads transactions.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Spreadsheet (xlsx, xls, ods) or CSV file with transactions
    pub file: PathBuf,
    /// Worksheet to read (default: from settings, else Sheet1)
    #[arg(long)]
    pub sheet: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Year to analyze (default: most recent in the data)
    #[arg(long)]
    pub year: Option<i32>,
    /// Account code to include; repeat for several (default: all)
    #[arg(long = "account")]
    pub accounts: Vec<String>,
    /// Month to include as Jan, January or 1; repeat for several (default: all)
    #[arg(long = "month")]
    pub months: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print KPIs, the pivot table and charts for a selection.
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filters: FilterArgs,
        /// Emit the analysis as JSON
        #[arg(long)]
        json: bool,
        /// Skip charts and show environment diagnostics instead
        #[arg(long = "no-charts")]
        no_charts: bool,
    },
    /// List the years, account codes and months available for filtering.
    Options {
        #[command(flatten)]
        source: SourceArgs,
        /// Year whose account codes and months to list
        #[arg(long)]
        year: Option<i32>,
    },
    /// Export the pivot table for a selection.
    Export {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filters: FilterArgs,
        /// Output format
        #[arg(long, value_enum, default_value = "xlsx")]
        format: ExportFormat,
        /// Add the filtered rows as a second sheet (xlsx only)
        #[arg(long = "include-data")]
        include_data: bool,
        /// Output path (default: <export_dir>/pivot_<year>.<ext>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Interactive dashboard.
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the runtime dependencies this build declares.
    Deps {
        /// Write the list to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show or update settings.
    Config {
        /// Default worksheet name
        #[arg(long)]
        sheet: Option<String>,
        /// Default export directory
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
}

impl SourceArgs {
    /// The `--sheet` flag wins over the configured sheet name.
    pub fn sheet_name(&self) -> String {
        self.sheet
            .clone()
            .unwrap_or_else(|| load_settings().sheet_name)
    }

    pub fn load(&self) -> Result<Vec<Transaction>> {
        load_path(&self.file, &self.sheet_name())
    }
}

/// Build the selection for a run: defaults for the year, narrowed by any
/// accounts or months given on the command line.
pub(crate) fn resolve_selection(records: &[Transaction], filters: &FilterArgs) -> Result<Selection> {
    if records.is_empty() {
        return Err(AnalyzerError::Selection(
            "no complete transactions in the input".to_string(),
        ));
    }
    let selection = Selection::default_for(records, filters.year).ok_or_else(|| {
        AnalyzerError::Selection(format!(
            "no transactions in {}",
            filters.year.map(|y| y.to_string()).unwrap_or_default()
        ))
    })?;
    selection.with_overrides(&filters.accounts, &filters.months)
}

/// Open the interactive dashboard when stdout is a terminal and the build has
/// it; otherwise print the text report for the default selection.
pub fn run_dashboard(source: &SourceArgs) -> Result<()> {
    let caps = Capabilities::detect(false);
    #[cfg(feature = "tui")]
    if caps.interactive {
        let records = source.load()?;
        let export_dir = PathBuf::from(shellexpand_path(&load_settings().export_dir));
        return dashboard::run(records, &source.file, export_dir);
    }
    info!(interactive = caps.interactive, "dashboard unavailable, printing report");
    analyze::run(source, &FilterArgs::default(), false, false)
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::txn;

    fn rows() -> Vec<Transaction> {
        vec![
            txn("2024-01-05", "A100", 50.0),
            txn("2024-02-10", "A100", 30.0),
            txn("2023-03-01", "B200", 20.0),
        ]
    }

    #[test]
    fn test_resolve_defaults_to_latest_year() {
        let sel = resolve_selection(&rows(), &FilterArgs::default()).unwrap();
        assert_eq!(sel.year, 2024);
        assert_eq!(sel.months.len(), 2);
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let filters = FilterArgs {
            year: Some(2024),
            accounts: vec!["A100".to_string()],
            months: vec!["feb".to_string()],
        };
        let sel = resolve_selection(&rows(), &filters).unwrap();
        assert_eq!(sel.months.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_resolve_unknown_year() {
        let filters = FilterArgs {
            year: Some(1999),
            ..Default::default()
        };
        let err = resolve_selection(&rows(), &filters).unwrap_err();
        assert!(err.to_string().contains("no transactions in 1999"));
    }

    #[test]
    fn test_resolve_empty_input() {
        assert!(matches!(
            resolve_selection(&[], &FilterArgs::default()),
            Err(AnalyzerError::Selection(_))
        ));
    }

    #[test]
    fn test_cli_parses_repeated_filters() {
        let cli = Cli::try_parse_from([
            "txn-analyzer", "analyze", "data.xlsx", "--account", "A100", "--account", "B200",
            "--month", "Jan", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Analyze { source, filters, json, .. } => {
                assert_eq!(source.file, PathBuf::from("data.xlsx"));
                assert_eq!(filters.accounts, vec!["A100", "B200"]);
                assert_eq!(filters.months, vec!["Jan"]);
                assert!(!json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_cli_export_format_value_enum() {
        let cli = Cli::try_parse_from(["txn-analyzer", "export", "d.csv", "--format", "csv"]).unwrap();
        assert!(matches!(cli.command, Commands::Export { format: ExportFormat::Csv, .. }));
    }
}
