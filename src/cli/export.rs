use std::path::PathBuf;

use crate::cli::{resolve_selection, FilterArgs, SourceArgs};
use crate::error::Result;
use crate::export::{default_file_name, export_to, ExportFormat};
use crate::pipeline::analyze;
use crate::settings::{load_settings, shellexpand_path};

fn default_path(year: i32, format: ExportFormat) -> PathBuf {
    let dir = shellexpand_path(&load_settings().export_dir);
    PathBuf::from(dir).join(default_file_name(year, format))
}

pub fn run(
    source: &SourceArgs,
    filters: &FilterArgs,
    format: ExportFormat,
    include_data: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let records = source.load()?;
    let selection = resolve_selection(&records, filters)?;
    let analysis = analyze(&records, &selection);

    let path = output.unwrap_or_else(|| default_path(selection.year, format));
    let written = export_to(&analysis, format, include_data, &path)?;
    println!(
        "Wrote {} ({} account(s), {} month(s))",
        written.display(),
        analysis.pivot.rows.len(),
        analysis.pivot.months.len()
    );
    Ok(())
}
