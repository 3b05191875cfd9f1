use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{AnalyzerError, Result};
use crate::loader::{COL_ACCOUNT, COL_AMOUNT, COL_DATE};
use crate::pipeline::Analysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

pub fn pivot_sheet_name(year: i32) -> String {
    format!("Pivot_{year}")
}

pub fn data_sheet_name(year: i32) -> String {
    format!("Data_{year}")
}

pub fn default_file_name(year: i32, format: ExportFormat) -> String {
    format!("pivot_{year}.{}", format.extension())
}

fn pivot_header(analysis: &Analysis) -> Vec<String> {
    let mut header = vec![COL_ACCOUNT.to_string()];
    header.extend(analysis.pivot.month_labels().into_iter().map(str::to_string));
    header.push("Total".to_string());
    header
}

/// Build an xlsx workbook holding the pivot table, and optionally the
/// filtered rows on a second sheet using the input column names.
pub fn write_xlsx(analysis: &Analysis, include_data: bool) -> Result<Vec<u8>> {
    let year = analysis.selection.year;
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(pivot_sheet_name(year))?;
    for (c, h) in pivot_header(analysis).iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, h, &bold)?;
    }
    for (r, row) in analysis.pivot.rows.iter().enumerate() {
        let r = r as u32 + 1;
        sheet.write_string(r, 0, &row.account_code)?;
        for (c, v) in row.cells.iter().enumerate() {
            sheet.write_number_with_format(r, c as u16 + 1, *v, &money)?;
        }
        sheet.write_number_with_format(r, row.cells.len() as u16 + 1, row.total, &money)?;
    }
    sheet.set_column_width(0, 16)?;

    if include_data {
        let data = workbook.add_worksheet();
        data.set_name(data_sheet_name(year))?;
        for (c, h) in [COL_DATE, COL_ACCOUNT, COL_AMOUNT, "Year", "Month"].iter().enumerate() {
            data.write_string_with_format(0, c as u16, *h, &bold)?;
        }
        for (r, t) in analysis.filtered.iter().enumerate() {
            let r = r as u32 + 1;
            data.write_string(r, 0, t.date.format("%Y-%m-%d %H:%M:%S").to_string())?;
            data.write_string(r, 1, &t.account_code)?;
            data.write_number_with_format(r, 2, t.amount, &money)?;
            data.write_number(r, 3, t.year as f64)?;
            data.write_string(r, 4, t.month_label())?;
        }
        data.set_column_width(0, 20)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// The pivot table as CSV, numbers with two decimals.
pub fn write_csv(analysis: &Analysis) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(pivot_header(analysis))?;
    for row in &analysis.pivot.rows {
        let mut record = vec![row.account_code.clone()];
        record.extend(row.cells.iter().map(|v| format!("{v:.2}")));
        record.push(format!("{:.2}", row.total));
        wtr.write_record(&record)?;
    }
    wtr.into_inner().map_err(|e| AnalyzerError::Io(e.into_error()))
}

pub fn render(analysis: &Analysis, format: ExportFormat, include_data: bool) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => write_xlsx(analysis, include_data),
        ExportFormat::Csv => {
            if include_data {
                return Err(AnalyzerError::Usage(
                    "--include-data needs the xlsx format".to_string(),
                ));
            }
            write_csv(analysis)
        }
    }
}

/// Render and write the export to `path`, creating parent directories.
pub fn export_to(analysis: &Analysis, format: ExportFormat, include_data: bool, path: &Path) -> Result<PathBuf> {
    let bytes = render(analysis, format, include_data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote export");
    Ok(path.to_path_buf())
}
