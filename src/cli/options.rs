use colored::Colorize;

use crate::cli::{display_name, SourceArgs};
use crate::error::{AnalyzerError, Result};
use crate::filter::FilterOptions;
use crate::models::month_label;

pub fn run(source: &SourceArgs, year: Option<i32>) -> Result<()> {
    let records = source.load()?;
    let options = FilterOptions::from_records(&records, year).ok_or_else(|| match year {
        Some(y) => AnalyzerError::Selection(format!("no transactions in {y}")),
        None => AnalyzerError::Selection("no complete transactions in the input".to_string()),
    })?;

    let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    let months: Vec<&str> = options.months.iter().map(|m| month_label(*m)).collect();

    println!("{}", display_name(&source.file).bold());
    println!("Years:          {}", years.join(", "));
    println!("Selected year:  {}", options.year);
    println!("Account codes:  {}", options.accounts.join(", "));
    println!("Months:         {}", months.join(", "));
    Ok(())
}
