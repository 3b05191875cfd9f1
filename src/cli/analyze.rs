use tracing::warn;

use crate::cli::{resolve_selection, FilterArgs, SourceArgs};
use crate::error::Result;
use crate::pipeline::analyze;
use crate::present::{render_json, render_text, Capabilities};

pub fn run(source: &SourceArgs, filters: &FilterArgs, json: bool, no_charts: bool) -> Result<()> {
    let records = source.load()?;
    let selection = resolve_selection(&records, filters)?;
    let analysis = analyze(&records, &selection);

    if json {
        println!("{}", render_json(&analysis)?);
        return Ok(());
    }

    let caps = Capabilities::detect(no_charts);
    if !caps.charts {
        warn!("charts disabled, falling back to diagnostics");
    }
    println!("{}", render_text(&analysis, &caps));
    Ok(())
}
