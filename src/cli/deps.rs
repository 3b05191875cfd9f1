use std::path::PathBuf;

use crate::deps::{declared_dependencies, format_dependencies};
use crate::error::Result;

pub fn run(output: Option<PathBuf>) -> Result<()> {
    let text = format_dependencies(&declared_dependencies()?);
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &text)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
