use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

/// Print the current settings, or update them when any flag is given.
pub fn run(sheet: Option<String>, export_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let changed = sheet.is_some() || export_dir.is_some();
    if let Some(sheet) = sheet {
        settings.sheet_name = sheet;
    }
    if let Some(dir) = export_dir {
        settings.export_dir = shellexpand_path(&dir);
    }
    if changed {
        save_settings(&settings)?;
        println!("Saved {}", settings_path().display());
    }

    println!("Sheet name:  {}", settings.sheet_name);
    println!("Export dir:  {}", settings.export_dir);
    Ok(())
}
