use crate::error::{AnalyzerError, Result};

const MANIFEST: &str = include_str!("../Cargo.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub name: String,
    pub requirement: String,
    pub optional: bool,
}

fn parse_manifest(manifest: &str) -> Result<Vec<Dependency>> {
    let table: toml::Table = manifest
        .parse()
        .map_err(|e| AnalyzerError::Format(format!("invalid manifest: {e}")))?;
    let Some(deps) = table.get("dependencies").and_then(|d| d.as_table()) else {
        return Ok(Vec::new());
    };
    Ok(deps
        .iter()
        .map(|(name, spec)| {
            let (requirement, optional) = match spec {
                toml::Value::String(v) => (v.clone(), false),
                toml::Value::Table(t) => (
                    t.get("version").and_then(|v| v.as_str()).unwrap_or("*").to_string(),
                    t.get("optional").and_then(|v| v.as_bool()).unwrap_or(false),
                ),
                _ => ("*".to_string(), false),
            };
            Dependency {
                name: name.clone(),
                requirement,
                optional,
            }
        })
        .collect())
}

/// Runtime dependencies declared in this crate's manifest.
pub fn declared_dependencies() -> Result<Vec<Dependency>> {
    parse_manifest(MANIFEST)
}

/// One dependency per line: `name requirement`, optional ones marked.
pub fn format_dependencies(deps: &[Dependency]) -> String {
    deps.iter()
        .map(|d| {
            let marker = if d.optional { " (optional)" } else { "" };
            format!("{} {}{marker}\n", d.name, d.requirement)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = r#"
[package]
name = "x"

[dependencies]
csv = "1"
ratatui = { version = "0.29", optional = true }
local = { path = "../local" }

[dev-dependencies]
tempfile = "3"
"#;
        let deps = parse_manifest(manifest).unwrap();
        assert_eq!(deps.len(), 3);
        let ratatui = deps.iter().find(|d| d.name == "ratatui").unwrap();
        assert_eq!(ratatui.requirement, "0.29");
        assert!(ratatui.optional);
        assert_eq!(deps.iter().find(|d| d.name == "local").unwrap().requirement, "*");
        assert!(!deps.iter().any(|d| d.name == "tempfile"));
    }

    #[test]
    fn test_declared_dependencies_include_core_crates() {
        let deps = declared_dependencies().unwrap();
        for name in ["calamine", "csv", "comfy-table", "tracing"] {
            assert!(deps.iter().any(|d| d.name == name), "missing {name}");
        }
        let text = format_dependencies(&deps);
        assert!(text.lines().count() == deps.len());
    }
}
