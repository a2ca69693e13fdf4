//! Minimal dotenv file editing.

use anyhow::{Context, Result};
use std::path::Path;

/// Set `key` to `value` in the dotenv file at `path`.
///
/// Every line starting with `KEY=` is rewritten as `KEY="value"`; every
/// other line is kept as is. The assignment is appended when absent, and the
/// file is created if it does not exist.
pub fn upsert(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let assignment = format!("{key}=\"{value}\"");
    let prefix = format!("{key}=");
    let mut found = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if line.trim_start().starts_with(&prefix) {
                found = true;
                assignment.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !found {
        lines.push(assignment);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read `key` back through the dotenv parser.
pub fn read(path: &Path, key: &str) -> Result<Option<String>> {
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    for entry in entries {
        let (k, v) = entry.with_context(|| format!("Failed to parse {}", path.display()))?;
        if k == key {
            return Ok(Some(v).filter(|v| !v.is_empty()));
        }
    }
    Ok(None)
}
