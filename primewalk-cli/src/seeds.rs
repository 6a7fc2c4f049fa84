use std::io;
use std::path::Path;

use anyhow::{bail, Context};
use log::warn;

/// Parses one integer per line. Blank lines and `#` comments are skipped.
pub fn parse_seeds(text: &str) -> anyhow::Result<Vec<i64>> {
    let mut values = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<i64>() {
            Ok(v) => values.push(v),
            Err(e) => bail!("line {}: invalid integer `{line}`: {e}", lineno + 1),
        }
    }
    Ok(values)
}

/// Reads a seed file; a missing file yields an empty list.
pub fn load_seed_file(path: &Path) -> anyhow::Result<Vec<i64>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("seed file {} not found, skipping", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("reading seed file {}", path.display())),
    };
    parse_seeds(&text).with_context(|| format!("parsing seed file {}", path.display()))
}
