//! File Utility Functions

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Returns regular expression for extracting the file extension. This will
/// match the last occurrence of a period followed by no periods or slashes.
fn regex_file_ext() -> &'static Regex {
    static DATA: OnceLock<Regex> = OnceLock::new();
    DATA.get_or_init(|| Regex::new(r"\.([^./\\]+)$").expect("valid extension regex"))
}

/// Retrieve the lowercase extension (without the period) from a file path.
///
/// * `path` - The file path.
pub fn get_extension_from_filename(path: &str) -> Option<String> {
    regex_file_ext()
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Resolves `path` against the directory containing `relative_to` unless it is
/// already absolute.
///
/// * `path`        - Path to resolve.
/// * `relative_to` - A file whose directory is the base.
pub fn resolve_sibling(path: &str, relative_to: &Path) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() {
        return p;
    }
    match relative_to.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(p),
        _ => p,
    }
}

/// Returns the trimmed data lines of a text table with their 1-based line
/// numbers, skipping blank and `#` lines.
///
/// * `text` - The table contents.
pub fn data_lines(text: &str) -> Vec<(usize, String)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(i, line)| (i, line.to_string()))
        .collect()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
