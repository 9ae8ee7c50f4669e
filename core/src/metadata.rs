//! Image metadata sidecar

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Key/value metadata describing a rendered image. Each value carries a
/// comment, which may span several lines.
#[derive(Clone, Debug, Default)]
pub struct Metadata {
    entries: BTreeMap<String, (String, String)>,
}

impl Metadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    ///
    /// * `key`     - Dotted key, e.g. `image.utc`.
    /// * `comment` - Description of the value.
    /// * `value`   - The value.
    pub fn add(&mut self, key: &str, comment: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), (comment.to_string(), value.into()));
    }

    /// Returns the value of an entry.
    ///
    /// * `key` - The key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|(_, value)| value.as_str())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the metadata file.
    ///
    /// * `path`      - Output file path.
    /// * `program`   - Name and version of the creating program.
    /// * `arguments` - The command line.
    pub fn write<P: AsRef<Path>>(&self, path: P, program: &str, arguments: &str) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out, program, arguments)?;
        out.flush()?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Writes the metadata to a stream. Entries are sorted by key with a
    /// blank line between groups sharing the same prefix.
    ///
    /// * `out`       - Destination.
    /// * `program`   - Name and version of the creating program.
    /// * `arguments` - The command line.
    pub fn write_to<W: Write>(&self, out: &mut W, program: &str, arguments: &str) -> Result<()> {
        writeln!(out, "# Created by {program}")?;
        writeln!(out, "# arguments: {arguments}\n")?;

        let mut last_section: Option<&str> = None;
        for (key, (comment, value)) in &self.entries {
            let section = key.split('.').next().unwrap_or(key);
            if last_section.is_some_and(|s| s != section) {
                writeln!(out)?;
            }
            last_section = Some(section);

            for line in comment.lines().map(str::trim).filter(|l| !l.is_empty()) {
                writeln!(out, "# {line}")?;
            }
            writeln!(out, "{key} = {value}")?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
