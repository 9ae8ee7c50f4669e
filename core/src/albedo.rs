//! Per-element albedo overrides

use crate::common::Float;
use crate::error::{Error, Result};
use crate::fileutil::data_lines;
use crate::surface::ElementId;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Albedo multipliers keyed by element id. Elements that are absent have a
/// multiplier of 1.
#[derive(Clone, Debug, Default)]
pub struct AlbedoOverride {
    values: HashMap<ElementId, Float>,
}

impl AlbedoOverride {
    /// Loads an albedo table from a CSV file of `id, value` lines. Columns
    /// past the second are ignored.
    ///
    /// * `path` - The file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let albedo = Self::parse(&text, path)?;
        info!("Read {} albedo values from {}", albedo.len(), path.display());
        Ok(albedo)
    }

    /// Parses an albedo table.
    ///
    /// * `text` - Table contents.
    /// * `path` - Used in error messages.
    pub fn parse<P: AsRef<Path>>(text: &str, path: P) -> Result<Self> {
        let mut values = HashMap::new();
        for (line_no, line) in data_lines(text) {
            let mut fields = line.split(',').map(str::trim);
            let id = fields
                .next()
                .and_then(|s| s.parse::<ElementId>().ok())
                .ok_or_else(|| Error::parse(&path, line_no, "expected a non-negative element id"))?;
            let value = fields
                .next()
                .and_then(|s| s.parse::<Float>().ok())
                .ok_or_else(|| Error::parse(&path, line_no, "expected an albedo value"))?;
            if !(value >= 0.0) {
                return Err(Error::parse(&path, line_no, format!("albedo {value} is negative")));
            }
            values.insert(id, value);
        }
        Ok(Self { values })
    }

    /// Sets the multiplier for an element.
    ///
    /// * `element` - The element.
    /// * `value`   - The multiplier.
    pub fn insert(&mut self, element: ElementId, value: Float) {
        self.values.insert(element, value);
    }

    /// Returns the multiplier for an element.
    ///
    /// * `element` - The element.
    pub fn get(&self, element: ElementId) -> Float {
        self.values.get(&element).copied().unwrap_or(1.0)
    }

    /// Returns the number of overridden elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no element is overridden.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
