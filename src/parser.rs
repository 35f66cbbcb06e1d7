//! Parsing of persisted dashboard formats.
//!
//! Two wire formats come through here:
//! - the legacy absolute-position grid: an ordered JSON array of
//!   `{col, row, size_x, size_y, slice_id}` objects, bit-exact as stored
//!   by old dashboards (extra legacy markers such as `"v"` are ignored);
//! - the flat layout tree: a JSON object keyed by node id, the persisted
//!   format consumed by the rendering and drag/drop collaborators.
//!
//! Parsing is fail-fast: malformed rectangles and structurally invalid
//! trees are rejected before any conversion is attempted.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::LayoutError;
use crate::model::{ChartId, LayoutTree};

/// One chart footprint on the legacy fixed-width grid.
///
/// `row`/`col` are 1-based grid-unit coordinates (row 0 is accepted, the
/// legacy store used it for the top band); `size_x`/`size_y` are extents
/// in the same units. Field names match the persisted format exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub row: i64,
    pub col: i64,
    pub size_x: i64,
    pub size_y: i64,
    pub slice_id: String,
}

impl Rectangle {
    /// Validates field ranges and the numeric slice id.
    ///
    /// Violations fail with [`LayoutError::InvalidRectangle`]; no partial
    /// partitioning is attempted on bad input.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let fail = |reason: &str| {
            Err(LayoutError::InvalidRectangle {
                slice_id: self.slice_id.clone(),
                reason: reason.to_string(),
            })
        };
        if self.size_x < 1 {
            return fail("size_x must be at least 1");
        }
        if self.size_y < 1 {
            return fail("size_y must be at least 1");
        }
        if self.row < 0 {
            return fail("row must not be negative");
        }
        if self.col < 1 {
            return fail("col must be at least 1");
        }
        self.chart_id().map(|_| ())
    }

    /// Numeric chart identity parsed from the stored slice id.
    pub fn chart_id(&self) -> Result<ChartId, LayoutError> {
        match self.slice_id.parse::<ChartId>() {
            Ok(id) if id >= 0 => Ok(id),
            _ => Err(LayoutError::InvalidRectangle {
                slice_id: self.slice_id.clone(),
                reason: "slice_id must be a non-negative integer".to_string(),
            }),
        }
    }
}

/// Parses a legacy positions array and validates every rectangle.
pub fn parse_positions(json: &str) -> Result<Vec<Rectangle>, LayoutError> {
    let rects: Vec<Rectangle> = serde_json::from_str(json)?;
    for rect in &rects {
        rect.validate()?;
    }
    Ok(rects)
}

/// Parses a flat layout tree and checks its structural invariants.
pub fn parse_layout(json: &str) -> Result<LayoutTree, LayoutError> {
    let tree: LayoutTree = serde_json::from_str(json)?;
    tree.validate()?;
    Ok(tree)
}

/// Reads and parses a legacy positions file.
pub fn load_positions(path: impl AsRef<Path>) -> anyhow::Result<Vec<Rectangle>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read positions file: {}", path.display()))?;
    parse_positions(&json)
        .with_context(|| format!("Failed to parse positions file: {}", path.display()))
}

/// Reads and parses a persisted layout tree file.
pub fn load_layout(path: impl AsRef<Path>) -> anyhow::Result<LayoutTree> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
    parse_layout(&json).with_context(|| format!("Failed to parse layout file: {}", path.display()))
}
