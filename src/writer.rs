//! Output of persisted dashboard formats.
//!
//! Trees and position maps are written as pretty-printed JSON with a
//! trailing newline, stable across runs: the tree serializes in insertion
//! order and positions sort by chart id.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::positions::ChartPosition;
use crate::error::LayoutError;
use crate::model::{ChartId, LayoutTree};

/// Serializes a layout tree to its persisted JSON form.
pub fn layout_to_json(tree: &LayoutTree) -> Result<String, LayoutError> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Serializes a positions map to JSON.
pub fn positions_to_json(
    positions: &BTreeMap<ChartId, ChartPosition>,
) -> Result<String, LayoutError> {
    Ok(serde_json::to_string_pretty(positions)?)
}

/// Writes a layout tree to a file.
pub fn save_layout(path: impl AsRef<Path>, tree: &LayoutTree) -> Result<()> {
    write_json(path.as_ref(), tree)
}

/// Writes a positions map to a file.
pub fn save_positions(
    path: impl AsRef<Path>,
    positions: &BTreeMap<ChartId, ChartPosition>,
) -> Result<()> {
    write_json(path.as_ref(), positions)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to serialize to {}", path.display()))?;
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush writer")?;
    Ok(())
}
