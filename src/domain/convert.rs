//! Legacy grid partitioning and layout tree construction.
//!
//! Converts a flat set of absolute-positioned rectangles into the nested
//! Root -> Grid -> (row/column/chart...) hierarchy. The divider sweep that
//! cuts the grid into horizontal row bands and the one that cuts a band
//! into vertical column bands are the same routine parameterized by axis;
//! the recursion alternates axes to handle arbitrarily nested stacks.

use tracing::debug;

use crate::error::LayoutError;
use crate::model::{LayoutNode, LayoutTree, NodeType, BACKGROUND_TRANSPARENT, GRID_ID};
use crate::parser::Rectangle;

/// Legacy grid units per converted layout cell.
pub const GRID_RATIO: i64 = 4;

/// Fixed row height divisor applied to converted chart heights.
pub const ROW_HEIGHT: i64 = 16;

/// Synthetic id source for one conversion run.
///
/// The counter is owned by the conversion call, never process-global, so
/// repeated conversions of the same input produce identical trees and
/// concurrent conversions cannot collide.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Creates a generator seeded at 1.
    pub fn new() -> Self {
        IdGenerator { next: 1 }
    }

    /// Produces the next id, e.g. `ROW-3`. The counter is shared across
    /// all node types within one run.
    pub fn next_id(&mut self, node_type: NodeType) -> String {
        let id = format!("{}-{}", node_type.as_str(), self.next);
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sweep axis: `Rows` cuts horizontal bands, `Cols` cuts vertical bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Rows,
    Cols,
}

impl Axis {
    fn start(self, rect: &Rectangle) -> i64 {
        match self {
            Axis::Rows => rect.row,
            Axis::Cols => rect.col,
        }
    }

    fn extent(self, rect: &Rectangle) -> i64 {
        match self {
            Axis::Rows => rect.size_y,
            Axis::Cols => rect.size_x,
        }
    }

    fn flip(self) -> Axis {
        match self {
            Axis::Rows => Axis::Cols,
            Axis::Cols => Axis::Rows,
        }
    }

    /// Container type produced for bands cut along this axis.
    fn container(self) -> NodeType {
        match self {
            Axis::Rows => NodeType::Row,
            Axis::Cols => NodeType::Column,
        }
    }
}

/// Converts a legacy positions set into a validated layout tree.
///
/// Every rectangle is validated up front; nothing is partitioned on bad
/// input. An empty input yields the bare Root -> Grid skeleton.
pub fn convert_to_layout(positions: &[Rectangle]) -> Result<LayoutTree, LayoutError> {
    for rect in positions {
        rect.validate()?;
    }
    let mut tree = LayoutTree::with_skeleton();
    let mut ids = IdGenerator::new();
    partition(positions, GRID_ID, &mut tree, &mut ids)?;
    debug!(
        charts = positions.len(),
        nodes = tree.len(),
        "converted legacy grid to layout tree"
    );
    Ok(tree)
}

/// Partitions `rects` into containers under `parent_id`.
fn partition(
    rects: &[Rectangle],
    parent_id: &str,
    tree: &mut LayoutTree,
    ids: &mut IdGenerator,
) -> Result<(), LayoutError> {
    if rects.is_empty() {
        return Ok(());
    }

    if rects.len() == 1 {
        // Lone-chart dashboards always get a wrapping row under the grid.
        let mut parent_id = parent_id.to_string();
        if tree.get(&parent_id).map(|n| n.node_type) == Some(NodeType::Grid) {
            let row = container_node(NodeType::Row, ids);
            let row_id = row.id.clone();
            tree.insert(row);
            tree.push_child(&parent_id, &row_id)?;
            parent_id = row_id;
        }
        let chart = chart_node(&rects[0], ids)?;
        let chart_node_id = chart.id.clone();
        tree.insert(chart);
        tree.push_child(&parent_id, &chart_node_id)?;
        tree.refresh_meta(&parent_id)?;
        return Ok(());
    }

    split_into_bands(rects, Axis::Rows, parent_id, tree, ids, false)
}

/// Cuts `rects` into bands along `axis`, emitting one container per band.
///
/// A band whose members do not overlap along the cross axis is emitted as
/// a flat chart list ordered by cross-axis coordinate; otherwise the band
/// is recursively cut along the cross axis inside its container. `stalled`
/// records that the previous (cross-axis) sweep failed to split its input;
/// two stalled sweeps in a row mean neither axis can separate the set and
/// the overlap is irreducible.
fn split_into_bands(
    rects: &[Rectangle],
    axis: Axis,
    parent_id: &str,
    tree: &mut LayoutTree,
    ids: &mut IdGenerator,
    stalled: bool,
) -> Result<(), LayoutError> {
    let bands = sweep_bands(rects, axis);
    let no_split = bands.len() == 1 && bands[0].len() == rects.len();
    if no_split && stalled {
        return Err(LayoutError::IrreducibleOverlap {
            remaining: rects.len(),
        });
    }
    let cross = axis.flip();

    for band in bands {
        let container = container_node(axis.container(), ids);
        let container_id = container.id.clone();
        tree.insert(container);
        tree.push_child(parent_id, &container_id)?;

        if !has_overlap(&band, cross) {
            let mut sorted = band;
            sorted.sort_by_key(|r| cross.start(r));
            for rect in &sorted {
                let chart = chart_node(rect, ids)?;
                let chart_node_id = chart.id.clone();
                tree.insert(chart);
                tree.push_child(&container_id, &chart_node_id)?;
            }
        } else {
            split_into_bands(&band, cross, &container_id, tree, ids, no_split)?;
        }

        tree.refresh_meta(&container_id)?;
    }
    Ok(())
}

/// Sweeps a divider line along `axis`, splitting `rects` into clean bands.
///
/// A coordinate is accepted as a divider only when every remaining
/// rectangle classifies as fully before the line or fully after it (no
/// straddlers). Divider positions that separate nothing (gutters between
/// bands) are skipped rather than materialized as empty containers. The
/// far edge of the bounding box always closes the final band, so the
/// sweep cannot lose rectangles; input that no divider can cut simply
/// comes back as one band, and irreducibility is detected by the caller
/// when neither axis makes progress.
fn sweep_bands(rects: &[Rectangle], axis: Axis) -> Vec<Vec<Rectangle>> {
    let lo = rects.iter().map(|r| axis.start(r)).min().unwrap_or(0);
    let hi = rects
        .iter()
        .map(|r| axis.start(r) + axis.extent(r))
        .max()
        .unwrap_or(0);

    let mut current: Vec<Rectangle> = rects.to_vec();
    let mut bands = Vec::new();
    let mut cursor = lo + 1;

    while !current.is_empty() && cursor <= hi {
        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut clean = true;

        for rect in &current {
            let start = axis.start(rect);
            if start + axis.extent(rect) <= cursor {
                before.push(rect.clone());
            } else if start >= cursor {
                after.push(rect.clone());
            } else {
                clean = false;
                break;
            }
        }

        if clean {
            if !before.is_empty() {
                bands.push(before);
            }
            current = after;
        }
        cursor += 1;
    }

    bands
}

/// True when any two rectangles overlap along `axis`.
fn has_overlap(rects: &[Rectangle], axis: Axis) -> bool {
    let mut sorted: Vec<&Rectangle> = rects.iter().collect();
    sorted.sort_by_key(|r| axis.start(r));
    sorted
        .windows(2)
        .any(|pair| axis.start(pair[0]) + axis.extent(pair[0]) > axis.start(pair[1]))
}

/// Rounds `a / b` half away from zero; inputs are non-negative here.
fn round_div(a: i64, b: i64) -> i64 {
    (a + b / 2) / b
}

fn container_node(node_type: NodeType, ids: &mut IdGenerator) -> LayoutNode {
    let mut node = LayoutNode::new(ids.next_id(node_type), node_type);
    node.meta.background = Some(BACKGROUND_TRANSPARENT.to_string());
    node
}

/// Converts one rectangle into a chart leaf, rescaling grid units by
/// [`GRID_RATIO`] and the height further by the [`ROW_HEIGHT`] convention.
fn chart_node(rect: &Rectangle, ids: &mut IdGenerator) -> Result<LayoutNode, LayoutError> {
    let chart_id = rect.chart_id()?;
    let size_x = (rect.size_x / GRID_RATIO).max(1);
    let size_y = round_div(rect.size_y, GRID_RATIO).max(1);

    let mut node = LayoutNode::new(ids.next_id(NodeType::Chart), NodeType::Chart);
    node.meta.width = size_x;
    node.meta.height = round_div(size_y * 100, ROW_HEIGHT);
    node.meta.chart_id = Some(chart_id);
    Ok(node)
}
