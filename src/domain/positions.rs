//! Reconstruction of render coordinates from the layout tree.
//!
//! The inverse of conversion: a depth-first walk from the root accumulates
//! row/column offsets and emits a flat chart-id -> position map for a
//! CSS-grid-like rendering surface. Container aggregates are recomputed on
//! the way back up, so the walk doubles as a consistency check on the
//! cached Row/Column metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LayoutError;
use crate::model::{ChartId, LayoutNode, LayoutTree, NodeType, ROOT_ID};

/// Render coordinates for one chart, in layout cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPosition {
    pub row: i64,
    pub col: i64,
    #[serde(rename = "rowSpan")]
    pub row_span: i64,
    #[serde(rename = "colSpan")]
    pub col_span: i64,
}

/// Converts a converted height into grid rows.
///
/// The legacy grid renders two height units per row, shifted by one when
/// the height is even. The formula must be preserved exactly for
/// round-trip fidelity with persisted layouts.
pub fn half_height(height: i64) -> i64 {
    if height % 2 == 0 {
        height / 2 + 1
    } else {
        (height + 1) / 2
    }
}

/// Walks the tree from the root and emits positions for every chart leaf.
///
/// An empty tree yields an empty map; a tree with nodes but no root is a
/// structural error, as is a chart leaf without a chart id or a cached
/// Row/Column aggregate that disagrees with its children.
pub fn convert_to_positions(
    tree: &LayoutTree,
) -> Result<BTreeMap<ChartId, ChartPosition>, LayoutError> {
    let mut positions = BTreeMap::new();
    if tree.is_empty() {
        return Ok(positions);
    }
    let root = tree
        .get(ROOT_ID)
        .ok_or_else(|| LayoutError::Structure(format!("missing root node {ROOT_ID}")))?;
    walk(tree, root, 1, 1, &mut positions)?;
    Ok(positions)
}

/// Visits `node` at the accumulated offset and returns its effective
/// (width, height), recomputed bottom-up for Row/Column containers.
fn walk(
    tree: &LayoutTree,
    node: &LayoutNode,
    row: i64,
    col: i64,
    positions: &mut BTreeMap<ChartId, ChartPosition>,
) -> Result<(i64, i64), LayoutError> {
    if node.children.is_empty() {
        if node.node_type == NodeType::Chart {
            let chart_id = node.meta.chart_id.ok_or_else(|| {
                LayoutError::Structure(format!("chart node {} has no chartId", node.id))
            })?;
            positions.insert(
                chart_id,
                ChartPosition {
                    row,
                    col,
                    row_span: half_height(node.meta.height),
                    col_span: node.meta.width,
                },
            );
        }
        return Ok((node.meta.width, node.meta.height));
    }

    let mut row = row;
    let mut col = col;
    let mut prev: Option<(i64, i64)> = None;
    let mut width_sum = 0;
    let mut width_max = 0;
    let mut height_sum = 0;
    let mut height_max = 0;

    for child_id in &node.children {
        let child = tree.get(child_id).ok_or_else(|| LayoutError::DanglingChild {
            parent: node.id.clone(),
            child: child_id.clone(),
        })?;

        if let Some((prev_width, prev_height)) = prev {
            match node.node_type {
                // Row children advance across; vertical stacks advance down.
                NodeType::Row => col += prev_width,
                NodeType::Column | NodeType::Root | NodeType::Grid => {
                    row += half_height(prev_height);
                }
                // Tab pages each restart at the parent offset.
                _ => {}
            }
        }

        let (child_width, child_height) = walk(tree, child, row, col, positions)?;
        prev = Some((child_width, child_height));
        width_sum += child_width;
        width_max = width_max.max(child_width);
        height_sum += child_height;
        height_max = height_max.max(child_height);
    }

    let dims = match node.node_type {
        NodeType::Row => (width_sum, height_max),
        NodeType::Column => (width_max, height_sum),
        _ => return Ok((node.meta.width, node.meta.height)),
    };
    if (node.meta.width, node.meta.height) != dims {
        return Err(LayoutError::AggregateMismatch {
            id: node.id.clone(),
            stored_width: node.meta.width,
            stored_height: node.meta.height,
            width: dims.0,
            height: dims.1,
        });
    }
    Ok(dims)
}
