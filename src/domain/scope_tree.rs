//! Display-tree projection for the filter scope selection UI.
//!
//! Projects the layout tree down to the node types that matter for scope
//! selection: the root, tabs, and chart leaves. Rows, columns, and the
//! grid are transparent; their children are spliced directly into the
//! parent's list so the selection UI never sees pure layout containers.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::LayoutError;
use crate::model::{ChartId, LayoutNode, LayoutTree, NodeType, ROOT_ID};

/// Label shown for the dashboard-wide root entry.
pub const ALL_DASHBOARD_LABEL: &str = "All dashboard";

/// One entry of the projected selection tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeNode {
    /// Container node id, or the decimal chart id for chart leaves.
    pub value: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(rename = "chartId", skip_serializing_if = "Option::is_none")]
    pub chart_id: Option<ChartId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ScopeNode>,
}

/// Projects the layout tree into the scope selection tree.
///
/// `filter_chart_ids` names filter-source widgets, which cannot be their
/// own target and are omitted entirely. An empty layout yields an empty
/// projection; otherwise the result is a single root entry.
pub fn scope_nodes_tree(
    tree: &LayoutTree,
    filter_chart_ids: &HashSet<ChartId>,
) -> Result<Vec<ScopeNode>, LayoutError> {
    if tree.is_empty() {
        return Ok(Vec::new());
    }
    let root = tree
        .get(ROOT_ID)
        .ok_or_else(|| LayoutError::Structure(format!("missing root node {ROOT_ID}")))?;
    project(tree, root, filter_chart_ids)
}

fn project(
    tree: &LayoutTree,
    node: &LayoutNode,
    filter_chart_ids: &HashSet<ChartId>,
) -> Result<Vec<ScopeNode>, LayoutError> {
    if node.node_type == NodeType::Chart {
        let Some(chart_id) = node.meta.chart_id else {
            return Ok(Vec::new());
        };
        if filter_chart_ids.contains(&chart_id) {
            return Ok(Vec::new());
        }
        let label = node
            .meta
            .text
            .clone()
            .unwrap_or_else(|| format!("{} {chart_id}", node.node_type));
        return Ok(vec![ScopeNode {
            value: chart_id.to_string(),
            label,
            node_type: NodeType::Chart,
            chart_id: Some(chart_id),
            children: Vec::new(),
        }]);
    }

    let mut children = Vec::new();
    for child_id in &node.children {
        let child = tree.get(child_id).ok_or_else(|| LayoutError::DanglingChild {
            parent: node.id.clone(),
            child: child_id.clone(),
        })?;
        children.extend(project(tree, child, filter_chart_ids)?);
    }

    match node.node_type {
        NodeType::Root | NodeType::Tab => {
            let label = if node.node_type == NodeType::Root {
                ALL_DASHBOARD_LABEL.to_string()
            } else {
                node.meta
                    .text
                    .clone()
                    .unwrap_or_else(|| format!("{} {}", node.node_type, node.id))
            };
            Ok(vec![ScopeNode {
                value: node.id.clone(),
                label,
                node_type: node.node_type,
                chart_id: None,
                children,
            }])
        }
        // Row, Column, Grid: splice children straight through.
        _ => Ok(children),
    }
}
