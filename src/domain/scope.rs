//! Filter scope resolution over the layout tree.
//!
//! Two directions:
//! - expand: materialize a filter's `{scope, immune}` declaration into the
//!   concrete set of affected chart ids;
//! - collapse: derive the minimal `{scope, immune}` representation back
//!   from a checked-chart set produced by the selection UI.

use std::collections::HashSet;
use tracing::debug;

use crate::domain::scope_tree::{scope_nodes_tree, ScopeNode};
use crate::error::LayoutError;
use crate::filters::FilterScope;
use crate::model::{ChartId, LayoutNode, LayoutTree, NodeType};

/// Expands a filter scope into the chart ids it affects.
///
/// Each scope id roots a depth-first traversal; chart leaves are collected
/// unless immune or the filter's own source chart (a filter never applies
/// to itself). Scope ids missing from the tree contribute nothing - filters
/// may reference stale ids after layout edits. Charts covered by more than
/// one scope id are reported once.
pub fn charts_in_scope(
    tree: &LayoutTree,
    filter_scope: &FilterScope,
    filter_chart_id: ChartId,
) -> Result<Vec<ChartId>, LayoutError> {
    let immune: HashSet<ChartId> = filter_scope.immune.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut chart_ids = Vec::new();

    for scope_id in &filter_scope.scope {
        let Some(node) = tree.get(scope_id) else {
            debug!(scope_id = %scope_id, "skipping stale scope id");
            continue;
        };
        collect_charts(tree, node, &immune, filter_chart_id, &mut seen, &mut chart_ids)?;
    }
    Ok(chart_ids)
}

fn collect_charts(
    tree: &LayoutTree,
    node: &LayoutNode,
    immune: &HashSet<ChartId>,
    filter_chart_id: ChartId,
    seen: &mut HashSet<ChartId>,
    chart_ids: &mut Vec<ChartId>,
) -> Result<(), LayoutError> {
    if node.node_type == NodeType::Chart {
        if let Some(chart_id) = node.meta.chart_id {
            if !immune.contains(&chart_id) && chart_id != filter_chart_id && seen.insert(chart_id)
            {
                chart_ids.push(chart_id);
            }
        }
        return Ok(());
    }
    for child_id in &node.children {
        let child = tree.get(child_id).ok_or_else(|| LayoutError::DanglingChild {
            parent: node.id.clone(),
            child: child_id.clone(),
        })?;
        collect_charts(tree, child, immune, filter_chart_id, seen, chart_ids)?;
    }
    Ok(())
}

/// Derives the minimal `{scope, immune}` representation of a checked set.
///
/// Works on the projected scope tree. A container qualifies when any of
/// its direct chart entries is checked, or when it has tab children and
/// all of them qualify. Scope is the shallowest qualified frontier; immune
/// lists exactly the unchecked chart ids under the taken scope nodes, so
/// expanding the result yields the checked set back for every
/// checkbox-reachable selection.
pub fn scope_from_checked(
    tree: &LayoutTree,
    checked_chart_ids: &[ChartId],
    filter_chart_ids: &HashSet<ChartId>,
) -> Result<FilterScope, LayoutError> {
    let nodes = scope_nodes_tree(tree, filter_chart_ids)?;
    let checked: HashSet<ChartId> = checked_chart_ids.iter().copied().collect();

    let mut scope = Vec::new();
    for node in &nodes {
        collect_scope(node, &checked, &mut scope);
    }

    let mut immune = Vec::new();
    let scope_ids: HashSet<&str> = scope.iter().map(String::as_str).collect();
    for node in &nodes {
        collect_immune(node, &scope_ids, &checked, false, &mut immune);
    }

    debug!(
        checked = checked_chart_ids.len(),
        scope = scope.len(),
        immune = immune.len(),
        "collapsed checked set to filter scope"
    );
    Ok(FilterScope { scope, immune })
}

/// True when this projected container is wholly claimable for the scope.
fn qualifies(node: &ScopeNode, checked: &HashSet<ChartId>) -> bool {
    let mut has_tab = false;
    let mut all_tabs_qualify = true;
    let mut any_chart_checked = false;

    for child in &node.children {
        match child.node_type {
            NodeType::Chart => {
                if child.chart_id.is_some_and(|id| checked.contains(&id)) {
                    any_chart_checked = true;
                }
            }
            NodeType::Tab => {
                has_tab = true;
                if !qualifies(child, checked) {
                    all_tabs_qualify = false;
                }
            }
            _ => {}
        }
    }
    any_chart_checked || (has_tab && all_tabs_qualify)
}

/// Takes qualified nodes without descending; recurses into tabs otherwise.
fn collect_scope(node: &ScopeNode, checked: &HashSet<ChartId>, scope: &mut Vec<String>) {
    if node.node_type == NodeType::Chart {
        return;
    }
    if qualifies(node, checked) {
        scope.push(node.value.clone());
        return;
    }
    for child in &node.children {
        collect_scope(child, checked, scope);
    }
}

/// Collects unchecked chart ids underneath the taken scope nodes.
fn collect_immune(
    node: &ScopeNode,
    scope_ids: &HashSet<&str>,
    checked: &HashSet<ChartId>,
    in_scope: bool,
    immune: &mut Vec<ChartId>,
) {
    let in_scope = in_scope || scope_ids.contains(node.value.as_str());
    if let Some(chart_id) = node.chart_id {
        if in_scope && !checked.contains(&chart_id) {
            immune.push(chart_id);
        }
        return;
    }
    for child in &node.children {
        collect_immune(child, scope_ids, checked, in_scope, immune);
    }
}
