//! Layout tree data model.
//!
//! The dashboard layout is stored flattened: an insertion-ordered arena
//! mapping node id to [`LayoutNode`], not a nested object graph. Parent and
//! child relations are expressed purely through `children` lists; a parent
//! is never stored on the node itself and is recovered on demand by
//! scanning children lists ([`LayoutTree::parent_of`]).
//!
//! This module contains:
//! - Node types and metadata ([`NodeType`], [`NodeMeta`], [`LayoutNode`])
//! - The arena container ([`LayoutTree`]) with ordered serialization
//! - Structural invariant validation ([`LayoutTree::validate`])

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::LayoutError;

/// Numeric chart identity, shared with the filter-scope configuration.
pub type ChartId = i64;

/// Id of the synthetic root node present in every tree.
pub const ROOT_ID: &str = "ROOT_ID";

/// Id of the single grid container directly under the root.
pub const GRID_ID: &str = "GRID_ID";

/// Background style assigned to generated row and column containers.
pub const BACKGROUND_TRANSPARENT: &str = "BACKGROUND_TRANSPARENT";

/// Node variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "ROOT")]
    Root,
    #[serde(rename = "GRID")]
    Grid,
    #[serde(rename = "ROW")]
    Row,
    #[serde(rename = "COLUMN")]
    Column,
    #[serde(rename = "TAB")]
    Tab,
    #[serde(rename = "CHART")]
    Chart,
}

impl NodeType {
    /// Returns the serialized tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "ROOT",
            NodeType::Grid => "GRID",
            NodeType::Row => "ROW",
            NodeType::Column => "COLUMN",
            NodeType::Tab => "TAB",
            NodeType::Chart => "CHART",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Size and display metadata attached to a node.
///
/// `width`/`height` are derived aggregates for Row and Column nodes and
/// converted extents for Chart nodes; containers that carry no sizing
/// (Root, Grid, Tab) leave them at zero and the fields are omitted from
/// serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(rename = "chartId", default, skip_serializing_if = "Option::is_none")]
    pub chart_id: Option<ChartId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl NodeMeta {
    /// True when every field is unset; empty meta is omitted from output.
    pub fn is_empty(&self) -> bool {
        self.width == 0
            && self.height == 0
            && self.background.is_none()
            && self.chart_id.is_none()
            && self.text.is_none()
    }
}

/// A single node of the flattened layout tree.
///
/// Chart nodes are terminal leaves; container nodes own their children
/// through the ordered `children` id list (order is rendering order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "NodeMeta::is_empty")]
    pub meta: NodeMeta,
}

impl LayoutNode {
    /// Creates a node with no children and empty metadata.
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        LayoutNode {
            id: id.into(),
            node_type,
            children: Vec::new(),
            meta: NodeMeta::default(),
        }
    }
}

/// Insertion-ordered arena of layout nodes keyed by id.
///
/// Every node is addressable by id in O(1). The arena serializes as a flat
/// JSON object keyed by id, in insertion order, which is the persisted
/// layout format consumed by the rendering and drag/drop collaborators.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
    index: HashMap<String, usize>,
}

impl LayoutTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree with the synthetic Root -> Grid skeleton that every
    /// converted dashboard starts from.
    pub fn with_skeleton() -> Self {
        let mut tree = Self::new();
        let mut root = LayoutNode::new(ROOT_ID, NodeType::Root);
        root.children.push(GRID_ID.to_string());
        tree.insert(root);
        tree.insert(LayoutNode::new(GRID_ID, NodeType::Grid));
        tree
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when a node with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a node by id.
    pub fn get(&self, id: &str) -> Option<&LayoutNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Looks up a node by id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut LayoutNode> {
        self.index.get(id).copied().map(move |i| &mut self.nodes[i])
    }

    /// Inserts a node, replacing any existing node with the same id while
    /// keeping its original position in insertion order.
    pub fn insert(&mut self, node: LayoutNode) {
        match self.index.get(&node.id) {
            Some(&i) => self.nodes[i] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Appends `child_id` to the children of `parent_id`.
    pub fn push_child(&mut self, parent_id: &str, child_id: &str) -> Result<(), LayoutError> {
        let parent = self
            .get_mut(parent_id)
            .ok_or_else(|| LayoutError::Structure(format!("unknown parent node {parent_id}")))?;
        parent.children.push(child_id.to_string());
        Ok(())
    }

    /// Iterates nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter()
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// Derives the parent of a node by scanning children lists.
    ///
    /// Parents are intentionally not stored on nodes (no cyclic ownership);
    /// this is the derived query that replaces a parent pointer.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.children.iter().any(|c| c == id))
            .map(|n| n.id.as_str())
    }

    /// Checks every structural invariant of the tree:
    ///
    /// - the root exists, is `ROOT`, and has exactly one `GRID` child;
    /// - every referenced child id resolves (no dangling references);
    /// - chart nodes are leaves;
    /// - ownership is exclusive: every non-root node is claimed by exactly
    ///   one parent, the root by none, and all nodes are reachable from
    ///   the root;
    /// - Row/Column aggregate metadata matches their children (sum along
    ///   the primary axis, max along the cross axis).
    pub fn validate(&self) -> Result<(), LayoutError> {
        let root = self
            .get(ROOT_ID)
            .ok_or_else(|| LayoutError::Structure(format!("missing root node {ROOT_ID}")))?;
        if root.node_type != NodeType::Root {
            return Err(LayoutError::Structure(format!(
                "{ROOT_ID} has type {}, expected ROOT",
                root.node_type
            )));
        }
        if root.children.len() != 1 {
            return Err(LayoutError::Structure(format!(
                "root must have exactly one child, found {}",
                root.children.len()
            )));
        }
        let grid_id = &root.children[0];
        match self.get(grid_id) {
            Some(grid) if grid.node_type == NodeType::Grid => {}
            Some(grid) => {
                return Err(LayoutError::Structure(format!(
                    "root child {grid_id} has type {}, expected GRID",
                    grid.node_type
                )));
            }
            None => {
                return Err(LayoutError::DanglingChild {
                    parent: ROOT_ID.to_string(),
                    child: grid_id.clone(),
                });
            }
        }

        let mut claims: HashMap<&str, usize> = HashMap::new();
        for node in &self.nodes {
            if node.node_type == NodeType::Chart && !node.children.is_empty() {
                return Err(LayoutError::Structure(format!(
                    "chart node {} must be a leaf, found {} children",
                    node.id,
                    node.children.len()
                )));
            }
            for child in &node.children {
                if !self.contains(child) {
                    return Err(LayoutError::DanglingChild {
                        parent: node.id.clone(),
                        child: child.clone(),
                    });
                }
                *claims.entry(child.as_str()).or_insert(0) += 1;
            }
        }

        for node in &self.nodes {
            let claimed = claims.get(node.id.as_str()).copied().unwrap_or(0);
            if node.id == ROOT_ID {
                if claimed != 0 {
                    return Err(LayoutError::Structure(format!(
                        "root node {ROOT_ID} must not be a child of any node"
                    )));
                }
            } else if claimed != 1 {
                return Err(LayoutError::Structure(format!(
                    "node {} is claimed by {claimed} parents, expected exactly 1",
                    node.id
                )));
            }
        }

        let mut reachable = HashSet::new();
        let mut stack = vec![ROOT_ID];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().map(String::as_str));
            }
        }
        if reachable.len() != self.len() {
            return Err(LayoutError::Structure(format!(
                "{} of {} nodes are unreachable from {ROOT_ID}",
                self.len() - reachable.len(),
                self.len()
            )));
        }

        for node in &self.nodes {
            self.check_aggregates(node)?;
        }

        Ok(())
    }

    /// Verifies the cached width/height aggregate on one Row/Column node.
    fn check_aggregates(&self, node: &LayoutNode) -> Result<(), LayoutError> {
        let (width, height) = match node.node_type {
            NodeType::Row if !node.children.is_empty() => (
                self.children_sum(node, |m| m.width),
                self.children_max(node, |m| m.height),
            ),
            NodeType::Column if !node.children.is_empty() => (
                self.children_max(node, |m| m.width),
                self.children_sum(node, |m| m.height),
            ),
            _ => return Ok(()),
        };
        if node.meta.width != width || node.meta.height != height {
            return Err(LayoutError::AggregateMismatch {
                id: node.id.clone(),
                stored_width: node.meta.width,
                stored_height: node.meta.height,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Recomputes the cached width/height aggregate on one node after its
    /// children changed. Row: width = sum, height = max; Column: the axes
    /// swap. Other node types carry no aggregate and are left untouched.
    pub fn refresh_meta(&mut self, id: &str) -> Result<(), LayoutError> {
        let node = self
            .get(id)
            .ok_or_else(|| LayoutError::Structure(format!("unknown node {id}")))?;
        for child in &node.children {
            if !self.contains(child) {
                return Err(LayoutError::DanglingChild {
                    parent: id.to_string(),
                    child: child.clone(),
                });
            }
        }
        let dims = match node.node_type {
            NodeType::Row => Some((
                self.children_sum(node, |m| m.width),
                self.children_max(node, |m| m.height),
            )),
            NodeType::Column => Some((
                self.children_max(node, |m| m.width),
                self.children_sum(node, |m| m.height),
            )),
            _ => None,
        };
        if let Some((width, height)) = dims {
            if let Some(node) = self.get_mut(id) {
                node.meta.width = width;
                node.meta.height = height;
            }
        }
        Ok(())
    }

    /// Sum of a meta attribute over a node's children.
    pub fn children_sum(&self, node: &LayoutNode, attr: impl Fn(&NodeMeta) -> i64) -> i64 {
        node.children
            .iter()
            .filter_map(|id| self.get(id))
            .map(|child| attr(&child.meta))
            .sum()
    }

    /// Max of a meta attribute over a node's children.
    pub fn children_max(&self, node: &LayoutNode, attr: impl Fn(&NodeMeta) -> i64) -> i64 {
        node.children
            .iter()
            .filter_map(|id| self.get(id))
            .map(|child| attr(&child.meta))
            .max()
            .unwrap_or(0)
    }
}

impl Serialize for LayoutTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for node in &self.nodes {
            map.serialize_entry(&node.id, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LayoutTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = LayoutTree;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a flat object mapping node id to layout node")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut tree = LayoutTree::new();
                while let Some((key, node)) = access.next_entry::<String, LayoutNode>()? {
                    if key != node.id {
                        return Err(serde::de::Error::custom(format!(
                            "map key {key} does not match node id {}",
                            node.id
                        )));
                    }
                    tree.insert(node);
                }
                Ok(tree)
            }
        }

        deserializer.deserialize_map(TreeVisitor)
    }
}
