//! Dashboard layout core: grid-to-tree conversion and filter scoping.
//!
//! This crate converts legacy absolute-position dashboard grids into a
//! nested row/column/chart hierarchy, reconstructs render coordinates
//! from that hierarchy, and resolves which charts fall inside a filter's
//! scope. The tree is stored flattened (id -> node) and every operation
//! is a pure function over immutable input: callers replace their stored
//! tree wholesale rather than mutating in place.

pub mod domain;
pub mod error;
pub mod filters;
pub mod model;
pub mod parser;
pub mod virtual_grid;
pub mod writer;

// Export the data model
pub use error::LayoutError;
pub use model::{
    ChartId, LayoutNode, LayoutTree, NodeMeta, NodeType, BACKGROUND_TRANSPARENT, GRID_ID, ROOT_ID,
};

// Export conversion and reconstruction
pub use domain::convert::{convert_to_layout, IdGenerator, GRID_RATIO, ROW_HEIGHT};
pub use domain::positions::{convert_to_positions, half_height, ChartPosition};

// Export filter scoping
pub use domain::scope::{charts_in_scope, scope_from_checked};
pub use domain::scope_tree::{scope_nodes_tree, ScopeNode, ALL_DASHBOARD_LABEL};
pub use filters::{serialize_filter_scopes, DashboardFilter, FilterScope};

// Export persistence helpers
pub use parser::{load_layout, load_positions, parse_layout, parse_positions, Rectangle};
pub use writer::{layout_to_json, positions_to_json, save_layout, save_positions};

// Export synthetic grid generation
pub use virtual_grid::{generate_virtual_grid, VirtualGridConfig, GRID_COLUMN_UNITS};
