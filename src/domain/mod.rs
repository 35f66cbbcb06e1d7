//! Domain logic for dashboard layout management.
//!
//! This module contains the algorithmic core:
//! - Conversion (geometry partitioning, layout tree construction)
//! - Positions (render coordinate reconstruction)
//! - Scope (filter scope expansion and collapse)
//! - Scope tree (display projection for the selection UI)

pub mod convert;
pub mod positions;
pub mod scope;
pub mod scope_tree;
