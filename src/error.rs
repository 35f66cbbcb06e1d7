//! Error types for layout conversion and tree traversal.

use thiserror::Error;

/// Errors produced by the layout core.
///
/// All failures are local to a single conversion or resolution call;
/// callers get either a complete result or an error, never a partially
/// converted tree.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A legacy grid rectangle failed field validation.
    #[error("invalid rectangle for slice {slice_id}: {reason}")]
    InvalidRectangle { slice_id: String, reason: String },

    /// JSON parse or serialize failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node's children list references an id that is not in the tree.
    #[error("node {parent} references missing child {child}")]
    DanglingChild { parent: String, child: String },

    /// The divider sweep exhausted its coordinate range with rectangles
    /// left unassigned. The input cannot be separated into clean bands.
    #[error("irreducible overlap: {remaining} rectangles cannot be separated into clean bands")]
    IrreducibleOverlap { remaining: usize },

    /// A structural invariant of the tree does not hold.
    #[error("structural violation: {0}")]
    Structure(String),

    /// Cached Row/Column aggregate metadata disagrees with its children.
    #[error(
        "aggregate metadata mismatch on {id}: stored {stored_width}x{stored_height}, \
         computed {width}x{height}"
    )]
    AggregateMismatch {
        id: String,
        stored_width: i64,
        stored_height: i64,
        width: i64,
        height: i64,
    },
}
