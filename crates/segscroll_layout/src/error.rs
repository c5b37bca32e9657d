//! Layout error types

use thiserror::Error;

/// Layout-related errors
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A node id no longer maps to a Taffy node
    #[error("Layout node is not part of the tree")]
    UnknownNode,

    /// Taffy rejected an operation
    #[error("Layout engine error: {0}")]
    Taffy(#[from] taffy::TaffyError),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
