//! Container error types

use segscroll_layout::LayoutError;
use thiserror::Error;

/// Errors surfaced by the segmented container
///
/// Presentation misconfiguration (negative heights, missing header) is
/// clamped or defaulted instead of reported here.
#[derive(Error, Debug)]
pub enum SegmentedError {
    /// Selected a segment index that is not configured
    #[error("Segment index {index} out of range ({count} segments)")]
    SegmentOutOfRange { index: usize, count: usize },

    /// Called back into the container while it was applying an update
    #[error("Container is busy applying another update")]
    Reentrant,

    /// Options text could not be parsed
    #[error("Invalid container options: {0}")]
    InvalidOptions(#[from] toml::de::Error),

    /// Frame computation failed
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),
}

/// Result type for container operations
pub type Result<T> = std::result::Result<T, SegmentedError>;
