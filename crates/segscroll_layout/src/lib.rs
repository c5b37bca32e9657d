//! segscroll Layout
//!
//! Container geometry powered by Taffy: header band, paged content band and
//! per-segment page frames.

pub mod error;
pub mod frames;
pub mod style;
pub mod tree;

pub use error::LayoutError;
pub use frames::{FrameInputs, FrameManager, Frames};
pub use style::LayoutStyle;
pub use tree::{LayoutNodeId, LayoutTree};
