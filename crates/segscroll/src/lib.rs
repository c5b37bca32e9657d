//! segscroll
//!
//! A container that pins a collapsible header above a horizontally paged set
//! of vertically scrolling segments. Scrolling the active segment collapses
//! the header; switching segments re-derives the header from the incoming
//! segment's own offset.
//!
//! The engine is headless. Platform views plug in through the
//! [`ViewHandle`] and [`ScrollSurface`] traits and the host forwards its
//! lifecycle events to a [`SegmentedViewController`].
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use segscroll::prelude::*;
//! use segscroll_core::testing::MemorySurface;
//!
//! struct Page(Rc<MemorySurface>);
//!
//! impl SegmentController for Page {
//!     fn root_surface(&self) -> Rc<dyn ScrollSurface> {
//!         self.0.clone()
//!     }
//! }
//!
//! let first = MemorySurface::new();
//! let second = MemorySurface::new();
//! let options = SegmentedOptions {
//!     header_view_height: 200.0,
//!     header_view_offset_height: 44.0,
//!     ..Default::default()
//! };
//! let container = SegmentedViewController::with_controllers(
//!     None,
//!     vec![Rc::new(Page(first.clone())), Rc::new(Page(second.clone()))],
//!     options,
//! );
//!
//! container.load_view()?;
//! container.view_did_layout(Rect::new(0.0, 0.0, 375.0, 812.0), Spacing::ZERO)?;
//!
//! first.scroll_to(120.0);
//! assert_eq!(container.collapse(), 120.0);
//!
//! container.select_segment(1)?;
//! assert_eq!(container.collapse(), 0.0);
//! # Ok::<(), segscroll::SegmentedError>(())
//! ```

pub mod controller;
pub mod coordinator;
pub mod error;
pub mod handoff;
pub mod options;
pub mod segment;

pub use controller::{Lifecycle, ObserverStats, SegmentedViewController};
pub use coordinator::{HeaderCoordinator, HeaderTransform};
pub use error::{Result, SegmentedError};
pub use handoff::{hand_off, HandoffReport};
pub use options::{ConfigureRequest, SegmentedOptions};
pub use segment::{
    resolve_observed_surface, HeaderController, ObservedSurface, PlaceholderView,
    SegmentController, SurfaceSource,
};

pub use segscroll_core::{
    collapse_for_offset, CollapsePhase, OffsetEvent, Rect, ScrollSurface, SegmentId, Size,
    Spacing, ViewHandle,
};
pub use segscroll_layout::Frames;

/// Everything a host needs to embed the container
pub mod prelude {
    pub use crate::controller::{Lifecycle, SegmentedViewController};
    pub use crate::coordinator::HeaderTransform;
    pub use crate::error::{Result, SegmentedError};
    pub use crate::options::{ConfigureRequest, SegmentedOptions};
    pub use crate::segment::{HeaderController, SegmentController};
    pub use segscroll_core::{CollapsePhase, Rect, ScrollSurface, Spacing, ViewHandle};
}
