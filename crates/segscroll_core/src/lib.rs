//! segscroll Core
//!
//! Foundational primitives for the segmented scroll container:
//!
//! - **Geometry**: points, sizes, rects and host spacing
//! - **Typed Offset Events**: segment-keyed offset notifications
//! - **Surface Capabilities**: traits platform views implement
//! - **Scroll Observation**: one listener per segment, released exactly once
//! - **Collapse Phases**: the header's Expanded / Collapsing / Collapsed machine
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use segscroll_core::observer::ScrollObserver;
//! use segscroll_core::testing::MemorySurface;
//! use segscroll_core::events::{OffsetEvent, SegmentId};
//! use slotmap::SlotMap;
//!
//! let mut segments: SlotMap<SegmentId, ()> = SlotMap::with_key();
//! let segment = segments.insert(());
//!
//! let surface = MemorySurface::new();
//! let mut observer = ScrollObserver::new();
//! let handle = observer.register(
//!     segment,
//!     surface.clone(),
//!     Rc::new(|event: &OffsetEvent| println!("offset {}", event.offset_y)),
//! );
//!
//! surface.scroll_to(24.0);
//! assert!(observer.release(handle));
//! assert!(observer.is_balanced());
//! ```

pub mod collapse;
pub mod events;
pub mod geometry;
pub mod observer;
pub mod surface;
pub mod testing;

pub use collapse::{collapse_for_offset, CollapseMachine, CollapsePhase};
pub use events::{ListenerToken, OffsetEvent, OffsetHandler, SegmentId, SurfaceListener};
pub use geometry::{non_negative, Point, Rect, Size, Spacing};
pub use observer::{GuardScope, ObservationHandle, ObservationId, ReentrancyGuard, ScrollObserver};
pub use surface::{ScrollSurface, ViewHandle};
