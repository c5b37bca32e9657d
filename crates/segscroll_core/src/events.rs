//! Typed offset events
//!
//! Offset changes travel from a platform scroll surface to the coordinator as
//! [`OffsetEvent`] values keyed by [`SegmentId`]. There are no string keys:
//! a listener is bound to exactly one segment when it is registered.

use std::rc::Rc;

use slotmap::new_key_type;

new_key_type! {
    /// Identity of one segment (one page of scrollable content)
    pub struct SegmentId;
}

/// Token handed out by a surface when a listener is attached
///
/// Surfaces mint these; the observer hands the same token back on removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ListenerToken(pub u64);

/// A vertical content offset reported by an observed surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffsetEvent {
    /// Segment whose surface moved
    pub segment: SegmentId,
    /// New vertical content offset (negative while bouncing past the top)
    pub offset_y: f32,
}

impl OffsetEvent {
    pub fn new(segment: SegmentId, offset_y: f32) -> Self {
        Self { segment, offset_y }
    }

    /// True while the surface is rubber-banding above its top edge
    pub fn is_overscroll(&self) -> bool {
        self.offset_y < 0.0
    }
}

/// Callback a surface invokes with its new vertical offset
pub type SurfaceListener = Rc<dyn Fn(f32)>;

/// Handler the observer forwards segment-tagged events to
pub type OffsetHandler = Rc<dyn Fn(&OffsetEvent)>;
