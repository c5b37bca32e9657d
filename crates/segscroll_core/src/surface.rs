//! Platform capability traits
//!
//! The engine never owns views. It reaches platform objects through these
//! traits, which take `&self` because platform views are shared handles
//! (UIKit views, toolkit widgets, test doubles) with their own interior state.

use crate::events::{ListenerToken, SurfaceListener};
use crate::geometry::Rect;

/// Any view the container positions: the header and every segment root
pub trait ViewHandle {
    /// Assign the view's frame in its parent's coordinates
    ///
    /// The header is a child of the container and gets container
    /// coordinates. Segment roots are children of the horizontal pager and
    /// get pager-content coordinates: page `i` sits at `x = i * band width`,
    /// `y = 0`.
    fn set_frame(&self, frame: Rect);

    /// Current frame
    fn frame(&self) -> Rect;

    /// Vertical translation applied on top of the frame.
    ///
    /// Views that never move after layout can ignore this.
    fn set_translation_y(&self, dy: f32) {
        let _ = dy;
    }
}

/// A vertically scrollable surface whose offset drives header collapse
///
/// Scroll physics (momentum, bounce) stay with the platform. The coordinator
/// only reads the offset and writes the top content inset.
pub trait ScrollSurface: ViewHandle {
    /// Current vertical content offset
    fn content_offset(&self) -> f32;

    /// Current top content inset
    fn top_inset(&self) -> f32;

    /// Replace the top content inset.
    ///
    /// Some platforms report an offset change synchronously from inside this
    /// call.
    fn set_top_inset(&self, inset: f32);

    /// Attach a listener invoked with the new offset after every change
    fn add_offset_listener(&self, listener: SurfaceListener) -> ListenerToken;

    /// Detach a listener previously attached with `add_offset_listener`
    fn remove_offset_listener(&self, token: ListenerToken);
}
