//! Segment and header capabilities
//!
//! A segment controller exposes its root surface and may point the container
//! at a different surface to observe. The observed surface is resolved once,
//! when the segment is attached, in this order:
//!
//! 1. the root surface
//! 2. the grid surface, if the root is a grid/collection container
//! 3. the surface returned by [`SegmentController::view_to_observe`], if any
//!
//! Later steps win.

use std::cell::Cell;
use std::rc::Rc;

use segscroll_core::geometry::Rect;
use segscroll_core::observer::ObservationHandle;
use segscroll_core::surface::{ScrollSurface, ViewHandle};

/// Supplies the view shown in the header band
pub trait HeaderController {
    fn view(&self) -> Rc<dyn ViewHandle>;
}

/// Supplies one page of scrollable content
pub trait SegmentController {
    /// Root view of the segment; receives the page frame
    fn root_surface(&self) -> Rc<dyn ScrollSurface>;

    /// Scrollable grid when the root is a grid/collection container
    fn grid_surface(&self) -> Option<Rc<dyn ScrollSurface>> {
        None
    }

    /// Surface to observe instead of the default
    fn view_to_observe(&self, index: usize) -> Option<Rc<dyn ScrollSurface>> {
        let _ = index;
        None
    }

    /// Label for the segment, shown by hosts that render a tab strip
    fn title(&self) -> Option<String> {
        None
    }
}

/// Which rule picked the observed surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSource {
    Root,
    Grid,
    Custom,
}

/// The surface whose offset drives the header for one segment
#[derive(Clone)]
pub struct ObservedSurface {
    pub surface: Rc<dyn ScrollSurface>,
    pub source: SurfaceSource,
}

/// Resolve the observed surface for the segment at `index`
pub fn resolve_observed_surface(
    controller: &dyn SegmentController,
    index: usize,
) -> ObservedSurface {
    let mut resolved = ObservedSurface {
        surface: controller.root_surface(),
        source: SurfaceSource::Root,
    };
    if let Some(grid) = controller.grid_surface() {
        resolved = ObservedSurface {
            surface: grid,
            source: SurfaceSource::Grid,
        };
    }
    if let Some(custom) = controller.view_to_observe(index) {
        resolved = ObservedSurface {
            surface: custom,
            source: SurfaceSource::Custom,
        };
    }
    tracing::trace!(index, source = ?resolved.source, "resolved observed surface");
    resolved
}

/// An attached segment
pub(crate) struct Segment {
    pub(crate) controller: Rc<dyn SegmentController>,
    pub(crate) root: Rc<dyn ScrollSurface>,
    pub(crate) observed: ObservedSurface,
    pub(crate) observation: Option<ObservationHandle>,
}

/// Empty header used when no header controller is configured
#[derive(Debug, Default)]
pub struct PlaceholderView {
    frame: Cell<Rect>,
    translation_y: Cell<f32>,
}

impl PlaceholderView {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn translation_y(&self) -> f32 {
        self.translation_y.get()
    }
}

impl ViewHandle for PlaceholderView {
    fn set_frame(&self, frame: Rect) {
        self.frame.set(frame);
    }

    fn frame(&self) -> Rect {
        self.frame.get()
    }

    fn set_translation_y(&self, dy: f32) {
        self.translation_y.set(dy);
    }
}
