//! Segmented view controller
//!
//! Composition root for the container. Owns the header, the ordered segments,
//! the observer registry, the coordinator and the frame manager, and exposes
//! the lifecycle hooks a host forwards to it:
//!
//! ```text
//! load_view ──► header + segments attached, observers registered
//! view_will_appear ──► active segment re-synced
//! view_did_layout(bounds, spacing) ──► frames recomputed and applied
//! teardown ──► every observation released (also on drop)
//! ```
//!
//! All state lives behind one `RefCell`. Offset listeners hold a weak
//! reference to it. Notifications caused by the container's own writes are
//! dropped by the re-entrancy guard; any other notification that arrives
//! while the container is mid-update (a phase action scrolling a surface, for
//! example) is deferred and applied, in order, once the update finishes.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use segscroll_core::collapse::CollapsePhase;
use segscroll_core::events::{OffsetEvent, OffsetHandler, SegmentId};
use segscroll_core::geometry::{Rect, Spacing};
use segscroll_core::observer::{ReentrancyGuard, ScrollObserver};
use segscroll_core::surface::{ScrollSurface, ViewHandle};
use segscroll_layout::{FrameInputs, FrameManager, Frames};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::coordinator::{HeaderCoordinator, HeaderTransform};
use crate::error::{Result, SegmentedError};
use crate::handoff::{hand_off, HandoffReport};
use crate::options::{ConfigureRequest, SegmentedOptions};
use crate::segment::{
    resolve_observed_surface, HeaderController, PlaceholderView, Segment, SegmentController,
    SurfaceSource,
};

/// Where the container is in its view lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Unloaded,
    Loaded,
    TornDown,
}

/// Observation bookkeeping, for hosts and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserverStats {
    pub registered: usize,
    pub released: usize,
    pub live: usize,
    /// Self-triggered notifications dropped by the re-entrancy guard
    pub suppressed: u64,
}

impl ObserverStats {
    /// Every registration released exactly once
    pub fn is_balanced(&self) -> bool {
        self.registered == self.released && self.live == 0
    }
}

/// Offset changes that arrived while the container state was borrowed
type DeferredOffsets = RefCell<SmallVec<[OffsetEvent; 4]>>;

struct ContainerState {
    options: SegmentedOptions,
    header_controller: Option<Rc<dyn HeaderController>>,
    header_view: Option<Rc<dyn ViewHandle>>,
    segment_controllers: Vec<Rc<dyn SegmentController>>,
    segments: SlotMap<SegmentId, Segment>,
    order: Vec<SegmentId>,
    active_index: Option<usize>,
    observer: ScrollObserver,
    coordinator: HeaderCoordinator,
    frame_manager: FrameManager,
    frames: Frames,
    bounds: Option<Rect>,
    spacing: Spacing,
    lifecycle: Lifecycle,
    weak_self: Weak<RefCell<ContainerState>>,
    deferred: Rc<DeferredOffsets>,
}

/// Container pinning a collapsible header above paged scroll surfaces
pub struct SegmentedViewController {
    state: Rc<RefCell<ContainerState>>,
    deferred: Rc<DeferredOffsets>,
}

impl SegmentedViewController {
    /// Create an empty container; configure it before loading
    pub fn new(options: SegmentedOptions) -> Self {
        let options = options.sanitized();
        let deferred = Rc::new(DeferredOffsets::default());
        let state = Rc::new_cyclic(|weak| {
            let guard = ReentrancyGuard::new();
            let mut coordinator = HeaderCoordinator::new(guard.clone());
            coordinator.set_header_heights(
                options.header_view_height,
                options.header_view_offset_height,
            );
            RefCell::new(ContainerState {
                options,
                header_controller: None,
                header_view: None,
                segment_controllers: Vec::new(),
                segments: SlotMap::with_key(),
                order: Vec::new(),
                active_index: None,
                observer: ScrollObserver::with_guard(guard),
                coordinator,
                frame_manager: FrameManager::new(),
                frames: Frames::default(),
                bounds: None,
                spacing: Spacing::ZERO,
                lifecycle: Lifecycle::Unloaded,
                weak_self: weak.clone(),
                deferred: deferred.clone(),
            })
        });
        Self { state, deferred }
    }

    /// Create a container with its header and segments
    pub fn with_controllers(
        header: Option<Rc<dyn HeaderController>>,
        segments: Vec<Rc<dyn SegmentController>>,
        options: SegmentedOptions,
    ) -> Self {
        let controller = Self::new(options);
        {
            let mut state = controller.state.borrow_mut();
            state.header_controller = header;
            state.segment_controllers = segments;
        }
        controller
    }

    fn state_mut(&self) -> Result<RefMut<'_, ContainerState>> {
        self.state
            .try_borrow_mut()
            .map_err(|_| SegmentedError::Reentrant)
    }

    fn state(&self) -> Ref<'_, ContainerState> {
        self.state.borrow()
    }

    /// Run a mutation, then apply offset changes deferred while it ran
    fn update<R>(&self, apply: impl FnOnce(&mut ContainerState) -> Result<R>) -> Result<R> {
        let result = apply(&mut *self.state_mut()?);
        drain_deferred(&self.state, &self.deferred);
        result
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Attach the header and segments and start observing
    ///
    /// Loading an already loaded container does nothing.
    pub fn load_view(&self) -> Result<()> {
        self.update(|state| state.load())
    }

    /// The container is about to become visible
    ///
    /// Loads if needed and re-derives the header from the active segment's
    /// live offset, which may have moved while off screen.
    pub fn view_will_appear(&self) -> Result<()> {
        self.update(|state| {
            state.load()?;
            state.resync_active();
            state.relayout()
        })
    }

    /// Bounds or host spacing changed; recompute and apply frames
    pub fn view_did_layout(&self, bounds: Rect, spacing: Spacing) -> Result<Frames> {
        self.update(|state| {
            state.bounds = Some(bounds);
            state.spacing = spacing.sanitized();
            let spacing = state.spacing;
            state.coordinator.set_spacing(spacing);
            state.relayout()?;
            Ok(state.frames.clone())
        })
    }

    /// Release every observation and detach all segments
    ///
    /// Idempotent. Returns how many observations were released by this call.
    pub fn teardown(&self) -> Result<usize> {
        self.update(|state| Ok(state.teardown()))
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Apply a batch of configuration changes with a single relayout
    pub fn configure(&self, request: ConfigureRequest) -> Result<()> {
        self.update(|state| state.apply_configuration(request))
    }

    /// Current numeric options
    pub fn options(&self) -> SegmentedOptions {
        self.state().options
    }

    // =========================================================================
    // Segment Selection
    // =========================================================================

    /// Make the segment at `index` active
    ///
    /// Before load this only records the selection. Returns the handoff when
    /// the active segment changed.
    pub fn select_segment(&self, index: usize) -> Result<Option<HandoffReport>> {
        self.update(|state| {
            if state.lifecycle != Lifecycle::Loaded {
                let count = state.segment_controllers.len();
                if index >= count {
                    return Err(SegmentedError::SegmentOutOfRange { index, count });
                }
                state.options.initial_segment = index;
                return Ok(None);
            }
            if state.active_index == Some(index) {
                return Ok(None);
            }
            state.activate(index).map(Some)
        })
    }

    /// The horizontal pager moved; switch to the nearest page
    pub fn on_pager_scrolled(&self, offset_x: f32) -> Result<Option<HandoffReport>> {
        self.update(|state| {
            let Some(index) = state.page_for_offset(offset_x) else {
                return Ok(None);
            };
            if state.active_index == Some(index) {
                return Ok(None);
            }
            state.activate(index).map(Some)
        })
    }

    // =========================================================================
    // Phase Actions
    // =========================================================================

    /// Run `action` whenever the header enters `phase`
    ///
    /// Actions run while the container is mid-update. Offset changes they
    /// cause are applied once the update finishes; calling container methods
    /// from them fails with [`SegmentedError::Reentrant`].
    pub fn on_phase_enter<F: FnMut() + 'static>(&self, phase: CollapsePhase, action: F) -> Result<()> {
        self.state_mut()?
            .coordinator
            .machine_mut()
            .on_enter(phase, action);
        Ok(())
    }

    /// Run `action` whenever the header leaves `phase`
    pub fn on_phase_exit<F: FnMut() + 'static>(&self, phase: CollapsePhase, action: F) -> Result<()> {
        self.state_mut()?
            .coordinator
            .machine_mut()
            .on_exit(phase, action);
        Ok(())
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn lifecycle(&self) -> Lifecycle {
        self.state().lifecycle
    }

    /// Current collapse (0 ..= header_view_height)
    pub fn collapse(&self) -> f32 {
        self.state().coordinator.collapse()
    }

    pub fn collapse_phase(&self) -> CollapsePhase {
        self.state().coordinator.phase()
    }

    pub fn header_transform(&self) -> HeaderTransform {
        self.state().coordinator.header_transform()
    }

    /// Index of the active segment, once loaded with at least one segment
    pub fn active_segment_index(&self) -> Option<usize> {
        self.state().active_index
    }

    pub fn active_segment(&self) -> Option<SegmentId> {
        self.state().coordinator.active()
    }

    /// Identity of the segment at `index`
    pub fn segment_id(&self, index: usize) -> Option<SegmentId> {
        self.state().order.get(index).copied()
    }

    pub fn segment_count(&self) -> usize {
        let state = self.state();
        match state.lifecycle {
            Lifecycle::Loaded => state.order.len(),
            _ => state.segment_controllers.len(),
        }
    }

    pub fn segment_title(&self, index: usize) -> Option<String> {
        let state = self.state();
        match state.order.get(index) {
            Some(id) => state.segments.get(*id)?.controller.title(),
            None => state.segment_controllers.get(index)?.title(),
        }
    }

    /// Rule that picked the observed surface of the segment at `index`
    pub fn observed_source(&self, index: usize) -> Option<SurfaceSource> {
        let state = self.state();
        let id = state.order.get(index)?;
        state.segments.get(*id).map(|segment| segment.observed.source)
    }

    /// Remembered offset for the segment at `index`
    pub fn last_offset(&self, index: usize) -> Option<f32> {
        let state = self.state();
        let id = state.order.get(index)?;
        state.coordinator.last_offset(*id)
    }

    /// The view currently in the header band (placeholder if none configured)
    pub fn header_view(&self) -> Option<Rc<dyn ViewHandle>> {
        self.state().header_view.clone()
    }

    /// True when the header band shows the empty placeholder
    pub fn has_placeholder_header(&self) -> bool {
        let state = self.state();
        state.header_view.is_some() && state.header_controller.is_none()
    }

    /// Frames from the most recent layout pass
    pub fn frames(&self) -> Frames {
        self.state().frames.clone()
    }

    pub fn observer_stats(&self) -> ObserverStats {
        let state = self.state();
        ObserverStats {
            registered: state.observer.registered_count(),
            released: state.observer.released_count(),
            live: state.observer.len(),
            suppressed: state.observer.guard().suppressed_count(),
        }
    }

    /// Offset events the coordinator has handled
    pub fn processed_events(&self) -> u64 {
        self.state().coordinator.processed_count()
    }
}

impl Drop for SegmentedViewController {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.teardown();
        }
    }
}

impl fmt::Debug for SegmentedViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("SegmentedViewController")
                .field("lifecycle", &state.lifecycle)
                .field("options", &state.options)
                .field("segments", &state.order.len())
                .field("active_index", &state.active_index)
                .field("collapse", &state.coordinator.collapse())
                .finish(),
            Err(_) => f.write_str("SegmentedViewController { <busy> }"),
        }
    }
}

/// Apply deferred offset changes in arrival order
///
/// Changes raised while draining are picked up by the next round. Returns
/// without draining when the state is still borrowed further up the stack.
fn drain_deferred(state: &RefCell<ContainerState>, deferred: &DeferredOffsets) {
    loop {
        let Ok(mut state) = state.try_borrow_mut() else {
            return;
        };
        let batch = std::mem::take(&mut *deferred.borrow_mut());
        if batch.is_empty() {
            return;
        }
        for event in &batch {
            state.handle_offset(event);
        }
    }
}

impl ContainerState {
    fn offset_handler(&self) -> OffsetHandler {
        let weak = self.weak_self.clone();
        let deferred = self.deferred.clone();
        Rc::new(move |event: &OffsetEvent| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match state.try_borrow_mut() {
                Ok(mut state) => state.handle_offset(event),
                Err(_) => {
                    // The update holding the state drains this when it ends
                    tracing::trace!(
                        segment = ?event.segment,
                        offset_y = event.offset_y,
                        "deferred offset change raised during container update"
                    );
                    deferred.borrow_mut().push(*event);
                    return;
                }
            }
            drain_deferred(&state, &deferred);
        })
    }

    fn handle_offset(&mut self, event: &OffsetEvent) {
        let Some(segment) = self.segments.get(event.segment) else {
            tracing::trace!(segment = ?event.segment, "offset change for detached segment");
            return;
        };
        let Some(header) = self.header_view.as_ref() else {
            return;
        };
        self.coordinator.on_offset_changed(
            event,
            segment.observed.surface.as_ref(),
            header.as_ref(),
        );
    }

    fn load(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Loaded {
            return Ok(());
        }
        self.attach_header();
        self.attach_segments();
        self.lifecycle = Lifecycle::Loaded;
        tracing::debug!(segments = self.order.len(), "container loaded");

        self.activate_initial()?;
        self.relayout()
    }

    fn teardown(&mut self) -> usize {
        if self.lifecycle != Lifecycle::Loaded {
            return 0;
        }
        let released = self.detach_segments();
        // Anything registered outside the segment table goes too
        let stray = self.observer.release_all();
        if stray > 0 {
            tracing::warn!(stray, "released observations not owned by a segment");
        }
        self.header_view = None;
        self.lifecycle = Lifecycle::TornDown;
        tracing::debug!(released, "container torn down");
        released + stray
    }

    fn attach_header(&mut self) {
        let view: Rc<dyn ViewHandle> = match &self.header_controller {
            Some(controller) => controller.view(),
            None => {
                tracing::debug!("no header controller, using an empty placeholder");
                PlaceholderView::new()
            }
        };
        let transform = self.coordinator.header_transform();
        let _scope = self.observer.guard().enter();
        view.set_translation_y(transform.translation_y);
        self.header_view = Some(view);
    }

    fn attach_segments(&mut self) {
        let controllers = self.segment_controllers.clone();
        for (index, controller) in controllers.into_iter().enumerate() {
            let observed = resolve_observed_surface(controller.as_ref(), index);
            let root = controller.root_surface();
            let surface = observed.surface.clone();

            let id = self.segments.insert(Segment {
                controller,
                root,
                observed,
                observation: None,
            });
            self.coordinator.prime_surface(surface.as_ref());
            let handler = self.offset_handler();
            let handle = self.observer.register(id, surface, handler);
            if let Some(segment) = self.segments.get_mut(id) {
                segment.observation = Some(handle);
            }
            self.order.push(id);
        }
    }

    fn detach_segments(&mut self) -> usize {
        let mut released = 0;
        for id in self.order.drain(..) {
            let Some(mut segment) = self.segments.remove(id) else {
                continue;
            };
            if let Some(handle) = segment.observation.take() {
                if self.observer.release(handle) {
                    released += 1;
                }
            }
            self.coordinator.forget(id);
        }
        self.active_index = None;
        released
    }

    fn activate_initial(&mut self) -> Result<()> {
        if self.order.is_empty() {
            if let Some(header) = self.header_view.clone() {
                self.coordinator.reset(header.as_ref());
            }
            return Ok(());
        }
        let last = self.order.len() - 1;
        let index = self.options.initial_segment;
        if index > last {
            tracing::warn!(index, last, "initial segment out of range, clamping");
        }
        self.activate(index.min(last))?;
        Ok(())
    }

    fn activate(&mut self, index: usize) -> Result<HandoffReport> {
        let count = self.order.len();
        let incoming = *self
            .order
            .get(index)
            .ok_or(SegmentedError::SegmentOutOfRange { index, count })?;
        let incoming_surface = self
            .segments
            .get(incoming)
            .map(|segment| segment.observed.surface.clone())
            .ok_or(SegmentedError::SegmentOutOfRange { index, count })?;
        let header: Rc<dyn ViewHandle> = match &self.header_view {
            Some(view) => view.clone(),
            None => PlaceholderView::new(),
        };

        let outgoing = self
            .active_index
            .and_then(|active| self.order.get(active).copied())
            .filter(|&id| id != incoming);
        let outgoing_surface: Option<Rc<dyn ScrollSurface>> = outgoing
            .and_then(|id| self.segments.get(id))
            .map(|segment| segment.observed.surface.clone());

        let report = hand_off(
            &mut self.coordinator,
            outgoing.zip(outgoing_surface.as_deref()),
            incoming,
            incoming_surface.as_ref(),
            header.as_ref(),
        );
        self.active_index = Some(index);
        Ok(report)
    }

    /// Re-derive the header from the active segment without switching
    fn resync_active(&mut self) {
        let Some(active) = self.coordinator.active() else {
            return;
        };
        let Some(surface) = self
            .segments
            .get(active)
            .map(|segment| segment.observed.surface.clone())
        else {
            return;
        };
        let Some(header) = self.header_view.clone() else {
            return;
        };
        hand_off(
            &mut self.coordinator,
            None,
            active,
            surface.as_ref(),
            header.as_ref(),
        );
    }

    /// Re-apply insets after header heights changed
    fn refresh_insets(&mut self) {
        let active = self.coordinator.active();
        for &id in &self.order {
            if Some(id) == active {
                continue;
            }
            if let Some(segment) = self.segments.get(id) {
                self.coordinator
                    .settle_inactive(id, segment.observed.surface.as_ref());
            }
        }
        self.resync_active();
    }

    fn apply_configuration(&mut self, request: ConfigureRequest) -> Result<()> {
        if request.is_empty() {
            return Ok(());
        }
        tracing::debug!(?request, "configure");

        let options = request.merged_options(self.options);
        let heights_changed = options.header_view_height != self.options.header_view_height
            || options.header_view_offset_height != self.options.header_view_offset_height;
        self.options = options;
        self.coordinator
            .set_header_heights(options.header_view_height, options.header_view_offset_height);

        let ConfigureRequest {
            header_controller,
            segment_controllers,
            ..
        } = request;
        let header_changed = header_controller.is_some();
        if let Some(header) = header_controller {
            self.header_controller = header;
        }
        let segments_changed = segment_controllers.is_some();
        if let Some(segments) = segment_controllers {
            self.segment_controllers = segments;
        }

        if self.lifecycle != Lifecycle::Loaded {
            return Ok(());
        }

        if header_changed {
            self.attach_header();
        }
        if segments_changed {
            let released = self.detach_segments();
            tracing::debug!(released, "replacing segments");
            self.attach_segments();
            self.activate_initial()?;
        } else if heights_changed {
            self.refresh_insets();
        } else if header_changed {
            self.resync_active();
        }
        self.relayout()
    }

    fn page_for_offset(&self, offset_x: f32) -> Option<usize> {
        let width = self.frames.content_band.width();
        if self.order.is_empty() || width <= 0.0 || !offset_x.is_finite() {
            return None;
        }
        let last = self.order.len() - 1;
        let page = (offset_x / width).round().max(0.0) as usize;
        Some(page.min(last))
    }

    fn relayout(&mut self) -> Result<()> {
        let Some(bounds) = self.bounds else {
            return Ok(());
        };
        let inputs = FrameInputs {
            bounds,
            spacing: self.spacing,
            header_height: self.options.header_view_height,
            header_offset_height: self.options.header_view_offset_height,
            segment_count: self.order.len(),
        };
        let frames = self.frame_manager.compute(&inputs)?;

        let _scope = self.observer.guard().enter();
        if let Some(header) = &self.header_view {
            header.set_frame(frames.header);
            header.set_translation_y(self.coordinator.header_transform().translation_y);
        }
        let roots: SmallVec<[Rc<dyn ScrollSurface>; 8]> = self
            .order
            .iter()
            .filter_map(|id| self.segments.get(*id))
            .map(|segment| segment.root.clone())
            .collect();
        for (root, frame) in roots.iter().zip(&frames.segments) {
            root.set_frame(*frame);
        }

        self.frames = frames;
        Ok(())
    }
}
