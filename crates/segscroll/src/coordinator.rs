//! Header collapse coordination
//!
//! Owns the single collapse value shared by every segment. Only the active
//! segment moves the header; offsets from other segments are remembered for
//! the next handoff and otherwise ignored.
//!
//! For the active surface:
//!
//! ```text
//! collapse   = clamp(offset, 0, header_height)
//! top inset  = header_height + header_offset_height - collapse
//! header dy  = -collapse
//! ```
//!
//! Every write to a surface or the header happens inside a re-entrancy guard
//! scope, so notifications the platform raises in response are dropped.

use rustc_hash::FxHashMap;
use segscroll_core::collapse::{collapse_for_offset, CollapseMachine, CollapsePhase};
use segscroll_core::events::{OffsetEvent, SegmentId};
use segscroll_core::geometry::{non_negative, Spacing};
use segscroll_core::observer::ReentrancyGuard;
use segscroll_core::surface::{ScrollSurface, ViewHandle};

/// Where the header is drawn for a given collapse
///
/// A pure function of its inputs; never of time or frame count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeaderTransform {
    /// Amount of the collapsible band currently hidden
    pub collapse: f32,
    /// Translation applied to the header view
    pub translation_y: f32,
    /// Rendered top edge in container coordinates
    pub origin_y: f32,
    /// Height of the header still on screen (collapsible remainder + offset band)
    pub visible_height: f32,
}

impl HeaderTransform {
    pub fn compute(
        collapse: f32,
        header_height: f32,
        header_offset_height: f32,
        top_spacing: f32,
    ) -> Self {
        Self {
            collapse,
            translation_y: -collapse,
            origin_y: top_spacing - collapse,
            visible_height: (header_height - collapse).max(0.0) + header_offset_height,
        }
    }
}

/// Owns collapse state and applies it to the header and active surface
pub struct HeaderCoordinator {
    header_height: f32,
    header_offset_height: f32,
    spacing: Spacing,
    active: Option<SegmentId>,
    /// Advisory: used to reconcile on switch, never to drive the header
    last_offsets: FxHashMap<SegmentId, f32>,
    machine: CollapseMachine,
    guard: ReentrancyGuard,
    processed: u64,
}

impl HeaderCoordinator {
    pub fn new(guard: ReentrancyGuard) -> Self {
        Self {
            header_height: 0.0,
            header_offset_height: 0.0,
            spacing: Spacing::ZERO,
            active: None,
            last_offsets: FxHashMap::default(),
            machine: CollapseMachine::new(),
            guard,
            processed: 0,
        }
    }

    /// Set header heights (clamped to `0.0..`)
    pub fn set_header_heights(&mut self, header_height: f32, header_offset_height: f32) {
        self.header_height = non_negative(header_height);
        self.header_offset_height = non_negative(header_offset_height);
    }

    pub fn set_spacing(&mut self, spacing: Spacing) {
        self.spacing = spacing.sanitized();
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn header_offset_height(&self) -> f32 {
        self.header_offset_height
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// True when the header never collapses
    pub fn is_inert(&self) -> bool {
        self.header_height == 0.0
    }

    pub fn active(&self) -> Option<SegmentId> {
        self.active
    }

    pub(crate) fn set_active(&mut self, segment: Option<SegmentId>) {
        self.active = segment;
    }

    pub fn collapse(&self) -> f32 {
        self.machine.collapse()
    }

    pub fn phase(&self) -> CollapsePhase {
        self.machine.phase()
    }

    /// Phase machine, for registering entry/exit actions
    pub fn machine_mut(&mut self) -> &mut CollapseMachine {
        &mut self.machine
    }

    pub fn machine(&self) -> &CollapseMachine {
        &self.machine
    }

    /// Top inset a surface gets while the header is fully expanded
    pub fn base_inset(&self) -> f32 {
        self.header_height + self.header_offset_height
    }

    /// Top inset for the active surface at a given collapse
    pub fn inset_for(&self, collapse: f32) -> f32 {
        self.base_inset() - collapse
    }

    pub fn header_transform(&self) -> HeaderTransform {
        HeaderTransform::compute(
            self.collapse(),
            self.header_height,
            self.header_offset_height,
            self.spacing.top,
        )
    }

    /// Last offset seen for a segment
    pub fn last_offset(&self, segment: SegmentId) -> Option<f32> {
        self.last_offsets.get(&segment).copied()
    }

    pub(crate) fn record_offset(&mut self, segment: SegmentId, offset: f32) {
        self.last_offsets.insert(segment, offset);
    }

    /// Forget everything known about a detached segment
    pub fn forget(&mut self, segment: SegmentId) {
        self.last_offsets.remove(&segment);
        if self.active == Some(segment) {
            self.active = None;
        }
    }

    /// Offset events handled (suppressed ones never reach here)
    pub fn processed_count(&self) -> u64 {
        self.processed
    }

    /// React to an offset change reported for `event.segment`
    ///
    /// `surface` is that segment's observed surface. Returns the new header
    /// transform when the event came from the active segment.
    pub fn on_offset_changed(
        &mut self,
        event: &OffsetEvent,
        surface: &dyn ScrollSurface,
        header: &dyn ViewHandle,
    ) -> Option<HeaderTransform> {
        self.processed += 1;
        self.record_offset(event.segment, event.offset_y);

        if self.active != Some(event.segment) {
            tracing::trace!(segment = ?event.segment, offset_y = event.offset_y, "offset recorded for inactive segment");
            return None;
        }

        let collapse = collapse_for_offset(event.offset_y, self.header_height);
        tracing::trace!(
            offset_y = event.offset_y,
            overscroll = event.is_overscroll(),
            collapse,
            "active segment scrolled"
        );
        Some(self.apply_collapse(collapse, surface, header))
    }

    /// Apply a collapse value to the header and the active surface
    pub(crate) fn apply_collapse(
        &mut self,
        collapse: f32,
        surface: &dyn ScrollSurface,
        header: &dyn ViewHandle,
    ) -> HeaderTransform {
        self.machine.apply(collapse, self.header_height);
        let transform = self.header_transform();
        let inset = self.inset_for(collapse);

        let _scope = self.guard.enter();
        header.set_translation_y(transform.translation_y);
        if surface.top_inset() != inset {
            surface.set_top_inset(inset);
        }
        transform
    }

    /// Expand the header with no active segment (empty segment list)
    pub(crate) fn reset(&mut self, header: &dyn ViewHandle) {
        self.machine.apply(0.0, self.header_height);
        let _scope = self.guard.enter();
        header.set_translation_y(0.0);
    }

    /// Give an inactive surface the inset matching its own remembered offset
    pub(crate) fn settle_inactive(&self, segment: SegmentId, surface: &dyn ScrollSurface) {
        let offset = self
            .last_offset(segment)
            .unwrap_or_else(|| surface.content_offset());
        let inset = self.inset_for(collapse_for_offset(offset, self.header_height));
        let _scope = self.guard.enter();
        surface.set_top_inset(inset);
    }

    /// Give a newly attached surface the expanded inset
    pub(crate) fn prime_surface(&self, surface: &dyn ScrollSurface) {
        let _scope = self.guard.enter();
        surface.set_top_inset(self.base_inset());
    }
}
