//! Segment switch handoff
//!
//! Runs whenever the active segment changes, before any further offset event
//! from the incoming segment is trusted:
//!
//! 1. record the outgoing segment's current offset
//! 2. look up the incoming segment's last known offset (0 if never seen)
//! 3. re-derive collapse from that offset and apply it immediately
//! 4. re-apply the incoming surface's top inset
//!
//! Header state is derived per segment at switch time. A header collapsed by
//! one page never stays collapsed over a page that was not scrolled.

use segscroll_core::collapse::{collapse_for_offset, CollapsePhase};
use segscroll_core::events::SegmentId;
use segscroll_core::surface::{ScrollSurface, ViewHandle};

use crate::coordinator::{HeaderCoordinator, HeaderTransform};

/// What a handoff did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandoffReport {
    pub outgoing: Option<SegmentId>,
    /// Offset recorded for the outgoing segment
    pub outgoing_offset: Option<f32>,
    pub incoming: SegmentId,
    /// Offset the incoming collapse was derived from
    pub incoming_offset: f32,
    /// Live offset minus remembered offset for the incoming segment
    pub drift: f32,
    pub transform: HeaderTransform,
    pub phase_change: Option<(CollapsePhase, CollapsePhase)>,
}


/// Make `incoming` the active segment and bring the header in line with it
pub fn hand_off(
    coordinator: &mut HeaderCoordinator,
    outgoing: Option<(SegmentId, &dyn ScrollSurface)>,
    incoming: SegmentId,
    incoming_surface: &dyn ScrollSurface,
    header: &dyn ViewHandle,
) -> HandoffReport {
    let outgoing_offset = outgoing.map(|(segment, surface)| {
        let offset = surface.content_offset();
        coordinator.record_offset(segment, offset);
        offset
    });

    let remembered = coordinator.last_offset(incoming).unwrap_or(0.0);
    let live = incoming_surface.content_offset();
    let drift = if live.is_finite() { live - remembered } else { 0.0 };
    let incoming_offset = if drift != 0.0 {
        // The platform moved the surface while it was off screen
        tracing::debug!(?incoming, remembered, live, "reconciled offset drift");
        coordinator.record_offset(incoming, live);
        live
    } else {
        remembered
    };

    coordinator.set_active(Some(incoming));

    let before = coordinator.phase();
    let collapse = collapse_for_offset(incoming_offset, coordinator.header_height());
    let transform = coordinator.apply_collapse(collapse, incoming_surface, header);
    let after = coordinator.phase();

    tracing::debug!(
        outgoing = ?outgoing.map(|(segment, _)| segment),
        ?incoming,
        incoming_offset,
        collapse,
        "segment handoff"
    );

    HandoffReport {
        outgoing: outgoing.map(|(segment, _)| segment),
        outgoing_offset,
        incoming,
        incoming_offset,
        drift,
        transform,
        phase_change: (before != after).then_some((before, after)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segscroll_core::events::OffsetEvent;
    use segscroll_core::geometry::Spacing;
    use segscroll_core::observer::ReentrancyGuard;
    use segscroll_core::testing::{MemorySurface, MemoryView};
    use slotmap::SlotMap;

    struct Fixture {
        coordinator: HeaderCoordinator,
        segments: Vec<SegmentId>,
        surfaces: Vec<std::rc::Rc<MemorySurface>>,
        header: std::rc::Rc<MemoryView>,
    }

    impl Fixture {
        fn new(header_height: f32) -> Self {
            let mut ids: SlotMap<SegmentId, ()> = SlotMap::with_key();
            let segments: Vec<_> = (0..3).map(|_| ids.insert(())).collect();
            let surfaces = segments.iter().map(|_| MemorySurface::new()).collect();
            let mut coordinator = HeaderCoordinator::new(ReentrancyGuard::new());
            coordinator.set_header_heights(header_height, 0.0);
            coordinator.set_spacing(Spacing::ZERO);
            coordinator.set_active(Some(segments[0]));
            Self {
                coordinator,
                segments,
                surfaces,
                header: MemoryView::new(),
            }
        }

        fn scroll(&mut self, index: usize, offset: f32) {
            self.surfaces[index].scroll_to(offset);
            self.coordinator.on_offset_changed(
                &OffsetEvent::new(self.segments[index], offset),
                self.surfaces[index].as_ref(),
                self.header.as_ref(),
            );
        }

        fn switch(&mut self, from: usize, to: usize) -> HandoffReport {
            hand_off(
                &mut self.coordinator,
                Some((self.segments[from], self.surfaces[from].as_ref())),
                self.segments[to],
                self.surfaces[to].as_ref(),
                self.header.as_ref(),
            )
        }
    }

    #[test]
    fn test_fresh_segment_expands_header() {
        let mut fixture = Fixture::new(200.0);
        fixture.scroll(0, 200.0);
        assert_eq!(fixture.coordinator.phase(), CollapsePhase::Collapsed);

        let report = fixture.switch(0, 1);

        assert_eq!(report.outgoing_offset, Some(200.0));
        assert_eq!(report.incoming_offset, 0.0);
        assert_eq!(report.transform.collapse, 0.0);
        assert_eq!(
            report.phase_change,
            Some((CollapsePhase::Collapsed, CollapsePhase::Expanded))
        );
        assert_eq!(fixture.coordinator.collapse(), 0.0);
        assert_eq!(fixture.surfaces[1].top_inset(), 200.0);
        assert_eq!(fixture.header.translation_y(), 0.0);
    }

    #[test]
    fn test_switching_back_restores_collapse() {
        let mut fixture = Fixture::new(200.0);
        fixture.scroll(0, 300.0);
        fixture.switch(0, 1);
        let report = fixture.switch(1, 0);

        assert_eq!(report.incoming_offset, 300.0);
        assert_eq!(report.transform.collapse, 200.0);
        assert_eq!(fixture.surfaces[0].top_inset(), 0.0);
        assert_eq!(fixture.coordinator.active(), Some(fixture.segments[0]));
    }

    #[test]
    fn test_partial_collapse_carries_per_segment() {
        let mut fixture = Fixture::new(200.0);
        fixture.scroll(0, 80.0);
        fixture.switch(0, 2);
        fixture.scroll(2, 30.0);
        assert_eq!(fixture.coordinator.collapse(), 30.0);

        let report = fixture.switch(2, 0);
        assert_eq!(report.transform.collapse, 80.0);
        assert_eq!(fixture.coordinator.last_offset(fixture.segments[2]), Some(30.0));
    }

    #[test]
    fn test_drift_is_reconciled_from_live_offset() {
        let mut fixture = Fixture::new(200.0);
        fixture.switch(0, 1);
        fixture.scroll(1, 40.0);
        fixture.switch(1, 0);

        // The platform moved segment 1 while it was off screen; nothing
        // observes the fixture's surfaces, so no event reaches the coordinator
        fixture.surfaces[1].scroll_to(120.0);
        let report = fixture.switch(0, 1);

        assert_eq!(report.drift, 80.0);
        assert_eq!(report.incoming_offset, 120.0);
        assert_eq!(report.transform.collapse, 120.0);
        assert_eq!(
            fixture.coordinator.last_offset(fixture.segments[1]),
            Some(120.0)
        );
    }

    #[test]
    fn test_first_activation_has_no_outgoing() {
        let mut fixture = Fixture::new(200.0);
        let report = hand_off(
            &mut fixture.coordinator,
            None,
            fixture.segments[2],
            fixture.surfaces[2].as_ref(),
            fixture.header.as_ref(),
        );
        assert_eq!(report.outgoing, None);
        assert_eq!(report.outgoing_offset, None);
        assert_eq!(report.drift, 0.0);
    }
}
