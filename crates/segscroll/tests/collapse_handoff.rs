//! Collapse and segment handoff through the public container API

mod common;

use common::{loaded, options};
use segscroll::prelude::*;

#[test]
fn test_three_segment_walkthrough() {
    common::init_tracing();
    let (container, header, pages) = loaded(3, options(200.0, 10.0));

    pages[0].root.scroll_to(50.0);
    assert_eq!(container.collapse(), 50.0);
    let transform = container.header_transform();
    assert_eq!(transform.visible_height, 150.0 + 10.0);
    assert_eq!(header.view.translation_y(), -50.0);

    pages[0].root.scroll_to(300.0);
    assert_eq!(container.collapse(), 200.0);
    assert_eq!(container.collapse_phase(), CollapsePhase::Collapsed);

    container.select_segment(1).unwrap();
    assert_eq!(container.collapse(), 0.0);
    assert_eq!(container.collapse_phase(), CollapsePhase::Expanded);
    assert_eq!(header.view.translation_y(), 0.0);

    container.select_segment(0).unwrap();
    assert_eq!(container.collapse(), 200.0);
    assert_eq!(header.view.translation_y(), -200.0);
}

#[test]
fn test_collapse_tracks_offset_within_header_height() {
    let (container, _header, pages) = loaded(1, options(200.0, 10.0));
    let surface = &pages[0].root;

    for offset in [0.0, 1.0, 37.5, 100.0, 199.0, 200.0] {
        surface.scroll_to(offset);
        assert_eq!(container.collapse(), offset);
        assert_eq!(surface.top_inset(), 210.0 - offset);
    }
}

#[test]
fn test_collapse_pins_past_header_height() {
    let (container, _header, pages) = loaded(1, options(200.0, 0.0));
    let surface = &pages[0].root;

    for offset in [200.5, 450.0, 10_000.0, f32::MAX, f32::INFINITY] {
        surface.scroll_to(offset);
        assert_eq!(container.collapse(), 200.0);
        assert_eq!(surface.top_inset(), 0.0);
    }
}

#[test]
fn test_overscroll_keeps_header_expanded() {
    let (container, header, pages) = loaded(1, options(200.0, 10.0));
    let surface = &pages[0].root;

    surface.scroll_to(80.0);
    for offset in [-0.5, -64.0, f32::NEG_INFINITY, f32::NAN] {
        surface.scroll_to(offset);
        assert_eq!(container.collapse(), 0.0);
        assert_eq!(surface.top_inset(), 210.0);
    }
    assert_eq!(header.view.translation_y(), 0.0);
}

#[test]
fn test_offset_equal_to_header_height_is_collapsed() {
    let (container, _header, pages) = loaded(1, options(120.0, 0.0));

    pages[0].root.scroll_to(119.9);
    assert_eq!(container.collapse_phase(), CollapsePhase::Collapsing);
    pages[0].root.scroll_to(120.0);
    assert_eq!(container.collapse_phase(), CollapsePhase::Collapsed);
}

#[test]
fn test_fresh_segment_never_inherits_collapse() {
    let (container, _header, pages) = loaded(2, options(200.0, 0.0));

    pages[0].root.scroll_to(200.0);
    let report = container.select_segment(1).unwrap().unwrap();

    assert_eq!(report.incoming_offset, 0.0);
    assert_eq!(report.transform.collapse, 0.0);
    assert_eq!(
        report.phase_change,
        Some((CollapsePhase::Collapsed, CollapsePhase::Expanded))
    );
    assert_eq!(pages[1].root.top_inset(), 200.0);
}

#[test]
fn test_inactive_segment_scroll_leaves_header_alone() {
    let (container, header, pages) = loaded(2, options(200.0, 0.0));

    pages[0].root.scroll_to(30.0);
    pages[1].root.scroll_to(150.0);

    assert_eq!(container.collapse(), 30.0);
    assert_eq!(header.view.translation_y(), -30.0);
    assert_eq!(container.last_offset(1), Some(150.0));

    container.select_segment(1).unwrap();
    assert_eq!(container.collapse(), 150.0);
}

#[test]
fn test_reload_reconciles_live_offsets() {
    let (container, _header, pages) = loaded(2, options(200.0, 0.0));

    pages[1].root.scroll_to(40.0);
    container.teardown().unwrap();

    // Scrolled while nothing was observing it
    pages[1].root.scroll_to(120.0);
    container.load_view().unwrap();
    assert_eq!(container.last_offset(1), None);

    let report = container.select_segment(1).unwrap().unwrap();
    assert_eq!(report.drift, 120.0);
    assert_eq!(report.incoming_offset, 120.0);
    assert_eq!(container.collapse(), 120.0);
    assert_eq!(container.last_offset(1), Some(120.0));
}

#[test]
fn test_pager_scroll_switches_to_nearest_page() {
    let (container, _header, pages) = loaded(3, options(200.0, 0.0));
    pages[0].root.scroll_to(200.0);

    assert!(container.on_pager_scrolled(150.0).unwrap().is_none());
    let report = container.on_pager_scrolled(200.0).unwrap().unwrap();
    assert_eq!(report.incoming, container.segment_id(1).unwrap());
    assert_eq!(container.active_segment_index(), Some(1));
    assert_eq!(container.collapse(), 0.0);

    container.on_pager_scrolled(5_000.0).unwrap();
    assert_eq!(container.active_segment_index(), Some(2));
    container.on_pager_scrolled(-400.0).unwrap();
    assert_eq!(container.active_segment_index(), Some(0));
    assert_eq!(container.collapse(), 200.0);
}

#[test]
fn test_selecting_unknown_segment_is_an_error() {
    let (container, _header, _pages) = loaded(2, options(200.0, 0.0));

    let err = container.select_segment(5).unwrap_err();
    assert!(matches!(
        err,
        SegmentedError::SegmentOutOfRange { index: 5, count: 2 }
    ));
    assert_eq!(container.active_segment_index(), Some(0));
}

#[test]
fn test_reselecting_active_segment_is_a_no_op() {
    let (container, _header, _pages) = loaded(2, options(200.0, 0.0));
    assert!(container.select_segment(0).unwrap().is_none());
}

#[test]
fn test_zero_height_header_is_inert() {
    let (container, header, pages) = loaded(2, options(0.0, 12.0));

    pages[0].root.scroll_to(500.0);
    assert_eq!(container.collapse(), 0.0);
    assert_eq!(header.view.translation_y(), 0.0);
    assert_eq!(pages[0].root.top_inset(), 12.0);
}

#[test]
fn test_last_value_wins_for_rapid_changes() {
    let (container, header, pages) = loaded(1, options(200.0, 0.0));

    for offset in [10.0, 90.0, 35.0, 170.0, 60.0] {
        pages[0].root.scroll_to(offset);
    }
    assert_eq!(container.collapse(), 60.0);
    assert_eq!(header.view.translation_y(), -60.0);
}

#[test]
fn test_phase_actions_fire_on_transitions() {
    use std::cell::Cell;
    use std::rc::Rc;

    let (container, _header, pages) = loaded(2, options(100.0, 0.0));
    let collapsed = Rc::new(Cell::new(0));
    let counter = collapsed.clone();
    container
        .on_phase_enter(CollapsePhase::Collapsed, move || {
            counter.set(counter.get() + 1)
        })
        .unwrap();

    pages[0].root.scroll_to(50.0);
    pages[0].root.scroll_to(150.0);
    pages[0].root.scroll_to(300.0);
    assert_eq!(collapsed.get(), 1);

    container.select_segment(1).unwrap();
    container.select_segment(0).unwrap();
    assert_eq!(collapsed.get(), 2);
}
