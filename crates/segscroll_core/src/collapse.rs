//! Header collapse phases
//!
//! The collapse value is derived from a scroll offset with a single clamp.
//! [`CollapseMachine`] tracks which phase that value falls in and runs
//! entry/exit actions when the phase changes:
//!
//! - `Expanded`: collapse == 0, header fully visible
//! - `Collapsing`: 0 < collapse < header height
//! - `Collapsed`: collapse == header height, only the offset band remains
//!
//! An offset exactly equal to the header height is `Collapsed`. Overscroll
//! above the top edge (negative offset) is `Expanded`; the surface's own
//! bounce absorbs it.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::geometry::non_negative;

/// Amount the header is hidden for a given content offset
///
/// `header_height == 0` makes the header inert.
pub fn collapse_for_offset(offset: f32, header_height: f32) -> f32 {
    let limit = non_negative(header_height);
    if offset.is_nan() || offset <= 0.0 {
        return 0.0;
    }
    offset.min(limit)
}

/// Visibility phase of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollapsePhase {
    #[default]
    Expanded,
    Collapsing,
    Collapsed,
}

impl CollapsePhase {
    /// Classify a collapse value against the header height
    pub fn from_collapse(collapse: f32, header_height: f32) -> Self {
        let limit = non_negative(header_height);
        if limit == 0.0 || collapse <= 0.0 {
            CollapsePhase::Expanded
        } else if collapse >= limit {
            CollapsePhase::Collapsed
        } else {
            CollapsePhase::Collapsing
        }
    }

    /// Check if any part of the collapsible band is hidden
    pub fn is_hidden(&self) -> bool {
        !matches!(self, CollapsePhase::Expanded)
    }
}

/// An action run on phase entry or exit
pub type PhaseAction = Box<dyn FnMut()>;

const HISTORY_LIMIT: usize = 64;

/// Tracks the header phase and fires entry/exit actions
pub struct CollapseMachine {
    phase: CollapsePhase,
    collapse: f32,
    entry_callbacks: FxHashMap<CollapsePhase, Vec<PhaseAction>>,
    exit_callbacks: FxHashMap<CollapsePhase, Vec<PhaseAction>>,
    /// Most recent phase transitions (for debugging)
    history: VecDeque<(CollapsePhase, CollapsePhase)>,
}

impl CollapseMachine {
    pub fn new() -> Self {
        Self {
            phase: CollapsePhase::Expanded,
            collapse: 0.0,
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Current phase
    pub fn phase(&self) -> CollapsePhase {
        self.phase
    }

    /// Last collapse value applied
    pub fn collapse(&self) -> f32 {
        self.collapse
    }

    /// Check if we're in a specific phase
    pub fn is_in(&self, phase: CollapsePhase) -> bool {
        self.phase == phase
    }

    /// Get transition history
    pub fn history(&self) -> &VecDeque<(CollapsePhase, CollapsePhase)> {
        &self.history
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Record a new collapse value, returning the transition if the phase changed
    pub fn apply(
        &mut self,
        collapse: f32,
        header_height: f32,
    ) -> Option<(CollapsePhase, CollapsePhase)> {
        self.collapse = collapse;
        let next = CollapsePhase::from_collapse(collapse, header_height);
        let current = self.phase;
        if next == current {
            return None;
        }

        if let Some(callbacks) = self.exit_callbacks.get_mut(&current) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        self.phase = next;
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back((current, next));

        if let Some(callbacks) = self.entry_callbacks.get_mut(&next) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        tracing::trace!(from = ?current, to = ?next, collapse, "header phase changed");
        Some((current, next))
    }

    /// Register an entry callback for a phase
    pub fn on_enter<F: FnMut() + 'static>(&mut self, phase: CollapsePhase, callback: F) {
        self.entry_callbacks
            .entry(phase)
            .or_default()
            .push(Box::new(callback));
    }

    /// Register an exit callback for a phase
    pub fn on_exit<F: FnMut() + 'static>(&mut self, phase: CollapsePhase, callback: F) {
        self.exit_callbacks
            .entry(phase)
            .or_default()
            .push(Box::new(callback));
    }

    /// Phases entered since history was last cleared, in order
    pub fn entered(&self) -> SmallVec<[CollapsePhase; 4]> {
        self.history.iter().map(|&(_, to)| to).collect()
    }
}

impl Default for CollapseMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_collapse_tracks_offset_inside_band() {
        for offset in [0.0, 1.0, 50.0, 199.5, 200.0] {
            assert_eq!(collapse_for_offset(offset, 200.0), offset);
        }
    }

    #[test]
    fn test_collapse_pins_past_band() {
        for offset in [200.1, 300.0, 10_000.0, f32::MAX, f32::INFINITY] {
            assert_eq!(collapse_for_offset(offset, 200.0), 200.0);
        }
    }

    #[test]
    fn test_overscroll_never_collapses() {
        for offset in [-0.5, -80.0, f32::MIN, f32::NEG_INFINITY, f32::NAN] {
            assert_eq!(collapse_for_offset(offset, 200.0), 0.0);
        }
    }

    #[test]
    fn test_zero_height_is_inert() {
        assert_eq!(collapse_for_offset(150.0, 0.0), 0.0);
        assert_eq!(collapse_for_offset(150.0, -20.0), 0.0);
        assert_eq!(
            CollapsePhase::from_collapse(0.0, 0.0),
            CollapsePhase::Expanded
        );
    }

    #[test]
    fn test_phase_boundaries() {
        use CollapsePhase::*;

        assert_eq!(CollapsePhase::from_collapse(0.0, 200.0), Expanded);
        assert_eq!(CollapsePhase::from_collapse(0.1, 200.0), Collapsing);
        assert_eq!(CollapsePhase::from_collapse(199.9, 200.0), Collapsing);
        assert_eq!(CollapsePhase::from_collapse(200.0, 200.0), Collapsed);
    }

    #[test]
    fn test_machine_history() {
        let mut machine = CollapseMachine::new();

        use CollapsePhase::*;

        assert_eq!(machine.apply(50.0, 200.0), Some((Expanded, Collapsing)));
        assert_eq!(machine.apply(80.0, 200.0), None);
        assert_eq!(machine.apply(200.0, 200.0), Some((Collapsing, Collapsed)));
        assert_eq!(machine.apply(0.0, 200.0), Some((Collapsed, Expanded)));

        assert_eq!(
            machine.entered().as_slice(),
            &[Collapsing, Collapsed, Expanded]
        );
        assert_eq!(machine.collapse(), 0.0);

        machine.clear_history();
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_entry_exit_callbacks() {
        let entered = Rc::new(Cell::new(0));
        let exited = Rc::new(Cell::new(0));

        let mut machine = CollapseMachine::new();
        let entered_clone = entered.clone();
        machine.on_enter(CollapsePhase::Collapsed, move || {
            entered_clone.set(entered_clone.get() + 1);
        });
        let exited_clone = exited.clone();
        machine.on_exit(CollapsePhase::Collapsed, move || {
            exited_clone.set(exited_clone.get() + 1);
        });

        machine.apply(200.0, 200.0);
        assert_eq!(entered.get(), 1);
        assert_eq!(exited.get(), 0);

        machine.apply(200.0, 200.0);
        assert_eq!(entered.get(), 1);

        machine.apply(10.0, 200.0);
        assert_eq!(exited.get(), 1);
        assert!(machine.is_in(CollapsePhase::Collapsing));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = CollapseMachine::new();
        for _ in 0..HISTORY_LIMIT {
            machine.apply(200.0, 200.0);
            machine.apply(0.0, 200.0);
        }

        assert_eq!(machine.history().len(), HISTORY_LIMIT);
        assert_eq!(
            machine.history().front(),
            Some(&(CollapsePhase::Expanded, CollapsePhase::Collapsed))
        );
        assert_eq!(
            machine.history().back(),
            Some(&(CollapsePhase::Collapsed, CollapsePhase::Expanded))
        );

        // Oldest entry is evicted, not the newest
        machine.apply(100.0, 200.0);
        assert_eq!(machine.history().len(), HISTORY_LIMIT);
        assert_eq!(
            machine.history().front(),
            Some(&(CollapsePhase::Collapsed, CollapsePhase::Expanded))
        );
        assert_eq!(
            machine.history().back(),
            Some(&(CollapsePhase::Expanded, CollapsePhase::Collapsing))
        );
    }
}
