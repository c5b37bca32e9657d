//! Scroll position observation
//!
//! [`ScrollObserver`] keeps exactly one listener per segment on that segment's
//! observed surface. Registration yields an [`ObservationHandle`] that cannot
//! be cloned and is consumed on release, so a registration can be torn down
//! at most once. Anything still registered when the observer is dropped is
//! released then.
//!
//! Offset notifications raised while a [`ReentrancyGuard`] scope is open are
//! dropped. The coordinator opens a scope whenever it writes to a surface, so
//! an inset change that makes the platform report a new offset cannot feed
//! back into the coordinator.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::events::{ListenerToken, OffsetEvent, OffsetHandler, SegmentId, SurfaceListener};
use crate::surface::ScrollSurface;

new_key_type! {
    /// Unique identifier for one observation registration
    pub struct ObservationId;
}

// =========================================================================
// Re-entrancy Guard
// =========================================================================

/// Shared flag marking "the coordinator is writing to a surface right now"
///
/// Cloning shares the same flag. Scopes nest.
#[derive(Clone, Default)]
pub struct ReentrancyGuard {
    depth: Rc<Cell<u32>>,
    suppressed: Rc<Cell<u64>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope; notifications are suppressed until it is dropped
    pub fn enter(&self) -> GuardScope {
        self.depth.set(self.depth.get() + 1);
        GuardScope {
            depth: self.depth.clone(),
        }
    }

    /// Check whether any scope is open
    pub fn is_active(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of notifications dropped because a scope was open
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.get()
    }

    fn record_suppressed(&self) {
        self.suppressed.set(self.suppressed.get() + 1);
    }
}

impl fmt::Debug for ReentrancyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrancyGuard")
            .field("depth", &self.depth.get())
            .field("suppressed", &self.suppressed.get())
            .finish()
    }
}

/// An open guard scope; closes on drop
#[must_use = "the guard closes as soon as the scope is dropped"]
pub struct GuardScope {
    depth: Rc<Cell<u32>>,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

// =========================================================================
// Registrations
// =========================================================================

/// Proof of one live registration
///
/// Not `Clone`: releasing consumes it, so the same registration cannot be
/// released twice through its handle.
#[derive(Debug)]
#[must_use = "an observation handle must be released or the observer torn down"]
pub struct ObservationHandle {
    id: ObservationId,
    segment: SegmentId,
}

impl ObservationHandle {
    pub fn id(&self) -> ObservationId {
        self.id
    }

    pub fn segment(&self) -> SegmentId {
        self.segment
    }
}

struct Registration {
    segment: SegmentId,
    surface: Rc<dyn ScrollSurface>,
    token: ListenerToken,
}

/// Registry of observed surfaces, one per segment
pub struct ScrollObserver {
    registrations: SlotMap<ObservationId, Registration>,
    by_segment: FxHashMap<SegmentId, ObservationId>,
    guard: ReentrancyGuard,
    registered: usize,
    released: usize,
}

impl ScrollObserver {
    pub fn new() -> Self {
        Self::with_guard(ReentrancyGuard::new())
    }

    /// Create an observer sharing an existing guard
    pub fn with_guard(guard: ReentrancyGuard) -> Self {
        Self {
            registrations: SlotMap::with_key(),
            by_segment: FxHashMap::default(),
            guard,
            registered: 0,
            released: 0,
        }
    }

    /// The guard consulted before forwarding any notification
    pub fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    /// Start observing `surface` on behalf of `segment`
    ///
    /// A segment has at most one registration: registering it again first
    /// releases the previous one.
    pub fn register(
        &mut self,
        segment: SegmentId,
        surface: Rc<dyn ScrollSurface>,
        handler: OffsetHandler,
    ) -> ObservationHandle {
        if self.by_segment.contains_key(&segment) {
            tracing::warn!(?segment, "segment registered twice, releasing previous observation");
            self.unregister(segment);
        }

        let guard = self.guard.clone();
        let listener: SurfaceListener = Rc::new(move |offset_y| {
            if guard.is_active() {
                guard.record_suppressed();
                tracing::trace!(?segment, offset_y, "suppressed self-triggered offset change");
                return;
            }
            handler(&OffsetEvent::new(segment, offset_y));
        });

        let token = surface.add_offset_listener(listener);
        let id = self.registrations.insert(Registration {
            segment,
            surface,
            token,
        });
        self.by_segment.insert(segment, id);
        self.registered += 1;

        tracing::trace!(?segment, ?id, "observation registered");
        ObservationHandle { id, segment }
    }

    /// Release a registration through its handle
    ///
    /// Returns false when the registration was already torn down (for example
    /// by [`ScrollObserver::release_all`]).
    pub fn release(&mut self, handle: ObservationHandle) -> bool {
        self.remove(handle.id)
    }

    /// Stop observing a segment. Safe to call any number of times.
    pub fn unregister(&mut self, segment: SegmentId) -> bool {
        match self.by_segment.get(&segment).copied() {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Release every registration, returning how many were live
    pub fn release_all(&mut self) -> usize {
        let ids: SmallVec<[ObservationId; 8]> = self.registrations.keys().collect();
        ids.into_iter().filter(|&id| self.remove(id)).count()
    }

    fn remove(&mut self, id: ObservationId) -> bool {
        let Some(registration) = self.registrations.remove(id) else {
            return false;
        };
        registration
            .surface
            .remove_offset_listener(registration.token);
        if self.by_segment.get(&registration.segment) == Some(&id) {
            self.by_segment.remove(&registration.segment);
        }
        self.released += 1;
        tracing::trace!(segment = ?registration.segment, ?id, "observation released");
        true
    }

    /// Surface observed for a segment
    pub fn surface(&self, segment: SegmentId) -> Option<&Rc<dyn ScrollSurface>> {
        self.by_segment
            .get(&segment)
            .and_then(|&id| self.registrations.get(id))
            .map(|registration| &registration.surface)
    }

    pub fn is_observing(&self, segment: SegmentId) -> bool {
        self.by_segment.contains_key(&segment)
    }

    /// Total registrations ever made
    pub fn registered_count(&self) -> usize {
        self.registered
    }

    /// Total registrations ever released
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Registrations currently live
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// True when every registration has been released exactly once
    pub fn is_balanced(&self) -> bool {
        self.registered == self.released && self.registrations.is_empty()
    }
}

impl Default for ScrollObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScrollObserver {
    fn drop(&mut self) {
        let live = self.release_all();
        if live > 0 {
            tracing::debug!(live, "released observations on drop");
        }
    }
}
