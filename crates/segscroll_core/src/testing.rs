//! In-memory views and surfaces for tests and headless hosts.
//!
//! [`MemorySurface`] behaves like a platform scroll view reduced to its
//! observable state: an offset, an inset, a frame and a listener list. With
//! [`MemorySurface::set_echo_inset_changes`] enabled it mimics platforms that
//! report an offset change from inside an inset change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::events::{ListenerToken, SurfaceListener};
use crate::geometry::Rect;
use crate::surface::{ScrollSurface, ViewHandle};

/// A plain positioned view (used for headers)
#[derive(Debug, Default)]
pub struct MemoryView {
    frame: Cell<Rect>,
    translation_y: Cell<f32>,
    frame_writes: Cell<usize>,
}

impl MemoryView {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Last vertical translation applied
    pub fn translation_y(&self) -> f32 {
        self.translation_y.get()
    }

    /// Number of `set_frame` calls received
    pub fn frame_writes(&self) -> usize {
        self.frame_writes.get()
    }
}

impl ViewHandle for MemoryView {
    fn set_frame(&self, frame: Rect) {
        self.frame.set(frame);
        self.frame_writes.set(self.frame_writes.get() + 1);
    }

    fn frame(&self) -> Rect {
        self.frame.get()
    }

    fn set_translation_y(&self, dy: f32) {
        self.translation_y.set(dy);
    }
}

/// A scroll surface that lives entirely in memory
#[derive(Default)]
pub struct MemorySurface {
    view: MemoryView,
    offset: Cell<f32>,
    top_inset: Cell<f32>,
    inset_writes: Cell<usize>,
    echo_inset_changes: Cell<bool>,
    listeners: RefCell<Vec<(ListenerToken, SurfaceListener)>>,
    next_token: Cell<u64>,
    attached: Cell<usize>,
    detached: Cell<usize>,
}

impl MemorySurface {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Report offset changes from inside `set_top_inset`
    pub fn set_echo_inset_changes(&self, echo: bool) {
        self.echo_inset_changes.set(echo);
    }

    /// Move the content as a user drag would, notifying listeners
    pub fn scroll_to(&self, offset: f32) {
        self.offset.set(offset);
        self.notify();
    }

    fn notify(&self) {
        let offset = self.offset.get();
        // Listeners may attach or detach while being called
        let listeners: SmallVec<[SurfaceListener; 2]> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(offset);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of listeners ever attached
    pub fn attach_count(&self) -> usize {
        self.attached.get()
    }

    /// Number of listeners ever detached
    pub fn detach_count(&self) -> usize {
        self.detached.get()
    }

    /// Number of `set_top_inset` calls received
    pub fn inset_writes(&self) -> usize {
        self.inset_writes.get()
    }

    pub fn translation_y(&self) -> f32 {
        self.view.translation_y()
    }
}

impl ViewHandle for MemorySurface {
    fn set_frame(&self, frame: Rect) {
        self.view.set_frame(frame);
    }

    fn frame(&self) -> Rect {
        self.view.frame()
    }

    fn set_translation_y(&self, dy: f32) {
        self.view.set_translation_y(dy);
    }
}

impl ScrollSurface for MemorySurface {
    fn content_offset(&self) -> f32 {
        self.offset.get()
    }

    fn top_inset(&self) -> f32 {
        self.top_inset.get()
    }

    fn set_top_inset(&self, inset: f32) {
        let previous = self.top_inset.replace(inset);
        self.inset_writes.set(self.inset_writes.get() + 1);
        if self.echo_inset_changes.get() && previous != inset {
            self.notify();
        }
    }

    fn add_offset_listener(&self, listener: SurfaceListener) -> ListenerToken {
        let token = ListenerToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.listeners.borrow_mut().push((token, listener));
        self.attached.set(self.attached.get() + 1);
        token
    }

    fn remove_offset_listener(&self, token: ListenerToken) {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != token);
        if listeners.len() != before {
            self.detached.set(self.detached.get() + 1);
        }
    }
}
