//! Shared fixtures for container integration tests

#![allow(dead_code)]

use std::rc::Rc;

use segscroll::prelude::*;
use segscroll_core::testing::{MemorySurface, MemoryView};

pub const PHONE: Rect = Rect::new(0.0, 0.0, 375.0, 812.0);

/// Segment whose root view is the scroll surface
pub struct Page {
    pub root: Rc<MemorySurface>,
    pub title: &'static str,
}

impl Page {
    pub fn new(title: &'static str) -> Rc<Self> {
        Rc::new(Self {
            root: MemorySurface::new(),
            title,
        })
    }
}

impl SegmentController for Page {
    fn root_surface(&self) -> Rc<dyn ScrollSurface> {
        self.root.clone()
    }

    fn title(&self) -> Option<String> {
        Some(self.title.to_string())
    }
}

/// Segment backed by a grid inside a non-scrolling root
pub struct GridPage {
    pub root: Rc<MemorySurface>,
    pub grid: Rc<MemorySurface>,
}

impl GridPage {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            root: MemorySurface::new(),
            grid: MemorySurface::new(),
        })
    }
}

impl SegmentController for GridPage {
    fn root_surface(&self) -> Rc<dyn ScrollSurface> {
        self.root.clone()
    }

    fn grid_surface(&self) -> Option<Rc<dyn ScrollSurface>> {
        Some(self.grid.clone())
    }
}

/// Segment that names its own observed surface
pub struct CustomPage {
    pub root: Rc<MemorySurface>,
    pub list: Rc<MemorySurface>,
}

impl CustomPage {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            root: MemorySurface::new(),
            list: MemorySurface::new(),
        })
    }
}

impl SegmentController for CustomPage {
    fn root_surface(&self) -> Rc<dyn ScrollSurface> {
        self.root.clone()
    }

    fn view_to_observe(&self, _index: usize) -> Option<Rc<dyn ScrollSurface>> {
        Some(self.list.clone())
    }
}

pub struct Header {
    pub view: Rc<MemoryView>,
}

impl Header {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            view: MemoryView::new(),
        })
    }
}

impl HeaderController for Header {
    fn view(&self) -> Rc<dyn ViewHandle> {
        self.view.clone()
    }
}

pub fn options(header_view_height: f32, header_view_offset_height: f32) -> SegmentedOptions {
    SegmentedOptions {
        header_view_height,
        header_view_offset_height,
        initial_segment: 0,
    }
}

pub fn as_segments(pages: &[Rc<Page>]) -> Vec<Rc<dyn SegmentController>> {
    pages
        .iter()
        .map(|page| page.clone() as Rc<dyn SegmentController>)
        .collect()
}

/// Loaded container with a header and `count` plain pages
pub fn loaded(
    count: usize,
    options: SegmentedOptions,
) -> (SegmentedViewController, Rc<Header>, Vec<Rc<Page>>) {
    const TITLES: [&str; 4] = ["Posts", "Photos", "Likes", "About"];
    let header = Header::new();
    let pages: Vec<_> = (0..count).map(|i| Page::new(TITLES[i % TITLES.len()])).collect();
    let container = SegmentedViewController::with_controllers(
        Some(header.clone()),
        as_segments(&pages),
        options,
    );
    container.load_view().unwrap();
    container.view_did_layout(PHONE, Spacing::ZERO).unwrap();
    (container, header, pages)
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
