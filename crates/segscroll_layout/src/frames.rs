//! Frame computation for the segmented container
//!
//! The container is a column: top spacing, the content band, bottom spacing.
//! The header overlays the top of the content band. Pages sit side by side in
//! the band, one band-width each, so the horizontal pager's content is
//! `segment_count * width` wide.
//!
//! Frames describe the expanded header. Collapse is applied afterwards as a
//! translation and an inset, never by moving frames.

use segscroll_core::geometry::{non_negative, Point, Rect, Size, Spacing};
use taffy::geometry::Size as TaffySize;
use taffy::style::AvailableSpace;

use crate::error::{LayoutError, Result};
use crate::style::LayoutStyle;
use crate::tree::{LayoutNodeId, LayoutTree};

/// Everything frame computation depends on
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInputs {
    /// Container bounds
    pub bounds: Rect,
    /// Host-reserved space above and below the content band
    pub spacing: Spacing,
    /// Collapsible header height
    pub header_height: f32,
    /// Header band that stays visible when collapsed
    pub header_offset_height: f32,
    /// Number of pages in the pager
    pub segment_count: usize,
}

impl FrameInputs {
    /// Copy with every length clamped to `0.0..`
    pub fn sanitized(self) -> Self {
        Self {
            bounds: Rect::from_origin_size(
                self.bounds.origin,
                Size::new(
                    non_negative(self.bounds.width()),
                    non_negative(self.bounds.height()),
                ),
            ),
            spacing: self.spacing.sanitized(),
            header_height: non_negative(self.header_height),
            header_offset_height: non_negative(self.header_offset_height),
            segment_count: self.segment_count,
        }
    }

    /// Full header band: collapsible part plus the pinned offset band
    pub fn header_band_height(&self) -> f32 {
        self.header_height + self.header_offset_height
    }
}

/// Result of one layout pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frames {
    /// Header band in container coordinates
    pub header: Rect,
    /// Paged content band in container coordinates
    pub content_band: Rect,
    /// Page frames in pager-content coordinates (relative to the band)
    pub segments: Vec<Rect>,
    /// Scrollable size of the horizontal pager
    pub pager_content_size: Size,
}

impl Frames {
    /// Page frame for a segment index
    pub fn segment(&self, index: usize) -> Option<Rect> {
        self.segments.get(index).copied()
    }

    /// Horizontal pager offset that shows a page
    pub fn page_offset(&self, index: usize) -> Option<f32> {
        self.segment(index).map(|frame| frame.x())
    }
}

struct Nodes {
    root: LayoutNodeId,
    top_spacer: LayoutNodeId,
    band: LayoutNodeId,
    bottom_spacer: LayoutNodeId,
    header: LayoutNodeId,
    pages: Vec<LayoutNodeId>,
}

/// Computes container frames, caching the last pass
///
/// Pure geometry: computing twice with the same inputs returns identical
/// frames and performs no layout work the second time.
pub struct FrameManager {
    tree: LayoutTree,
    nodes: Option<Nodes>,
    cached: Option<(FrameInputs, Frames)>,
}

impl FrameManager {
    pub fn new() -> Self {
        Self {
            tree: LayoutTree::new(),
            nodes: None,
            cached: None,
        }
    }

    /// Most recent frames, if any pass has run
    pub fn frames(&self) -> Option<&Frames> {
        self.cached.as_ref().map(|(_, frames)| frames)
    }

    /// Forget the cached pass so the next `compute` runs layout again
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Compute frames for the given inputs
    pub fn compute(&mut self, inputs: &FrameInputs) -> Result<Frames> {
        let inputs = inputs.sanitized();
        if let Some((cached_inputs, frames)) = &self.cached {
            if *cached_inputs == inputs {
                return Ok(frames.clone());
            }
        }

        let frames = self.run_layout(&inputs)?;
        tracing::debug!(
            width = inputs.bounds.width(),
            height = inputs.bounds.height(),
            segments = inputs.segment_count,
            band_height = frames.content_band.height(),
            "computed container frames"
        );
        self.cached = Some((inputs, frames.clone()));
        Ok(frames)
    }

    fn ensure_nodes(&mut self) -> Result<()> {
        if self.nodes.is_some() {
            return Ok(());
        }
        let root = self.tree.create_node(LayoutStyle::container(0.0, 0.0))?;
        let top_spacer = self.tree.create_node(LayoutStyle::spacer(0.0))?;
        let band = self.tree.create_node(LayoutStyle::content_band())?;
        let bottom_spacer = self.tree.create_node(LayoutStyle::spacer(0.0))?;
        let header = self.tree.create_node(LayoutStyle::pinned_overlay(0.0, 0.0))?;
        self.tree
            .set_children(root, &[top_spacer, band, bottom_spacer])?;
        self.nodes = Some(Nodes {
            root,
            top_spacer,
            band,
            bottom_spacer,
            header,
            pages: Vec::new(),
        });
        Ok(())
    }

    fn run_layout(&mut self, inputs: &FrameInputs) -> Result<Frames> {
        self.ensure_nodes()?;
        let nodes = self.nodes.as_mut().ok_or(LayoutError::UnknownNode)?;
        let tree = &mut self.tree;

        let width = inputs.bounds.width();
        let height = inputs.bounds.height();

        tree.set_style(nodes.root, LayoutStyle::container(width, height))?;
        tree.set_style(nodes.top_spacer, LayoutStyle::spacer(inputs.spacing.top))?;
        tree.set_style(
            nodes.bottom_spacer,
            LayoutStyle::spacer(inputs.spacing.bottom),
        )?;
        tree.set_style(
            nodes.header,
            LayoutStyle::pinned_overlay(width, inputs.header_band_height()),
        )?;

        while nodes.pages.len() < inputs.segment_count {
            nodes.pages.push(tree.create_node(LayoutStyle::page(width))?);
        }
        while nodes.pages.len() > inputs.segment_count {
            if let Some(page) = nodes.pages.pop() {
                tree.remove_node(page);
            }
        }
        for &page in &nodes.pages {
            tree.set_style(page, LayoutStyle::page(width))?;
        }

        let mut band_children = nodes.pages.clone();
        band_children.push(nodes.header);
        tree.set_children(nodes.band, &band_children)?;

        tree.compute_layout(
            nodes.root,
            TaffySize {
                width: AvailableSpace::Definite(width),
                height: AvailableSpace::Definite(height),
            },
        )?;

        let band_layout = tree.get_layout(nodes.band).ok_or(LayoutError::UnknownNode)?;
        let band_origin = Point::new(
            inputs.bounds.x() + band_layout.location.x,
            inputs.bounds.y() + band_layout.location.y,
        );
        let band_size = Size::new(band_layout.size.width, band_layout.size.height);
        let content_band = Rect::from_origin_size(band_origin, band_size);

        let header_layout = tree
            .get_layout(nodes.header)
            .ok_or(LayoutError::UnknownNode)?;
        let header = Rect::new(
            band_origin.x + header_layout.location.x,
            band_origin.y + header_layout.location.y,
            header_layout.size.width,
            header_layout.size.height,
        );

        let segments = nodes
            .pages
            .iter()
            .map(|&page| {
                tree.get_layout(page)
                    .map(|layout| {
                        Rect::new(
                            layout.location.x,
                            layout.location.y,
                            layout.size.width,
                            layout.size.height,
                        )
                    })
                    .ok_or(LayoutError::UnknownNode)
            })
            .collect::<Result<Vec<_>>>()?;

        let pager_content_size = Size::new(width * segments.len() as f32, band_size.height);

        Ok(Frames {
            header,
            content_band,
            segments,
            pager_content_size,
        })
    }
}

impl Default for FrameManager {
    fn default() -> Self {
        Self::new()
    }
}
