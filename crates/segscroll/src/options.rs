//! Container options and atomic reconfiguration

use std::fmt;
use std::rc::Rc;

use segscroll_core::geometry::non_negative;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::segment::{HeaderController, SegmentController};

/// Numeric container options
///
/// ```toml
/// header_view_height = 200.0
/// header_view_offset_height = 10.0
/// initial_segment = 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmentedOptions {
    /// Collapsible header height. 0 disables collapsing.
    pub header_view_height: f32,
    /// Header band that stays visible when the header is collapsed
    pub header_view_offset_height: f32,
    /// Segment shown first after load
    pub initial_segment: usize,
}

impl Default for SegmentedOptions {
    fn default() -> Self {
        Self {
            header_view_height: 0.0,
            header_view_offset_height: 0.0,
            initial_segment: 0,
        }
    }
}

impl SegmentedOptions {
    /// Parse options from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: SegmentedOptions = toml::from_str(text)?;
        Ok(options.sanitized())
    }

    /// Copy with negative or non-finite heights clamped to zero
    pub fn sanitized(self) -> Self {
        let header_view_height = non_negative(self.header_view_height);
        let header_view_offset_height = non_negative(self.header_view_offset_height);
        if header_view_height != self.header_view_height
            || header_view_offset_height != self.header_view_offset_height
        {
            tracing::warn!(
                requested_height = self.header_view_height,
                requested_offset = self.header_view_offset_height,
                "header heights clamped to zero"
            );
        }
        Self {
            header_view_height,
            header_view_offset_height,
            initial_segment: self.initial_segment,
        }
    }
}

/// A batch of configuration changes applied in one step
///
/// Unset fields keep their current value. Everything set here is applied
/// together and followed by a single relayout.
#[derive(Default)]
pub struct ConfigureRequest {
    pub(crate) header_view_height: Option<f32>,
    pub(crate) header_view_offset_height: Option<f32>,
    pub(crate) initial_segment: Option<usize>,
    pub(crate) header_controller: Option<Option<Rc<dyn HeaderController>>>,
    pub(crate) segment_controllers: Option<Vec<Rc<dyn SegmentController>>>,
}

impl ConfigureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all numeric options at once
    pub fn options(mut self, options: SegmentedOptions) -> Self {
        self.header_view_height = Some(options.header_view_height);
        self.header_view_offset_height = Some(options.header_view_offset_height);
        self.initial_segment = Some(options.initial_segment);
        self
    }

    pub fn header_view_height(mut self, height: f32) -> Self {
        self.header_view_height = Some(height);
        self
    }

    pub fn header_view_offset_height(mut self, height: f32) -> Self {
        self.header_view_offset_height = Some(height);
        self
    }

    pub fn initial_segment(mut self, index: usize) -> Self {
        self.initial_segment = Some(index);
        self
    }

    pub fn header_controller(mut self, header: Rc<dyn HeaderController>) -> Self {
        self.header_controller = Some(Some(header));
        self
    }

    /// Drop the header controller; an empty placeholder takes its place
    pub fn clear_header_controller(mut self) -> Self {
        self.header_controller = Some(None);
        self
    }

    pub fn segment_controllers(mut self, segments: Vec<Rc<dyn SegmentController>>) -> Self {
        self.segment_controllers = Some(segments);
        self
    }

    /// Check whether the request changes anything
    pub fn is_empty(&self) -> bool {
        self.header_view_height.is_none()
            && self.header_view_offset_height.is_none()
            && self.initial_segment.is_none()
            && self.header_controller.is_none()
            && self.segment_controllers.is_none()
    }

    /// Fold the numeric part into existing options
    pub(crate) fn merged_options(&self, current: SegmentedOptions) -> SegmentedOptions {
        SegmentedOptions {
            header_view_height: self
                .header_view_height
                .unwrap_or(current.header_view_height),
            header_view_offset_height: self
                .header_view_offset_height
                .unwrap_or(current.header_view_offset_height),
            initial_segment: self.initial_segment.unwrap_or(current.initial_segment),
        }
        .sanitized()
    }
}

impl fmt::Debug for ConfigureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureRequest")
            .field("header_view_height", &self.header_view_height)
            .field("header_view_offset_height", &self.header_view_offset_height)
            .field("initial_segment", &self.initial_segment)
            .field(
                "header_controller",
                &self.header_controller.as_ref().map(|header| header.is_some()),
            )
            .field(
                "segment_controllers",
                &self.segment_controllers.as_ref().map(Vec::len),
            )
            .finish()
    }
}
