//! Layout style helpers

use taffy::geometry::{Rect, Size};
use taffy::style::{
    Dimension, Display, FlexDirection, LengthPercentageAuto, Position, Style,
};

/// Helper to create the styles the container tree is built from
pub struct LayoutStyle;

impl LayoutStyle {
    /// Create a fixed size style
    pub fn fixed_size(width: f32, height: f32) -> Style {
        Style {
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Length(height),
            },
            ..Default::default()
        }
    }

    /// Root column filling the container bounds
    pub fn container(width: f32, height: f32) -> Style {
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            ..Self::fixed_size(width, height)
        }
    }

    /// Rigid vertical gap (host top/bottom spacing)
    pub fn spacer(height: f32) -> Style {
        Style {
            size: Size {
                width: Dimension::Auto,
                height: Dimension::Length(height),
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    /// Row that takes whatever height the spacers leave
    pub fn content_band() -> Style {
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Row,
            flex_grow: 1.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Length(0.0),
            min_size: Size {
                width: Dimension::Length(0.0),
                height: Dimension::Length(0.0),
            },
            ..Default::default()
        }
    }

    /// One page of the horizontal pager; stretches to the band height
    pub fn page(width: f32) -> Style {
        Style {
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Auto,
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    /// Header pinned to the band's top-left corner, outside the flex flow
    pub fn pinned_overlay(width: f32, height: f32) -> Style {
        Style {
            position: Position::Absolute,
            inset: Rect {
                left: LengthPercentageAuto::Length(0.0),
                right: LengthPercentageAuto::Auto,
                top: LengthPercentageAuto::Length(0.0),
                bottom: LengthPercentageAuto::Auto,
            },
            ..Self::fixed_size(width, height)
        }
    }
}
