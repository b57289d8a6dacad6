//! Bubble appearance.

use lumen_types::{CellSize, EdgeInsets, Offset};
use ratatui::style::Color;

/// Dark text color used by both presets.
pub const TOOLTIP_TEXT: Color = Color::Rgb(0x2E, 0x2E, 0x2D);
/// Pale blue background of the default preset.
pub const TOOLTIP_BACKGROUND: Color = Color::Rgb(0xBE, 0xD2, 0xE5);

/// Drop shadow cast by a bubble onto the cells behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    pub offset: Offset,
    pub color: Color,
    /// 0.0 (invisible) ..= 1.0 (opaque).
    pub opacity: f32,
}

impl ShadowStyle {
    pub const fn light() -> Self {
        Self {
            offset: Offset::new(1, 1),
            color: Color::Rgb(0, 0, 0),
            opacity: 0.25,
        }
    }

    pub const fn dark() -> Self {
        Self {
            offset: Offset::new(1, 1),
            color: Color::Rgb(0, 0, 0),
            opacity: 0.6,
        }
    }
}

/// Colors, chrome and spacing of a speech bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleStyle {
    pub text_color: Color,
    pub background_color: Color,
    pub shadow: Option<ShadowStyle>,
    /// Any non-zero radius clips the bubble's corner cells; the arrow also
    /// keeps this distance from the bubble's sides.
    pub corner_radius: u16,
    pub text_insets: EdgeInsets,
    /// Gap between the highlighted area and the tip of the arrow.
    pub y_offset_to_highlighted_area: u16,
    /// Arrow width and height in cells.
    pub arrow_size: CellSize,
}

impl Default for BubbleStyle {
    fn default() -> Self {
        Self {
            text_color: TOOLTIP_TEXT,
            background_color: TOOLTIP_BACKGROUND,
            shadow: None,
            corner_radius: 1,
            text_insets: EdgeInsets::symmetric(1, 2),
            y_offset_to_highlighted_area: 1,
            arrow_size: CellSize::new(3, 1),
        }
    }
}

impl BubbleStyle {
    /// Dark text on a white bubble with a light shadow.
    pub fn white() -> Self {
        Self {
            background_color: Color::Rgb(0xFF, 0xFF, 0xFF),
            shadow: Some(ShadowStyle::light()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_colors(mut self, text: Color, background: Color) -> Self {
        self.text_color = text;
        self.background_color = background;
        self
    }

    #[must_use]
    pub fn with_shadow(mut self, shadow: Option<ShadowStyle>) -> Self {
        self.shadow = shadow;
        self
    }

    #[must_use]
    pub fn with_corner_radius(mut self, radius: u16) -> Self {
        self.corner_radius = radius;
        self
    }

    #[must_use]
    pub fn with_y_offset(mut self, offset: u16) -> Self {
        self.y_offset_to_highlighted_area = offset;
        self
    }

    /// Vertical distance between the bubble body and the highlighted area.
    pub fn highlight_gap(&self) -> i32 {
        i32::from(self.y_offset_to_highlighted_area) + i32::from(self.arrow_size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_in_colors_and_shadow() {
        let default = BubbleStyle::default();
        let white = BubbleStyle::white();

        assert_eq!(default.text_color, white.text_color);
        assert_ne!(default.background_color, white.background_color);
        assert!(default.shadow.is_none());
        assert_eq!(white.shadow, Some(ShadowStyle::light()));
        assert_eq!(default.corner_radius, white.corner_radius);
        assert_eq!(default.text_insets, white.text_insets);
        assert_eq!(default.arrow_size, white.arrow_size);
    }

    #[test]
    fn highlight_gap_adds_arrow_height() {
        let style = BubbleStyle::default().with_y_offset(2);
        assert_eq!(style.highlight_gap(), 3);
    }
}
