//! Overlay box styling

use crate::geometry::Category;

/// RGBA color, 8 bits per channel
pub type Rgba = [u8; 4];

pub const BLUE: Rgba = [0, 0, 255, 255];
pub const ORANGE: Rgba = [255, 128, 0, 255];
pub const GREEN: Rgba = [0, 255, 0, 255];

/// Outline color per category, indexed by [`Category::index`].
/// Receipt numbers and other text intentionally share orange.
pub const CATEGORY_COLORS: [Rgba; 4] = [BLUE, ORANGE, GREEN, ORANGE];

/// Outline color for a category
pub fn category_color(category: Category) -> Rgba {
    CATEGORY_COLORS[category.index()]
}

/// Style configuration for overlay boxes
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    /// Outline width in screen pixels
    pub border_width: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self { border_width: 2.0 }
    }
}
