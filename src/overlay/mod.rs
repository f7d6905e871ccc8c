//! Overlay Renderer
//!
//! Maps detections onto the aspect-fit image shown inside a container and
//! keeps the list of drawn boxes. Every redraw replaces the whole list.

pub mod widgets;

use tracing::debug;

use crate::geometry::{to_pixel_rect, Category, Detection, PixelRect, Size};
use crate::overlay::widgets::{category_color, BoxStyle, Rgba};

/// Scale and centering offsets mapping natural image pixels into a container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewportTransform {
    /// Aspect-fit transform of an image of `natural` size inside `container`.
    ///
    /// Returns `None` when the natural size is unavailable (zero, negative or
    /// non-finite).
    pub fn compute(natural: Size, container: Size) -> Option<Self> {
        if !natural.is_usable() {
            return None;
        }

        let scale_w = container.width / natural.width;
        let scale_h = container.height / natural.height;
        let scale = scale_w.min(scale_h);

        Some(Self {
            scale,
            offset_x: (container.width - natural.width * scale) / 2.0,
            offset_y: (container.height - natural.height * scale) / 2.0,
        })
    }

    /// Map a rect in natural image pixels to container coordinates
    pub fn apply(&self, rect: &PixelRect) -> PixelRect {
        PixelRect {
            x: rect.x * self.scale + self.offset_x,
            y: rect.y * self.scale + self.offset_y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }

    /// Rect occupied by the scaled image itself
    pub fn image_rect(&self, natural: Size) -> PixelRect {
        PixelRect {
            x: self.offset_x,
            y: self.offset_y,
            width: natural.width * self.scale,
            height: natural.height * self.scale,
        }
    }
}

/// One outlined rectangle on the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub category: Category,
    /// Record key of the detection, for hover labels
    pub label: Option<String>,
    pub rect: PixelRect,
    pub color: Rgba,
    pub border_width: f32,
}

/// Holds the currently drawn overlay boxes
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: BoxStyle,
    transform: Option<ViewportTransform>,
    boxes: Vec<OverlayBox>,
}

impl OverlayRenderer {
    pub fn new(style: BoxStyle) -> Self {
        Self {
            style,
            transform: None,
            boxes: Vec::new(),
        }
    }

    /// Remove every drawn box
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.transform = None;
    }

    /// Recompute all boxes for the given image and container sizes.
    ///
    /// A no-op (empty overlay) when the natural size is unavailable.
    pub fn redraw(&mut self, detections: &[Detection], natural: Size, container: Size) {
        self.clear();

        let Some(transform) = ViewportTransform::compute(natural, container) else {
            debug!("Natural image size unavailable, overlay left empty");
            return;
        };
        self.transform = Some(transform);

        for detection in detections {
            let Some(rect) = detection.rect else {
                continue;
            };
            let pixel_rect = to_pixel_rect(&rect, natural.width, natural.height);
            self.boxes.push(OverlayBox {
                category: detection.category,
                label: detection.key.clone(),
                rect: transform.apply(&pixel_rect),
                color: category_color(detection.category),
                border_width: self.style.border_width,
            });
        }

        debug!(
            "Redrew {} overlay boxes (scale {:.3}, offset {:.1}, {:.1})",
            self.boxes.len(),
            transform.scale,
            transform.offset_x,
            transform.offset_y
        );
    }

    /// Boxes in detection order
    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    /// Transform used by the last successful redraw
    pub fn transform(&self) -> Option<ViewportTransform> {
        self.transform
    }
}
