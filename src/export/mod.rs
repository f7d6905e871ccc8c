//! Annotated receipt export
//!
//! Renders the current preview (letterboxed image plus overlay outlines) into
//! an RGBA image, for headless use.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;
use tracing::info;

use crate::error::{PreviewError, Result};
use crate::overlay::OverlayBox;
use crate::preview::PreviewController;

/// Letterbox fill used by the CLI renderer
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Render the controller's image and overlay at its displayed size
pub fn render_annotated(controller: &PreviewController, background: Rgba<u8>) -> Result<RgbaImage> {
    let image = controller.image().ok_or(PreviewError::NoImage)?;
    let natural = controller.natural_size().ok_or(PreviewError::NoImage)?;
    let transform = controller.transform().ok_or(PreviewError::NoImage)?;

    let canvas_size = controller.viewport().displayed_size();
    let width = canvas_size.width.round().max(1.0) as u32;
    let height = canvas_size.height.round().max(1.0) as u32;
    let mut canvas = RgbaImage::from_pixel(width, height, background);

    let image_rect = transform.image_rect(natural);
    let scaled_width = image_rect.width.round() as u32;
    let scaled_height = image_rect.height.round() as u32;
    if scaled_width > 0 && scaled_height > 0 {
        let scaled = imageops::resize(image, scaled_width, scaled_height, FilterType::Triangle);
        imageops::overlay(
            &mut canvas,
            &scaled,
            image_rect.x.round() as i64,
            image_rect.y.round() as i64,
        );
    }

    for overlay_box in controller.overlay_boxes() {
        draw_outline(&mut canvas, overlay_box);
    }

    Ok(canvas)
}

/// Render and write a PNG (or any format inferred from the extension)
pub fn save_annotated(controller: &PreviewController, path: &Path) -> Result<()> {
    let canvas = render_annotated(controller, DEFAULT_BACKGROUND)?;
    canvas.save(path)?;
    info!(
        "Wrote {}x{} annotated receipt to {:?}",
        canvas.width(),
        canvas.height(),
        path
    );
    Ok(())
}

/// Stroke a box outline inside its bounds, at least one pixel wide and tall
fn draw_outline(canvas: &mut RgbaImage, overlay_box: &OverlayBox) {
    let color = Rgba(overlay_box.color);
    let thickness = overlay_box.border_width.round().max(1.0) as i32;

    let x = overlay_box.rect.x.round() as i32;
    let y = overlay_box.rect.y.round() as i32;
    let width = (overlay_box.rect.width.round() as i32).max(1);
    let height = (overlay_box.rect.height.round() as i32).max(1);

    for inset in 0..thickness {
        let inner_width = width - 2 * inset;
        let inner_height = height - 2 * inset;
        if inner_width <= 0 || inner_height <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(x + inset, y + inset).of_size(inner_width as u32, inner_height as u32),
            color,
        );
    }
}
