//! Preview Controller
//!
//! Owns everything the receipt preview renders: the detection list, the
//! displayed image, the viewport and the overlay. All methods are called from
//! the UI thread; the only asynchronous input is the fetch receiver drained by
//! [`PreviewController::poll_fetch`].

pub mod fetch;

use crossbeam_channel::{Receiver, TryRecvError};
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::geometry::{Category, Detection, ReceiptPayload, Size};
use crate::overlay::widgets::BoxStyle;
use crate::overlay::{OverlayBox, OverlayRenderer, ViewportTransform};
use crate::shared::FetchEvent;

/// Settings that shape the preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSettings {
    pub style: BoxStyle,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            style: BoxStyle::default(),
            min_zoom: 1.0,
            max_zoom: 6.0,
        }
    }
}

impl PreviewSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let min_zoom = config.overlay.min_zoom.max(f32::EPSILON);
        Self {
            style: BoxStyle {
                border_width: config.overlay.border_width,
            },
            min_zoom,
            max_zoom: config.overlay.max_zoom.max(min_zoom),
        }
    }
}

/// Container size and zoom of the image view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Unzoomed size of the view showing the image
    pub container: Size,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            container: Size::default(),
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Size of the zoomed content the overlay is laid out in
    pub fn displayed_size(&self) -> Size {
        self.container.scaled(self.zoom)
    }
}

/// Rendering context for one receipt preview
pub struct PreviewController {
    settings: PreviewSettings,
    detections: Vec<Detection>,
    upload: Option<String>,
    image: Option<RgbaImage>,
    natural_size: Option<Size>,
    /// Bumped whenever the displayed image changes
    image_generation: u64,
    viewport: Viewport,
    renderer: OverlayRenderer,
    fetch_receiver: Option<Receiver<FetchEvent>>,
    last_error: Option<String>,
}

impl PreviewController {
    pub fn new(settings: PreviewSettings) -> Self {
        let renderer = OverlayRenderer::new(settings.style.clone());
        Self {
            settings,
            detections: Vec::new(),
            upload: None,
            image: None,
            natural_size: None,
            image_generation: 0,
            viewport: Viewport::default(),
            renderer,
            fetch_receiver: None,
            last_error: None,
        }
    }

    /// Replace the detections with those of a payload
    pub fn load_detections(&mut self, payload: &ReceiptPayload) {
        info!(
            "Loaded {} detections ({} with geometry)",
            payload.detections.len(),
            payload.detections.iter().filter(|d| d.is_renderable()).count()
        );
        for category in Category::ALL {
            debug!("  {}: {}", category.section_key(), payload.count(category));
        }
        let out_of_bounds = payload
            .detections
            .iter()
            .filter_map(|d| d.rect)
            .filter(|rect| !rect.is_within_bounds())
            .count();
        if out_of_bounds > 0 {
            debug!("{} rects extend past the image edges", out_of_bounds);
        }

        self.detections = payload.detections.clone();
        self.upload = payload.upload.clone();
        self.redraw();
    }

    /// The image's natural size became available
    pub fn on_image_ready(&mut self, natural_size: Size) {
        debug!("Image ready: {}x{}", natural_size.width, natural_size.height);
        self.natural_size = Some(natural_size);
        self.redraw();
    }

    /// Show a decoded image
    pub fn set_image(&mut self, image: RgbaImage) {
        let (width, height) = image.dimensions();
        self.image = Some(image);
        self.image_generation += 1;
        self.last_error = None;
        self.on_image_ready(Size::new(width as f32, height as f32));
    }

    /// The container was resized or the zoom changed
    pub fn on_viewport_changed(&mut self, container: Size, zoom: f32) {
        let zoom = self.clamp_zoom(zoom);
        let viewport = Viewport { container, zoom };
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.redraw();
    }

    /// Clamp a zoom factor to the configured range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.settings.min_zoom, self.settings.max_zoom)
        } else {
            self.settings.min_zoom
        }
    }

    /// Track an in-flight image fetch
    pub fn begin_fetch(&mut self, receiver: Receiver<FetchEvent>) {
        self.fetch_receiver = Some(receiver);
        self.last_error = None;
    }

    /// Consume fetch results. Returns true if the preview changed.
    pub fn poll_fetch(&mut self) -> bool {
        let Some(receiver) = &self.fetch_receiver else {
            return false;
        };

        match receiver.try_recv() {
            Ok(FetchEvent::ImageReady(image)) => {
                self.fetch_receiver = None;
                info!("Receipt image loaded ({}x{})", image.width(), image.height());
                self.set_image(image);
                true
            }
            Ok(FetchEvent::Failed(reason)) => {
                self.fetch_receiver = None;
                warn!("Receipt image unavailable: {}", reason);
                self.last_error = Some(reason);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.fetch_receiver = None;
                warn!("Image fetch ended without a result");
                self.last_error = Some("Image fetch ended without a result".to_string());
                true
            }
        }
    }

    /// Whether an image fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.fetch_receiver.is_some()
    }

    fn redraw(&mut self) {
        match self.natural_size {
            Some(natural) => {
                self.renderer
                    .redraw(&self.detections, natural, self.viewport.displayed_size())
            }
            // Nothing is drawn before an image exists
            None => self.renderer.clear(),
        }
    }

    #[cfg(test)]
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Detections of a category as (rendered, without geometry)
    pub fn category_counts(&self, category: Category) -> (usize, usize) {
        self.detections
            .iter()
            .filter(|d| d.category == category)
            .fold((0, 0), |(with, without), d| {
                if d.is_renderable() {
                    (with + 1, without)
                } else {
                    (with, without + 1)
                }
            })
    }

    pub fn upload(&self) -> Option<&str> {
        self.upload.as_deref()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn image_generation(&self) -> u64 {
        self.image_generation
    }

    pub fn natural_size(&self) -> Option<Size> {
        self.natural_size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transform(&self) -> Option<ViewportTransform> {
        self.renderer.transform()
    }

    pub fn overlay_boxes(&self) -> &[OverlayBox] {
        self.renderer.boxes()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }
}

impl Default for PreviewController {
    fn default() -> Self {
        Self::new(PreviewSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    const EPS: f32 = 1e-4;

    const PAYLOAD: &str = r#"{
        "upload": "/media/1.jpg",
        "ocr_data_json": {
            "amounts": [
                { "total": { "geometry": { "Width": 0.1, "Top": 0.1, "Height": 0.05, "Left": 0.2 } } }
            ],
            "receipt_numbers": [
                { "no": { "geometry": { "Top": 0.3, "Height": 0.05, "Left": 0.2 } } }
            ],
            "dates": [
                { "date": { "geometry": { "Width": 0.2, "Top": 0.5, "Height": 0.05, "Left": 0.1 } } }
            ],
            "others": [
                { "a": { "geometry": { "Width": 0.2, "Top": 0.6, "Height": 0.05, "Left": 0.1 } } },
                { "b": { "geometry": { "Width": 0.2, "Top": 0.7, "Height": 0.05, "Left": 0.1 } } }
            ]
        }
    }"#;

    fn controller() -> PreviewController {
        let mut controller = PreviewController::default();
        controller.load_detections(&ReceiptPayload::from_json_str(PAYLOAD).unwrap());
        controller
    }

    #[test]
    fn test_no_overlay_before_image() {
        let mut controller = controller();
        controller.on_viewport_changed(Size::new(500.0, 500.0), 1.0);

        assert_eq!(controller.detections().len(), 5);
        assert!(controller.overlay_boxes().is_empty());
        assert!(controller.transform().is_none());
    }

    #[test]
    fn test_image_ready_draws_renderable_detections() {
        let mut controller = controller();
        controller.on_viewport_changed(Size::new(500.0, 500.0), 1.0);
        controller.set_image(RgbaImage::new(1000, 2000));

        let boxes = controller.overlay_boxes();
        assert_eq!(boxes.len(), 4);

        let first = boxes[0].rect;
        assert!((first.x - 175.0).abs() < EPS);
        assert!((first.y - 50.0).abs() < EPS);
        assert!((first.width - 25.0).abs() < EPS);
        assert!((first.height - 25.0).abs() < EPS);
        assert_eq!(controller.category_counts(Category::ReceiptNumber), (0, 1));
        assert_eq!(controller.category_counts(Category::Other), (2, 0));
    }

    #[test]
    fn test_zoom_scales_overlay() {
        let mut controller = controller();
        controller.set_image(RgbaImage::new(1000, 2000));
        controller.on_viewport_changed(Size::new(500.0, 500.0), 2.0);

        let t = controller.transform().unwrap();
        assert!((t.scale - 0.5).abs() < EPS);
        assert!((t.offset_x - 250.0).abs() < EPS);

        let first = controller.overlay_boxes()[0].rect;
        assert!((first.x - 350.0).abs() < EPS);
        assert!((first.y - 100.0).abs() < EPS);
        assert!((first.width - 50.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut controller = controller();
        controller.on_viewport_changed(Size::new(100.0, 100.0), 50.0);
        assert!((controller.viewport().zoom - 6.0).abs() < EPS);

        controller.on_viewport_changed(Size::new(100.0, 100.0), 0.1);
        assert!((controller.viewport().zoom - 1.0).abs() < EPS);

        controller.on_viewport_changed(Size::new(100.0, 100.0), f32::NAN);
        assert!((controller.viewport().zoom - 1.0).abs() < EPS);
    }

    #[test]
    fn test_reload_does_not_accumulate() {
        let mut controller = controller();
        controller.on_viewport_changed(Size::new(300.0, 300.0), 1.0);
        controller.set_image(RgbaImage::new(100, 100));
        let first = controller.overlay_boxes().to_vec();

        controller.load_detections(&ReceiptPayload::from_json_str(PAYLOAD).unwrap());
        controller.on_image_ready(Size::new(100.0, 100.0));

        assert_eq!(controller.overlay_boxes(), first.as_slice());
    }

    #[test]
    fn test_poll_fetch_image_ready() {
        let mut controller = controller();
        let (sender, receiver) = bounded(1);
        controller.begin_fetch(receiver);
        controller.on_viewport_changed(Size::new(500.0, 500.0), 1.0);

        assert!(controller.is_loading());
        assert!(!controller.poll_fetch());

        sender.send(FetchEvent::ImageReady(RgbaImage::new(1000, 2000))).unwrap();
        assert!(controller.poll_fetch());

        assert!(!controller.is_loading());
        assert_eq!(controller.image_generation(), 1);
        assert_eq!(controller.natural_size(), Some(Size::new(1000.0, 2000.0)));
        assert_eq!(controller.overlay_boxes().len(), 4);
    }

    #[test]
    fn test_poll_fetch_failure_renders_nothing() {
        let mut controller = controller();
        let (sender, receiver) = bounded(1);
        controller.begin_fetch(receiver);

        sender.send(FetchEvent::Failed("404".to_string())).unwrap();
        assert!(controller.poll_fetch());

        assert!(!controller.is_loading());
        assert!(controller.image().is_none());
        assert_eq!(controller.last_error(), Some("404"));
        assert!(controller.overlay_boxes().is_empty());
    }

    #[test]
    fn test_poll_fetch_disconnected() {
        let mut controller = controller();
        let (sender, receiver) = bounded::<FetchEvent>(1);
        controller.begin_fetch(receiver);
        drop(sender);

        assert!(controller.poll_fetch());
        assert!(!controller.is_loading());
        assert!(controller.last_error().is_some());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::default();
        config.overlay.border_width = 3.0;
        config.overlay.min_zoom = 2.0;
        config.overlay.max_zoom = 1.0;

        let settings = PreviewSettings::from_config(&config);
        assert!((settings.style.border_width - 3.0).abs() < EPS);
        assert!((settings.min_zoom - 2.0).abs() < EPS);
        assert!((settings.max_zoom - 2.0).abs() < EPS);
    }
}
