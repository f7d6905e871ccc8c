//! Dashboard view state

/// UI-only state of the preview window
pub struct DashboardState {
    /// Name shown in the toolbar (payload file name)
    pub source_name: String,
    /// Requested zoom factor, clamped by the controller
    pub zoom: f32,
    /// Draw detection boxes over the image
    pub show_overlays: bool,
    /// Uploaded texture of the receipt image
    pub texture: Option<egui::TextureHandle>,
    /// Controller image generation the texture was built from
    pub texture_generation: u64,
}

impl std::fmt::Debug for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardState")
            .field("source_name", &self.source_name)
            .field("zoom", &self.zoom)
            .field("show_overlays", &self.show_overlays)
            .field("texture", &self.texture.as_ref().map(|_| "<texture>"))
            .field("texture_generation", &self.texture_generation)
            .finish()
    }
}

impl DashboardState {
    pub fn new(source_name: impl Into<String>, show_overlays: bool) -> Self {
        Self {
            source_name: source_name.into(),
            zoom: 1.0,
            show_overlays,
            texture: None,
            texture_generation: 0,
        }
    }
}
