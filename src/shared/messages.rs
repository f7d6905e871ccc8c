//! Message types sent from the fetch worker to the preview controller

use image::RgbaImage;

/// Outcome of a receipt image fetch
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// Image downloaded and decoded
    ImageReady(RgbaImage),
    /// Network, HTTP status or decode failure
    Failed(String),
}
