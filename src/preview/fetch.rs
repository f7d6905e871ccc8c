//! Receipt image download
//!
//! Resolves the payload's `upload` path against the configured endpoint and
//! downloads the image with reqwest on a worker thread.

use crossbeam_channel::{bounded, Receiver};
use image::RgbaImage;
use reqwest::Url;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::error::{PreviewError, Result};
use crate::shared::FetchEvent;

/// Build the image URL from the base endpoint and the payload's upload path.
///
/// Absolute upload URLs are used as they are.
pub fn resolve_image_url(base: &str, upload: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(upload) {
        if url.has_host() {
            return Ok(url);
        }
    }

    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        upload.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| PreviewError::InvalidUrl(format!("{}: {}", joined, e)))
}

/// Decode downloaded bytes into an RGBA image
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Load a receipt image from disk
pub fn load_image_file(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Download and decode an image (blocking)
pub fn fetch_image_blocking(url: &Url, timeout: Duration) -> Result<RgbaImage> {
    info!("Downloading receipt image from {}", url);

    let rt = Runtime::new().map_err(|e| PreviewError::Runtime(e.to_string()))?;
    let bytes = rt.block_on(download_bytes(url, timeout))?;
    debug!("Downloaded {} bytes", bytes.len());

    decode_image(&bytes)
}

async fn download_bytes(url: &Url, timeout: Duration) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        return Err(PreviewError::HttpStatus {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}

/// Start a download on a worker thread.
///
/// The returned receiver yields exactly one [`FetchEvent`].
pub fn spawn_fetch(url: Url, timeout: Duration) -> Receiver<FetchEvent> {
    let (sender, receiver) = bounded(1);

    std::thread::spawn(move || {
        let event = match fetch_image_blocking(&url, timeout) {
            Ok(image) => FetchEvent::ImageReady(image),
            Err(e) => {
                warn!("Failed to download image {}: {}", url, e);
                FetchEvent::Failed(e.to_string())
            }
        };
        // The preview may already be closed
        let _ = sender.send(event);
    });

    receiver
}
