//! Receipt OCR Preview
//!
//! Shows a receipt image with color-coded boxes around the OCR-detected
//! amounts, receipt numbers, dates and other text of a receipt payload.

mod config;
mod dashboard;
mod error;
mod export;
mod geometry;
mod overlay;
mod preview;
mod shared;
mod storage;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::AppConfig;
use crate::dashboard::DashboardState;
use crate::geometry::{ReceiptPayload, Size};
use crate::preview::fetch::{fetch_image_blocking, load_image_file, resolve_image_url, spawn_fetch};
use crate::preview::{PreviewController, PreviewSettings};

/// Receipt OCR Preview - receipt image with OCR field overlays
#[derive(Parser, Debug)]
#[command(name = "receipt-ocr-preview")]
#[command(about = "Display a receipt image with color-coded OCR field boxes")]
struct Args {
    /// Receipt payload JSON file
    payload: PathBuf,

    /// Endpoint that relative upload paths are resolved against
    #[arg(long)]
    base_url: Option<String>,

    /// Use a local image instead of downloading the payload's upload
    #[arg(long)]
    image: Option<PathBuf>,

    /// Render the annotated receipt to this file and exit
    #[arg(long)]
    render: Option<PathBuf>,

    /// Canvas size for --render, as WIDTHxHEIGHT (default: image size)
    #[arg(long, value_parser = parse_canvas)]
    canvas: Option<Size>,

    /// Zoom factor applied to the canvas
    #[arg(long, default_value = "1.0")]
    zoom: f32,

    /// Configuration file (default: config.toml in the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str())),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = load_or_create_config(args.config.as_deref());
    if let Some(base_url) = &args.base_url {
        config.general.image_base_url = base_url.clone();
    }

    let payload = match ReceiptPayload::from_file(&args.payload) {
        Ok(payload) => Some(payload),
        Err(e) => {
            error!("Failed to load payload {:?}: {}", args.payload, e);
            None
        }
    };

    let mut controller = PreviewController::new(PreviewSettings::from_config(&config));
    if let Some(payload) = &payload {
        controller.load_detections(payload);
    }

    if let Some(output) = &args.render {
        if payload.is_none() {
            bail!("Nothing to render: payload {:?} could not be loaded", args.payload);
        }
        return run_headless(&args, &config, controller, output);
    }

    run_with_dashboard(&args, &config, controller);

    info!("Receipt preview closed");
    Ok(())
}

/// Load configuration from the given file or the user config directory,
/// writing the defaults there when no file exists yet
fn load_or_create_config(explicit: Option<&Path>) -> AppConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match storage::get_config_dir() {
            Ok(dir) => dir.join("config.toml"),
            Err(e) => {
                warn!("No configuration directory: {:#}", e);
                return AppConfig::default();
            }
        },
    };

    if path.exists() {
        match config::load_config(&path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => {
                warn!("Ignoring configuration {:?}: {:#}", path, e);
                return AppConfig::default();
            }
        }
    }

    let config = AppConfig::default();
    match config::save_config(&config, &path) {
        Ok(()) => info!("Wrote default configuration to {:?}", path),
        Err(e) => warn!("Could not write default configuration {:?}: {:#}", path, e),
    }
    config
}

/// Load the receipt image synchronously and write the annotated render
fn run_headless(
    args: &Args,
    config: &AppConfig,
    mut controller: PreviewController,
    output: &Path,
) -> Result<()> {
    let image = match &args.image {
        Some(path) => load_image_file(path)
            .with_context(|| format!("Failed to load image {:?}", path))?,
        None => {
            let upload = controller
                .upload()
                .context("Payload has no \"upload\" path and no --image was given")?;
            let url = resolve_image_url(&config.general.image_base_url, upload)?;
            fetch_image_blocking(&url, config.general.fetch_timeout())?
        }
    };

    let canvas = args
        .canvas
        .unwrap_or_else(|| Size::new(image.width() as f32, image.height() as f32));
    controller.set_image(image);
    controller.on_viewport_changed(canvas, args.zoom);

    export::save_annotated(&controller, output)?;
    Ok(())
}

/// Start the image load and run the preview window
fn run_with_dashboard(args: &Args, config: &AppConfig, mut controller: PreviewController) {
    match &args.image {
        Some(path) => match load_image_file(path) {
            Ok(image) => controller.set_image(image),
            Err(e) => error!("Failed to load image {:?}: {}", path, e),
        },
        None => {
            if let Some(upload) = controller.upload() {
                match resolve_image_url(&config.general.image_base_url, upload) {
                    Ok(url) => {
                        controller.begin_fetch(spawn_fetch(url, config.general.fetch_timeout()));
                    }
                    Err(e) => error!("Cannot download receipt image: {}", e),
                }
            }
        }
    }

    let source_name = args
        .payload
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt".to_string());
    let mut state = DashboardState::new(source_name, config.overlay.enabled);
    state.zoom = controller.clamp_zoom(args.zoom);

    if let Err(e) = dashboard::run_dashboard(controller, state, config) {
        error!("Preview window error: {}", e);
    }
}

/// Parse `WIDTHxHEIGHT`
fn parse_canvas(value: &str) -> std::result::Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", value))?;
    let width: f32 = width.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let height: f32 = height.trim().parse().map_err(|e| format!("invalid height: {}", e))?;

    let size = Size::new(width, height);
    if !size.is_usable() {
        return Err(format!("canvas must be positive, got {:?}", value));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas() {
        assert_eq!(parse_canvas("500x400").unwrap(), Size::new(500.0, 400.0));
        assert_eq!(parse_canvas("390X844").unwrap(), Size::new(390.0, 844.0));
        assert!(parse_canvas("500").is_err());
        assert!(parse_canvas("0x10").is_err());
        assert!(parse_canvas("ax10").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "receipt-ocr-preview",
            "sample.json",
            "--render",
            "out.png",
            "--canvas",
            "500x500",
        ])
        .unwrap();

        assert_eq!(args.payload, PathBuf::from("sample.json"));
        assert_eq!(args.canvas, Some(Size::new(500.0, 500.0)));
        assert!((args.zoom - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_or_create_config(Some(&path));
        assert_eq!(config.general.fetch_timeout_secs, 30);
        assert!(path.exists());

        let written = config::load_config(&path).unwrap();
        assert_eq!(written.general.image_base_url, config.general.image_base_url);
    }

    #[test]
    fn test_invalid_config_is_not_overwritten() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid").unwrap();

        let config = load_or_create_config(Some(&path));
        assert_eq!(config.general.fetch_timeout_secs, 30);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not [valid");
    }

    #[test]
    fn test_missing_explicit_config_falls_back_to_defaults() {
        let config = load_or_create_config(Some(Path::new("/nonexistent/config.toml")));
        assert_eq!(config.general.fetch_timeout_secs, 30);
    }
}
