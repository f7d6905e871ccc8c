//! Receipt payload decoding
//!
//! Reads the `upload` image path and the four `ocr_data_json` sections from
//! the receipt JSON document. Missing keys are skipped, not errors.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::geometry::{parse_detections, Category, Detection};

/// Decoded receipt payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptPayload {
    /// Relative or absolute image location
    pub upload: Option<String>,
    /// Detections from all sections, in section order
    pub detections: Vec<Detection>,
}

impl ReceiptPayload {
    /// Parse a payload from JSON text. Only invalid JSON is an error.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(&value))
    }

    /// Read and parse a payload file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Build a payload from an already-decoded JSON document
    pub fn from_value(value: &Value) -> Self {
        let upload = value.get("upload").and_then(Value::as_str).map(str::to_string);
        if upload.is_none() {
            info!("Payload has no \"upload\" path, no image will be shown");
        }

        let detections = match value.get("ocr_data_json").and_then(Value::as_object) {
            Some(ocr_data) => {
                let mut detections = Vec::new();
                for category in Category::ALL {
                    match ocr_data.get(category.section_key()).and_then(Value::as_array) {
                        Some(records) => detections.extend(parse_detections(records, category)),
                        None => debug!("Section {:?} missing", category.section_key()),
                    }
                }
                detections
            }
            None => {
                info!("Payload has no \"ocr_data_json\" object, no overlays will be shown");
                Vec::new()
            }
        };

        Self { upload, detections }
    }

    /// Number of detections in a category
    pub fn count(&self, category: Category) -> usize {
        self.detections.iter().filter(|d| d.category == category).count()
    }
}
