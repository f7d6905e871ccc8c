//! Geometry Model
//!
//! Normalized OCR rectangles, categorized detections, and the mapping from
//! fractional geometry to image pixels.

pub mod payload;

pub use payload::ReceiptPayload;

use serde_json::Value;
use tracing::debug;

/// Width/height pair in pixels (or points, for containers)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Multiply both dimensions by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// Rectangle in image pixels or screen coordinates (x, y = top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rectangle expressed as fractions (0.0-1.0) of the full image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self { top, left, width, height }
    }

    /// Whether the rect stays inside the unit square. Out-of-bounds rects are
    /// still rendered.
    pub fn is_within_bounds(&self) -> bool {
        self.top >= 0.0
            && self.left >= 0.0
            && self.top + self.height <= 1.0
            && self.left + self.width <= 1.0
    }
}

/// Convert a normalized rect to image pixels. No clamping is applied.
pub fn to_pixel_rect(rect: &NormalizedRect, image_width: f32, image_height: f32) -> PixelRect {
    PixelRect {
        x: rect.left * image_width,
        y: rect.top * image_height,
        width: rect.width * image_width,
        height: rect.height * image_height,
    }
}

/// Kind of OCR field a detection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Amount,
    ReceiptNumber,
    ReceiptDate,
    Other,
}

impl Category {
    /// All categories, in the order their payload sections are read
    pub const ALL: [Category; 4] = [
        Category::Amount,
        Category::ReceiptNumber,
        Category::ReceiptDate,
        Category::Other,
    ];

    /// Key of this category's array inside `ocr_data_json`
    pub fn section_key(&self) -> &'static str {
        match self {
            Category::Amount => "amounts",
            Category::ReceiptNumber => "receipt_numbers",
            Category::ReceiptDate => "dates",
            Category::Other => "others",
        }
    }

    /// Display name for the legend
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Amount => "Amount",
            Category::ReceiptNumber => "Receipt number",
            Category::ReceiptDate => "Date",
            Category::Other => "Other",
        }
    }

    /// Position in [`Category::ALL`], used to index static tables
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// One OCR-extracted field with optional geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub category: Category,
    /// Key of the single-entry raw record, if the record had one
    pub key: Option<String>,
    /// Absent when the record carried no usable geometry
    pub rect: Option<NormalizedRect>,
}

impl Detection {
    /// Build a detection from one raw record. Never fails: malformed records
    /// produce a detection without a rect.
    pub fn from_record(record: &Value, category: Category) -> Self {
        let Some((key, value)) = single_entry(record) else {
            return Self { category, key: None, rect: None };
        };

        Self {
            category,
            key: Some(key.to_string()),
            rect: parse_geometry(value),
        }
    }

    /// Whether this detection will be drawn
    pub fn is_renderable(&self) -> bool {
        self.rect.is_some()
    }
}

/// Parse an ordered batch of raw records into detections of one category.
///
/// The output always has the same length as the input.
pub fn parse_detections(records: &[Value], category: Category) -> Vec<Detection> {
    records
        .iter()
        .map(|record| Detection::from_record(record, category))
        .collect()
}

/// Extract the first entry of a record object.
///
/// Records are expected to hold exactly one entry; extra entries are ignored.
fn single_entry(record: &Value) -> Option<(&str, &Value)> {
    let map = record.as_object()?;
    if map.len() > 1 {
        debug!("Record has {} entries, reading only the first", map.len());
    }
    map.iter().next().map(|(key, value)| (key.as_str(), value))
}

/// Read `{"geometry": {Width, Top, Height, Left}}` from a record value
fn parse_geometry(value: &Value) -> Option<NormalizedRect> {
    let geometry = value.as_object()?.get("geometry")?.as_object()?;
    let field = |name: &str| geometry.get(name).and_then(Value::as_f64).map(|v| v as f32);

    let width = field("Width")?;
    let top = field("Top")?;
    let height = field("Height")?;
    let left = field("Left")?;
    Some(NormalizedRect::new(top, left, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f32 = 1e-4;

    fn record(top: f64, left: f64, width: f64, height: f64) -> Value {
        json!({
            "total": {
                "text": "12.50",
                "geometry": { "Width": width, "Top": top, "Height": height, "Left": left }
            }
        })
    }

    #[test]
    fn test_to_pixel_rect() {
        let rect = NormalizedRect::new(0.1, 0.2, 0.1, 0.05);
        let px = to_pixel_rect(&rect, 1000.0, 2000.0);

        assert!((px.x - 200.0).abs() < EPS);
        assert!((px.y - 200.0).abs() < EPS);
        assert!((px.width - 100.0).abs() < EPS);
        assert!((px.height - 100.0).abs() < EPS);
    }

    #[test]
    fn test_to_pixel_rect_scales_linearly() {
        let rect = NormalizedRect::new(0.25, 0.5, 0.125, 0.75);
        for (w, h) in [(1.0, 1.0), (640.0, 480.0), (3024.0, 4032.0)] {
            let px = to_pixel_rect(&rect, w, h);
            let doubled = to_pixel_rect(&rect, w * 2.0, h * 2.0);

            assert!((px.x - 0.5 * w).abs() < EPS * w);
            assert!((px.y - 0.25 * h).abs() < EPS * h);
            assert!((doubled.x - 2.0 * px.x).abs() < EPS * w);
            assert!((doubled.height - 2.0 * px.height).abs() < EPS * h);
        }
    }

    #[test]
    fn test_to_pixel_rect_does_not_clamp() {
        let rect = NormalizedRect::new(0.9, 0.8, 0.5, 0.3);
        assert!(!rect.is_within_bounds());

        let px = to_pixel_rect(&rect, 100.0, 100.0);
        assert!((px.x + px.width - 130.0).abs() < EPS);
        assert!((px.y + px.height - 120.0).abs() < EPS);
    }

    #[test]
    fn test_parse_valid_record() {
        let detections = parse_detections(&[record(0.1, 0.2, 0.3, 0.04)], Category::Amount);

        assert_eq!(detections.len(), 1);
        let detection = &detections[0];
        assert_eq!(detection.category, Category::Amount);
        assert_eq!(detection.key.as_deref(), Some("total"));

        let rect = detection.rect.expect("rect should parse");
        assert!((rect.top - 0.1).abs() < EPS);
        assert!((rect.left - 0.2).abs() < EPS);
        assert!((rect.width - 0.3).abs() < EPS);
        assert!((rect.height - 0.04).abs() < EPS);
    }

    #[test]
    fn test_parse_integer_fields() {
        let value = json!({ "k": { "geometry": { "Width": 1, "Top": 0, "Height": 1, "Left": 0 } } });
        let detection = Detection::from_record(&value, Category::Other);
        assert_eq!(detection.rect, Some(NormalizedRect::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_malformed_records_keep_count() {
        let records = vec![
            record(0.1, 0.1, 0.1, 0.1),
            json!({ "a": { "geometry": { "Top": 0.1, "Height": 0.1, "Left": 0.1 } } }),
            json!({ "b": { "geometry": { "Width": "wide", "Top": 0.1, "Height": 0.1, "Left": 0.1 } } }),
            json!({ "c": { "text": "no geometry" } }),
            json!({ "d": "not an object" }),
            json!({}),
            json!(["not", "a", "map"]),
            Value::Null,
        ];

        let detections = parse_detections(&records, Category::ReceiptDate);

        assert_eq!(detections.len(), records.len());
        assert!(detections[0].is_renderable());
        assert!(detections[1..].iter().all(|d| d.rect.is_none()));
        assert_eq!(detections[3].key.as_deref(), Some("c"));
        assert_eq!(detections[5].key, None);
        assert_eq!(detections[7].key, None);
    }

    #[test]
    fn test_multi_entry_record_uses_first_entry() {
        let value = json!({
            "first": { "geometry": { "Width": 0.1, "Top": 0.2, "Height": 0.3, "Left": 0.4 } },
            "second": { "geometry": { "Width": 0.9, "Top": 0.9, "Height": 0.9, "Left": 0.9 } }
        });

        let detection = Detection::from_record(&value, Category::ReceiptNumber);

        assert_eq!(detection.key.as_deref(), Some("first"));
        let rect = detection.rect.unwrap();
        assert!((rect.left - 0.4).abs() < EPS);
    }

    #[test]
    fn test_category_section_keys() {
        let keys: Vec<_> = Category::ALL.iter().map(|c| c.section_key()).collect();
        assert_eq!(keys, vec!["amounts", "receipt_numbers", "dates", "others"]);

        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_size_is_usable() {
        assert!(Size::new(10.0, 20.0).is_usable());
        assert!(!Size::new(0.0, 20.0).is_usable());
        assert!(!Size::new(10.0, -1.0).is_usable());
        assert!(!Size::new(f32::NAN, 1.0).is_usable());
        assert_eq!(Size::new(10.0, 20.0).scaled(2.0), Size::new(20.0, 40.0));
    }
}
