//! Rendering recognized fragments as plain text or JSON.

use serde::Serialize;

use crate::config::OutputFormat;
use crate::system::{BoundingBox, TextFragment};

/// Pixel-space rectangle, origin at the top-left of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Position {
    /// Converts a normalized bottom-left-origin box into pixels for an image
    /// of `width` x `height`.
    pub fn from_normalized(bbox: &BoundingBox, width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self {
            left: (bbox.x * w).round() as i64,
            top: ((1.0 - bbox.y - bbox.height) * h).round() as i64,
            width: (bbox.width * w).round() as i64,
            height: (bbox.height * h).round() as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrRecord {
    pub id: String,
    pub text: String,
    pub position: Position,
}

/// Top candidates joined by single spaces; fragments without one are skipped.
pub fn format_text(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .filter_map(TextFragment::top_candidate)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One record per fragment with a candidate. Ids follow the fragment's
/// position in the engine output, starting at "1".
pub fn json_records(fragments: &[TextFragment], width: u32, height: u32) -> Vec<OcrRecord> {
    fragments
        .iter()
        .enumerate()
        .filter_map(|(index, fragment)| {
            let text = fragment.top_candidate()?;
            Some(OcrRecord {
                id: (index + 1).to_string(),
                text: text.to_string(),
                position: Position::from_normalized(&fragment.bounding_box, width, height),
            })
        })
        .collect()
}

pub fn format_json(
    fragments: &[TextFragment],
    width: u32,
    height: u32,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&json_records(fragments, width, height))
}

pub fn format(
    fragments: &[TextFragment],
    output: OutputFormat,
    dimensions: (u32, u32),
) -> Result<String, serde_json::Error> {
    match output {
        OutputFormat::Text => Ok(format_text(fragments)),
        OutputFormat::Json => format_json(fragments, dimensions.0, dimensions.1),
    }
}
