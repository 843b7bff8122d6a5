//! OCR (Optical Character Recognition) engine backends

mod helper;
#[cfg(target_os = "macos")]
mod macos;

use image::DynamicImage;
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::config::RecognitionMode;

#[cfg(target_os = "macos")]
pub use macos::VisionEngine;

/// Bounding box coordinates (normalized 0-1, origin at bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,      // minX (left)
    pub y: f64,      // minY (bottom)
    pub width: f64,  // width
    pub height: f64, // height
}

impl BoundingBox {
    /// Clamps every coordinate to [0, 1] and keeps the box inside the image.
    pub fn clamped(self) -> Self {
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        let width = self.width.clamp(0.0, 1.0).min(1.0 - x);
        let height = self.height.clamp(0.0, 1.0).min(1.0 - y);
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One observation returned by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextFragment {
    /// Recognized strings, best first. Empty when the engine found a region
    /// but no readable text in it.
    pub candidates: Vec<String>,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

impl TextFragment {
    pub fn top_candidate(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

/// What the engine can do, resolved once before the request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineCapabilities {
    pub automatic_language_detection: bool,
}

/// A single recognition request as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub mode: RecognitionMode,
    pub auto_detect_language: bool,
    /// Prioritized recognition languages. `None` leaves the engine default.
    pub languages: Option<Vec<String>>,
}

/// `Ok(None)` means the engine produced no result structure at all.
pub type EngineOutcome = Result<Option<Vec<TextFragment>>, String>;

/// Fired exactly once by the engine when recognition finishes.
pub type Completion = oneshot::Sender<EngineOutcome>;

pub trait RecognitionEngine {
    fn capabilities(&self) -> EngineCapabilities;

    /// Starts recognition of `bitmap` and returns without waiting for it.
    fn submit(&self, bitmap: &DynamicImage, request: EngineRequest, completion: Completion);
}

#[cfg(not(target_os = "macos"))]
#[derive(Debug, Default)]
pub struct VisionEngine;

#[cfg(not(target_os = "macos"))]
impl VisionEngine {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "macos"))]
impl RecognitionEngine for VisionEngine {
    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities::default()
    }

    fn submit(&self, _bitmap: &DynamicImage, _request: EngineRequest, completion: Completion) {
        let _ = completion.send(Err("OCR not implemented for this platform".to_string()));
    }
}
