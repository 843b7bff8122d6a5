//! System interactions (screenshot, OCR)

mod ocr;
mod screenshot;

pub use ocr::{
    BoundingBox, Completion, EngineCapabilities, EngineOutcome, EngineRequest, RecognitionEngine,
    TextFragment, VisionEngine,
};
pub use screenshot::{CaptureError, CaptureRect, ScreenCapture, ScreenCapturer};
