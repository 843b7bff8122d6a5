//! macOS-specific OCR implementation using Swift script with Vision framework

use std::ffi::OsString;
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, warn};

use super::helper::{self, AUTO_DETECT_MIN_MACOS};
use super::{Completion, EngineCapabilities, EngineRequest, RecognitionEngine};

const SWIFT_PROGRAM: &str = "swift";

/// Apple Vision text recognition, run through `swift` and an embedded helper script.
#[derive(Debug, Clone)]
pub struct VisionEngine {
    capabilities: EngineCapabilities,
    swift: OsString,
}

impl VisionEngine {
    /// Probes the running macOS version once to decide which Vision features are available.
    pub fn new() -> Self {
        let major = macos_major_version();
        let capabilities = EngineCapabilities {
            automatic_language_detection: major.is_some_and(|v| v >= AUTO_DETECT_MIN_MACOS),
        };
        debug!(macos_major = ?major, ?capabilities, "Resolved Vision capabilities");
        Self {
            capabilities,
            swift: OsString::from(SWIFT_PROGRAM),
        }
    }
}

impl Default for VisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn macos_major_version() -> Option<u32> {
    let output = Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .map_err(|e| warn!(error = %e, "Failed to execute sw_vers"))
        .ok()?;
    if !output.status.success() {
        warn!(code = ?output.status.code(), "sw_vers failed");
        return None;
    }
    helper::parse_macos_major(&String::from_utf8_lossy(&output.stdout))
}

impl RecognitionEngine for VisionEngine {
    fn capabilities(&self) -> EngineCapabilities {
        self.capabilities
    }

    fn submit(&self, bitmap: &DynamicImage, request: EngineRequest, completion: Completion) {
        let png = match helper::encode_png(bitmap) {
            Ok(png) => png,
            Err(e) => {
                let _ = completion.send(Err(e));
                return;
            }
        };

        let swift = self.swift.clone();
        std::thread::spawn(move || {
            let outcome = helper::run_helper(&swift, &png, &request);
            if completion.send(outcome).is_err() {
                warn!("Recognition result dropped: receiver is gone");
            }
        });
    }
}
