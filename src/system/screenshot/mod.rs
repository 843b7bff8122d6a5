//! Screen capture through the platform capture facility

mod screencapture;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

pub use screencapture::ScreenCapture;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to create temporary file: {0}")]
    TempFile(std::io::Error),
    #[error("Failed to execute screencapture: {0}")]
    Spawn(std::io::Error),
    #[error("screencapture failed with exit code {code}{}", stderr_suffix(.stderr))]
    Failed { code: i32, stderr: String },
    #[error("Screenshot selection cancelled by user")]
    Cancelled,
    #[error("screencapture exited without writing {0}")]
    NoOutput(String),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Screen region in display points, origin at the top-left of the main display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for CaptureRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for CaptureRect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, width, height] = parts.as_slice() else {
            return Err(format!("expected x,y,w,h but got '{}'", s));
        };
        let x = x
            .parse::<i32>()
            .map_err(|e| format!("invalid x '{}': {}", x, e))?;
        let y = y
            .parse::<i32>()
            .map_err(|e| format!("invalid y '{}': {}", y, e))?;
        let width = width
            .parse::<u32>()
            .map_err(|e| format!("invalid width '{}': {}", width, e))?;
        let height = height
            .parse::<u32>()
            .map_err(|e| format!("invalid height '{}': {}", height, e))?;
        if width == 0 || height == 0 {
            return Err("width and height must be greater than zero".to_string());
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }
}

/// Writes a PNG screenshot to `destination`, blocking until the capture ends.
///
/// With a rectangle the region is captured without interaction; without one
/// the user picks a region or window.
pub trait ScreenCapturer {
    fn capture(&self, rect: Option<CaptureRect>, destination: &Path) -> Result<(), CaptureError>;
}
