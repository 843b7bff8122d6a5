//! Screenshot capture using the macOS screencapture command

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info};

use super::{CaptureError, CaptureRect, ScreenCapturer};

const SCREENCAPTURE_PATH: &str = "/usr/sbin/screencapture";

#[derive(Debug, Clone)]
pub struct ScreenCapture {
    program: PathBuf,
}

impl ScreenCapture {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(SCREENCAPTURE_PATH),
        }
    }

    /// Runs `program` with screencapture's arguments instead of the system binary.
    #[cfg(test)]
    pub(crate) fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for `screencapture`.
///
/// -R<x,y,w,h>: capture the given region, no interaction
/// -i: interactive mode (crosshair for region, space bar for window)
/// -x: disable sound
/// -r: do not add dpi meta data to the image
fn capture_args(rect: Option<CaptureRect>, destination: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = match rect {
        Some(rect) => vec![format!("-R{}", rect).into(), "-x".into()],
        None => vec!["-i".into()],
    };
    args.push("-r".into());
    args.push(destination.as_os_str().to_owned());
    args
}

impl ScreenCapturer for ScreenCapture {
    fn capture(&self, rect: Option<CaptureRect>, destination: &Path) -> Result<(), CaptureError> {
        match rect {
            Some(rect) => debug!(%rect, path = %destination.display(), "Capturing screen region"),
            None => debug!(path = %destination.display(), "Starting interactive screenshot selection"),
        }

        let output = Command::new(&self.program)
            .args(capture_args(rect, destination))
            .output()
            .map_err(CaptureError::Spawn)?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(code, stderr = %stderr, "Screenshot capture failed");
            return Err(CaptureError::Failed { code, stderr });
        }

        // Escape in interactive mode exits 0 and leaves the destination empty
        let written = fs::metadata(destination).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            if rect.is_none() {
                debug!("User cancelled screenshot selection");
                return Err(CaptureError::Cancelled);
            }
            error!(path = %destination.display(), "Screenshot file was not written");
            return Err(CaptureError::NoOutput(destination.display().to_string()));
        }

        info!(bytes = written, path = %destination.display(), "Screenshot captured successfully");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn rect() -> CaptureRect {
        CaptureRect {
            x: 0,
            y: 10,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn test_region_args_are_unattended() {
        let args = capture_args(Some(rect()), Path::new("/tmp/out.png"));
        assert_eq!(args, vec!["-R0,10,640,480", "-x", "-r", "/tmp/out.png"]);
    }

    #[test]
    fn test_interactive_args() {
        let args = capture_args(None, Path::new("/tmp/out.png"));
        assert_eq!(args, vec!["-i", "-r", "/tmp/out.png"]);
    }

    #[test]
    fn test_nonzero_exit_is_failed() {
        let destination = NamedTempFile::new().unwrap();
        let err = ScreenCapture::with_program("/usr/bin/false")
            .capture(None, destination.path())
            .unwrap_err();
        assert!(matches!(err, CaptureError::Failed { code: 1, .. }));
    }

    #[test]
    fn test_interactive_exit_without_image_is_cancelled() {
        let destination = NamedTempFile::new().unwrap();
        let err = ScreenCapture::with_program("/usr/bin/true")
            .capture(None, destination.path())
            .unwrap_err();
        assert!(matches!(err, CaptureError::Cancelled));
    }

    #[test]
    fn test_region_exit_without_image_is_no_output() {
        let destination = NamedTempFile::new().unwrap();
        let err = ScreenCapture::with_program("/usr/bin/true")
            .capture(Some(rect()), destination.path())
            .unwrap_err();
        assert!(matches!(err, CaptureError::NoOutput(_)));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let destination = NamedTempFile::new().unwrap();
        let err = ScreenCapture::with_program("/nonexistent/screencapture")
            .capture(None, destination.path())
            .unwrap_err();
        assert!(matches!(err, CaptureError::Spawn(_)));
    }

    #[test]
    fn test_written_image_is_success() {
        let destination = NamedTempFile::new().unwrap();
        fs::write(destination.path(), b"png").unwrap();
        ScreenCapture::with_program("/usr/bin/true")
            .capture(Some(rect()), destination.path())
            .unwrap();
    }
}
