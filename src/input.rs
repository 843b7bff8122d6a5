//! Input resolution: exactly one of a file, stdin, or a screen capture.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::paths;
use crate::system::{CaptureError, CaptureRect, ScreenCapturer};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("Input not properly specified: pass one of --input, --stdin or --capture")]
    NoInput,
    #[error("Input not properly specified: --input, --stdin and --capture are mutually exclusive")]
    ConflictingInputs,
    #[error("--rectangle requires --capture")]
    RectangleWithoutCapture,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read image file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read image data from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("No image data received on stdin")]
    EmptyInput,
    #[error("Failed to decode image from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: image::ImageError,
    },
}

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    FilePath(PathBuf),
    Stdin,
    Capture(Option<CaptureRect>),
}

impl InputSpec {
    /// Validates the raw selectors. No I/O happens here.
    pub fn from_selectors(
        input: Option<PathBuf>,
        stdin: bool,
        capture: bool,
        rectangle: Option<CaptureRect>,
    ) -> Result<Self, UsageError> {
        if rectangle.is_some() && !capture {
            return Err(UsageError::RectangleWithoutCapture);
        }
        match (input, stdin, capture) {
            (Some(path), false, false) => Ok(Self::FilePath(path)),
            (None, true, false) => Ok(Self::Stdin),
            (None, false, true) => Ok(Self::Capture(rectangle)),
            (None, false, false) => Err(UsageError::NoInput),
            _ => Err(UsageError::ConflictingInputs),
        }
    }
}

/// Resolves `path` against the current working directory.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

fn decode(bytes: &[u8], origin: impl Into<String>) -> Result<DynamicImage, InputError> {
    image::load_from_memory(bytes).map_err(|source| InputError::Decode {
        origin: origin.into(),
        source,
    })
}

fn decode_file(path: &Path) -> Result<DynamicImage, InputError> {
    let bytes = fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(bytes = bytes.len(), path = %path.display(), "Read image file");
    decode(&bytes, path.display().to_string())
}

fn decode_reader(mut reader: impl Read) -> Result<DynamicImage, InputError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(InputError::Stdin)?;
    debug!(bytes = bytes.len(), "Read image data from stdin");
    if bytes.is_empty() {
        return Err(InputError::EmptyInput);
    }
    decode(&bytes, "stdin")
}

fn capture_and_decode(
    capturer: &dyn ScreenCapturer,
    rect: Option<CaptureRect>,
) -> Result<DynamicImage, OcrError> {
    let destination = paths::temp_path("capture", "png").map_err(CaptureError::TempFile)?;
    // An early return drops `destination`, which removes the file as well
    capturer.capture(rect, &destination)?;
    let decoded = decode_file(&destination);
    paths::remove_temp_path(destination);
    Ok(decoded?)
}

/// Produces the bitmap for `spec`.
///
/// `stdin` is only read for [`InputSpec::Stdin`] and `capturer` only used for
/// [`InputSpec::Capture`].
pub fn resolve(
    spec: InputSpec,
    stdin: impl Read,
    capturer: &dyn ScreenCapturer,
) -> Result<DynamicImage, OcrError> {
    let bitmap = match spec {
        InputSpec::FilePath(path) => {
            let path = absolute_path(&path).map_err(|source| InputError::Read {
                path: path.clone(),
                source,
            })?;
            decode_file(&path)?
        }
        InputSpec::Stdin => decode_reader(stdin)?,
        InputSpec::Capture(rect) => capture_and_decode(capturer, rect)?,
    };
    info!(
        width = bitmap.width(),
        height = bitmap.height(),
        "Image loaded"
    );
    Ok(bitmap)
}
