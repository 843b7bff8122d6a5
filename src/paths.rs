//! Temporary files for captures and the recognition helper.

use std::io;

use tempfile::TempPath;
use tracing::{debug, warn};

const TEMP_FILE_PREFIX: &str = "macocr";

/// Creates an empty file `${TMPDIR}/macocr-<purpose>-XXXXXX.<extension>`.
///
/// The file is removed when the returned path is dropped.
pub fn temp_path(purpose: &str, extension: &str) -> io::Result<TempPath> {
    let path = tempfile::Builder::new()
        .prefix(&format!("{}-{}-", TEMP_FILE_PREFIX, purpose))
        .suffix(&format!(".{}", extension))
        .tempfile()?
        .into_temp_path();
    debug!(path = %path.display(), "Created temporary file");
    Ok(path)
}

/// Removes `path` now, logging instead of failing.
pub fn remove_temp_path(path: TempPath) {
    let path_str = path.display().to_string();
    match path.close() {
        Ok(()) => debug!(path = %path_str, "Removed temporary file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, path = %path_str, "Failed to remove temporary file"),
    }
}
