//! Command-line and JSON protocol of the Swift Vision helper.
//!
//! The helper is invoked as
//! `swift recognize_text.swift <image> --level <fast|accurate>
//! [--auto-detect-language] [--languages a,b]` and prints
//! `{"observations": [{"candidates": [..], "confidence": f, "bounding_box": {..}}]}`.
//! A missing `observations` key means Vision returned no result structure.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{EngineOutcome, EngineRequest, TextFragment};
use crate::paths;

/// Swift source of the helper, written to a temporary file before each run.
pub const HELPER_SOURCE: &str = include_str!("recognize_text.swift");

/// First macOS release whose Vision supports `automaticallyDetectsLanguage`.
pub const AUTO_DETECT_MIN_MACOS: u32 = 13;

#[derive(Debug, Deserialize)]
struct HelperOutput {
    #[serde(default)]
    observations: Option<Vec<TextFragment>>,
}

pub fn helper_args(script: &Path, image: &Path, request: &EngineRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        script.as_os_str().to_owned(),
        image.as_os_str().to_owned(),
        "--level".into(),
        request.mode.as_str().into(),
    ];
    if request.auto_detect_language {
        args.push("--auto-detect-language".into());
    }
    if let Some(languages) = &request.languages {
        args.push("--languages".into());
        args.push(languages.join(",").into());
    }
    args
}

/// Parses helper stdout into fragments with clamped bounding boxes.
pub fn parse_helper_output(stdout: &str) -> Result<Option<Vec<TextFragment>>, String> {
    let output: HelperOutput = serde_json::from_str(stdout).map_err(|e| {
        let preview = stdout.chars().take(200).collect::<String>();
        format!(
            "Failed to parse helper output: {}. Preview: {}",
            e,
            if stdout.len() > 200 {
                format!("{}...", preview)
            } else {
                preview
            }
        )
    })?;

    Ok(output.observations.map(|observations| {
        observations
            .into_iter()
            .map(|fragment| TextFragment {
                bounding_box: fragment.bounding_box.clamped(),
                ..fragment
            })
            .collect()
    }))
}

/// PNG bytes of `bitmap` as 8-bit RGBA, which every input color type converts to.
pub fn encode_png(bitmap: &DynamicImage) -> Result<Vec<u8>, String> {
    let mut png = Vec::new();
    bitmap
        .to_rgba8()
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| format!("Failed to encode image for Vision: {}", e))?;
    Ok(png)
}

/// Maps the helper's exit status and output streams to an engine outcome.
pub fn helper_outcome(success: bool, code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> EngineOutcome {
    if !stderr.is_empty() {
        debug!(stderr = %String::from_utf8_lossy(stderr), "Swift helper stderr");
    }

    if !success {
        let code = code.unwrap_or(-1);
        let stderr = String::from_utf8_lossy(stderr);
        error!(code, stderr = %stderr.trim(), "Text recognition failed");
        return Err(if stderr.trim().is_empty() {
            format!("Text recognition failed with exit code {}", code)
        } else {
            stderr.trim().to_string()
        });
    }

    let fragments = parse_helper_output(&String::from_utf8_lossy(stdout))?;
    info!(
        observations = fragments.as_ref().map(Vec::len),
        "Vision text recognition completed"
    );
    Ok(fragments)
}

/// Writes the image and helper script to temporary files and runs `program` on them.
pub fn run_helper(program: &OsStr, png: &[u8], request: &EngineRequest) -> EngineOutcome {
    debug!(bytes = png.len(), ?request, "Starting Vision text recognition");

    let image = paths::temp_path("image", "png")
        .map_err(|e| format!("Failed to create image file: {}", e))?;
    fs::write(&image, png).map_err(|e| format!("Failed to write image file: {}", e))?;

    let script = paths::temp_path("helper", "swift")
        .map_err(|e| format!("Failed to create helper script: {}", e))?;
    fs::write(&script, HELPER_SOURCE)
        .map_err(|e| format!("Failed to write helper script: {}", e))?;

    debug!(
        script = %script.display(),
        image = %image.display(),
        "Executing Swift helper"
    );

    let output = Command::new(program)
        .args(helper_args(&script, &image, request))
        .output();
    paths::remove_temp_path(script);
    paths::remove_temp_path(image);

    let output = output.map_err(|e| {
        error!(error = %e, "Failed to execute swift command");
        format!("Failed to execute swift command: {}", e)
    })?;
    helper_outcome(
        output.status.success(),
        output.status.code(),
        &output.stdout,
        &output.stderr,
    )
}

/// Major version of a `sw_vers -productVersion` string such as `14.4.1`.
pub fn parse_macos_major(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecognitionMode;

    fn request() -> EngineRequest {
        EngineRequest {
            mode: RecognitionMode::Fast,
            auto_detect_language: false,
            languages: None,
        }
    }

    #[test]
    fn test_helper_args_for_explicit_languages() {
        let request = EngineRequest {
            mode: RecognitionMode::Accurate,
            auto_detect_language: false,
            languages: Some(vec!["fr-FR".to_string(), "en-US".to_string()]),
        };
        let args = helper_args(Path::new("/tmp/h.swift"), Path::new("/tmp/i.png"), &request);
        assert_eq!(
            args,
            vec![
                "/tmp/h.swift",
                "/tmp/i.png",
                "--level",
                "accurate",
                "--languages",
                "fr-FR,en-US"
            ]
        );
    }

    #[test]
    fn test_helper_args_for_auto_detection() {
        let request = EngineRequest {
            mode: RecognitionMode::Fast,
            auto_detect_language: true,
            languages: None,
        };
        let args = helper_args(Path::new("h.swift"), Path::new("i.png"), &request);
        assert_eq!(
            args,
            vec!["h.swift", "i.png", "--level", "fast", "--auto-detect-language"]
        );
    }

    #[test]
    fn test_parse_observations() {
        let stdout = r#"{"observations":[
            {"candidates":["Hi"],"confidence":0.5,"bounding_box":{"x":0.1,"y":0.8,"width":0.2,"height":0.1}},
            {"candidates":[],"confidence":0.0,"bounding_box":{"x":0.9,"y":0.0,"width":0.5,"height":0.1}}
        ]}"#;
        let fragments = parse_helper_output(stdout).unwrap().unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].top_candidate(), Some("Hi"));
        assert_eq!(fragments[1].top_candidate(), None);
        assert!((fragments[1].bounding_box.width - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_parse_absent_result() {
        assert_eq!(parse_helper_output("{}").unwrap(), None);
        assert_eq!(
            parse_helper_output(r#"{"observations":null}"#).unwrap(),
            None
        );
        assert_eq!(
            parse_helper_output(r#"{"observations":[]}"#).unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        let err = parse_helper_output("Segmentation fault").unwrap_err();
        assert!(err.starts_with("Failed to parse helper output"));
    }

    #[test]
    fn test_parse_macos_major() {
        assert_eq!(parse_macos_major("14.4.1\n"), Some(14));
        assert_eq!(parse_macos_major("12.7"), Some(12));
        assert_eq!(parse_macos_major(""), None);
    }

    #[test]
    fn test_encode_png_accepts_float_images() {
        let png = encode_png(&DynamicImage::new_rgb32f(4, 3)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_failed_helper_reports_stderr_verbatim() {
        let err = helper_outcome(false, Some(2), b"", b"Failed to load image at /tmp/x.png\n")
            .unwrap_err();
        assert_eq!(err, "Failed to load image at /tmp/x.png");
    }

    #[test]
    fn test_failed_helper_without_stderr_reports_exit_code() {
        let err = helper_outcome(false, Some(1), b"", b"").unwrap_err();
        assert_eq!(err, "Text recognition failed with exit code 1");
        let err = helper_outcome(false, None, b"", b"").unwrap_err();
        assert_eq!(err, "Text recognition failed with exit code -1");
    }

    #[test]
    fn test_successful_helper_is_parsed_even_with_stderr() {
        let outcome = helper_outcome(true, Some(0), br#"{"observations":[]}"#, b"warning").unwrap();
        assert_eq!(outcome, Some(Vec::new()));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_helper_nonzero_exit() {
        let err = run_helper(OsStr::new("/usr/bin/false"), b"png", &request()).unwrap_err();
        assert_eq!(err, "Text recognition failed with exit code 1");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_helper_empty_output_is_parse_error() {
        let err = run_helper(OsStr::new("/usr/bin/true"), b"png", &request()).unwrap_err();
        assert!(err.starts_with("Failed to parse helper output"));
    }

    #[test]
    fn test_run_helper_missing_program() {
        let err = run_helper(OsStr::new("/nonexistent/swift"), b"png", &request()).unwrap_err();
        assert!(err.starts_with("Failed to execute swift command"));
    }
}
