pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod paths;
pub mod recognition;
pub mod system;

use std::io::{self, Read};

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{LogLevel, OutputFormat, RecognitionConfig};
use crate::error::OcrError;
use crate::input::{InputSpec, UsageError};
use crate::system::{RecognitionEngine, ScreenCapture, ScreenCapturer, VisionEngine};

pub const EXIT_SUCCESS: i32 = 0;

/// Everything one run needs, validated before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub input: InputSpec,
    pub recognition: RecognitionConfig,
    pub output: OutputFormat,
}

impl Invocation {
    pub fn from_cli(cli: &Cli) -> Result<Self, UsageError> {
        Ok(Self {
            input: cli.input_spec()?,
            recognition: cli.recognition_config(),
            output: cli.output,
        })
    }
}

/// Resolves the image, recognizes it once and renders the output string.
pub async fn execute<E>(
    invocation: Invocation,
    stdin: impl Read,
    capturer: &dyn ScreenCapturer,
    engine: &E,
) -> Result<String, OcrError>
where
    E: RecognitionEngine + ?Sized,
{
    debug!(?invocation, output = invocation.output.as_str(), "Starting OCR");
    let bitmap = input::resolve(invocation.input, stdin, capturer)?;
    let dimensions = (bitmap.width(), bitmap.height());
    let fragments = recognition::recognize(engine, &bitmap, &invocation.recognition).await?;
    drop(bitmap);
    Ok(format::format(&fragments, invocation.output, dimensions)?)
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str())),
        )
        .with_writer(io::stderr)
        .init();
}

fn report(err: &OcrError) -> i32 {
    debug!(error = ?err, "OCR failed");
    match err {
        OcrError::Usage(_) => eprintln!("Error: {}\nRun `ocr --help` for usage information.", err),
        _ => eprintln!("Error: {}", err),
    }
    err.exit_code()
}

/// Parses the command line, runs one recognition and returns the exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let invocation = match Invocation::from_cli(&cli) {
        Ok(invocation) => invocation,
        Err(e) => return report(&e.into()),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            eprintln!("Error: failed to start async runtime: {}", e);
            return error::EXIT_FAILURE;
        }
    };

    let engine = VisionEngine::new();
    let capturer = ScreenCapture::new();
    match runtime.block_on(execute(invocation, io::stdin().lock(), &capturer, &engine)) {
        Ok(output) => {
            println!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => report(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputError;
    use crate::recognition::RecognitionError;
    use crate::system::{
        BoundingBox, CaptureError, CaptureRect, Completion, EngineCapabilities, EngineOutcome,
        EngineRequest, TextFragment,
    };
    use image::{DynamicImage, ImageFormat};
    use std::cell::Cell;
    use std::io::Cursor;
    use std::path::Path;

    struct ScriptedEngine {
        outcome: EngineOutcome,
        calls: Cell<usize>,
    }

    impl ScriptedEngine {
        fn new(outcome: EngineOutcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn capabilities(&self) -> EngineCapabilities {
            EngineCapabilities {
                automatic_language_detection: true,
            }
        }

        fn submit(&self, _bitmap: &DynamicImage, _request: EngineRequest, completion: Completion) {
            self.calls.set(self.calls.get() + 1);
            let _ = completion.send(self.outcome.clone());
        }
    }

    struct NoCapture;

    impl ScreenCapturer for NoCapture {
        fn capture(&self, _rect: Option<CaptureRect>, _destination: &Path) -> Result<(), CaptureError> {
            panic!("capture must not run");
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_luma8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn invocation(args: &[&str]) -> Invocation {
        let cli = Cli::try_parse_from(std::iter::once("ocr").chain(args.iter().copied())).unwrap();
        Invocation::from_cli(&cli).unwrap()
    }

    #[tokio::test]
    async fn test_json_output_in_pixel_space() {
        let engine = ScriptedEngine::new(Ok(Some(vec![TextFragment {
            candidates: vec!["Hi".to_string()],
            confidence: 0.9,
            bounding_box: BoundingBox {
                x: 0.1,
                y: 0.8,
                width: 0.2,
                height: 0.1,
            },
        }])));
        let output = execute(
            invocation(&["--stdin", "--output", "json"]),
            Cursor::new(png(1000, 500)),
            &NoCapture,
            &engine,
        )
        .await
        .unwrap();
        assert_eq!(
            output,
            r#"[{"id":"1","text":"Hi","position":{"left":100,"top":50,"width":200,"height":50}}]"#
        );
    }

    #[tokio::test]
    async fn test_empty_stdin_skips_recognition() {
        let engine = ScriptedEngine::new(Ok(Some(Vec::new())));
        let err = execute(
            invocation(&["--stdin"]),
            Cursor::new(Vec::new()),
            &NoCapture,
            &engine,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OcrError::Input(InputError::EmptyInput)));
        assert_ne!(err.exit_code(), EXIT_SUCCESS);
        assert_eq!(engine.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_zero_observations_fails() {
        let engine = ScriptedEngine::new(Ok(Some(Vec::new())));
        let err = execute(
            invocation(&["-s"]),
            Cursor::new(png(8, 8)),
            &NoCapture,
            &engine,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            OcrError::Recognition(RecognitionError::NoTextFound)
        ));
        assert_eq!(engine.calls.get(), 1);
    }

    #[test]
    fn test_invalid_selection_is_rejected_before_io() {
        let cli = Cli::try_parse_from(["ocr", "-s", "-i", "photo.png"]).unwrap();
        let err: OcrError = Invocation::from_cli(&cli).unwrap_err().into();
        assert_eq!(err.exit_code(), error::EXIT_USAGE);
    }
}
