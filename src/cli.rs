//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueHint};

use crate::config::{LogLevel, OutputFormat, RecognitionConfig, RecognitionMode, AUTO_LANGUAGE};
use crate::input::{InputSpec, UsageError};
use crate::system::CaptureRect;

#[derive(Parser, Debug)]
#[command(name = "ocr", version, about = "Recognize text in an image, stdin, or a screen capture")]
pub struct Cli {
    /// Capture screenshot.
    #[arg(short = 'c', long)]
    pub capture: bool,

    /// Read stdin binary data.
    #[arg(short = 's', long)]
    pub stdin: bool,

    /// Path to input image.
    #[arg(short = 'i', long, value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Capture this region without interaction, as x,y,w,h (requires --capture).
    #[arg(short = 'r', long, value_name = "X,Y,W,H")]
    pub rectangle: Option<CaptureRect>,

    /// Recognition language such as en-US, or "auto" to detect it.
    #[arg(short = 'l', long, default_value = AUTO_LANGUAGE)]
    pub language: String,

    /// Output format.
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Recognition speed/accuracy trade-off.
    #[arg(short = 'm', long, value_enum, default_value_t = RecognitionMode::Fast)]
    pub mode: RecognitionMode,

    /// Log verbosity on stderr. RUST_LOG takes precedence when set.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn input_spec(&self) -> Result<InputSpec, UsageError> {
        InputSpec::from_selectors(self.input.clone(), self.stdin, self.capture, self.rectangle)
    }

    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig::new(self.language.clone(), self.mode)
    }
}
