//! Typed run configuration derived from the command line.
//!
//! Nothing is persisted: every value here is built once per invocation and
//! never changes afterwards.

use clap::ValueEnum;

/// Language hint that asks the engine to detect the language itself.
pub const AUTO_LANGUAGE: &str = "auto";

/// Language appended after an explicit hint.
pub const FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Engine speed/accuracy trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecognitionMode {
    #[default]
    Fast,
    Accurate,
}

impl RecognitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Accurate => "accurate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Language code such as `en-US`, or [`AUTO_LANGUAGE`].
    pub language: String,
    pub mode: RecognitionMode,
}

impl RecognitionConfig {
    pub fn new(language: impl Into<String>, mode: RecognitionMode) -> Self {
        Self {
            language: language.into(),
            mode,
        }
    }

    pub fn is_auto_language(&self) -> bool {
        self.language == AUTO_LANGUAGE
    }

    /// Prioritized language list for an explicit hint, `None` for auto-detection.
    pub fn language_priority(&self) -> Option<Vec<String>> {
        if self.is_auto_language() {
            return None;
        }
        Some(vec![self.language.clone(), FALLBACK_LANGUAGE.to_string()])
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::new(AUTO_LANGUAGE, RecognitionMode::default())
    }
}
