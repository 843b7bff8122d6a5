//! Recognition adapter: turns a [`RecognitionConfig`] into one engine request
//! and waits for its single completion.

use image::DynamicImage;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::RecognitionConfig;
use crate::system::{EngineCapabilities, EngineRequest, RecognitionEngine, TextFragment};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecognitionError {
    /// Engine-reported failure, message kept verbatim.
    #[error("{0}")]
    Engine(String),
    #[error("No text was found")]
    NoTextFound,
}

/// Builds the engine request for `config` given what the engine supports.
pub fn build_request(config: &RecognitionConfig, capabilities: EngineCapabilities) -> EngineRequest {
    if !config.is_auto_language() {
        return EngineRequest {
            mode: config.mode,
            auto_detect_language: false,
            languages: config.language_priority(),
        };
    }

    if !capabilities.automatic_language_detection {
        warn!("Automatic language detection is not supported, using engine default languages");
    }
    EngineRequest {
        mode: config.mode,
        auto_detect_language: capabilities.automatic_language_detection,
        languages: None,
    }
}

/// Runs exactly one recognition request on `bitmap`.
///
/// An absent or empty result is reported as [`RecognitionError::NoTextFound`].
pub async fn recognize<E>(
    engine: &E,
    bitmap: &DynamicImage,
    config: &RecognitionConfig,
) -> Result<Vec<TextFragment>, RecognitionError>
where
    E: RecognitionEngine + ?Sized,
{
    let request = build_request(config, engine.capabilities());
    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        ?request,
        "Submitting recognition request"
    );

    let (tx, rx) = oneshot::channel();
    engine.submit(bitmap, request, tx);

    let outcome = rx.await.map_err(|_| {
        RecognitionError::Engine("Recognition engine finished without a result".to_string())
    })?;

    match outcome {
        Err(message) => Err(RecognitionError::Engine(message)),
        Ok(None) => Err(RecognitionError::NoTextFound),
        Ok(Some(fragments)) if fragments.is_empty() => Err(RecognitionError::NoTextFound),
        Ok(Some(fragments)) => {
            info!(fragments = fragments.len(), "Recognition completed");
            Ok(fragments)
        }
    }
}
