use async_trait::async_trait;
use speechcheck_common::Result;
use std::path::Path;

use crate::postprocess;

/// Result of one recognition attempt
///
/// Exactly one variant is produced per call. Faults outside this contract
/// (unreadable file, undecodable audio, engine crash) are reported through
/// the `Err` side of [`SpeechRecognizer::recognize`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Speech was recognized
    Success { text: String },

    /// The backend could not serve the request (network, quota, HTTP error)
    ProviderError { message: String },

    /// Audio was processed but contained no usable speech
    Unintelligible,
}

impl RecognitionOutcome {
    /// Classify raw recognizer text
    ///
    /// Text that is empty once non-speech annotations are removed counts as
    /// unintelligible; otherwise the trimmed text is kept verbatim.
    pub fn from_text(raw: &str) -> Self {
        if postprocess::is_non_speech(raw) {
            Self::Unintelligible
        } else {
            Self::Success {
                text: raw.trim().to_string(),
            }
        }
    }

    /// Create provider error outcome
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self::ProviderError {
            message: message.into(),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::ProviderError { .. } => "provider_error",
            Self::Unintelligible => "unintelligible",
        }
    }
}

/// Speech-to-text capability consumed by the transcription endpoint
///
/// Implementations are shared across concurrent requests, so they must not
/// keep per-call mutable state.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize speech in the audio file at `audio_path`
    async fn recognize(&self, audio_path: &Path) -> Result<RecognitionOutcome>;

    /// Recognizer name for logs
    fn name(&self) -> &str;
}
