use speechcheck_common::{AppConfig, Result};
use speechcheck_stt::{build_recognizer, SpeechRecognizer};
use std::path::PathBuf;
use std::sync::Arc;

use crate::keywords::KeywordCounter;

/// Shared application state
///
/// Nothing here is mutated after startup, so requests never contend on it.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Speech recognizer shared by all requests
    pub recognizer: Arc<dyn SpeechRecognizer>,

    /// Keyword phrase counter
    pub keywords: KeywordCounter,

    /// Directory for per-request audio files
    pub temp_dir: PathBuf,
}

impl AppState {
    /// Create new application state, building the configured recognizer
    pub fn new(config: AppConfig) -> Result<Self> {
        let recognizer = build_recognizer(&config)?;
        Ok(Self::with_recognizer(config, recognizer))
    }

    /// Create state around an existing recognizer
    pub fn with_recognizer(config: AppConfig, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        let keywords = KeywordCounter::new(config.keyword_phrases.iter().cloned());
        let temp_dir = config.upload_temp_dir();

        Self {
            config,
            recognizer,
            keywords,
            temp_dir,
        }
    }
}
