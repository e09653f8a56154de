use speechcheck_common::{AppConfig, Result, SttProvider};
use std::sync::Arc;
use tracing::info;

use crate::http::HttpRecognizer;
use crate::recognizer::SpeechRecognizer;

/// Build the recognizer selected by `STT_PROVIDER`
pub fn build_recognizer(config: &AppConfig) -> Result<Arc<dyn SpeechRecognizer>> {
    let recognizer: Arc<dyn SpeechRecognizer> = match config.stt_provider {
        SttProvider::Http => Arc::new(HttpRecognizer::from_config(config)?),
        SttProvider::Whisper => build_whisper(config)?,
    };

    info!("Speech recognizer ready: {}", recognizer.name());
    Ok(recognizer)
}

#[cfg(feature = "local-whisper")]
fn build_whisper(config: &AppConfig) -> Result<Arc<dyn SpeechRecognizer>> {
    let recognizer = crate::whisper::WhisperRecognizer::new(
        &config.whisper_model_path,
        config.stt_language.clone(),
    )?;
    info!(
        "Whisper recognizer using {:?} ({})",
        recognizer.gpu_device(),
        config.whisper_model_path.display()
    );
    Ok(Arc::new(recognizer))
}

#[cfg(not(feature = "local-whisper"))]
fn build_whisper(_config: &AppConfig) -> Result<Arc<dyn SpeechRecognizer>> {
    Err(speechcheck_common::SpeechCheckError::config(
        "STT_PROVIDER=whisper requires building with the `local-whisper` feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_recognizer() {
        let config = AppConfig::default();
        let recognizer = build_recognizer(&config).unwrap();
        assert_eq!(recognizer.name(), "http");
    }

    #[cfg(not(feature = "local-whisper"))]
    #[test]
    fn test_whisper_requires_feature() {
        let mut config = AppConfig::default();
        config.stt_provider = SttProvider::Whisper;
        assert!(build_recognizer(&config).is_err());
    }
}
