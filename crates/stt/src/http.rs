use async_trait::async_trait;
use reqwest::{multipart, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use speechcheck_common::{AppConfig, Result, SpeechCheckError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::audio;
use crate::recognizer::{RecognitionOutcome, SpeechRecognizer};

/// Successful transcription body (`response_format=json`)
#[derive(Debug, Deserialize)]
struct TranscriptionBody {
    text: String,
}

/// OpenAI-style error envelope: `{"error": {"message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Recognizer backed by an OpenAI-compatible `/audio/transcriptions` endpoint
///
/// The inner `reqwest::Client` is reference counted and safe to share
/// between concurrent requests.
#[derive(Debug)]
pub struct HttpRecognizer {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    language: Option<String>,
}

impl HttpRecognizer {
    /// Create new HTTP recognizer
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        language: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("HTTP recognizer initialized: {}", base_url);

        Ok(Self {
            client,
            base_url,
            api_key,
            model: model.into(),
            language,
        })
    }

    /// Create from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.stt_base_url.clone(),
            config.stt_api_key.clone().map(SecretString::from),
            config.stt_model.clone(),
            config.stt_language.clone(),
            config.stt_timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    async fn build_form(&self, audio_path: &Path) -> Result<multipart::Form> {
        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            SpeechCheckError::file_system(format!(
                "Failed to read audio file {}: {}",
                audio_path.display(),
                e
            ))
        })?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        debug!(
            "Transcription request: {} bytes, model={}",
            audio.len(),
            self.model
        );

        let part = multipart::Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| SpeechCheckError::stt(format!("Invalid content type: {}", e)))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        Ok(form)
    }
}

/// Map a provider HTTP reply to a recognition outcome
pub(crate) fn interpret_response(status: u16, body: &str) -> RecognitionOutcome {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        return if detail.is_empty() {
            RecognitionOutcome::provider_error(format!("status {}", status))
        } else {
            RecognitionOutcome::provider_error(format!("status {}: {}", status, detail))
        };
    }

    match serde_json::from_str::<TranscriptionBody>(body) {
        Ok(parsed) => RecognitionOutcome::from_text(&parsed.text),
        Err(e) => RecognitionOutcome::provider_error(format!("unexpected response body: {}", e)),
    }
}

#[async_trait]
impl SpeechRecognizer for HttpRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<RecognitionOutcome> {
        // Undecodable uploads never reach the provider
        let path = audio_path.to_path_buf();
        tokio::task::spawn_blocking(move || audio::validate_file(&path))
            .await
            .map_err(|e| SpeechCheckError::internal(format!("Audio check task failed: {}", e)))??;

        let form = self.build_form(audio_path).await?;

        let mut request = self.client.post(self.endpoint()).multipart(form);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Transcription request failed: {}", e);
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {}", e)
                };
                return Ok(RecognitionOutcome::provider_error(message));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read transcription response: {}", e);
                return Ok(RecognitionOutcome::provider_error(format!(
                    "failed to read response: {}",
                    e
                )));
            }
        };

        if !status.is_success() {
            warn!("Transcription API error ({}): {}", status, body);
        }

        Ok(interpret_response(status.as_u16(), &body))
    }

    fn name(&self) -> &str {
        "http"
    }
}
