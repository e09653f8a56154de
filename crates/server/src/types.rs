use serde::{Deserialize, Serialize};

/// Failure body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Successful transcription body
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// Always `null` on success
    pub error: Option<String>,

    /// Recognized text
    pub transcription: String,

    /// Keyword phrase occurrences in `transcription`
    pub count: usize,
}

impl TranscriptionResponse {
    pub fn new(transcription: String, count: usize) -> Self {
        Self {
            error: None,
            transcription,
            count,
        }
    }
}

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    /// Active recognizer
    pub provider: String,
}
