use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use speechcheck_common::SpeechCheckError;

use crate::types::ErrorResponse;

/// Failures of the transcription endpoint, rendered as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request carried no `audio` file part
    #[error("No audio file found")]
    NoAudioFile,

    /// `audio` part had an empty filename
    #[error("Empty filename")]
    EmptyFilename,

    /// Recognizer backend failed (network, quota, HTTP error, timeout)
    #[error("API Error: {0}")]
    Provider(String),

    /// Recognizer found no usable speech
    #[error("Cannot recognize speech")]
    Unintelligible,

    /// Anything else (I/O, undecodable audio, recognizer crash)
    #[error("Processing error: {0}")]
    Processing(String),

    /// Route exists but not for this method
    #[error("Invalid method")]
    InvalidMethod,
}

impl From<SpeechCheckError> for ApiError {
    fn from(err: SpeechCheckError) -> Self {
        Self::Processing(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoAudioFile
            | Self::EmptyFilename
            | Self::Provider(_)
            | Self::Unintelligible => StatusCode::BAD_REQUEST,
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, Self::InvalidMethod) {
            builder.insert_header((header::ALLOW, "POST"));
        }
        builder.json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
