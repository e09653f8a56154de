use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use speechcheck_common::Result;
use speechcheck_stt::RecognitionOutcome;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::temp_audio::ScopedAudioFile;
use crate::types::TranscriptionResponse;

/// Multipart field carrying the audio clip
pub const AUDIO_FIELD: &str = "audio";

/// Transcribe an uploaded clip and count keyword phrases
pub async fn process(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<Arc<AppState>>,
) -> std::result::Result<HttpResponse, ApiError> {
    info!("Received transcription request");

    let upload = receive_upload(&req, payload, &state.temp_dir).await?;
    info!(
        "Saved {} bytes to temporary file: {}",
        upload.len(),
        upload.path().display()
    );

    let outcome = recognize(&state, upload.path()).await;

    // Remove the staged file before answering
    drop(upload);

    let transcription = into_transcription(outcome)?;
    let count = state.keywords.count(&transcription);
    info!("Transcription successful: {} characters, keyword count {}", transcription.len(), count);

    Ok(HttpResponse::Ok().json(TranscriptionResponse::new(transcription, count)))
}

/// Any method other than POST on `/api/process`
pub async fn invalid_method(req: HttpRequest) -> std::result::Result<HttpResponse, ApiError> {
    warn!("Rejected {} {}", req.method(), req.path());
    Err(ApiError::InvalidMethod)
}

/// Stream the first `audio` file part into a scoped temporary file
///
/// Bodies that are not multipart, or whose framing breaks before the audio
/// part, count as having no audio file. An `audio` part without a
/// `filename` (or `filename*`) parameter is a plain form value and is skipped.
async fn receive_upload(
    req: &HttpRequest,
    payload: web::Payload,
    temp_dir: &Path,
) -> std::result::Result<ScopedAudioFile, ApiError> {
    let mut multipart = Multipart::new(req.headers(), payload);

    while let Some(field) = multipart.next().await {
        let mut field = match field {
            Ok(field) => field,
            Err(e) => {
                warn!("Unreadable multipart body: {}", e);
                return Err(ApiError::NoAudioFile);
            }
        };

        let (name, filename) = {
            let content_disposition = field.content_disposition();
            let filename = content_disposition
                .get_filename()
                .map(str::to_owned)
                .or_else(|| {
                    // RFC 5987 `filename*=` when no plain `filename` was sent
                    content_disposition
                        .get_filename_ext()
                        .map(|ext| String::from_utf8_lossy(&ext.value).into_owned())
                });
            (content_disposition.get_name().map(str::to_owned), filename)
        };

        let filename = match (name.as_deref(), filename) {
            (Some(AUDIO_FIELD), Some(filename)) => filename,
            _ => {
                skip_field(&mut field).await;
                continue;
            }
        };

        if filename.is_empty() {
            warn!("Audio part has an empty filename");
            return Err(ApiError::EmptyFilename);
        }

        info!("Received file: {}", filename);

        let mut upload = ScopedAudioFile::create_in(temp_dir)?;
        while let Some(chunk) = field.next().await {
            let data = chunk
                .map_err(|e| ApiError::Processing(format!("Failed to read upload: {}", e)))?;
            upload.write_chunk(&data)?;
        }
        upload.finish()?;

        return Ok(upload);
    }

    warn!("No audio file in request");
    Err(ApiError::NoAudioFile)
}

/// Discard the body of a part we do not use
async fn skip_field(field: &mut Field) {
    while let Some(chunk) = field.next().await {
        if chunk.is_err() {
            break;
        }
    }
}

/// Call the recognizer, treating an elapsed timeout as a provider failure
async fn recognize(state: &AppState, audio_path: &Path) -> Result<RecognitionOutcome> {
    let timeout = state.config.stt_timeout();
    debug!("Attempting speech recognition with {}", state.recognizer.name());

    let outcome = match tokio::time::timeout(timeout, state.recognizer.recognize(audio_path)).await {
        Ok(result) => result,
        Err(_) => Ok(RecognitionOutcome::provider_error(format!(
            "request timed out after {}s",
            timeout.as_secs()
        ))),
    };

    if let Ok(outcome) = &outcome {
        debug!("Recognition finished: {}", outcome.kind());
    }
    outcome
}

/// Single mapping point from recognizer result to endpoint result
fn into_transcription(outcome: Result<RecognitionOutcome>) -> std::result::Result<String, ApiError> {
    match outcome {
        Ok(RecognitionOutcome::Success { text }) => Ok(text),
        Ok(RecognitionOutcome::ProviderError { message }) => {
            warn!("Speech provider error: {}", message);
            Err(ApiError::Provider(message))
        }
        Ok(RecognitionOutcome::Unintelligible) => {
            info!("Could not understand audio");
            Err(ApiError::Unintelligible)
        }
        Err(e) => {
            error!("Error processing audio: {}", e);
            Err(ApiError::from(e))
        }
    }
}
