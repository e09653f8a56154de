use async_trait::async_trait;
use speechcheck_common::{Result, SpeechCheckError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio;
use crate::recognizer::{RecognitionOutcome, SpeechRecognizer};

/// GPU 디바이스 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuDevice {
    /// CUDA (NVIDIA GPU)
    Cuda,
    /// Metal (Apple GPU)
    Metal,
    /// CPU만 사용
    Cpu,
}

/// Local whisper.cpp recognizer
///
/// The model context is loaded once and shared; every call creates its own
/// inference state, so concurrent requests never touch the same state.
pub struct WhisperRecognizer {
    ctx: Arc<WhisperContext>,
    language: Option<String>,
    gpu_device: GpuDevice,
}

impl WhisperRecognizer {
    /// CUDA/Metal 지원 여부는 조건부 컴파일(feature flags)로 제어합니다.
    fn detect_gpu_device() -> GpuDevice {
        if cfg!(feature = "cuda") {
            GpuDevice::Cuda
        } else if cfg!(feature = "metal") {
            GpuDevice::Metal
        } else {
            GpuDevice::Cpu
        }
    }

    /// Load a whisper.cpp model (.bin or .gguf)
    pub fn new(model_path: impl AsRef<Path>, language: Option<String>) -> Result<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(SpeechCheckError::config(format!(
                "Whisper model file not found: {}",
                path.display()
            )));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SpeechCheckError::config(format!("Model path is not valid UTF-8: {}", path.display()))
        })?;

        let gpu_device = Self::detect_gpu_device();
        info!("Loading Whisper model from {} ({:?})", path.display(), gpu_device);

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| SpeechCheckError::stt(format!("Failed to load Whisper model: {}", e)))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            ctx: Arc::new(ctx),
            language,
            gpu_device,
        })
    }

    /// Run inference on decoded samples
    fn transcribe_samples(
        ctx: &WhisperContext,
        samples: &[f32],
        language: Option<&str>,
    ) -> Result<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(language);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = ctx
            .create_state()
            .map_err(|e| SpeechCheckError::stt(format!("Failed to create Whisper state: {}", e)))?;

        debug!("Starting Whisper inference on {} samples", samples.len());
        state
            .full(params, samples)
            .map_err(|e| SpeechCheckError::stt(format!("Transcription failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| SpeechCheckError::stt(format!("Failed to get segment count: {}", e)))?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| SpeechCheckError::stt(format!("Failed to get segment text: {}", e)))?;
            text.push_str(segment.trim());
            text.push(' ');
        }

        debug!("Whisper produced {} segments", num_segments);

        Ok(text.trim().to_string())
    }

    /// Get GPU device being used
    pub fn gpu_device(&self) -> GpuDevice {
        self.gpu_device
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<RecognitionOutcome> {
        let ctx = Arc::clone(&self.ctx);
        let language = self.language.clone();
        let path = audio_path.to_path_buf();

        // Decoding and inference are CPU bound
        let text = tokio::task::spawn_blocking(move || -> Result<String> {
            let samples = audio::load_for_whisper(&path)?;
            if samples.is_empty() {
                return Ok(String::new());
            }
            Self::transcribe_samples(&ctx, &samples, language.as_deref())
        })
        .await
        .map_err(|e| SpeechCheckError::internal(format!("Whisper task panicked: {}", e)))??;

        Ok(RecognitionOutcome::from_text(&text))
    }

    fn name(&self) -> &str {
        "whisper"
    }
}
