//! speechcheck STT (Speech-to-Text) providers
//!
//! Recognizer capability plus the HTTP and whisper.cpp implementations

pub mod audio;
pub mod factory;
pub mod http;
pub mod postprocess;
pub mod recognizer;
#[cfg(feature = "local-whisper")]
pub mod whisper;

// Re-export main types
pub use factory::build_recognizer;
pub use http::HttpRecognizer;
pub use recognizer::{RecognitionOutcome, SpeechRecognizer};
#[cfg(feature = "local-whisper")]
pub use whisper::{GpuDevice, WhisperRecognizer};
