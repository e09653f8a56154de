pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, SttProvider, DEFAULT_KEYWORD_PHRASES};
pub use error::SpeechCheckError;
pub type Result<T> = std::result::Result<T, SpeechCheckError>;
