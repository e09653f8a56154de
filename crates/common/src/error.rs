/// speechcheck error types
#[derive(Debug, thiserror::Error)]
pub enum SpeechCheckError {
    /// Recognizer failure that is not part of the recognition contract
    /// (model load, decoding, provider crash)
    #[error("STT error: {0}")]
    Stt(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio decoding error
    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    /// Temporary file handling error
    #[error("File system error: {0}")]
    FileSystem(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpeechCheckError {
    /// Create STT error
    pub fn stt<S: Into<String>>(msg: S) -> Self {
        Self::Stt(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create audio decode error
    pub fn audio_decode<S: Into<String>>(msg: S) -> Self {
        Self::AudioDecode(msg.into())
    }

    /// Create file system error
    pub fn file_system<S: Into<String>>(msg: S) -> Self {
        Self::FileSystem(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}
