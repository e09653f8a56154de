use crate::error::SpeechCheckError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Phrases counted in every transcription unless `KEYWORD_PHRASES` overrides them
pub const DEFAULT_KEYWORD_PHRASES: &[&str] = &["kill myself", "jump off E7"];

/// Separator for `KEYWORD_PHRASES`
const KEYWORD_SEPARATOR: char = '|';

/// Which speech recognizer backs `/api/process`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttProvider {
    /// OpenAI-compatible `/audio/transcriptions` endpoint
    Http,
    /// Local whisper.cpp model (requires the `local-whisper` feature)
    Whisper,
}

impl SttProvider {
    /// Parse provider name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, SpeechCheckError> {
        match name.trim().to_lowercase().as_str() {
            "http" | "openai" => Ok(Self::Http),
            "whisper" | "local" => Ok(Self::Whisper),
            other => Err(SpeechCheckError::config(format!(
                "Unknown STT provider '{}' (expected 'http' or 'whisper')",
                other
            ))),
        }
    }
}

/// speechcheck application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Directory for per-request audio files (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// Recognizer backend
    pub stt_provider: SttProvider,

    /// Base URL of the transcription API
    pub stt_base_url: String,

    /// Bearer token for the transcription API
    #[serde(skip_serializing)]
    pub stt_api_key: Option<String>,

    /// Model name sent to the transcription API
    pub stt_model: String,

    /// Language hint (e.g., "en")
    pub stt_language: Option<String>,

    /// Upper bound for a single recognizer call
    pub stt_timeout_secs: u64,

    /// whisper.cpp model file for the local recognizer
    pub whisper_model_path: PathBuf,

    /// Literal phrases counted in transcriptions
    pub keyword_phrases: Vec<String>,

    /// Allowed CORS origins (empty = any origin)
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 2600,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
            temp_dir: None,
            stt_provider: SttProvider::Http,
            stt_base_url: "https://api.openai.com/v1".to_string(),
            stt_api_key: None,
            stt_model: "whisper-1".to_string(),
            stt_language: None,
            stt_timeout_secs: 60,
            whisper_model_path: PathBuf::from("./models/ggml-base.bin"),
            keyword_phrases: DEFAULT_KEYWORD_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SpeechCheckError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SpeechCheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let stt_provider = match lookup("STT_PROVIDER") {
            Some(name) => SttProvider::parse(&name)?,
            None => defaults.stt_provider,
        };

        Ok(Self {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: lookup("SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            temp_dir: lookup("TEMP_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            stt_provider,
            stt_base_url: lookup("STT_BASE_URL").unwrap_or(defaults.stt_base_url),
            stt_api_key: lookup("STT_API_KEY").filter(|s| !s.is_empty()),
            stt_model: lookup("STT_MODEL").unwrap_or(defaults.stt_model),
            stt_language: lookup("STT_LANGUAGE").filter(|s| !s.is_empty()),
            stt_timeout_secs: lookup("STT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.stt_timeout_secs),
            whisper_model_path: lookup("WHISPER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.whisper_model_path),
            keyword_phrases: lookup("KEYWORD_PHRASES")
                .map(|s| s.split(KEYWORD_SEPARATOR).map(str::to_string).collect())
                .unwrap_or(defaults.keyword_phrases),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), SpeechCheckError> {
        let mut dirs = vec![&self.log_dir];
        if let Some(temp_dir) = &self.temp_dir {
            dirs.push(temp_dir);
        }

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    SpeechCheckError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Directory where request audio is staged
    pub fn upload_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Recognizer call timeout
    pub fn stt_timeout(&self) -> Duration {
        Duration::from_secs(self.stt_timeout_secs)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SpeechCheckError> {
        if self.server_port == 0 {
            return Err(SpeechCheckError::config("Server port cannot be 0"));
        }

        if self.stt_provider == SttProvider::Http
            && !self.stt_base_url.starts_with("http://")
            && !self.stt_base_url.starts_with("https://")
        {
            return Err(SpeechCheckError::config(
                "STT base URL must start with http:// or https://",
            ));
        }

        if self.stt_model.is_empty() {
            return Err(SpeechCheckError::config("STT model name cannot be empty"));
        }

        if self.stt_timeout_secs == 0 {
            return Err(SpeechCheckError::config("STT timeout must be at least 1 second"));
        }

        // An empty phrase would match between every character
        if self.keyword_phrases.iter().any(|p| p.is_empty()) {
            return Err(SpeechCheckError::config("Keyword phrases cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 2600);
        assert_eq!(config.stt_provider, SttProvider::Http);
        assert_eq!(config.keyword_phrases, vec!["kill myself", "jump off E7"]);
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:2600");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SERVER_PORT", "9000"),
            ("STT_PROVIDER", "WHISPER"),
            ("STT_LANGUAGE", "en"),
            ("KEYWORD_PHRASES", "help me|call 911"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, http://example.com"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 9000);
        assert_eq!(config.stt_provider, SttProvider::Whisper);
        assert_eq!(config.stt_language.as_deref(), Some("en"));
        assert_eq!(config.keyword_phrases, vec!["help me", "call 911"]);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "http://example.com"]
        );
    }

    #[test]
    fn test_from_lookup_ignores_bad_port() {
        let config = AppConfig::from_lookup(lookup_from(&[("SERVER_PORT", "not-a-port")])).unwrap();
        assert_eq!(config.server_port, 2600);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_provider() {
        let result = AppConfig::from_lookup(lookup_from(&[("STT_PROVIDER", "carrier-pigeon")]));
        assert!(matches!(result, Err(SpeechCheckError::Config(_))));
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.stt_base_url = "ftp://example.com".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.keyword_phrases = vec!["kill myself".to_string(), String::new()];
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.stt_timeout_secs = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_ensure_directories_creates_temp_dir() {
        let root = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.log_dir = root.path().join("log");
        config.temp_dir = Some(root.path().join("uploads"));

        config.ensure_directories().unwrap();

        assert!(root.path().join("log").is_dir());
        assert!(root.path().join("uploads").is_dir());
        assert_eq!(config.upload_temp_dir(), root.path().join("uploads"));
    }
}
