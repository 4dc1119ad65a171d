#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
pub const DEFAULT_APP_VERSION: &str = "1.0";
pub const DEFAULT_TRANSCRIPT_DIR: &str = "./transcripts";
pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "text/",
    "image/",
    "application/pdf",
    "application/json",
    "application/msword",
];

/// Fully resolved settings for a chat session.
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub max_file_size_mb: u64,
    pub allowed_mime_types: Vec<String>,
    pub app_version: String,
    pub transcript_dir: String,
    pub monitor: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            allowed_mime_types: ALLOWED_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            transcript_dir: DEFAULT_TRANSCRIPT_DIR.to_string(),
            monitor: false,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("allowed_mime_types", &self.allowed_mime_types)
            .field("app_version", &self.app_version)
            .field("transcript_dir", &self.transcript_dir)
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl ChatConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }
}

impl ConfigProvider for ChatConfig {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb
    }

    fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Validate for ChatConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api_base_url)?;
        validate_non_empty_string("api.model", &self.model)?;
        validate_positive_number("api.max_tokens", u64::from(self.max_tokens), 1)?;
        validate_range("api.temperature", self.temperature, 0.0, 1.0)?;
        validate_positive_number("api.timeout_seconds", self.timeout_seconds, 1)?;
        validate_positive_number("attachments.max_file_size_mb", self.max_file_size_mb, 1)?;
        for prefix in &self.allowed_mime_types {
            validate_non_empty_string("attachments.allowed_mime_types", prefix)?;
        }
        validate_path("session.transcript_dir", &self.transcript_dir)?;
        Ok(())
    }
}
