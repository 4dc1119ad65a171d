use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: API key missing")]
    MissingApiKey,

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("API error ({status}): {message}")]
    ApiStatus {
        status: u16,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid response from API: {message}")]
    InvalidResponse { message: String },

    #[error("File size exceeds {limit_mb}MB limit")]
    FileTooLarge { path: String, limit_mb: u64 },

    #[error("Unsupported file type: {mime_type}")]
    UnsupportedFileType { path: String, mime_type: String },

    #[error("File error: {source}")]
    Attachment {
        path: String,
        #[source]
        source: Box<ChatError>,
    },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Attachment,
    Network,
    Api,
    Input,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ChatError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        ChatError::ConfigValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ChatError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::MissingApiKey
            | ChatError::ConfigValidationError { .. }
            | ChatError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ChatError::FileTooLarge { .. }
            | ChatError::UnsupportedFileType { .. }
            | ChatError::Attachment { .. } => ErrorCategory::Attachment,
            ChatError::Connection { .. } | ChatError::HttpError(_) => ErrorCategory::Network,
            ChatError::RateLimited { .. }
            | ChatError::ApiStatus { .. }
            | ChatError::InvalidResponse { .. } => ErrorCategory::Api,
            ChatError::ValidationError { .. } => ErrorCategory::Input,
            ChatError::IoError(_) | ChatError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Api if self.is_retryable() => ErrorSeverity::Medium,
            ErrorCategory::Api | ErrorCategory::Attachment => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// Whether the Messages API request that produced this error may be sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Connection { .. } | ChatError::RateLimited { .. } => true,
            ChatError::ApiStatus { status, .. } => {
                matches!(status, 408 | 409) || *status >= 500
            }
            _ => false,
        }
    }

    /// Server-requested wait, in seconds, from a `retry-after` header.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ChatError::RateLimited { retry_after, .. } | ChatError::ApiStatus { retry_after, .. } => {
                *retry_after
            }
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ChatError::MissingApiKey => "Export ANTHROPIC_API_KEY or set api.api_key in the config file",
            ChatError::Connection { .. } | ChatError::HttpError(_) => {
                "Check your network connection and the configured API base URL"
            }
            ChatError::RateLimited { .. } => "Wait a moment before sending another message",
            ChatError::ApiStatus { status: 401, .. } | ChatError::ApiStatus { status: 403, .. } => {
                "Verify that the API key is valid and has access to the model"
            }
            ChatError::ApiStatus { .. } | ChatError::InvalidResponse { .. } => {
                "Retry the message; if it keeps failing check the model name and request size"
            }
            ChatError::FileTooLarge { .. } => "Attach a smaller file or raise attachments.max_file_size_mb",
            ChatError::UnsupportedFileType { .. } => {
                "Attach text, PDF, JSON or Word documents, or JPEG, PNG, GIF or WebP images"
            }
            ChatError::Attachment { source, .. } => source.recovery_suggestion(),
            ChatError::ConfigValidationError { .. } | ChatError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and restart"
            }
            ChatError::ValidationError { .. } => "Type a message or attach a file before sending",
            ChatError::IoError(_) | ChatError::SerializationError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }

    /// Message shown to the person chatting, as opposed to the log line.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ChatError::MissingApiKey => "Configuration error: API key missing".to_string(),
            ChatError::Connection { .. } | ChatError::HttpError(_) => {
                "Connection error: Please check your internet connection".to_string()
            }
            ChatError::RateLimited { .. } => {
                "Rate limit exceeded: Please wait before sending new messages".to_string()
            }
            ChatError::ApiStatus { message, .. } => format!("API error: {}", message),
            ChatError::Attachment { .. } => self.to_string(),
            ChatError::FileTooLarge { .. } | ChatError::UnsupportedFileType { .. } => {
                format!("File error: {}", self)
            }
            ChatError::ConfigValidationError { .. }
            | ChatError::InvalidConfigValueError { .. }
            | ChatError::ValidationError { .. } => self.to_string(),
            _ => format!("Unexpected error: {}", self),
        }
    }
}
