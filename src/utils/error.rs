use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Server responded with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Stream error: {message}")]
    StreamError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Stream,
    Output,
    Configuration,
    Input,
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::ApiError(e) if e.is_decode() => ErrorCategory::Stream,
            ChatError::ApiError(_) => ErrorCategory::Network,
            ChatError::HttpStatus { .. } => ErrorCategory::Server,
            ChatError::StreamError { .. } => ErrorCategory::Stream,
            ChatError::IoError(_) => ErrorCategory::Output,
            ChatError::ConfigError { .. } | ChatError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            ChatError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            ChatError::ApiError(e) if e.is_timeout() => "The chat server did not answer in time".to_string(),
            ChatError::ApiError(e) if e.is_connect() => "Could not connect to the chat server".to_string(),
            ChatError::ApiError(e) if e.is_decode() => {
                "The chat server sent a malformed response".to_string()
            }
            ChatError::ApiError(_) => "The request to the chat server failed".to_string(),
            ChatError::HttpStatus { status, .. } => {
                format!("The chat server rejected the request (HTTP {})", status)
            }
            ChatError::StreamError { .. } => "The response stream was interrupted".to_string(),
            ChatError::IoError(_) => "Could not write the response output".to_string(),
            ChatError::ConfigError { message } => format!("Invalid configuration: {}", message),
            ChatError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for {}: {}", field, reason)
            }
            ChatError::ValidationError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the server is running and the base URL is correct",
            ErrorCategory::Server => "Check the API key and the request parameters",
            ErrorCategory::Stream => "Retry the request; the server response was cut short or malformed",
            ErrorCategory::Output => "Check that the output path is writable",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Input => "Provide a non-empty prompt",
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => 2,
            ErrorCategory::Network | ErrorCategory::Server => 3,
            ErrorCategory::Stream | ErrorCategory::Output => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
