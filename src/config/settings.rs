use crate::domain::model::RenderMode;
use crate::domain::ports::ClientConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_endpoint_path, validate_non_empty_string, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STREAM_PATH: &str = "/api/v1/chat/stream";
pub const DEFAULT_CHAT_PATH: &str = "/api/v1/chat";
pub const PLACEHOLDER_API_KEY: &str = "your-api-key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub stream_path: String,
    pub chat_path: String,
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub render_mode: RenderMode,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            timeout_seconds: None,
            model: None,
            temperature: None,
            max_tokens: None,
            render_mode: RenderMode::Raw,
        }
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_endpoint_path("stream_path", &self.stream_path)?;
        validate_endpoint_path("chat_path", &self.chat_path)?;
        validate_non_empty_string("api_key", &self.api_key)?;

        if let Some(timeout) = self.timeout_seconds {
            validate_range("timeout_seconds", timeout, 1, 3600)?;
        }
        if let Some(temperature) = self.temperature {
            validate_range("temperature", temperature, 0.0, 2.0)?;
        }
        if let Some(max_tokens) = self.max_tokens {
            validate_range("max_tokens", max_tokens, 1, 128_000)?;
        }

        if self.api_key == PLACEHOLDER_API_KEY {
            tracing::warn!("⚠️ Using placeholder API key; set CHAT_API_KEY or --api-key");
        }

        Ok(())
    }
}

impl ClientConfig for ClientSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn stream_path(&self) -> &str {
        &self.stream_path
    }

    fn chat_path(&self) -> &str {
        &self.chat_path
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    fn render_mode(&self) -> RenderMode {
        self.render_mode
    }
}
