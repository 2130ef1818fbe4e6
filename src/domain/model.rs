use crate::utils::error::ChatError;
use serde::{Deserialize, Serialize};

/// 串流與非串流端點共用的請求本體
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatStreamRequest {
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatStreamRequest {
    pub fn streaming(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            stream: true,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn blocking(prompt: impl Into<String>) -> Self {
        Self {
            stream: false,
            ..Self::streaming(prompt)
        }
    }
}

/// `/chat` 非串流回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// SSE `data:` 內的單一片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SseChunk {
    pub content: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// 回應本體的呈現方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RenderMode {
    /// 原樣附加解碼後的文字
    #[default]
    Raw,
    /// 解析 `data:` 行，只附加 content
    Sse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// 從網路讀到的 chunk 數
    pub chunks: usize,
    pub bytes: usize,
    /// 附加到輸出的次數
    pub fragments: usize,
    pub chars: usize,
}

#[derive(Debug)]
pub enum StreamOutcome {
    Completed(StreamSummary),
    /// 失敗前已附加的片段保留在輸出中，不做清理
    Failed {
        error: ChatError,
        rendered_fragments: usize,
    },
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed(_))
    }
}
