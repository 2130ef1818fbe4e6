use crate::core::renderer::StreamRenderer;
use crate::domain::model::{ChatStreamRequest, StreamOutcome, StreamSummary};
use crate::domain::ports::{ClientConfig, OutputSink};
use crate::utils::error::{ChatError, Result};
use crate::utils::validation::validate_prompt;
use reqwest::{Client, RequestBuilder, Response};

pub const API_KEY_HEADER: &str = "X-API-Key";

pub struct ChatStreamer<C: ClientConfig> {
    pub(crate) config: C,
    pub(crate) client: Client,
}

impl<C: ClientConfig> ChatStreamer<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// 串流一次對話並寫入輸出。所有錯誤在此攔截並記錄一次，不重試也不清理已輸出的內容。
    pub async fn stream_chat<S: OutputSink>(&self, prompt: &str, sink: S) -> StreamOutcome {
        let mut renderer = StreamRenderer::new(sink, self.config.render_mode());

        match self.run(prompt, &mut renderer).await {
            Ok(summary) => {
                tracing::info!(
                    "✅ Stream finished: {} chunks, {} bytes, {} chars rendered",
                    summary.chunks,
                    summary.bytes,
                    summary.chars
                );
                StreamOutcome::Completed(summary)
            }
            Err(error) => {
                let rendered_fragments = renderer.summary().fragments;
                tracing::error!(
                    category = ?error.category(),
                    rendered_fragments,
                    "❌ Chat stream failed: {}",
                    error
                );
                StreamOutcome::Failed {
                    error,
                    rendered_fragments,
                }
            }
        }
    }

    /// 與 `stream_chat` 相同，但把錯誤交給呼叫端處理，不記錄
    pub async fn try_stream_chat<S: OutputSink>(&self, prompt: &str, sink: S) -> Result<StreamSummary> {
        let mut renderer = StreamRenderer::new(sink, self.config.render_mode());
        self.run(prompt, &mut renderer).await
    }

    async fn run<S: OutputSink>(
        &self,
        prompt: &str,
        renderer: &mut StreamRenderer<S>,
    ) -> Result<StreamSummary> {
        validate_prompt(prompt)?;

        let url = self.endpoint(self.config.stream_path());
        let body = self.request_body(prompt, true);
        tracing::debug!("📡 POST {} ({:?} mode)", url, self.config.render_mode());

        let response = self.build_request(&url, &body).send().await?;
        let response = ensure_success(response).await?;
        tracing::debug!(
            "📡 Stream opened: status {}, content-type {:?}",
            response.status(),
            response.headers().get(reqwest::header::CONTENT_TYPE)
        );

        renderer.consume(response.bytes_stream()).await
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url().trim_end_matches('/'), path)
    }

    pub(crate) fn request_body(&self, prompt: &str, stream: bool) -> ChatStreamRequest {
        let mut request = if stream {
            ChatStreamRequest::streaming(prompt)
        } else {
            ChatStreamRequest::blocking(prompt)
        };
        request.model = self.config.model().map(str::to_string);
        request.temperature = self.config.temperature();
        request.max_tokens = self.config.max_tokens();
        request
    }

    pub(crate) fn build_request(&self, url: &str, body: &ChatStreamRequest) -> RequestBuilder {
        let mut request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.config.api_key())
            .json(body);

        // 逾時涵蓋整個交換，包含讀取串流
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }

        request
    }
}

/// 非 2xx 視為失敗，回應本體不輸出
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ChatError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}
