use crate::core::streamer::{ensure_success, ChatStreamer};
use crate::domain::model::ChatReply;
use crate::domain::ports::ClientConfig;
use crate::utils::error::Result;
use crate::utils::validation::validate_prompt;

impl<C: ClientConfig> ChatStreamer<C> {
    /// 非串流對話，回傳完整回覆
    pub async fn chat(&self, prompt: &str) -> Result<ChatReply> {
        validate_prompt(prompt)?;

        let url = self.endpoint(self.config.chat_path());
        let body = self.request_body(prompt, false);
        tracing::debug!("📡 POST {}", url);

        let response = self.build_request(&url, &body).send().await?;
        let response = ensure_success(response).await?;
        let reply: ChatReply = response.json().await?;

        tracing::debug!("Received reply of {} chars", reply.text.chars().count());
        Ok(reply)
    }
}
