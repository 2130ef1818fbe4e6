use crate::domain::model::RenderMode;
use crate::utils::error::Result;
use std::time::Duration;

/// 串流文字的顯示介面
pub trait OutputSink: Send {
    fn append(&mut self, text: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn append(&mut self, text: &str) -> Result<()> {
        (**self).append(text)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

pub trait ClientConfig: Send + Sync {
    fn base_url(&self) -> &str;
    fn stream_path(&self) -> &str;
    fn chat_path(&self) -> &str;
    fn api_key(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
    fn model(&self) -> Option<&str>;
    fn temperature(&self) -> Option<f32>;
    fn max_tokens(&self) -> Option<u32>;
    fn render_mode(&self) -> RenderMode;
}
