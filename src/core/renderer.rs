use crate::core::decoder::Utf8StreamDecoder;
use crate::core::sse::{SseEvent, SseParser};
use crate::domain::model::{RenderMode, StreamSummary};
use crate::domain::ports::OutputSink;
use crate::utils::error::{ChatError, Result};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};

/// 把位元組串流解碼後依到達順序附加到輸出
pub struct StreamRenderer<S: OutputSink> {
    sink: S,
    decoder: Utf8StreamDecoder,
    sse: Option<SseParser>,
    summary: StreamSummary,
}

impl<S: OutputSink> StreamRenderer<S> {
    pub fn new(sink: S, mode: RenderMode) -> Self {
        let sse = match mode {
            RenderMode::Raw => None,
            RenderMode::Sse => Some(SseParser::new()),
        };

        Self {
            sink,
            decoder: Utf8StreamDecoder::new(),
            sse,
            summary: StreamSummary::default(),
        }
    }

    /// 讀完整個串流；中途失敗時已附加的內容維持原樣
    pub async fn consume<St, E>(&mut self, stream: St) -> Result<StreamSummary>
    where
        St: Stream<Item = std::result::Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let mut stream = std::pin::pin!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ChatError::StreamError {
                message: format!("read failed after {} chunks: {}", self.summary.chunks, e),
            })?;
            self.push_chunk(&chunk)?;
        }

        self.finish()
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.summary.chunks += 1;
        self.summary.bytes += chunk.len();
        tracing::trace!("chunk #{} ({} bytes)", self.summary.chunks, chunk.len());

        let text = self.decoder.decode(chunk);
        self.render(&text)
    }

    pub fn finish(&mut self) -> Result<StreamSummary> {
        let tail = self.decoder.finish();
        self.render(&tail)?;

        if let Some(parser) = self.sse.as_mut() {
            let events = parser.finish();
            self.append_events(events)?;
        }

        self.sink.flush()?;
        Ok(self.summary)
    }

    pub fn summary(&self) -> StreamSummary {
        self.summary
    }

    fn render(&mut self, text: &str) -> Result<()> {
        match self.sse.as_mut() {
            None => self.append(text),
            Some(parser) => {
                let events = parser.push(text);
                self.append_events(events)
            }
        }
    }

    fn append_events(&mut self, events: Vec<SseEvent>) -> Result<()> {
        for event in events {
            match event {
                SseEvent::Content(content) => self.append(&content)?,
                SseEvent::Done => tracing::debug!("Server signalled end of stream"),
            }
        }
        Ok(())
    }

    fn append(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.sink.append(text)?;
        self.summary.fragments += 1;
        self.summary.chars += text.chars().count();
        Ok(())
    }
}
