//! `text/event-stream` 呈現模式
//!
//! 伺服器每個片段送出 `data: {"content": "...", "role": "assistant", "finish_reason": null}`，
//! 最後以 `data: [DONE]` 結束。

use crate::domain::model::SseChunk;

const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Content(String),
    Done,
}

#[derive(Debug, Default)]
pub struct SseParser {
    line_buf: String,
    done: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 餵入已解碼的文字，回傳其中完整行所產生的事件
    pub fn push(&mut self, text: &str) -> Vec<SseEvent> {
        self.line_buf.push_str(text);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.line_buf.find('\n') {
            let line = self.line_buf[..newline_pos]
                .trim_end_matches('\r')
                .to_string();
            self.line_buf.drain(..=newline_pos);

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// 處理最後一行沒有換行結尾的情況
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let remaining = std::mem::take(&mut self.line_buf);
        let line = remaining.trim_end_matches('\r');
        self.process_line(line).into_iter().collect()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if self.done {
            return None;
        }

        // 註解、event:、id: 與空行都略過
        let payload = line.strip_prefix("data:")?;
        let payload = payload.strip_prefix(' ').unwrap_or(payload);

        if payload.trim() == DONE_MARKER {
            self.done = true;
            return Some(SseEvent::Done);
        }

        match serde_json::from_str::<SseChunk>(payload) {
            Ok(chunk) if chunk.content.is_empty() => None,
            Ok(chunk) => Some(SseEvent::Content(chunk.content)),
            Err(e) => {
                tracing::debug!("SSE payload is not a chat chunk ({}), rendering verbatim", e);
                if payload.is_empty() {
                    None
                } else {
                    Some(SseEvent::Content(payload.to_string()))
                }
            }
        }
    }
}
