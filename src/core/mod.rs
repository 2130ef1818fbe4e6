pub mod chat;
pub mod decoder;
pub mod renderer;
pub mod sse;
pub mod streamer;

pub use crate::domain::model::{ChatReply, ChatStreamRequest, RenderMode, StreamOutcome, StreamSummary};
pub use crate::domain::ports::{ClientConfig, OutputSink};
pub use crate::utils::error::Result;
