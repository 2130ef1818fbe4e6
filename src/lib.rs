pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, RunConfig};

pub use crate::adapters::output::{BufferSink, FileSink, StdoutSink};
pub use crate::config::{ClientSettings, TomlConfig};
pub use crate::core::streamer::ChatStreamer;
pub use crate::domain::model::{ChatReply, ChatStreamRequest, RenderMode, StreamOutcome, StreamSummary};
pub use crate::domain::ports::{ClientConfig, OutputSink};
pub use crate::utils::error::{ChatError, Result};
