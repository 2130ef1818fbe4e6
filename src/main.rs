use chat_stream::utils::{logger, validation::Validate};
use chat_stream::{
    ChatError, ChatStreamer, CliConfig, FileSink, OutputSink, StdoutSink, StreamOutcome,
};
use clap::Parser;
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("Prompt of {} chars, config file {:?}", cli.prompt.chars().count(), cli.config);

    let run = match cli.resolve().and_then(|run| run.settings.validate().map(|_| run)) {
        Ok(run) => run,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    let to_stdout = run.output_path.is_none();
    let mut sink = match open_sink(run.output_path.as_deref()) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("❌ Cannot open output: {}", e);
            exit_with(&e);
        }
    };

    let streamer = ChatStreamer::new(run.settings);

    if cli.no_stream {
        let written = match streamer.chat(&cli.prompt).await {
            Ok(reply) => sink.append(&reply.text).and_then(|_| sink.flush()),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::error!("❌ Chat request failed: {}", e);
            exit_with(&e);
        }
        finish_stdout(to_stdout);
        return Ok(());
    }

    match streamer.stream_chat(&cli.prompt, &mut *sink).await {
        StreamOutcome::Completed(_) => finish_stdout(to_stdout),
        StreamOutcome::Failed { error, .. } => {
            // 錯誤已在 stream_chat 內記錄
            finish_stdout(to_stdout);
            exit_with(&error);
        }
    }

    Ok(())
}

fn open_sink(path: Option<&std::path::Path>) -> chat_stream::Result<Box<dyn OutputSink>> {
    match path {
        Some(path) => Ok(Box::new(FileSink::open(path)?)),
        None => Ok(Box::new(StdoutSink::new())),
    }
}

fn exit_with(error: &ChatError) -> ! {
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(error.exit_code());
}

// stdout 可能已被關閉 (例如 `| head`)，換行寫失敗就忽略
fn finish_stdout(is_stdout: bool) {
    if is_stdout {
        let _ = writeln!(std::io::stdout().lock());
    }
}
