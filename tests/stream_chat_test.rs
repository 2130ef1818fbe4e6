use chat_stream::utils::error::ErrorCategory;
use chat_stream::{
    BufferSink, ChatError, ChatStreamer, ClientSettings, FileSink, OutputSink, RenderMode,
    StreamOutcome,
};
use httpmock::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// 計算本 crate 發出的 ERROR 事件
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() == tracing::Level::ERROR && metadata.target().starts_with("chat_stream")
        {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn settings_for(server: &MockServer) -> ClientSettings {
    let mut settings = ClientSettings::new(server.base_url());
    settings.api_key = "test-key".to_string();
    settings
}

#[tokio::test]
async fn test_raw_stream_renders_body_in_order() {
    let server = MockServer::start();
    let body = "Rust is a systems language. 流式輸出 🦀";

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/chat/stream")
            .header("X-API-Key", "test-key")
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"prompt": "What is Rust?", "stream": true}));
        then.status(200)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body);
    });

    let streamer = ChatStreamer::new(settings_for(&server));
    let mut sink = BufferSink::new();
    let outcome = streamer.stream_chat("What is Rust?", &mut sink).await;

    api_mock.assert();
    match outcome {
        StreamOutcome::Completed(summary) => {
            assert!(summary.chunks >= 1);
            assert_eq!(summary.bytes, body.len());
            assert_eq!(summary.chars, body.chars().count());
        }
        StreamOutcome::Failed { error, .. } => panic!("stream failed: {}", error),
    }
    assert_eq!(sink.as_str(), body);
}

#[tokio::test]
async fn test_sse_mode_strips_event_framing() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(200)
            .header("Content-Type", "text/event-stream; charset=utf-8")
            .body(
                "data: {\"content\": \"Hello\", \"role\": \"assistant\", \"finish_reason\": null}\n\n\
                 data: {\"content\": \", world\", \"role\": \"assistant\", \"finish_reason\": \"stop\"}\n\n\
                 data: [DONE]\n\n",
            );
    });

    let mut settings = settings_for(&server);
    settings.render_mode = RenderMode::Sse;
    let streamer = ChatStreamer::new(settings);

    let mut sink = BufferSink::new();
    let summary = streamer.try_stream_chat("Hi", &mut sink).await.unwrap();

    api_mock.assert();
    assert_eq!(sink.as_str(), "Hello, world");
    assert_eq!(summary.fragments, 2);
}

#[tokio::test]
async fn test_optional_request_fields_are_sent_when_configured() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/chat/stream")
            .json_body(serde_json::json!({
                "prompt": "Hi",
                "stream": true,
                "model": "claude-3.5-sonnet",
                "max_tokens": 1000
            }));
        then.status(200).body("ok");
    });

    let mut settings = settings_for(&server);
    settings.model = Some("claude-3.5-sonnet".to_string());
    settings.max_tokens = Some(1000);

    let mut sink = BufferSink::new();
    let outcome = ChatStreamer::new(settings).stream_chat("Hi", &mut sink).await;

    api_mock.assert();
    assert!(outcome.is_completed());
    assert_eq!(sink.as_str(), "ok");
}

#[tokio::test]
async fn test_server_error_is_not_rendered() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(500).body("Stream creation error: upstream down");
    });

    let streamer = ChatStreamer::new(settings_for(&server));
    let mut sink = BufferSink::new();
    let outcome = streamer.stream_chat("Hello", &mut sink).await;

    api_mock.assert();
    match outcome {
        StreamOutcome::Failed {
            error: ChatError::HttpStatus { status, body },
            rendered_fragments,
        } => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream down"));
            assert_eq!(rendered_fragments, 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(sink.as_str().is_empty());
}

#[tokio::test]
async fn test_failure_is_logged_exactly_once() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(503);
    });

    let errors = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let streamer = ChatStreamer::new(settings_for(&server));
    let outcome = streamer.stream_chat("Hello", BufferSink::new()).await;

    assert!(!outcome.is_completed());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_success_logs_no_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(200).body("fine");
    });

    let errors = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let outcome = ChatStreamer::new(settings_for(&server))
        .stream_chat("Hello", BufferSink::new())
        .await;

    assert!(outcome.is_completed());
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_connection_refused_is_caught() {
    // 埠 1 上沒有服務
    let streamer = ChatStreamer::new(ClientSettings::new("http://127.0.0.1:1"));
    let mut sink = BufferSink::new();
    let outcome = streamer.stream_chat("Hello", &mut sink).await;

    match outcome {
        StreamOutcome::Failed { error, .. } => {
            assert!(matches!(error, ChatError::ApiError(_)));
        }
        StreamOutcome::Completed(_) => panic!("expected a connection failure"),
    }
    assert!(sink.as_str().is_empty());
}

#[tokio::test]
async fn test_empty_prompt_never_hits_the_server() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(200).body("unexpected");
    });

    let outcome = ChatStreamer::new(settings_for(&server))
        .stream_chat("   ", BufferSink::new())
        .await;

    api_mock.assert_hits(0);
    assert!(matches!(
        outcome,
        StreamOutcome::Failed {
            error: ChatError::ValidationError { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_timeout_aborts_slow_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(200)
            .delay(Duration::from_secs(3))
            .body("too late");
    });

    let mut settings = settings_for(&server);
    settings.timeout_seconds = Some(1);

    let mut sink = BufferSink::new();
    let outcome = ChatStreamer::new(settings).stream_chat("Hello", &mut sink).await;

    match outcome {
        StreamOutcome::Failed {
            error: ChatError::ApiError(e),
            ..
        } => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(sink.as_str().is_empty());
}

#[tokio::test]
async fn test_stream_appends_to_file_sink() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("answers/reply.txt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "previous|").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(200).body("streamed text");
    });

    let sink = FileSink::open(&path).unwrap();
    let outcome = ChatStreamer::new(settings_for(&server))
        .stream_chat("Hello", sink)
        .await;

    assert!(outcome.is_completed());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "previous|streamed text"
    );
}

/// 寫入時回報 BrokenPipe 的輸出，模擬已關閉的 stdout
struct ClosedPipeSink {
    attempts: usize,
}

impl OutputSink for ClosedPipeSink {
    fn append(&mut self, _text: &str) -> chat_stream::Result<()> {
        self.attempts += 1;
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "Broken pipe").into())
    }
}

#[tokio::test]
async fn test_closed_output_is_caught_and_logged_once() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/stream");
        then.status(200).body("nobody is reading");
    });

    let errors = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut sink = ClosedPipeSink { attempts: 0 };
    let outcome = ChatStreamer::new(settings_for(&server))
        .stream_chat("Hello", &mut sink)
        .await;

    match outcome {
        StreamOutcome::Failed {
            error,
            rendered_fragments,
        } => {
            assert_eq!(error.category(), ErrorCategory::Output);
            assert_eq!(error.exit_code(), 1);
            assert_eq!(rendered_fragments, 0);
        }
        StreamOutcome::Completed(_) => panic!("expected the write to fail"),
    }
    assert_eq!(sink.attempts, 1);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

/// 送出兩個 chunk 後直接斷線，chunked 本體沒有結尾
async fn spawn_truncating_server() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        // 讀完請求 (JSON 本體以 `}` 結尾)
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.ends_with(b"}") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let response = "HTTP/1.1 200 OK\r\n\
                        Content-Type: text/plain; charset=utf-8\r\n\
                        Transfer-Encoding: chunked\r\n\r\n\
                        8\r\npartial \r\n\
                        6\r\nanswer\r\n";
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.flush().await;
    });

    Ok(format!("http://{}", address))
}

#[tokio::test]
async fn test_connection_cut_mid_stream_keeps_prefix_and_logs_once() -> anyhow::Result<()> {
    let base_url = spawn_truncating_server().await?;

    let errors = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut sink = BufferSink::new();
    let outcome = ChatStreamer::new(ClientSettings::new(base_url))
        .stream_chat("Hello", &mut sink)
        .await;

    match outcome {
        StreamOutcome::Failed {
            error,
            rendered_fragments,
        } => {
            assert!(matches!(error, ChatError::StreamError { .. }));
            assert!(rendered_fragments >= 1);
        }
        StreamOutcome::Completed(_) => panic!("expected the cut stream to fail"),
    }
    assert_eq!(sink.as_str(), "partial answer");
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    Ok(())
}
