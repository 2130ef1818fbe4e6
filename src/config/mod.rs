pub mod settings;
pub mod toml_config;

pub use settings::ClientSettings;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::RenderMode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-stream")]
#[command(about = "Stream a chat completion and print it as it arrives")]
pub struct CliConfig {
    /// Prompt to send
    pub prompt: String,

    #[arg(long, env = "CHAT_BASE_URL", help = "Chat server base URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "CHAT_API_KEY", hide_env_values = true, help = "Value of the X-API-Key header")]
    pub api_key: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long, help = "Abort the whole exchange after this many seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, value_enum, help = "How to render the response body")]
    pub mode: Option<RenderMode>,

    #[arg(long, help = "Append the response to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Use the non-streaming chat endpoint")]
    pub no_stream: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// 合併後的執行設定
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: ClientSettings,
    pub output_path: Option<PathBuf>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 設定檔為底，命令列參數覆寫
    pub fn resolve(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        let mut settings = file.to_settings();
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.api_key {
            settings.api_key = api_key.clone();
        }
        if let Some(model) = &self.model {
            settings.model = Some(model.clone());
        }
        if let Some(temperature) = self.temperature {
            settings.temperature = Some(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            settings.max_tokens = Some(max_tokens);
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = Some(timeout);
        }
        if let Some(mode) = self.mode {
            settings.render_mode = mode;
        }

        let output_path = self
            .output
            .clone()
            .or_else(|| file.output_path().map(|p| p.to_path_buf()));

        Ok(RunConfig {
            settings,
            output_path,
        })
    }
}
