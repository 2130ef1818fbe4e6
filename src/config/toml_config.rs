use crate::config::settings::ClientSettings;
use crate::domain::model::RenderMode;
use crate::utils::error::{ChatError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub request: Option<RequestConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub stream_path: Option<String>,
    pub chat_path: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub mode: Option<RenderMode>,
    pub path: Option<PathBuf>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ChatError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ChatError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CHAT_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static env var pattern")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 轉成用戶端設定，未填的欄位用預設值
    pub fn to_settings(&self) -> ClientSettings {
        let defaults = ClientSettings::default();
        let server = &self.server;
        let request = self.request.clone().unwrap_or_default();

        ClientSettings {
            base_url: server.base_url.clone().unwrap_or(defaults.base_url),
            stream_path: server.stream_path.clone().unwrap_or(defaults.stream_path),
            chat_path: server.chat_path.clone().unwrap_or(defaults.chat_path),
            api_key: server.api_key.clone().unwrap_or(defaults.api_key),
            timeout_seconds: server.timeout_seconds,
            model: request.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            render_mode: self
                .output
                .as_ref()
                .and_then(|o| o.mode)
                .unwrap_or(defaults.render_mode),
        }
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_ref().and_then(|o| o.path.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_settings().validate()
    }
}
