use crate::domain::model::Locale;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TriageError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_output_tokens: Option<u32>,
    pub locale: Option<Locale>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TriageError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})；找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn endpoint(&self) -> &str {
        self.service.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn model(&self) -> &str {
        self.service.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// 空字串或沒被替換掉的 `${...}` 都視為沒有設定
    pub fn api_key(&self) -> Option<&str> {
        self.service
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !ENV_VAR_RE.is_match(key))
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.service.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.service
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)
    }

    pub fn locale(&self) -> Locale {
        self.service.locale.unwrap_or_default()
    }

    pub fn bind(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.server.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("service.endpoint", self.endpoint())?;
        validation::validate_non_empty_string("service.model", self.model())?;
        validation::validate_range("service.timeout_seconds", self.timeout_seconds(), 1, 600)?;
        validation::validate_range(
            "service.max_output_tokens",
            self.max_output_tokens(),
            1,
            65_536,
        )?;
        validation::validate_socket_addr("server.bind", self.bind())?;
        validation::validate_positive_number("server.max_body_bytes", self.max_body_bytes(), 1024)?;
        validation::validate_non_empty_string("logging.level", self.log_level())?;
        Ok(())
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings::from_provider(self)
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> &str {
        self.endpoint()
    }

    fn model(&self) -> &str {
        self.model()
    }

    fn credential(&self) -> Option<&str> {
        self.api_key()
    }

    fn locale(&self) -> Locale {
        self.locale()
    }

    fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 分類服務最後使用的設定（檔案、環境變數與命令列合併後的結果）
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
    pub max_output_tokens: u32,
    pub locale: Locale,
}

impl ServiceSettings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            endpoint: config.endpoint().to_string(),
            model: config.model().to_string(),
            api_key: config
                .credential()
                .map(|key| SecretString::from(key.to_string())),
            timeout: config.request_timeout(),
            max_output_tokens: config.max_output_tokens(),
            locale: config.locale(),
        }
    }

    /// 只有給了非空白的值才覆蓋
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.api_key = Some(SecretString::from(key));
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        if let Some(locale) = locale {
            self.locale = locale;
        }
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            locale: Locale::default(),
        }
    }
}

impl ConfigProvider for ServiceSettings {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn credential(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
    }

    fn locale(&self) -> Locale {
        self.locale
    }

    fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }
}

impl Validate for ServiceSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("service.endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("service.model", &self.model)?;
        validation::validate_range(
            "service.max_output_tokens",
            self.max_output_tokens,
            1,
            65_536,
        )?;
        Ok(())
    }
}
