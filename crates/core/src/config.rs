use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::view_model::ThemeMode;

/// Environment variables consulted (in order) when no API key is configured
pub const API_KEY_ENV_VARS: &[&str] = &["MATHCAST_API_KEY", "OPENAI_API_KEY"];

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mathcast.toml";

/// Provider-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat completions endpoint
    #[serde(rename = "openai")]
    OpenAi {
        /// API key; falls back to the environment when absent
        #[serde(default)]
        api_key: Option<String>,
        /// Model name (e.g., "gpt-4o-mini")
        model: String,
        /// Base URL for the API
        #[serde(default = "default_openai_base_url")]
        base_url: String,
    },
    /// Scripted responses for offline use and tests
    Mock {
        /// TOML file with `[[responses]]` entries
        #[serde(default)]
        responses_file: Option<PathBuf>,
    },
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Mock { responses_file: None }
    }
}

impl ProviderConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAi { .. } => "openai",
            ProviderConfig::Mock { .. } => "mock",
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            ProviderConfig::OpenAi { model, .. } => model,
            ProviderConfig::Mock { .. } => "mock",
        }
    }

    /// Configured API key, or the first non-empty key found in the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        match self {
            ProviderConfig::OpenAi { api_key: Some(key), .. } if !key.trim().is_empty() => Some(key.clone()),
            ProviderConfig::OpenAi { .. } => API_KEY_ENV_VARS
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|key| !key.trim().is_empty()),
            ProviderConfig::Mock { .. } => None,
        }
    }
}

/// Conversation settings passed to the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// System prompt sent ahead of the conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum number of recent messages sent with each request
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
}

fn default_system_prompt() -> String {
    "You are a math teacher. Assist the user in understanding the conceptual details of the topic they ask about."
        .to_string()
}

fn default_context_limit() -> usize {
    5
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { system_prompt: default_system_prompt(), context_limit: default_context_limit() }
    }
}

/// Terminal presentation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// Theme used at startup
    #[serde(default)]
    pub theme: ThemeMode,
}

/// Sources for the media panels and where downloads land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    #[serde(default)]
    pub video: Option<PathBuf>,
    #[serde(default)]
    pub transcript: Option<PathBuf>,
    #[serde(default)]
    pub audio: Option<PathBuf>,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { video: None, transcript: None, audio: None, download_dir: default_download_dir() }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter for stderr output
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: pretty, json, compact
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: FileLoggingConfig,
    #[serde(default)]
    pub privacy: PrivacyLoggingConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: FileLoggingConfig::default(),
            privacy: PrivacyLoggingConfig::default(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_level")]
    pub level: String,
    /// Directory for log files; defaults to `~/.mathcast/logs`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_file_level() -> String {
    "debug".to_string()
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_level(), dir: None }
    }
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivacyLoggingConfig {
    /// none, truncate or full
    #[serde(default = "default_log_message_content")]
    pub log_message_content: String,
    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

fn default_log_message_content() -> String {
    "truncate".to_string()
}

fn default_truncate_length() -> usize {
    200
}

impl Default for PrivacyLoggingConfig {
    fn default() -> Self {
        Self { log_message_content: default_log_message_content(), truncate_length: default_truncate_length() }
    }
}

/// Root configuration structure for mathcast.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.chat.context_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chat.context_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if let ProviderConfig::OpenAi { model, base_url, .. } = &self.provider {
            if model.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "provider.model".to_string(),
                    reason: "cannot be empty".to_string(),
                });
            }
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "provider.base_url".to_string(),
                    reason: format!("not an http(s) URL: {}", base_url),
                });
            }
        }

        if crate::logging::LogFormat::parse_str(&self.logging.format).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                reason: format!("unknown format: {}", self.logging.format),
            });
        }

        if crate::logging::ContentLogging::parse_str(&self.logging.privacy.log_message_content).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "logging.privacy.log_message_content".to_string(),
                reason: format!("unknown mode: {}", self.logging.privacy.log_message_content),
            });
        }

        Ok(())
    }

    /// Example configuration written by `mathcast init`
    pub fn example() -> &'static str {
        r#"# mathcast configuration

[provider]
# "openai" for any OpenAI-compatible endpoint, "mock" for scripted offline replies
kind = "openai"
model = "gpt-4o-mini"
# Leave unset to read MATHCAST_API_KEY or OPENAI_API_KEY
# api_key = "sk-..."
# base_url = "https://api.openai.com/v1"

[chat]
system_prompt = "You are a math teacher. Assist the user in understanding the conceptual details of the topic they ask about."
# Number of recent messages sent with each request
context_limit = 5

[ui]
# "light" or "dark" (Ctrl+T toggles at runtime)
theme = "light"

[media]
# video = "out/lesson.mp4"
# transcript = "out/lesson.txt"
# audio = "out/lesson.mp3"
download_dir = "downloads"

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false
level = "debug"

[logging.privacy]
# "none", "truncate" or "full"
log_message_content = "truncate"
truncate_length = 200
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid theme name
    #[error("invalid theme: {0}")]
    InvalidTheme(String),

    /// A field holds an unusable value
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// No API key configured or found in the environment
    #[error("no API key for provider '{0}' (set provider.api_key or MATHCAST_API_KEY)")]
    MissingApiKey(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.provider, ProviderConfig::Mock { responses_file: None });
        assert_eq!(config.chat.context_limit, 5);
        assert_eq!(config.ui.theme, ThemeMode::Light);
        assert_eq!(config.media.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config.provider.kind(), "openai");
        assert_eq!(config.provider.model_name(), "gpt-4o-mini");
        assert_eq!(config.ui.theme, ThemeMode::Light);
    }

    #[test]
    fn test_openai_provider() {
        let toml = r#"
[provider]
kind = "openai"
model = "gpt-4o"
api_key = "sk-test"
base_url = "http://localhost:8080/v1"
"#;
        let config = Config::from_toml_str(toml).unwrap();
        match &config.provider {
            ProviderConfig::OpenAi { api_key, model, base_url } => {
                assert_eq!(api_key.as_deref(), Some("sk-test"));
                assert_eq!(model, "gpt-4o");
                assert_eq!(base_url, "http://localhost:8080/v1");
            }
            _ => panic!("Expected OpenAI provider"),
        }
        assert_eq!(config.provider.resolved_api_key(), Some("sk-test".to_string()));
    }

    #[test]
    fn test_openai_default_base_url() {
        let config = Config::from_toml_str("[provider]\nkind = \"openai\"\nmodel = \"gpt-4o\"\n").unwrap();
        match &config.provider {
            ProviderConfig::OpenAi { base_url, .. } => assert_eq!(base_url, &default_openai_base_url()),
            _ => panic!("Expected OpenAI provider"),
        }
    }

    #[test]
    fn test_mock_provider() {
        let config = Config::from_toml_str("[provider]\nkind = \"mock\"\nresponses_file = \"replies.toml\"\n").unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Mock { responses_file: Some(PathBuf::from("replies.toml")) }
        );
        assert_eq!(config.provider.model_name(), "mock");
        assert_eq!(config.provider.resolved_api_key(), None);
    }

    #[test]
    fn test_chat_and_ui_sections() {
        let toml = r#"
[chat]
system_prompt = "Be brief."
context_limit = 2

[ui]
theme = "dark"

[media]
video = "out/lesson.mp4"
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.chat.system_prompt, "Be brief.");
        assert_eq!(config.chat.context_limit, 2);
        assert_eq!(config.ui.theme, ThemeMode::Dark);
        assert_eq!(config.media.video, Some(PathBuf::from("out/lesson.mp4")));
        assert_eq!(config.media.audio, None);
    }

    #[test]
    fn test_validation_zero_context_limit() {
        let err = Config::from_toml_str("[chat]\ncontext_limit = 0\n").unwrap_err();
        assert!(err.to_string().contains("chat.context_limit"));
    }

    #[test]
    fn test_validation_empty_model() {
        let err = Config::from_toml_str("[provider]\nkind = \"openai\"\nmodel = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("provider.model"));
    }

    #[test]
    fn test_validation_bad_base_url() {
        let toml = "[provider]\nkind = \"openai\"\nmodel = \"m\"\nbase_url = \"ftp://x\"\n";
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("provider.base_url"));
    }

    #[test]
    fn test_validation_bad_log_format() {
        let err = Config::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = Config::from_toml_str("[ui]\ncolour = \"blue\"\n").unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_invalid_theme_rejected() {
        assert!(Config::from_toml_str("[ui]\ntheme = \"sepia\"\n").is_err());
    }

    #[test]
    fn test_from_file_and_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::write(&path, "[ui]\ntheme = \"dark\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.ui.theme, ThemeMode::Dark);
        assert_eq!(Config::load_or_default(&path).unwrap(), config);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidTheme("sepia".to_string());
        assert_eq!(err.to_string(), "invalid theme: sepia");

        let err = ConfigError::InvalidValue { field: "chat.context_limit".to_string(), reason: "too small".to_string() };
        assert_eq!(err.to_string(), "invalid value for chat.context_limit: too small");

        let err = ConfigError::MissingApiKey("openai".to_string());
        assert!(err.to_string().starts_with("no API key for provider 'openai'"));

        let err = ConfigError::TomlParse("parse error".to_string());
        assert_eq!(err.to_string(), "TOML parse error: parse error");
    }
}
