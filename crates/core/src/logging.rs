//! Logging setup on top of the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `MATHCAST_LOG`: Filter directive (like `RUST_LOG`), e.g., `mathcast=debug`
//! - `MATHCAST_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `MATHCAST_LOG_DIR`: Directory for the rolling log file
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = true
//! level = "debug"
//!
//! [logging.privacy]
//! log_message_content = "truncate"
//! truncate_length = 200
//! ```
//!
//! While the terminal UI owns the screen, stderr output is disabled and only the
//! file sink receives events:
//!
//! ```no_run
//! use mathcast_core::logging::{self, LoggingConfig};
//!
//! let _guard = logging::init_logging(LoggingConfig::default().with_stderr(false))?;
//! # Ok::<(), mathcast_core::Error>(())
//! ```

use crate::Error;
use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig};

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix for the daily rolling log
pub const LOG_FILE_NAME: &str = "mathcast.log";

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// How much of a chat message may appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentLogging {
    /// Only lengths are logged.
    None,
    /// Up to `truncate_length` characters.
    #[default]
    Truncate,
    /// Whole message (may include sensitive data).
    Full,
}

impl ContentLogging {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(ContentLogging::None),
            "truncate" => Some(ContentLogging::Truncate),
            "full" => Some(ContentLogging::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentLogging::None => "none",
            ContentLogging::Truncate => "truncate",
            ContentLogging::Full => "full",
        }
    }
}

impl FromStr for ContentLogging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentLogging::parse_str(s).ok_or_else(|| format!("invalid message content logging: {}", s))
    }
}

/// Privacy controls for message content in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyConfig {
    pub log_message_content: ContentLogging,
    /// Maximum length for truncated content.
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_message_content: ContentLogging::default(), truncate_length: 200 }
    }
}

/// Resolved logging settings, built from the `[logging]` config section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter for stderr output.
    pub level: String,
    pub format: LogFormat,
    /// Write to stderr at all; off while the TUI draws.
    pub stderr: bool,
    /// File logging, when enabled.
    pub file: Option<FileLoggingConfig>,
    pub privacy: PrivacyConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            stderr: true,
            file: None,
            privacy: PrivacyConfig::default(),
        }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let log_message_content = ContentLogging::parse_str(&config.privacy.log_message_content).unwrap_or_default();

        Self {
            level: config.level,
            format,
            stderr: true,
            file: if config.file.enabled { Some(config.file) } else { None },
            privacy: PrivacyConfig { log_message_content, truncate_length: config.privacy.truncate_length },
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    pub fn with_privacy(mut self, config: PrivacyConfig) -> Self {
        self.privacy = config;
        self
    }

    /// Filter directive for stderr: `MATHCAST_LOG`, then `RUST_LOG`, then the configured level
    fn stderr_directive(&self) -> String {
        env::var("MATHCAST_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone())
    }

    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("MATHCAST_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if atty::is(atty::Stream::Stderr) { self.format } else { LogFormat::Compact }
    }

    fn log_dir(file: &FileLoggingConfig) -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("MATHCAST_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }
        if let Some(dir) = &file.dir {
            return Ok(dir.clone());
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Other("could not determine home directory for logs".to_string()))?;

        Ok(PathBuf::from(home).join(".mathcast").join("logs"))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// Returns the file writer guard when file logging is enabled; keep it alive
/// for the lifetime of the program so buffered events get flushed.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>, Error> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.stderr {
        let filter = EnvFilter::new(config.stderr_directive());
        let layer = match config.detect_format() {
            LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).with_filter(filter).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(io::stderr).with_filter(filter).boxed(),
            LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).with_filter(filter).boxed(),
        };
        layers.push(layer);
    }

    if let Some(file_config) = &config.file {
        let log_dir = LoggingConfig::log_dir(file_config)?;
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        let filter = EnvFilter::new(&file_config.level);

        layers.push(fmt::layer().json().with_writer(non_blocking).with_filter(filter).boxed());
        guard = Some(file_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to install tracing subscriber: {}", e)))?;

    Ok(guard)
}

/// Render message content for a log field according to the privacy settings
pub fn redact_message(content: &str, privacy: &PrivacyConfig) -> String {
    let total = content.chars().count();
    match privacy.log_message_content {
        ContentLogging::None => format!("[{} chars]", total),
        ContentLogging::Truncate if total > privacy.truncate_length => {
            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str(&format!("... ({} total chars)", total));
            truncated
        }
        ContentLogging::Truncate | ContentLogging::Full => content.to_string(),
    }
}

/// Render a path for logs with the home directory shortened to `~`
pub fn sanitize_path(path: &Path) -> String {
    if let Ok(home) = env::var("HOME")
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
