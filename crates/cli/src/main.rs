use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mathcast_core::config::DEFAULT_CONFIG_FILE;
use mathcast_core::logging::{self, LoggingConfig, sanitize_path};
use mathcast_core::{Config, ProviderConfig, SessionViewModel, SubmitOutcome, ThemeMode, Transport};
use mathcast_providers::{ChatTransport, ProviderFactory, TransportEvent};
use mathcast_ui::{App, AppState, MediaPanels};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// mathcast - ask a math tutor, watch the answer stream in
#[derive(Parser, Debug)]
#[command(name = "mathcast")]
#[command(about = "A terminal chat client for learning math concepts", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to mathcast.toml (default: ./mathcast.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive TUI
    Start {
        /// Override the configured theme (light or dark)
        #[arg(short, long, value_name = "THEME")]
        theme: Option<ThemeMode>,
    },
    /// Ask a single question and print the streamed reply
    Ask {
        #[arg(required = true, value_name = "PROMPT")]
        prompt: String,

        /// Print the finished chat as JSON instead of streaming text
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration
    Status,
    /// Write an example mathcast.toml
    Init,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if cli.verbose {
        eprintln!("{} Using config: {}", "Info:".blue().bold(), config_path.display());
    }

    match cli.command {
        Commands::Start { theme } => cmd_start(load_config(&config_path)?, theme, cli.verbose).await,
        Commands::Ask { prompt, json } => cmd_ask(load_config(&config_path)?, &prompt, json, cli.verbose).await,
        Commands::Status => cmd_status(&load_config(&config_path)?, &config_path, cli.verbose),
        Commands::Init => cmd_init(&config_path),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn logging_config(config: &Config, stderr: bool, verbose: bool) -> LoggingConfig {
    let logging = LoggingConfig::from(config.logging.clone()).with_stderr(stderr);
    if verbose { logging.with_level("debug") } else { logging }
}

/// Start the interactive TUI
async fn cmd_start(config: Config, theme: Option<ThemeMode>, verbose: bool) -> Result<()> {
    let _guard = logging::init_logging(logging_config(&config, false, verbose)).context("Failed to set up logging")?;

    let provider = ProviderFactory::from_config(&config.provider).context("Failed to create provider")?;
    let privacy = LoggingConfig::from(config.logging.clone()).privacy;
    let (transport, updates) = ChatTransport::new(provider, config.chat.clone());
    let transport = transport.with_privacy(privacy);

    let provider_label = match config.provider.kind() {
        "mock" => "mock".to_string(),
        kind => format!("{}/{}", kind, config.provider.model_name()),
    };
    let state = AppState::new(MediaPanels::new(&config.media), provider_label);
    let theme = theme.unwrap_or(config.ui.theme);

    tracing::info!(provider = config.provider.kind(), theme = %theme, "starting TUI");
    let mut app = App::new(transport, updates, state, theme);
    app.run().await.context("TUI error")?;

    Ok(())
}

/// Submit one question headless and print the reply as it streams
async fn cmd_ask(config: Config, prompt: &str, json: bool, verbose: bool) -> Result<()> {
    let _guard = logging::init_logging(logging_config(&config, true, verbose)).context("Failed to set up logging")?;

    let provider = ProviderFactory::from_config(&config.provider).context("Failed to create provider")?;
    let (transport, mut updates) = ChatTransport::new(provider, config.chat.clone());
    let mut vm = SessionViewModel::new(transport);
    vm.initialize();

    if vm.submit_message(prompt) == SubmitOutcome::EmptyDraft {
        anyhow::bail!("Prompt is empty");
    }

    let mut stdout = std::io::stdout();
    while vm.transport().is_streaming() {
        let Some(update) = updates.recv().await else {
            break;
        };
        let delta = match &update.event {
            TransportEvent::Delta { text, .. } => Some(text.clone()),
            _ => None,
        };
        let applied = vm.transport_turn(|transport| transport.apply(update));

        if applied
            && !json
            && let Some(text) = delta
        {
            write!(stdout, "{}", text)?;
            stdout.flush()?;
        }
    }

    if !json {
        writeln!(stdout)?;
    }

    if let Some(error) = vm.transport().last_error() {
        anyhow::bail!("Exchange failed: {}", error);
    }

    if json {
        let session = vm.active_session().context("No active chat")?;
        let output = serde_json::json!({
            "title": session.title,
            "messages": session.transcript,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

/// Show the resolved configuration
fn cmd_status(config: &Config, config_path: &Path, verbose: bool) -> Result<()> {
    println!("{}", "mathcast status".green().bold().underline());
    println!();

    let source = if config_path.exists() { sanitize_path(config_path) } else { "defaults".to_string() };
    println!("{} Configuration ({})", "Info:".blue().bold(), source);
    println!("  Provider: {}", config.provider.kind().cyan());
    println!("  Model: {}", config.provider.model_name().cyan());
    if matches!(config.provider, ProviderConfig::OpenAi { .. }) {
        let key = match config.provider.resolved_api_key() {
            Some(_) => "set".green().to_string(),
            None => "missing".red().to_string(),
        };
        println!("  API key: {}", key);
    }
    println!("  Theme: {}", config.ui.theme.cyan());
    println!("  Context limit: {}", config.chat.context_limit.to_string().cyan());

    println!();
    println!("{} Media", "Info:".blue().bold());
    let describe = |path: &Option<PathBuf>| path.as_deref().map(sanitize_path).unwrap_or_else(|| "-".to_string());
    println!("  Video: {}", describe(&config.media.video));
    println!("  Transcript: {}", describe(&config.media.transcript));
    println!("  Audio: {}", describe(&config.media.audio));
    println!("  Download dir: {}", sanitize_path(&config.media.download_dir));

    if verbose {
        println!();
        println!("{} Logging", "Info:".blue().bold());
        println!("  Level: {}", config.logging.level);
        println!("  Format: {}", config.logging.format);
        println!("  File logging: {}", config.logging.file.enabled);
        println!("  Message content: {}", config.logging.privacy.log_message_content);
    }

    Ok(())
}

/// Write the example config, refusing to overwrite an existing file
fn cmd_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists; remove it first to regenerate", path.display());
    }

    std::fs::write(path, Config::example()).context("Failed to write config")?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["mathcast", "status"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["mathcast", "--config", "/tmp/m.toml", "--verbose", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_start_theme() {
        let cli = Cli::try_parse_from(["mathcast", "start"]).unwrap();
        assert!(matches!(cli.command, Commands::Start { theme: None }));

        let cli = Cli::try_parse_from(["mathcast", "start", "--theme", "dark"]).unwrap();
        assert!(matches!(cli.command, Commands::Start { theme: Some(ThemeMode::Dark) }));

        assert!(Cli::try_parse_from(["mathcast", "start", "--theme", "sepia"]).is_err());
    }

    #[test]
    fn test_cli_ask_command() {
        let cli = Cli::try_parse_from(["mathcast", "ask", "What is pi?", "--json"]).unwrap();
        if let Commands::Ask { prompt, json } = cli.command {
            assert_eq!(prompt, "What is pi?");
            assert!(json);
        } else {
            panic!("Expected Ask command");
        }

        assert!(Cli::try_parse_from(["mathcast", "ask"]).is_err());
    }

    #[test]
    fn test_init_writes_example() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mathcast.toml");

        cmd_init(&path).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.provider.kind(), "openai");
        assert_eq!(config.chat.context_limit, 5);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mathcast.toml");
        std::fs::write(&path, "# mine").unwrap();

        assert!(cmd_init(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }

    #[test]
    fn test_load_config_missing_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.provider.kind(), "mock");
    }

    #[test]
    fn test_load_config_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mathcast.toml");
        std::fs::write(&path, "invalid toml").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load config"));
    }

    #[test]
    fn test_cmd_status() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        assert!(cmd_status(&config, &temp.path().join("mathcast.toml"), true).is_ok());
    }

    #[test]
    fn test_logging_config_verbose() {
        let config = Config::default();
        let quiet = logging_config(&config, false, false);
        assert!(!quiet.stderr);
        assert_eq!(quiet.level, "warn");

        let verbose = logging_config(&config, true, true);
        assert!(verbose.stderr);
        assert_eq!(verbose.level, "debug");
    }
}
