//! Planning Poker
//!
//! CLI entry point for interactive sessions and the scripted demo round.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use planpoker::cli::{Cli, Command, OutputFormat, get_log_path};
use planpoker::config::Config;
use planpoker::demo::run_demo;
use planpoker::repl::run_interactive;
use pokercore::VoteValue;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        enforce_facilitator = config.session.enforce_facilitator,
        outlier_ratio = config.session.outlier_ratio,
        "Planpoker loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Play { name }) => {
            debug!(?name, "main: matched Play command");
            run_interactive(&config, name).await
        }
        Some(Command::Demo { format }) => {
            debug!(?format, "main: matched Demo command");
            cmd_demo(&config, format).await
        }
        Some(Command::Scale) => {
            debug!("main: matched Scale command");
            cmd_scale();
            Ok(())
        }
        None => {
            debug!("main: no command specified, starting interactive session");
            run_interactive(&config, None).await
        }
    }
}

/// Run the scripted round and print the results
async fn cmd_demo(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_demo: called");
    let report = run_demo(config.session.clone()).await?;
    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }
    Ok(())
}

/// Print the voting scale
fn cmd_scale() {
    let cards: Vec<String> = VoteValue::SCALE.iter().map(ToString::to_string).collect();
    println!("{} {}", "Scale:".bold(), cards.join(" "));
}
