use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;

use listsync::api::HttpGateway;
use listsync::config::{Config, API_URL_ENV};
use listsync::controller::{ControllerOptions, ListController};

mod ui;

/// Get the config directory path (~/.config/listsync/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("listsync"))
}

#[derive(Parser, Debug)]
#[command(
    name = "listsync",
    about = "Browse, search, select and reorder a remote paginated list"
)]
struct Args {
    /// Base URL of the list API (overridden by LISTSYNC_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Items requested per page
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Config file (default: ~/.config/listsync/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal is busy with the UI)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Install the tracing subscriber. Without a log file, events are discarded.
fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

/// Resolve configuration: file, then CLI flags, then environment.
fn load_config(args: &Args) -> Result<Config> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&path)
        .with_context(|| format!("Failed to load config from '{}'", path.display()))?;

    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    config.apply_api_url_override(std::env::var(API_URL_ENV).ok());
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config = load_config(&args)?;
    tracing::info!(api_url = %config.api_url, page_size = config.page_size, "Starting listsync");

    let client = reqwest::Client::builder()
        .user_agent(concat!("listsync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let gateway = HttpGateway::new(client, &config.api_url)
        .with_context(|| format!("Invalid API URL '{}'", config.api_url))?;

    let (mut controller, event_rx) = ListController::new(gateway, ControllerOptions::from(&config));
    controller.bootstrap();

    ui::run(&mut controller, event_rx).await?;
    Ok(())
}
