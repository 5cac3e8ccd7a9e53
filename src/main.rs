use anyhow::{Context, Result};
use belltower::app::{App, AppEvent};
use belltower::config::Config;
use belltower::feed::{Fixture, MemoryFeed};
use belltower::theme::ThemeType;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Fixture used when no `--fixture` is given.
const DEMO_FIXTURE: &str = include_str!("../demos/inbox.json");

/// Simulated round trip of the fixture client.
const DEMO_LATENCY: Duration = Duration::from_millis(300);

/// Get the config directory path (~/.config/belltower/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("belltower"))
}

fn parse_theme_type(s: &str) -> Result<ThemeType, String> {
    ThemeType::from_str_name(s).ok_or_else(|| format!("unknown theme type '{}' (light|dark)", s))
}

#[derive(Parser, Debug)]
#[command(name = "belltower", about = "Notification inbox for the terminal")]
struct Args {
    /// Config file (default: ~/.config/belltower/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON fixture with stores, notifications and queued deliveries
    #[arg(long, value_name = "PATH")]
    fixture: Option<PathBuf>,

    /// Base theme, overriding the config file
    #[arg(long, value_name = "light|dark", value_parser = parse_theme_type)]
    theme_type: Option<ThemeType>,

    /// Log file (default: ~/.config/belltower/belltower.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Seconds between queued fixture deliveries, 0 to disable
    #[arg(long, value_name = "N", default_value_t = 8)]
    drip_secs: u64,
}

/// Log to a file: the terminal belongs to the widget.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_fixture(path: Option<&Path>) -> Result<Fixture> {
    match path {
        Some(path) => Fixture::load(path)
            .with_context(|| format!("Failed to load fixture '{}'", path.display())),
        None => serde_json::from_str(DEMO_FIXTURE).context("Failed to parse demo fixture"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_dir = get_config_dir()?;

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("belltower.log"));
    init_logging(&log_path)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    if let Some(theme_type) = args.theme_type {
        config.theme_type = theme_type;
    }

    let fixture = load_fixture(args.fixture.as_deref())?;
    tracing::info!(
        notifications = fixture.notifications.len(),
        incoming = fixture.incoming.len(),
        stores = fixture.stores.len(),
        "Loaded fixture"
    );
    let feed = MemoryFeed::with_options(fixture, config.page_size, DEMO_LATENCY);

    let mut app =
        App::new(config, Arc::new(feed.clone())).context("Failed to create application")?;

    // First page loads in the background; the panel shows a loader meanwhile
    let connecting = feed.clone();
    tokio::spawn(async move {
        if let Err(e) = connecting.connect().await {
            tracing::error!(error = %e, "Initial feed load failed");
        }
    });
    let delivery = (args.drip_secs > 0).then(|| feed.spawn_delivery(Duration::from_secs(args.drip_secs)));

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    let result = belltower::ui::run(&mut app, event_tx, event_rx).await;

    if let Some(handle) = delivery {
        handle.abort();
    }
    result
}
