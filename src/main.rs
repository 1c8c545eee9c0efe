mod app;
mod term;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use trainwreck::GameConfig;

#[derive(Parser)]
#[command(name = "trainwreck")]
#[command(version, about = "Steer a train around a 16x16 board without wrecking it")]
struct Cli {
    /// TOML file overriding the default game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for passenger and station placement
    #[arg(long)]
    seed: Option<u64>,

    /// Starting speed in ticks per second
    #[arg(long)]
    speed: Option<u32>,

    /// Directory for the log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_dir)?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.initial_speed = speed;
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?cli.seed, speed = config.initial_speed, "starting");

    let mut app = app::TrainWreckApp::new(config, rng)?;
    app.initialize()?;

    // The terminal is restored whatever the game loop returns
    let result = app.show_intro().and_then(|play| if play { app.play() } else { Ok(()) });
    app.restore()?;

    if let Err(err) = &result {
        tracing::error!("game aborted: {err:#}");
    }
    result
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: GameConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join("trainwreck.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    // stdout belongs to the game screen, so everything goes to the file
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .init();

    Ok(())
}
