use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod angle;
mod backend;
mod color;
mod config;
mod display;
mod form;
mod materials;
mod model;
mod plot;
mod session;

use config::Config;
use display::DisplayMode;
use model::{Plane, Variable};

#[derive(Parser, Debug)]
#[command(name = "anisoplot")]
#[command(author, version, about = "Polar plots of elastic wave anisotropy in crystals")]
struct Args {
    /// Display mode: terminal or print
    #[arg(short, long)]
    mode: Option<DisplayMode>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend URL requests are POSTed to
    #[arg(short, long)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Catalog material to load, e.g. "Zn (zinc)"
    #[arg(long)]
    material: Option<String>,

    /// Initial propagation angle in degrees
    #[arg(short, long, allow_hyphen_values = true)]
    angle: Option<String>,

    /// Projection plane
    #[arg(short, long)]
    plane: Option<Plane>,

    /// Variable to plot
    #[arg(long)]
    variable: Option<Variable>,

    /// Label height in braille dots
    #[arg(long)]
    font_size: Option<f64>,

    /// Number of angle spokes
    #[arg(long)]
    angle_guides: Option<usize>,

    /// Wave mode colors as three hex values, e.g. "#AA0000,#005000,#0000FF"
    #[arg(long)]
    mode_colors: Option<String>,

    /// Log file for the terminal UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write a commented config template to the default path and exit
    #[arg(long)]
    init_config: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,
}

/// Terminal mode owns the screen, so its logs go to a file; print mode logs to stderr.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("anisoplot=info".parse()?);

    match config.display.mode {
        DisplayMode::Print => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        DisplayMode::Terminal => {
            let Some(path) = config.log_path() else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::sink)
                    .init();
                return Ok(());
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "anisoplot", &mut std::io::stdout());
        return Ok(());
    }

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(&args);

    init_logging(&config)?;

    info!("Starting anisoplot in {:?} mode", config.display.mode);

    match config.display.mode {
        DisplayMode::Terminal => {
            display::terminal::run(config).await?;
        }
        DisplayMode::Print => {
            display::print::run(config).await?;
        }
    }

    Ok(())
}
