//! Headless driver for the trail simulation.

mod driver;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use driver::{FrameClock, RunOptions};
use physarum_core::SimConfig;
use render::ColorMask;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "physarum")]
#[command(version)]
#[command(about = "Physarum-style emergent trail simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and write color-mapped frames
    Run {
        /// Configuration file (JSON); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed; overrides the config file
        #[arg(long)]
        seed: Option<u64>,

        /// Number of frames to simulate
        #[arg(short, long, default_value = "500")]
        frames: u64,

        /// Fixed time step per tick
        #[arg(long, default_value = "1.0")]
        dt: f64,

        /// Derive dt from elapsed wall time instead of --dt
        #[arg(long)]
        wall_clock: bool,

        /// Extra ticks per frame before drawing
        #[arg(long, default_value = "0")]
        fast_forward: u32,

        /// Save a frame every N frames (0 disables images)
        #[arg(long, default_value = "50")]
        snapshot_every: u64,

        /// Output directory for frames and summary.json
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Pixel size of one grid cell
        #[arg(long, default_value = "2")]
        cell_px: u32,
    },

    /// Write the default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "physarum.json")]
        output: PathBuf,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SimConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            frames,
            dt,
            wall_clock,
            fast_forward,
            snapshot_every,
            output,
            cell_px,
        } => {
            let mut config = load_config(config.as_ref())?;
            if seed.is_some() {
                config.seed = seed;
            }
            let clock = if wall_clock {
                FrameClock::WallClock {
                    last: Instant::now(),
                }
            } else {
                FrameClock::Fixed(dt)
            };
            let summary = driver::run(RunOptions {
                config,
                frames,
                clock,
                fast_forward,
                snapshot_every,
                output,
                cell_px,
                mask: ColorMask::default(),
            })?;
            info!(
                ticks = summary.ticks,
                mean_tick_us = summary.mean_tick_us,
                "done"
            );
        }
        Commands::Init { output } => {
            let json = serde_json::to_string_pretty(&SimConfig::default())?;
            std::fs::write(&output, json)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), "default config written");
        }
    }

    Ok(())
}
