use crate::render::{render_frame, ColorMask};
use anyhow::{Context, Result};
use physarum_core::simulation::GridStats;
use physarum_core::{Engine, RunSummary, SimConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Source of the per-tick `dt`.
pub enum FrameClock {
    Fixed(f64),
    /// Elapsed wall time since the previous frame, in hundredths of a second.
    WallClock { last: Instant },
}

impl FrameClock {
    pub fn next_dt(&mut self) -> f64 {
        match self {
            FrameClock::Fixed(dt) => *dt,
            FrameClock::WallClock { last } => {
                let now = Instant::now();
                let dt = now.duration_since(*last).as_secs_f64() * 100.0;
                *last = now;
                dt
            }
        }
    }

    /// Start timing from now, so setup time is not counted as the first dt.
    pub fn restart(&mut self) {
        if let FrameClock::WallClock { last } = self {
            *last = Instant::now();
        }
    }
}

pub struct RunOptions {
    pub config: SimConfig,
    pub frames: u64,
    pub clock: FrameClock,
    /// Extra ticks per frame before drawing.
    pub fast_forward: u32,
    /// Write a frame image every N frames; 0 disables images.
    pub snapshot_every: u64,
    pub output: PathBuf,
    pub cell_px: u32,
    pub mask: ColorMask,
}

/// Drive the engine for `frames` frames, saving snapshots and a summary.
pub fn run(mut options: RunOptions) -> Result<RunSummary> {
    std::fs::create_dir_all(&options.output)
        .with_context(|| format!("creating output directory {}", options.output.display()))?;

    let mut engine = Engine::new();
    engine
        .initialize_with(options.config.clone())
        .context("initializing simulation")?;
    info!(
        columns = options.config.columns,
        rows = options.config.rows,
        agents = options.config.agent_count,
        frames = options.frames,
        "simulation started"
    );
    options.clock.restart();

    let mut samples = Vec::new();
    let mut total_us = 0u64;
    let mut ticks = 0u64;
    let mut last_dt = 0.0;
    for frame in 1..=options.frames {
        let dt = options.clock.next_dt();
        last_dt = dt;
        for _ in 0..=options.fast_forward {
            total_us += engine.tick(dt)?.total_us;
            ticks += 1;
        }

        let view = engine.view()?;
        if options.snapshot_every > 0 && frame % options.snapshot_every == 0 {
            let path = options.output.join(format!("frame_{frame:05}.png"));
            render_frame(view, &options.mask, options.cell_px)?
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            let stats = GridStats::from_cells(ticks, view.cells);
            info!(
                frame,
                ticks,
                lit_cells = stats.lit_cells,
                mean_intensity = stats.mean_intensity,
                "snapshot written"
            );
            samples.push(stats);
        } else {
            debug!(frame, ticks, dt, "frame");
        }
    }

    let summary = RunSummary {
        schema_version: 1,
        ticks,
        sample_every: options.snapshot_every,
        dt: last_dt,
        agent_count: options.config.agent_count,
        mean_tick_us: if ticks > 0 { total_us / ticks } else { 0 },
        samples,
    };
    let summary_path = options.output.join("summary.json");
    let json = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    info!(ticks, path = %summary_path.display(), "run finished");

    engine.teardown();
    Ok(summary)
}
