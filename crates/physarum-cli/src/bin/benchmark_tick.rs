use physarum_core::{SimConfig, Simulation, SpawnStrategy, TickTimings};
use std::time::Instant;

fn main() {
    let config = SimConfig {
        spawn: SpawnStrategy::Disk { radius: 100 },
        seed: Some(42),
        ..SimConfig::default()
    };
    println!(
        "Benchmarking {}x{} grid with {} agents (history {})",
        config.columns, config.rows, config.agent_count, config.history_len
    );

    let mut simulation = Simulation::new(config.clone());
    let mut sampled = Simulation::new(config);
    let steps = 200u32;

    // Warm up so trails and histories are populated
    for _ in 0..20 {
        simulation.tick(1.0);
    }

    let mut totals = TickTimings::default();
    let start = Instant::now();
    for _ in 0..steps {
        let t = simulation.tick(1.0);
        totals.steer_us += t.steer_us;
        totals.diffuse_us += t.diffuse_us;
        totals.commit_us += t.commit_us;
        totals.total_us += t.total_us;
    }
    let duration = start.elapsed();

    println!("Time for {} ticks: {:?}", steps, duration);
    println!("Avg time per tick: {:?}", duration / steps);
    println!(
        "Avg phases (us): steer {} | diffuse {} | commit {}",
        totals.steer_us / steps as u64,
        totals.diffuse_us / steps as u64,
        totals.commit_us / steps as u64
    );

    // Same run with grid statistics sampled every tick
    let start = Instant::now();
    let summary = sampled.run_experiment(20 + steps as u64, 1, 1.0);
    let duration_sampled = start.elapsed();
    println!(
        "Time for {} ticks WITH sampling: {:?} ({} samples, mean tick {} us)",
        summary.ticks,
        duration_sampled,
        summary.samples.len(),
        summary.mean_tick_us
    );

    let stats = simulation.grid_stats();
    println!(
        "Final grid: {} lit cells, mean intensity {:.2}",
        stats.lit_cells, stats.mean_intensity
    );
}
