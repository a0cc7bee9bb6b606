use crate::agent::Agent;
use crate::config::{SimConfig, SpawnStrategy};
use crate::steering::clamp_to_extent;
use rand::Rng;
use std::f64::consts::TAU;

/// Create the full population for `config` using its spawn strategy.
pub fn spawn_agents<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec<Agent> {
    (0..config.agent_count)
        .map(|_| match config.spawn {
            SpawnStrategy::Disk { radius } => disk_agent(config, radius, rng),
            SpawnStrategy::Uniform => uniform_agent(config, rng),
        })
        .collect()
}

fn disk_agent<R: Rng + ?Sized>(config: &SimConfig, radius: u32, rng: &mut R) -> Agent {
    let cx = (config.columns / 2) as f64;
    let cy = (config.rows / 2) as f64;
    let theta = TAU * rng.random::<f64>();
    let r = rng.random_range(0..radius.max(1)) as f64;
    let position = clamp_to_extent(
        [cx + r * theta.cos(), cy + r * theta.sin()],
        config.columns,
        config.rows,
    );

    // Each axis is normalised by its own scale, so the heading points only
    // roughly toward the centre.
    let vx = (cx - position[0]) / cx.hypot(position[0]);
    let vy = (cy - position[1]) / cy.hypot(position[1]);
    let heading = if vx.is_finite() && vy.is_finite() {
        vy.atan2(vx)
    } else {
        0.0
    };

    Agent::new(position, heading, config.agent_speed, config.history_len)
}

fn uniform_agent<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Agent {
    let position = [
        rng.random_range(0..config.columns) as f64,
        rng.random_range(0..config.rows) as f64,
    ];
    let heading = TAU * rng.random::<f64>();
    Agent::new(position, heading, config.agent_speed, config.history_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn config(spawn: SpawnStrategy) -> SimConfig {
        SimConfig {
            columns: 64,
            rows: 48,
            agent_count: 500,
            spawn,
            ..SimConfig::default()
        }
    }

    #[test]
    fn disk_spawn_stays_within_radius_and_grid() {
        let config = config(SpawnStrategy::Disk { radius: 10 });
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let agents = spawn_agents(&config, &mut rng);
        assert_eq!(agents.len(), 500);
        for agent in &agents {
            let dx = agent.position[0] - 32.0;
            let dy = agent.position[1] - 24.0;
            assert!(dx.hypot(dy) < 10.0 + 1e-9);
            assert!((0.0..64.0).contains(&agent.position[0]));
            assert!((0.0..48.0).contains(&agent.position[1]));
            assert!(agent.history.is_empty());
            assert_eq!(agent.speed, config.agent_speed);
        }
    }

    #[test]
    fn oversized_disk_is_clamped_into_grid() {
        let config = config(SpawnStrategy::Disk { radius: 1000 });
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        for agent in spawn_agents(&config, &mut rng) {
            assert!((0.0..64.0).contains(&agent.position[0]));
            assert!((0.0..48.0).contains(&agent.position[1]));
        }
    }

    #[test]
    fn uniform_spawn_uses_whole_cells() {
        let config = config(SpawnStrategy::Uniform);
        let mut rng = ChaCha12Rng::seed_from_u64(9);
        for agent in spawn_agents(&config, &mut rng) {
            assert_eq!(agent.position[0].fract(), 0.0);
            assert_eq!(agent.position[1].fract(), 0.0);
            assert!((0.0..TAU).contains(&agent.heading));
        }
    }

    #[test]
    fn spawn_is_deterministic_for_fixed_seed() {
        let config = config(SpawnStrategy::Disk { radius: 20 });
        let a = spawn_agents(&config, &mut ChaCha12Rng::seed_from_u64(1));
        let b = spawn_agents(&config, &mut ChaCha12Rng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
