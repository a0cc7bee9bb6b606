pub mod metrics;
mod tick;

pub use metrics::*;

use crate::agent::Agent;
use crate::config::{SimConfig, SimConfigError};
use crate::diffusion::DecayRates;
use crate::grid::{GridView, TrailGrid};
use crate::sensing::SensorGeometry;
use crate::spawn::spawn_agents;
use crate::steering::SteeringParams;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};
use tracing::debug;

/// Owns both grid buffers, the agent population and the random source.
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) grid: TrailGrid,
    pub(crate) agents: Vec<Agent>,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) steering: SteeringParams,
    pub(crate) rates: DecayRates,
    pub(crate) tick_index: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    InvalidConfiguration(SimConfigError),
    NotInitialized,
    AgentCountMismatch { expected: usize, actual: usize },
    InvalidTimeStep(f64),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfiguration(e) => write!(f, "invalid configuration: {e}"),
            SimError::NotInitialized => write!(f, "simulation has not been initialized"),
            SimError::AgentCountMismatch { expected, actual } => write!(
                f,
                "agents.len() ({actual}) must match config.agent_count ({expected})"
            ),
            SimError::InvalidTimeStep(dt) => {
                write!(f, "dt must be finite and non-negative (got {dt})")
            }
        }
    }
}

impl From<SimConfigError> for SimError {
    fn from(err: SimConfigError) -> Self {
        SimError::InvalidConfiguration(err)
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimError::InvalidConfiguration(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    InvalidTimeStep(f64),
    TooManyTicks { max: u64, actual: u64 },
    TooManySamples { max: u64, actual: u64 },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::InvalidTimeStep(dt) => {
                write!(f, "dt must be finite and non-negative (got {dt})")
            }
            ExperimentError::TooManyTicks { max, actual } => {
                write!(f, "ticks ({actual}) exceed supported maximum ({max})")
            }
            ExperimentError::TooManySamples { max, actual } => {
                write!(f, "sample count ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl Error for ExperimentError {}

impl Simulation {
    pub const MAX_EXPERIMENT_TICKS: u64 = 1_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: u64 = 50_000;

    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Validate `config`, seed the generator and spawn the population.
    pub fn try_new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_os_rng(),
        };
        let agents = spawn_agents(&config, &mut rng);
        Self::try_with_agents(config, agents, rng)
    }

    /// Build from an explicit population and generator.
    pub fn try_with_agents(
        config: SimConfig,
        agents: Vec<Agent>,
        rng: ChaCha12Rng,
    ) -> Result<Self, SimError> {
        config.validate()?;
        if agents.len() != config.agent_count {
            return Err(SimError::AgentCountMismatch {
                expected: config.agent_count,
                actual: agents.len(),
            });
        }
        debug!(
            columns = config.columns,
            rows = config.rows,
            agents = agents.len(),
            spawn = ?config.spawn,
            "simulation initialized"
        );
        Ok(Self {
            grid: TrailGrid::new(config.columns, config.rows, 0),
            steering: Self::steering_from_config(&config),
            rates: DecayRates {
                diffuse_rate: config.diffuse_rate,
                evaporation_rate: config.evaporation_rate,
            },
            agents,
            rng,
            tick_index: 0,
            config,
        })
    }

    fn steering_from_config(config: &SimConfig) -> SteeringParams {
        SteeringParams {
            scope: config.sensor_scope,
            turn_rate: config.turn_rate,
            sensors: SensorGeometry {
                offset: config.sensor_offset,
                half_width: config.sensor_half_width,
            },
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn grid(&self) -> &TrailGrid {
        &self.grid
    }

    /// Committed grid for renderers.
    pub fn view(&self) -> GridView<'_> {
        self.grid.view()
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Set a committed cell before the run starts, e.g. to plant a pattern.
    pub fn seed_cell(&mut self, col: usize, row: usize, value: u8) {
        let index = self.grid.index_of(col, row);
        self.grid.seed_committed(index, value);
    }

    pub fn run_experiment(&mut self, ticks: u64, sample_every: u64, dt: f64) -> RunSummary {
        self.try_run_experiment(ticks, sample_every, dt)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Tick `ticks` times, sampling grid statistics every `sample_every`
    /// ticks and on the final tick.
    pub fn try_run_experiment(
        &mut self,
        ticks: u64,
        sample_every: u64,
        dt: f64,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if !Self::valid_dt(dt) {
            return Err(ExperimentError::InvalidTimeStep(dt));
        }
        if ticks > Self::MAX_EXPERIMENT_TICKS {
            return Err(ExperimentError::TooManyTicks {
                max: Self::MAX_EXPERIMENT_TICKS,
                actual: ticks,
            });
        }
        let estimated_samples = if ticks == 0 {
            0
        } else {
            ((ticks - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let mut samples = Vec::with_capacity(estimated_samples as usize);
        let mut total_us = 0u64;
        for tick in 1..=ticks {
            total_us += self.advance(dt).total_us;
            if tick % sample_every == 0 || tick == ticks {
                samples.push(self.grid_stats());
            }
        }
        debug!(ticks, samples = samples.len(), total_us, "experiment finished");
        Ok(RunSummary {
            schema_version: 1,
            ticks,
            sample_every,
            dt,
            agent_count: self.agents.len(),
            mean_tick_us: if ticks > 0 { total_us / ticks } else { 0 },
            samples,
        })
    }
}
