use crate::config::{SimConfig, SpawnStrategy};
use crate::grid::GridView;
use crate::simulation::{SimError, Simulation, TickTimings};
use tracing::debug;

/// Driver-facing handle. Holds at most one live simulation between
/// `initialize` and `teardown`.
#[derive(Default)]
pub struct Engine {
    simulation: Option<Simulation>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run on a `columns` x `rows` grid with default tunables.
    pub fn initialize(
        &mut self,
        columns: usize,
        rows: usize,
        agent_count: usize,
        spawn: SpawnStrategy,
    ) -> Result<(), SimError> {
        self.initialize_with(SimConfig {
            columns,
            rows,
            agent_count,
            spawn,
            ..SimConfig::default()
        })
    }

    /// Start a run from a full config, replacing any previous one.
    pub fn initialize_with(&mut self, config: SimConfig) -> Result<(), SimError> {
        self.simulation = Some(Simulation::try_new(config)?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.simulation.is_some()
    }

    pub fn tick(&mut self, dt: f64) -> Result<TickTimings, SimError> {
        let simulation = self.simulation.as_mut().ok_or(SimError::NotInitialized)?;
        simulation.try_tick(dt)
    }

    /// Committed grid of the live run.
    pub fn view(&self) -> Result<GridView<'_>, SimError> {
        self.simulation
            .as_ref()
            .map(Simulation::view)
            .ok_or(SimError::NotInitialized)
    }

    /// End the run and hand back its final state.
    pub fn teardown(&mut self) -> Option<Simulation> {
        let simulation = self.simulation.take();
        if let Some(sim) = &simulation {
            debug!(ticks = sim.tick_index(), "simulation torn down");
        }
        simulation
    }
}
