use super::metrics::TickTimings;
use super::{SimError, Simulation};
use crate::diffusion;
use crate::steering::{deposit, steer_and_move};
use std::time::Instant;

impl Simulation {
    /// Steer, move and deposit for every agent. Agents read only the
    /// committed grid, so their order does not affect the pending result.
    pub(super) fn step_agents_phase(&mut self, dt: f64) {
        let deposit_intensity = self.config.deposit_intensity;
        for agent in &mut self.agents {
            steer_and_move(agent, &self.grid, &self.steering, &mut self.rng, dt);
            deposit(&mut self.grid, agent, deposit_intensity);
        }
    }

    /// Fade agent trails, then blur and evaporate the whole grid.
    pub(super) fn step_diffusion_phase(&mut self, dt: f64) {
        diffusion::diffuse_and_evaporate(&mut self.grid, &self.agents, self.rates, dt);
    }

    pub(super) fn valid_dt(dt: f64) -> bool {
        dt.is_finite() && dt >= 0.0
    }

    pub fn tick(&mut self, dt: f64) -> TickTimings {
        self.try_tick(dt).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Advance the simulation by one tick of length `dt`. A non-finite or
    /// negative `dt` is rejected before any state changes.
    pub fn try_tick(&mut self, dt: f64) -> Result<TickTimings, SimError> {
        if !Self::valid_dt(dt) {
            return Err(SimError::InvalidTimeStep(dt));
        }
        Ok(self.advance(dt))
    }

    pub(super) fn advance(&mut self, dt: f64) -> TickTimings {
        let total_start = Instant::now();
        self.tick_index = self.tick_index.saturating_add(1);

        let t0 = Instant::now();
        self.step_agents_phase(dt);
        let steer_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        self.step_diffusion_phase(dt);
        let diffuse_us = t1.elapsed().as_micros() as u64;

        let t2 = Instant::now();
        self.grid.commit();
        let commit_us = t2.elapsed().as_micros() as u64;

        TickTimings {
            steer_us,
            diffuse_us,
            commit_us,
            total_us: total_start.elapsed().as_micros() as u64,
        }
    }
}
