use crate::agent::Agent;
use crate::grid::TrailGrid;
use crate::sensing::{sense, SensorGeometry};
use rand::Rng;
use std::f64::consts::TAU;

/// Gap kept between a clamped position and the far edge of the grid.
pub const EDGE_EPSILON: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringParams {
    /// Angle between the forward sensor and each side sensor.
    pub scope: f64,
    pub turn_rate: f64,
    pub sensors: SensorGeometry,
}

/// Outcome of comparing the three sensor readings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steer {
    /// Forward strictly strongest: keep heading.
    Hold,
    /// Forward strictly weakest: random perturbation either way.
    Wander,
    TurnRight,
    TurnLeft,
    /// Left and right equal, forward neither strongest nor weakest. Heading is kept.
    Undecided,
}

pub fn decide(forward: f32, left: f32, right: f32) -> Steer {
    if forward > left && forward > right {
        Steer::Hold
    } else if forward < left && forward < right {
        Steer::Wander
    } else if right > left {
        Steer::TurnRight
    } else if left > right {
        Steer::TurnLeft
    } else {
        Steer::Undecided
    }
}

impl Steer {
    /// Heading change for this decision given a uniform draw in [0, 1).
    pub fn heading_delta(self, strength: f64, turn_rate: f64, dt: f64) -> f64 {
        match self {
            Steer::Hold | Steer::Undecided => 0.0,
            Steer::Wander => (strength - 0.5) * 2.0 * turn_rate * dt,
            Steer::TurnRight => -strength * turn_rate * dt,
            Steer::TurnLeft => strength * turn_rate * dt,
        }
    }
}

/// Clamp into `[0, extent - EDGE_EPSILON]` per axis. NaN maps to 0.
pub fn clamp_to_extent(position: [f64; 2], columns: usize, rows: usize) -> [f64; 2] {
    let clamp_axis = |v: f64, extent: usize| {
        if v.is_nan() {
            0.0
        } else {
            v.clamp(0.0, extent as f64 - EDGE_EPSILON)
        }
    };
    [clamp_axis(position[0], columns), clamp_axis(position[1], rows)]
}

fn outside_extent(position: [f64; 2], columns: usize, rows: usize) -> bool {
    !(position[0] >= 0.0
        && position[0] < columns as f64
        && position[1] >= 0.0
        && position[1] < rows as f64)
}

/// Steer and move one agent for a tick.
///
/// Displacement follows the heading held at the start of the tick; the
/// heading chosen here takes effect on the next tick. An agent that would
/// leave the grid is clamped inside and given a fresh random heading.
/// Returns the decision taken.
pub fn steer_and_move<R: Rng + ?Sized>(
    agent: &mut Agent,
    grid: &TrailGrid,
    params: &SteeringParams,
    rng: &mut R,
    dt: f64,
) -> Steer {
    let step = agent.speed * dt;
    let mut next = [
        agent.position[0] + agent.heading.cos() * step,
        agent.position[1] + agent.heading.sin() * step,
    ];

    let forward = sense(grid, agent, 0.0, params.sensors);
    let left = sense(grid, agent, params.scope, params.sensors);
    let right = sense(grid, agent, -params.scope, params.sensors);

    let strength = rng.random::<f64>();
    let steer = decide(forward, left, right);
    agent.heading += steer.heading_delta(strength, params.turn_rate, dt);

    if outside_extent(next, grid.columns(), grid.rows()) {
        next = clamp_to_extent(next, grid.columns(), grid.rows());
        agent.heading = TAU * rng.random::<f64>();
    }

    agent.advance_to(next);
    steer
}

/// Deposit trail at the agent's current cell into the pending buffer.
pub fn deposit(grid: &mut TrailGrid, agent: &Agent, intensity: u8) {
    if let Some(index) = grid.cell_of(agent.position) {
        grid.write_combine(index, intensity as f32);
    }
}
