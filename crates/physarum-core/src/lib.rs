//! Physarum-style trail simulation: agents sense and steer over a
//! double-buffered intensity grid that diffuses and evaporates each tick.

pub mod agent;
pub mod config;
pub mod diffusion;
pub mod engine;
pub mod grid;
pub mod sensing;
pub mod simulation;
pub mod spawn;
pub mod steering;

pub use config::{SimConfig, SimConfigError, SpawnStrategy};
pub use engine::Engine;
pub use grid::{GridView, TrailGrid};
pub use simulation::{ExperimentError, RunSummary, SimError, Simulation, TickTimings};
