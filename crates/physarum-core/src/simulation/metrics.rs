use super::Simulation;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
pub struct TickTimings {
    pub steer_us: u64,
    pub diffuse_us: u64,
    pub commit_us: u64,
    pub total_us: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GridStats {
    pub tick: u64,
    pub total_intensity: u64,
    /// Cells with non-zero intensity.
    pub lit_cells: usize,
    pub max_intensity: u8,
    pub mean_intensity: f32,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub ticks: u64,
    pub sample_every: u64,
    pub dt: f64,
    pub agent_count: usize,
    #[serde(default)]
    pub mean_tick_us: u64,
    pub samples: Vec<GridStats>,
}

impl GridStats {
    pub fn from_cells(tick: u64, cells: &[u8]) -> Self {
        let total_intensity = cells.iter().map(|&v| v as u64).sum::<u64>();
        Self {
            tick,
            total_intensity,
            lit_cells: cells.iter().filter(|&&v| v > 0).count(),
            max_intensity: cells.iter().copied().max().unwrap_or(0),
            mean_intensity: if cells.is_empty() {
                0.0
            } else {
                total_intensity as f32 / cells.len() as f32
            },
        }
    }
}

impl Simulation {
    pub fn grid_stats(&self) -> GridStats {
        GridStats::from_cells(self.tick_index, self.grid.view().cells)
    }
}
