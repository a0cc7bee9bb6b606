use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::{error::Error, fmt};

/// How the initial population is laid out over the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnStrategy {
    /// Agents scattered inside a disk around the grid centre, facing inward.
    Disk { radius: u32 },
    /// Agents on uniformly random cells with uniformly random headings.
    Uniform,
}

impl Default for SpawnStrategy {
    fn default() -> Self {
        SpawnStrategy::Disk { radius: 100 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub columns: usize,
    pub rows: usize,
    pub agent_count: usize,
    /// Cells travelled per unit of `dt`.
    pub agent_speed: f64,
    /// Number of prior positions remembered per agent.
    pub history_len: usize,
    pub diffuse_rate: f64,
    pub evaporation_rate: f64,
    /// Half-angle between the forward sensor and each side sensor (radians).
    pub sensor_scope: f64,
    pub turn_rate: f64,
    pub sensor_offset: f64,
    /// Sensor window spans `2 * sensor_half_width + 1` cells per axis.
    pub sensor_half_width: usize,
    pub deposit_intensity: u8,
    pub spawn: SpawnStrategy,
    /// `None` seeds the generator from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            columns: 640,
            rows: 420,
            agent_count: 10_000,
            agent_speed: 0.05,
            history_len: 300,
            diffuse_rate: 0.015,
            evaporation_rate: 0.2,
            sensor_scope: PI / 6.0,
            turn_rate: 0.3,
            sensor_offset: 3.0,
            sensor_half_width: 3,
            deposit_intensity: u8::MAX,
            spawn: SpawnStrategy::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigError {
    EmptyGrid { columns: usize, rows: usize },
    GridTooLarge { max: usize, actual: usize },
    NoAgents,
    TooManyAgents { max: usize, actual: usize },
    EmptyHistory,
    ZeroSpawnRadius,
    SensorTooWide { max: usize, actual: usize },
    InvalidRate { field: &'static str, value: f64 },
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::EmptyGrid { columns, rows } => {
                write!(f, "grid must have positive dimensions (got {columns}x{rows})")
            }
            SimConfigError::GridTooLarge { max, actual } => {
                write!(f, "grid cell count ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::NoAgents => write!(f, "agent_count must be positive"),
            SimConfigError::TooManyAgents { max, actual } => {
                write!(f, "agent_count ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::EmptyHistory => write!(f, "history_len must be positive"),
            SimConfigError::ZeroSpawnRadius => write!(f, "disk spawn radius must be positive"),
            SimConfigError::SensorTooWide { max, actual } => {
                write!(f, "sensor_half_width ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InvalidRate { field, value } => {
                write!(f, "{field} must be finite and non-negative (got {value})")
            }
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub const MAX_CELLS: usize = 1 << 24;
    pub const MAX_AGENTS: usize = 1_000_000;
    /// Each sensor reads `(2 * half_width + 1)^2` cells per agent per tick.
    pub const MAX_SENSOR_HALF_WIDTH: usize = 64;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(SimConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let cells = self
            .columns
            .checked_mul(self.rows)
            .unwrap_or(usize::MAX);
        if cells > Self::MAX_CELLS {
            return Err(SimConfigError::GridTooLarge {
                max: Self::MAX_CELLS,
                actual: cells,
            });
        }
        if self.agent_count == 0 {
            return Err(SimConfigError::NoAgents);
        }
        if self.agent_count > Self::MAX_AGENTS {
            return Err(SimConfigError::TooManyAgents {
                max: Self::MAX_AGENTS,
                actual: self.agent_count,
            });
        }
        if self.history_len == 0 {
            return Err(SimConfigError::EmptyHistory);
        }
        if self.spawn == (SpawnStrategy::Disk { radius: 0 }) {
            return Err(SimConfigError::ZeroSpawnRadius);
        }
        if self.sensor_half_width > Self::MAX_SENSOR_HALF_WIDTH {
            return Err(SimConfigError::SensorTooWide {
                max: Self::MAX_SENSOR_HALF_WIDTH,
                actual: self.sensor_half_width,
            });
        }
        let rates = [
            ("agent_speed", self.agent_speed),
            ("diffuse_rate", self.diffuse_rate),
            ("evaporation_rate", self.evaporation_rate),
            ("sensor_scope", self.sensor_scope),
            ("turn_rate", self.turn_rate),
            ("sensor_offset", self.sensor_offset),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(SimConfigError::InvalidRate { field, value });
            }
        }
        Ok(())
    }

    /// Parse a config from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
