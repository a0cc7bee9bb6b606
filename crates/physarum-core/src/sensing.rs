use crate::agent::Agent;
use crate::grid::TrailGrid;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorGeometry {
    /// Distance from the agent to the sensor centre, in cells.
    pub offset: f64,
    pub half_width: usize,
}

/// Sum of committed intensity in the square window around a sensor projected
/// along `heading + angular_offset`. Off-grid samples contribute nothing.
pub fn sense(grid: &TrailGrid, agent: &Agent, angular_offset: f64, geometry: SensorGeometry) -> f32 {
    let angle = agent.heading + angular_offset;
    // Truncation toward zero picks the sensor cell.
    let centre_col = (agent.position[0] + angle.cos() * geometry.offset) as i64;
    let centre_row = (agent.position[1] + angle.sin() * geometry.offset) as i64;
    let reach = geometry.half_width as i64;

    let mut sum = 0.0f32;
    for dc in -reach..=reach {
        for dr in -reach..=reach {
            if let Some(v) = grid.committed_at(centre_col + dc, centre_row + dr) {
                sum += v as f32;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const GEOMETRY: SensorGeometry = SensorGeometry {
        offset: 3.0,
        half_width: 1,
    };

    #[test]
    fn sums_window_around_projected_point() {
        let mut grid = TrailGrid::new(10, 10, 0);
        // Sensor for an agent at (2.5, 5.5) facing +column lands on (5, 5).
        for (c, r) in [(4, 4), (5, 5), (6, 6), (7, 5)] {
            let i = grid.index_of(c, r);
            grid.seed_committed(i, 10);
        }
        let agent = Agent::new([2.5, 5.5], 0.0, 1.0, 4);
        assert_eq!(sense(&grid, &agent, 0.0, GEOMETRY), 30.0);
    }

    #[test]
    fn angular_offset_rotates_sensor() {
        let mut grid = TrailGrid::new(10, 10, 0);
        let i = grid.index_of(5, 8);
        grid.seed_committed(i, 50);
        let agent = Agent::new([5.5, 5.5], 0.0, 1.0, 4);
        assert_eq!(sense(&grid, &agent, 0.0, GEOMETRY), 0.0);
        assert_eq!(sense(&grid, &agent, FRAC_PI_2, GEOMETRY), 50.0);
    }

    #[test]
    fn off_grid_window_contributes_zero() {
        let grid = TrailGrid::new(4, 4, 100);
        // Facing away from the grid from its corner: only the in-bounds part counts.
        let agent = Agent::new([0.5, 0.5], std::f64::consts::PI, 1.0, 4);
        let geometry = SensorGeometry {
            offset: 0.0,
            half_width: 1,
        };
        assert_eq!(sense(&grid, &agent, 0.0, geometry), 400.0);

        let far = SensorGeometry {
            offset: 10.0,
            half_width: 1,
        };
        assert_eq!(sense(&grid, &agent, 0.0, far), 0.0);
    }
}
