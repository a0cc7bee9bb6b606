//! Per-tick blur and evaporation. Both passes read only the committed buffer
//! and max-combine into the pending buffer.

use crate::agent::Agent;
use crate::grid::TrailGrid;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecayRates {
    pub diffuse_rate: f64,
    pub evaporation_rate: f64,
}

#[inline]
fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}

/// Fade every cell an agent recently occupied by one evaporation step.
pub fn decay_trails(grid: &mut TrailGrid, agents: &[Agent], evaporation_rate: f64, dt: f64) {
    let fade = (evaporation_rate * dt) as f32;
    for agent in agents {
        for position in agent.history.iter() {
            let Some(index) = grid.cell_of(position) else {
                continue;
            };
            let faded = (grid.committed_index(index) as f32 - fade).max(0.0);
            grid.write_combine(index, faded);
        }
    }
}

/// Mean of the eight neighbours of `index` over a fixed divisor of 9.
/// Off-grid neighbours count as zero, which darkens edges.
fn neighbourhood_mean(cells: &[u8], columns: usize, rows: usize, index: usize) -> f32 {
    let col = (index % columns) as i64;
    let row = (index / columns) as i64;
    let mut sum = 0u32;
    for dc in -1i64..=1 {
        for dr in -1i64..=1 {
            if dc == 0 && dr == 0 {
                continue;
            }
            let (nc, nr) = (col + dc, row + dr);
            if nc >= 0 && nr >= 0 && (nc as usize) < columns && (nr as usize) < rows {
                sum += cells[nr as usize * columns + nc as usize] as u32;
            }
        }
    }
    sum as f32 / 9.0
}

/// Blend each cell toward its neighbourhood mean, then evaporate.
/// Cells are independent, so the pass runs in parallel over the pending buffer.
pub fn diffuse(grid: &mut TrailGrid, rates: DecayRates, dt: f64) {
    let columns = grid.columns();
    let rows = grid.rows();
    let blend = (rates.diffuse_rate * dt) as f32;
    let fade = (rates.evaporation_rate * dt) as f32;
    let (committed, pending) = grid.buffers_mut();
    let cells = committed.cells();

    pending.par_combine_each(|index| {
        let own = cells[index] as f32;
        let blurred = lerp(own, neighbourhood_mean(cells, columns, rows, index), blend);
        (blurred - fade).max(0.0)
    });
}

/// Both decay passes in tick order.
pub fn diffuse_and_evaporate(grid: &mut TrailGrid, agents: &[Agent], rates: DecayRates, dt: f64) {
    decay_trails(grid, agents, rates.evaporation_rate, dt);
    diffuse(grid, rates, dt);
}

#[cfg(test)]
mod tests {
    use super::*;

    const STILL: DecayRates = DecayRates {
        diffuse_rate: 0.0,
        evaporation_rate: 0.0,
    };

    #[test]
    fn zero_rates_reproduce_committed_grid() {
        let mut grid = TrailGrid::new(5, 4, 0);
        for i in 0..20 {
            grid.seed_committed(i, (i * 12) as u8);
        }
        diffuse(&mut grid, STILL, 1.0);
        grid.commit();
        for i in 0..20 {
            assert_eq!(grid.committed_index(i), (i * 12) as u8);
        }
    }

    #[test]
    fn full_blend_uses_ninth_of_neighbour_sum() {
        let mut grid = TrailGrid::new(3, 3, 0);
        let centre = grid.index_of(1, 1);
        grid.seed_committed(centre, 90);
        let rates = DecayRates {
            diffuse_rate: 1.0,
            evaporation_rate: 0.0,
        };
        diffuse(&mut grid, rates, 1.0);
        grid.commit();
        // Centre's neighbours are all zero.
        assert_eq!(grid.read_committed(1, 1), 0);
        // Each neighbour sees only the centre: 90 / 9.
        assert_eq!(grid.read_committed(0, 0), 10);
        assert_eq!(grid.read_committed(2, 1), 10);
    }

    #[test]
    fn edge_cells_are_biased_dark() {
        let mut grid = TrailGrid::new(3, 3, 90);
        let rates = DecayRates {
            diffuse_rate: 1.0,
            evaporation_rate: 0.0,
        };
        diffuse(&mut grid, rates, 1.0);
        grid.commit();
        assert_eq!(grid.read_committed(1, 1), 80);
        assert_eq!(grid.read_committed(1, 0), 50);
        assert_eq!(grid.read_committed(0, 0), 30);
    }

    #[test]
    fn evaporation_floors_at_zero() {
        let mut grid = TrailGrid::new(2, 2, 3);
        let rates = DecayRates {
            diffuse_rate: 0.0,
            evaporation_rate: 5.0,
        };
        diffuse(&mut grid, rates, 1.0);
        grid.commit();
        assert!(grid.view().cells.iter().all(|&v| v == 0));
    }

    #[test]
    fn diffusion_cannot_erase_same_tick_deposit() {
        let mut grid = TrailGrid::new(3, 3, 0);
        let idx = grid.index_of(1, 1);
        grid.write_combine(idx, 255.0);
        let rates = DecayRates {
            diffuse_rate: 1.0,
            evaporation_rate: 1.0,
        };
        diffuse(&mut grid, rates, 1.0);
        grid.commit();
        assert_eq!(grid.read_committed(1, 1), 255);
    }

    #[test]
    fn trail_decay_fades_history_cells() {
        let mut grid = TrailGrid::new(4, 4, 0);
        let idx = grid.index_of(2, 3);
        grid.seed_committed(idx, 100);
        let mut agent = Agent::new([0.5, 0.5], 0.0, 1.0, 4);
        agent.history.push([2.2, 3.7]);

        decay_trails(&mut grid, std::slice::from_ref(&agent), 10.0, 1.0);
        assert_eq!(grid.pending().value(idx), 90);
        assert!(grid.pending().is_written(idx));
        assert!(!grid.pending().is_written(grid.index_of(0, 0)));
    }

    #[test]
    fn trail_decay_and_blur_combine_to_the_larger() {
        let mut grid = TrailGrid::new(3, 3, 0);
        let idx = grid.index_of(1, 1);
        grid.seed_committed(idx, 100);
        let mut agent = Agent::new([0.5, 0.5], 0.0, 1.0, 4);
        agent.history.push([1.5, 1.5]);
        let rates = DecayRates {
            diffuse_rate: 1.0,
            evaporation_rate: 2.0,
        };
        // Trail decay gives 98, full blur gives 0; max wins.
        diffuse_and_evaporate(&mut grid, std::slice::from_ref(&agent), rates, 1.0);
        grid.commit();
        assert_eq!(grid.read_committed(1, 1), 98);
    }
}
