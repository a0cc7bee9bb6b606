//! Double-buffered 2D trail field.
//! Reads during a tick go to the committed buffer; writes go to the pending
//! buffer through max-combine and become visible only on `commit`.

use rayon::prelude::*;

/// Convert a computed intensity to its stored form: clamp to [0, 255] and
/// truncate toward zero. NaN stores as 0.
#[inline]
pub fn quantize(value: f32) -> u8 {
    value as u8
}

/// Max-combine `candidate` into one pending cell.
///
/// The first write of a tick replaces whatever the cell held; later writes
/// keep the larger value.
#[inline]
pub fn combine_cell(cell: &mut u8, written: &mut bool, candidate: u8) {
    if *written {
        *cell = (*cell).max(candidate);
    } else {
        *cell = candidate;
        *written = true;
    }
}

#[derive(Clone, Debug)]
pub struct CommittedBuffer {
    cells: Vec<u8>,
}

impl CommittedBuffer {
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

#[derive(Clone, Debug)]
pub struct PendingBuffer {
    cells: Vec<u8>,
    written: Vec<bool>,
}

impl PendingBuffer {
    pub fn write_combine(&mut self, index: usize, candidate: f32) {
        combine_cell(
            &mut self.cells[index],
            &mut self.written[index],
            quantize(candidate),
        );
    }

    pub fn is_written(&self, index: usize) -> bool {
        self.written[index]
    }

    pub fn value(&self, index: usize) -> u8 {
        self.cells[index]
    }

    /// Hand every cell, paired with its index and marker, to `candidate_for`
    /// in parallel and max-combine the returned value into that cell.
    pub fn par_combine_each<F>(&mut self, candidate_for: F)
    where
        F: Fn(usize) -> f32 + Sync,
    {
        self.cells
            .par_iter_mut()
            .zip(self.written.par_iter_mut())
            .enumerate()
            .for_each(|(index, (cell, written))| {
                combine_cell(cell, written, quantize(candidate_for(index)));
            });
    }
}

#[derive(Clone, Debug)]
pub struct TrailGrid {
    columns: usize,
    rows: usize,
    committed: CommittedBuffer,
    pending: PendingBuffer,
}

/// Read-only row-major view of the committed buffer handed to renderers.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    pub columns: usize,
    pub rows: usize,
    pub cells: &'a [u8],
}

impl GridView<'_> {
    pub fn get(&self, col: usize, row: usize) -> u8 {
        self.cells[row * self.columns + col]
    }
}

impl TrailGrid {
    pub fn new(columns: usize, rows: usize, initial: u8) -> Self {
        let len = columns * rows;
        Self {
            columns,
            rows,
            committed: CommittedBuffer {
                cells: vec![initial; len],
            },
            pending: PendingBuffer {
                cells: vec![initial; len],
                written: vec![false; len],
            },
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }

    #[inline]
    pub fn index_of(&self, col: usize, row: usize) -> usize {
        row * self.columns + col
    }

    /// Row-major index of a signed cell coordinate, or `None` off-grid.
    #[inline]
    pub fn checked_index(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.columns && row < self.rows).then(|| self.index_of(col, row))
    }

    /// Index of the cell containing a continuous position, or `None` off-grid.
    pub fn cell_of(&self, position: [f64; 2]) -> Option<usize> {
        if !(position[0] >= 0.0 && position[1] >= 0.0) {
            return None;
        }
        self.checked_index(position[0] as i64, position[1] as i64)
    }

    /// Committed intensity at an in-bounds cell. Panics out of bounds;
    /// callers that may stray off-grid use `committed_at`.
    pub fn read_committed(&self, col: usize, row: usize) -> u8 {
        assert!(
            col < self.columns && row < self.rows,
            "cell ({col}, {row}) outside {}x{} grid",
            self.columns,
            self.rows
        );
        self.committed.cells[self.index_of(col, row)]
    }

    /// Committed intensity at a signed coordinate; off-grid reads are `None`.
    #[inline]
    pub fn committed_at(&self, col: i64, row: i64) -> Option<u8> {
        self.checked_index(col, row)
            .map(|index| self.committed.cells[index])
    }

    pub fn committed_index(&self, index: usize) -> u8 {
        self.committed.cells[index]
    }

    pub fn write_combine(&mut self, index: usize, candidate: f32) {
        self.pending.write_combine(index, candidate);
    }

    pub fn pending(&self) -> &PendingBuffer {
        &self.pending
    }

    /// Split borrow: read the committed buffer while writing the pending one.
    pub fn buffers_mut(&mut self) -> (&CommittedBuffer, &mut PendingBuffer) {
        (&self.committed, &mut self.pending)
    }

    /// Publish the pending buffer and reset every write marker.
    pub fn commit(&mut self) {
        self.committed
            .cells
            .copy_from_slice(&self.pending.cells);
        self.pending.written.fill(false);
    }

    pub fn view(&self) -> GridView<'_> {
        GridView {
            columns: self.columns,
            rows: self.rows,
            cells: &self.committed.cells,
        }
    }

    /// Overwrite a committed cell directly. Used to seed initial patterns.
    pub fn seed_committed(&mut self, index: usize, value: u8) {
        self.committed.cells[index] = value;
        self.pending.cells[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn quantize_clamps_and_truncates() {
        assert_eq!(quantize(-3.0), 0);
        assert_eq!(quantize(254.9), 254);
        assert_eq!(quantize(300.0), 255);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn first_write_replaces_later_writes_max() {
        let mut grid = TrailGrid::new(2, 2, 200);
        grid.write_combine(0, 10.0);
        assert_eq!(grid.pending().value(0), 10);
        assert!(grid.pending().is_written(0));
        grid.write_combine(0, 5.0);
        assert_eq!(grid.pending().value(0), 10);
        grid.write_combine(0, 90.0);
        assert_eq!(grid.pending().value(0), 90);
    }

    #[test]
    fn write_combine_is_order_independent() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for _ in 0..500 {
            let a = rng.random_range(0.0f32..=255.0);
            let b = rng.random_range(0.0f32..=255.0);
            let mut ab = TrailGrid::new(1, 1, rng.random());
            let mut ba = ab.clone();
            ab.write_combine(0, a);
            ab.write_combine(0, b);
            ba.write_combine(0, b);
            ba.write_combine(0, a);
            assert_eq!(ab.pending().value(0), ba.pending().value(0), "a={a} b={b}");
        }
    }

    #[test]
    fn committed_is_untouched_until_commit() {
        let mut grid = TrailGrid::new(3, 2, 0);
        let idx = grid.index_of(2, 1);
        grid.write_combine(idx, 255.0);
        assert_eq!(grid.read_committed(2, 1), 0);
        grid.commit();
        assert_eq!(grid.read_committed(2, 1), 255);
        assert!(!grid.pending().is_written(idx));
    }

    #[test]
    fn off_grid_reads_are_none() {
        let grid = TrailGrid::new(4, 3, 7);
        assert_eq!(grid.committed_at(-1, 0), None);
        assert_eq!(grid.committed_at(4, 0), None);
        assert_eq!(grid.committed_at(0, 3), None);
        assert_eq!(grid.committed_at(3, 2), Some(7));
        assert_eq!(grid.cell_of([3.99, 2.5]), Some(grid.index_of(3, 2)));
        assert_eq!(grid.cell_of([-0.5, 1.0]), None);
    }

    #[test]
    #[should_panic]
    fn read_committed_panics_out_of_bounds() {
        let grid = TrailGrid::new(2, 2, 0);
        grid.read_committed(2, 0);
    }

    #[test]
    fn parallel_combine_respects_markers() {
        let mut grid = TrailGrid::new(4, 4, 0);
        grid.write_combine(5, 200.0);
        let (_, pending) = grid.buffers_mut();
        pending.par_combine_each(|index| index as f32);
        assert_eq!(grid.pending().value(5), 200);
        assert_eq!(grid.pending().value(9), 9);
        assert!((0..16).all(|i| grid.pending().is_written(i)));
    }
}
