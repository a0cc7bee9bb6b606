use std::collections::VecDeque;

/// Fixed-capacity record of an agent's prior positions, most recent first.
///
/// Slots past `len()` are empty until enough ticks have elapsed to fill them;
/// once full, each push drops the oldest entry.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailHistory {
    entries: VecDeque<[f64; 2]>,
    capacity: usize,
}

impl TrailHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, position: [f64; 2]) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(position);
    }

    /// Slot `i` counted from the most recent; `None` when empty or past capacity.
    pub fn slot(&self, i: usize) -> Option<[f64; 2]> {
        self.entries.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// Continuous position in cell units, `[column, row]`.
    pub position: [f64; 2],
    /// Radians; 0 points along +column.
    pub heading: f64,
    pub speed: f64,
    pub history: TrailHistory,
}

impl Agent {
    pub fn new(position: [f64; 2], heading: f64, speed: f64, history_len: usize) -> Self {
        Self {
            position,
            heading,
            speed,
            history: TrailHistory::new(history_len),
        }
    }

    /// Record the current position in history and move to `next`.
    pub fn advance_to(&mut self, next: [f64; 2]) {
        self.history.push(self.position);
        self.position = next;
    }
}
