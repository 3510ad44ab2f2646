//! State history: bounded windows of prior snapshots
//!
//! The driver appends one snapshot per completed timestep. Two stores
//! implement [`StateHistory`]:
//! - [`HistoryWindow`] - bounded, evicts the oldest snapshot when full; this
//!   is what `StateHistoryWindow` bindings read
//! - [`Trajectory`](crate::Trajectory) - unbounded, the full run output

use crate::State;
use std::collections::VecDeque;

/// Trait for storing and retrieving historical state snapshots by timestep.
pub trait StateHistory {
    /// Save a snapshot taken at the end of `tick`.
    fn save_state(&mut self, tick: u64, state: &State);

    /// Get the snapshot saved for exactly `tick`, if still held.
    fn get_state(&self, tick: u64) -> Option<&State>;

    /// Clear all stored snapshots.
    fn clear(&mut self);

    /// Maximum number of snapshots held, or `None` when unbounded.
    fn capacity(&self) -> Option<usize>;

    /// Number of snapshots currently stored.
    fn len(&self) -> usize;

    /// Check if the history is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(oldest_tick, newest_tick)` of the stored snapshots.
    fn tick_range(&self) -> Option<(u64, u64)>;
}

/// Bounded, oldest-first window of state snapshots
///
/// A capacity of zero is valid and keeps nothing, so every history binding
/// resolves to an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryWindow {
    /// Oldest first
    states: VecDeque<(u64, State)>,
    capacity: usize,
}

impl HistoryWindow {
    /// Create an empty window holding at most `capacity` snapshots
    pub fn new(capacity: usize) -> Self {
        Self {
            states: VecDeque::new(),
            capacity,
        }
    }

    /// Append a snapshot, evicting the oldest when the window is full
    pub fn push(&mut self, tick: u64, state: State) {
        if self.capacity == 0 {
            return;
        }
        if self.states.len() == self.capacity {
            self.states.pop_front();
        }
        self.states.push_back((tick, state));
    }

    /// Snapshots from oldest to newest
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &State> + DoubleEndedIterator {
        self.states.iter().map(|(_, state)| state)
    }

    /// The most recently pushed snapshot
    pub fn newest(&self) -> Option<&State> {
        self.states.back().map(|(_, state)| state)
    }

    /// Whether the window holds `capacity` snapshots
    pub fn is_full(&self) -> bool {
        self.states.len() == self.capacity
    }
}

impl StateHistory for HistoryWindow {
    fn save_state(&mut self, tick: u64, state: &State) {
        self.push(tick, state.clone());
    }

    fn get_state(&self, tick: u64) -> Option<&State> {
        self.states
            .iter()
            .find(|(t, _)| *t == tick)
            .map(|(_, state)| state)
    }

    fn clear(&mut self) {
        self.states.clear();
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    fn tick_range(&self) -> Option<(u64, u64)> {
        let oldest = self.states.front()?.0;
        let newest = self.states.back()?.0;
        Some((oldest, newest))
    }
}
