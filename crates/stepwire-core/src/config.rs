//! Simulation Configuration - run length and context settings
//!
//! [`SimulationConfig`] holds everything about a run that is not part of the
//! model itself: how many timesteps to execute, how many prior snapshots
//! `StateHistoryWindow` bindings can see, and which snapshot the
//! `PreviousState` slot refers to when a timestep has several substeps.

use serde::{Deserialize, Serialize};

/// Which snapshot `PreviousState` bindings read within a timestep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviousStateView {
    /// The snapshot the timestep started from, for every substep
    #[default]
    TimestepStart,
    /// The snapshot produced by the preceding substep
    LatestSubstep,
}

/// Configuration for a simulation run
///
/// # Example
///
/// ```
/// use stepwire_core::{PreviousStateView, SimulationConfig};
///
/// let config = SimulationConfig::new(10).with_history_window(3);
/// assert_eq!(config.steps(), 10);
/// assert_eq!(config.history_window(), 3);
/// assert_eq!(config.previous_state(), PreviousStateView::TimestepStart);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of timesteps to execute
    steps: u64,
    /// Capacity of the state history window
    #[serde(default = "default_history_window")]
    history_window: usize,
    #[serde(default)]
    previous_state: PreviousStateView,
}

fn default_history_window() -> usize {
    1
}

impl SimulationConfig {
    /// Create a configuration running `steps` timesteps with default settings
    pub fn new(steps: u64) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn with_history_window(mut self, capacity: usize) -> Self {
        self.history_window = capacity;
        self
    }

    pub fn with_previous_state(mut self, view: PreviousStateView) -> Self {
        self.previous_state = view;
        self
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn set_steps(&mut self, steps: u64) {
        self.steps = steps;
    }

    /// Maximum number of prior snapshots visible to history bindings
    ///
    /// Zero is valid: history bindings then always resolve to an empty list.
    pub fn history_window(&self) -> usize {
        self.history_window
    }

    pub fn previous_state(&self) -> PreviousStateView {
        self.previous_state
    }
}

impl Default for SimulationConfig {
    /// Zero steps, a one-snapshot history window, timestep-start view
    fn default() -> Self {
        Self {
            steps: 0,
            history_window: default_history_window(),
            previous_state: PreviousStateView::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = SimulationConfig::default();
        assert_eq!(config.steps(), 0);
        assert_eq!(config.history_window(), 1);
        assert_eq!(config.previous_state(), PreviousStateView::TimestepStart);
    }

    #[test]
    fn test_builders() {
        let mut config = SimulationConfig::new(5)
            .with_history_window(0)
            .with_previous_state(PreviousStateView::LatestSubstep);
        assert_eq!(config.history_window(), 0);
        assert_eq!(config.previous_state(), PreviousStateView::LatestSubstep);

        config.set_steps(7);
        assert_eq!(config.steps(), 7);
    }

    #[test]
    fn test_ron_defaults_fill_missing_fields() {
        let config: SimulationConfig = ron::from_str("(steps: 3)").unwrap();
        assert_eq!(config, SimulationConfig::new(3));

        let config: SimulationConfig =
            ron::from_str("(steps: 2, history_window: 4, previous_state: LatestSubstep)").unwrap();
        assert_eq!(config.history_window(), 4);
        assert_eq!(config.previous_state(), PreviousStateView::LatestSubstep);
    }

    #[test]
    fn test_ron_requires_steps() {
        assert!(ron::from_str::<SimulationConfig>("(history_window: 2)").is_err());
    }
}
