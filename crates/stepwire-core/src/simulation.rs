//! Simulation driver
//!
//! A [`Simulation`] owns a [`Timestep`] template plus the initial parameters
//! and state, and runs the template `steps` times. Each run builds its own
//! history window, so [`Simulation::run`] is repeatable and deterministic.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::history::{HistoryWindow, StateHistory};
use crate::timestep::Timestep;
use crate::{Parameters, State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// A configured run of a timestep template
#[derive(Debug)]
pub struct Simulation {
    timestep: Timestep,
    parameters: Parameters,
    initial_state: State,
    config: SimulationConfig,
}

impl Simulation {
    /// Create a simulation running `steps` timesteps with default settings
    pub fn new(timestep: Timestep, parameters: Parameters, initial_state: State, steps: u64) -> Self {
        Self {
            timestep,
            parameters,
            initial_state,
            config: SimulationConfig::new(steps),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how many prior snapshots history bindings can see
    pub fn with_history_window(mut self, capacity: usize) -> Self {
        self.config = self.config.with_history_window(capacity);
        self
    }

    pub fn timestep(&self) -> &Timestep {
        &self.timestep
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Execute every timestep and return the produced snapshots.
    ///
    /// The first error aborts the run; nothing from the failing timestep is
    /// recorded.
    #[instrument(skip(self), fields(steps = self.config.steps()))]
    pub fn run(&self) -> Result<Trajectory> {
        let steps = self.config.steps();
        info!(
            substeps = self.timestep.len(),
            history_window = self.config.history_window(),
            "simulation started"
        );

        let mut history = HistoryWindow::new(self.config.history_window());
        let mut trajectory = Trajectory::default();
        let mut current = self.initial_state.clone();

        for tick in 0..steps {
            let next = self.timestep.apply(
                &self.parameters,
                tick,
                &history,
                &current,
                self.config.previous_state(),
            )?;
            history.push(tick, next.clone());
            trajectory.save_state(tick, &next);
            current = next;
        }

        info!(snapshots = trajectory.len(), "simulation finished");
        Ok(trajectory)
    }
}

/// Ordered snapshots of a completed run, one per timestep
///
/// The initial state is not included: `trajectory[t]` is the state at the
/// end of timestep `t`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    states: Vec<State>,
}

impl Trajectory {
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn into_states(self) -> Vec<State> {
        self.states
    }

    pub fn get(&self, tick: usize) -> Option<&State> {
        self.states.get(tick)
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateHistory for Trajectory {
    /// Snapshots must be saved in tick order starting at zero
    fn save_state(&mut self, tick: u64, state: &State) {
        debug_assert_eq!(tick as usize, self.states.len());
        self.states.push(state.clone());
    }

    fn get_state(&self, tick: u64) -> Option<&State> {
        self.states.get(tick as usize)
    }

    fn clear(&mut self) {
        self.states.clear();
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    fn tick_range(&self) -> Option<(u64, u64)> {
        let newest = self.states.len().checked_sub(1)?;
        Some((0, newest as u64))
    }
}

impl IntoIterator for Trajectory {
    type Item = State;
    type IntoIter = std::vec::IntoIter<State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.into_iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
