//! Timesteps: ordered substeps threading one evolving snapshot

use crate::config::PreviousStateView;
use crate::context::RuntimeContext;
use crate::error::Result;
use crate::history::HistoryWindow;
use crate::substep::Substep;
use crate::{Parameters, SignalMap, State};
use tracing::{error, instrument, trace};

/// The ordered substeps executed once per timestep
///
/// An empty timestep is valid and passes state through unchanged.
#[derive(Debug, Default)]
pub struct Timestep {
    substeps: Vec<Substep>,
}

impl Timestep {
    pub fn new(substeps: Vec<Substep>) -> Self {
        Self { substeps }
    }

    pub fn substeps(&self) -> &[Substep] {
        &self.substeps
    }

    pub fn len(&self) -> usize {
        self.substeps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substeps.is_empty()
    }

    /// Run every substep in order, starting from `start`.
    ///
    /// Substep *i + 1* applies its writes to the snapshot produced by substep
    /// *i*. `view` selects what `PreviousState` bindings read. On failure no
    /// partial snapshot escapes.
    #[instrument(level = "debug", skip_all, fields(timestep = tick))]
    pub fn apply(
        &self,
        parameters: &Parameters,
        tick: u64,
        history: &HistoryWindow,
        start: &State,
        view: PreviousStateView,
    ) -> Result<State> {
        let no_signals = SignalMap::new();
        let mut current = start.clone();

        for (index, substep) in self.substeps.iter().enumerate() {
            let previous = match view {
                PreviousStateView::TimestepStart => start,
                PreviousStateView::LatestSubstep => &current,
            };
            let ctx = RuntimeContext::new(parameters, tick, history, previous, &no_signals);
            trace!(substep = index, "entering substep");

            current = substep.apply(&ctx, &current).map_err(|err| {
                error!(timestep = tick, substep = index, %err, "step failed");
                err
            })?;
        }

        Ok(current)
    }
}
