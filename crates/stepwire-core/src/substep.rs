//! Substeps: one signal-resolution pass followed by state updates
//!
//! Executing a substep moves through three phases:
//!
//! ```text
//! ResolvingSignals ──► ApplyingUpdates ──► Done
//!  policies run,        updates run with     next snapshot =
//!  outputs merged       merged signals       base + writes
//! ```

use crate::context::RuntimeContext;
use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::state_update::StateUpdate;
use crate::write_set::{PendingWrite, WriteSet};
use crate::{SignalMap, State};
use indexmap::IndexMap;
use std::fmt;
use tracing::{debug, trace};

/// Execution phase of a substep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstepPhase {
    ResolvingSignals,
    ApplyingUpdates,
    Done,
}

impl fmt::Display for SubstepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstepPhase::ResolvingSignals => f.write_str("resolving_signals"),
            SubstepPhase::ApplyingUpdates => f.write_str("applying_updates"),
            SubstepPhase::Done => f.write_str("done"),
        }
    }
}

/// An ordered group of policies and state updates sharing one signal map
#[derive(Debug)]
pub struct Substep {
    policies: Vec<Policy>,
    updates: Vec<StateUpdate>,
}

impl Substep {
    /// Build a substep, checking its wiring.
    ///
    /// Checks performed:
    ///
    /// 1. No two policies declare the same output ([`Error::DuplicateSignal`]).
    /// 2. No two state updates target the same field
    ///    ([`Error::DuplicateFieldWrite`]).
    /// 3. Every signal a state update reads is declared by a policy of this
    ///    substep ([`Error::UnknownSignal`]).
    pub fn new(policies: Vec<Policy>, updates: Vec<StateUpdate>) -> Result<Self> {
        let mut producers: IndexMap<&str, &str> = IndexMap::new();
        for policy in &policies {
            for name in policy.outputs() {
                if let Some(first) = producers.insert(name, policy.label()) {
                    return Err(Error::DuplicateSignal {
                        name: name.clone(),
                        first: first.to_string(),
                        second: policy.label().to_string(),
                    });
                }
            }
        }

        let mut writers: IndexMap<&str, &str> = IndexMap::new();
        for update in &updates {
            if let Some(first) = writers.insert(update.target(), update.label()) {
                return Err(Error::DuplicateFieldWrite {
                    field: update.target().to_string(),
                    first: first.to_string(),
                    second: update.label().to_string(),
                });
            }
            if let Some(name) = update.inputs().find(|name| !producers.contains_key(name)) {
                return Err(Error::UnknownSignal {
                    update: update.label().to_string(),
                    name: name.to_string(),
                });
            }
        }

        debug!(
            policies = policies.len(),
            updates = updates.len(),
            signals = producers.len(),
            "substep wired"
        );

        Ok(Self { policies, updates })
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn updates(&self) -> &[StateUpdate] {
        &self.updates
    }

    /// Signal names declared by this substep's policies, in order
    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.policies
            .iter()
            .flat_map(|p| p.outputs().iter().map(String::as_str))
    }

    /// Fields written by this substep's state updates, in order
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.updates.iter().map(StateUpdate::target)
    }

    /// Execute the substep against `ctx` and return the next snapshot.
    ///
    /// Policies see `ctx` as given; state updates see it with the merged
    /// signal map. Writes are applied to `base`, which is left untouched.
    pub fn apply(&self, ctx: &RuntimeContext<'_>, base: &State) -> Result<State> {
        trace!(phase = %SubstepPhase::ResolvingSignals, policies = self.policies.len());
        let signals = self.resolve_signals(ctx)?;

        trace!(phase = %SubstepPhase::ApplyingUpdates, updates = self.updates.len());
        let update_ctx = ctx.with_signals(&signals);
        let mut writes = WriteSet::new();
        for update in &self.updates {
            let (field, value) = update.invoke(&update_ctx)?;
            writes.push(PendingWrite {
                field: field.to_string(),
                value,
                writer: update.label().to_string(),
            })?;
        }

        trace!(phase = %SubstepPhase::Done, writes = writes.len());
        Ok(writes.apply(base))
    }

    fn resolve_signals(&self, ctx: &RuntimeContext<'_>) -> Result<SignalMap> {
        let mut signals = SignalMap::new();
        let mut origins: Vec<&str> = Vec::new();
        for policy in &self.policies {
            for (name, value) in policy.invoke(ctx)? {
                if let Some(index) = signals.get_index_of(&name) {
                    return Err(Error::DuplicateSignal {
                        name,
                        first: origins[index].to_string(),
                        second: policy.label().to_string(),
                    });
                }
                signals.insert(name, value);
                origins.push(policy.label());
            }
        }
        Ok(signals)
    }
}
