//! Runtime context handed to every bound step function

use crate::error::{Error, Result};
use crate::history::{HistoryWindow, StateHistory};
use crate::tag::{BindingTag, Source};
use crate::{Parameters, SignalMap, State, Value, ValueMap};

/// The value held in one runtime-context slot
#[derive(Debug, Clone, Copy)]
pub enum ContextSlot<'a> {
    /// A keyed mapping (parameters, previous state, signals)
    Map(&'a ValueMap),
    /// The timestep index
    Index(u64),
    /// The oldest-first window of prior snapshots
    Window(&'a HistoryWindow),
}

/// Fixed-shape snapshot of everything a binding may resolve against
///
/// Slots are stored in a table indexed by [`Source::rank`], so each tag finds
/// its slot through the rank it carries. A context is never mutated: the
/// signal slot is filled by building a new context with
/// [`RuntimeContext::with_signals`].
#[derive(Debug, Clone, Copy)]
pub struct RuntimeContext<'a> {
    slots: [ContextSlot<'a>; Source::COUNT],
}

impl<'a> RuntimeContext<'a> {
    /// Assemble a context for one evaluation
    pub fn new(
        parameters: &'a Parameters,
        timestep: u64,
        history: &'a HistoryWindow,
        previous: &'a State,
        signals: &'a SignalMap,
    ) -> Self {
        let slots = Source::ALL.map(|source| match source {
            Source::Parameters => ContextSlot::Map(parameters),
            Source::TimestepIndex => ContextSlot::Index(timestep),
            Source::StateHistoryWindow => ContextSlot::Window(history),
            Source::PreviousState => ContextSlot::Map(previous),
            Source::PolicySignal => ContextSlot::Map(signals),
        });
        Self { slots }
    }

    /// A copy of this context whose signal slot holds `signals`
    pub fn with_signals<'b>(&self, signals: &'b SignalMap) -> RuntimeContext<'b>
    where
        'a: 'b,
    {
        let mut slots: [ContextSlot<'b>; Source::COUNT] = self.slots;
        slots[Source::PolicySignal.rank()] = ContextSlot::Map(signals);
        RuntimeContext { slots }
    }

    /// The slot for `source`
    pub fn slot(&self, source: Source) -> ContextSlot<'a> {
        self.slots[source.rank()]
    }

    /// Current timestep index
    pub fn timestep(&self) -> u64 {
        match self.slot(Source::TimestepIndex) {
            ContextSlot::Index(t) => t,
            _ => unreachable!("timestep slot always holds an index"),
        }
    }

    /// Resolve one tag to its value.
    ///
    /// `owner` labels the policy or state update doing the lookup, for
    /// error reporting.
    pub fn resolve(&self, owner: &str, tag: &BindingTag) -> Result<Value> {
        let unresolved = || Error::UnresolvedBinding {
            owner: owner.to_string(),
            origin: tag.source(),
            name: tag.name().to_string(),
        };

        match self.slots[tag.rank()] {
            ContextSlot::Map(map) => map.get(tag.name()).cloned().ok_or_else(unresolved),
            ContextSlot::Index(t) => Ok(Value::Int(t as i64)),
            ContextSlot::Window(window) => {
                let range = match tag.span() {
                    Some(span) => span.clamp(window.len()),
                    None => 0..window.len(),
                };
                window
                    .iter()
                    .skip(range.start)
                    .take(range.len())
                    .map(|state| state.get(tag.name()).cloned().ok_or_else(unresolved))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List)
            }
        }
    }
}
