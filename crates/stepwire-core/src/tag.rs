//! Binding tags: declarations of where a step function argument comes from
//!
//! A [`BindingTag`] names one value inside one slot of the
//! [`RuntimeContext`](crate::RuntimeContext). Tags are built only through the
//! constructors in this module, so the source, the contexts a tag may be used
//! in and its slot rank always agree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The runtime-context slot a tag reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Simulation parameters, looked up by key
    Parameters,
    /// The current timestep index (the tag name is ignored)
    TimestepIndex,
    /// One field across the bounded window of prior snapshots
    StateHistoryWindow,
    /// A field of the previous state snapshot
    PreviousState,
    /// An output of a policy in the same substep
    PolicySignal,
}

impl Source {
    /// Number of sources, and so of runtime-context slots
    pub const COUNT: usize = 5;

    /// All sources in rank order
    pub const ALL: [Source; Source::COUNT] = [
        Source::Parameters,
        Source::TimestepIndex,
        Source::StateHistoryWindow,
        Source::PreviousState,
        Source::PolicySignal,
    ];

    /// Slot index of this source in the runtime context
    pub const fn rank(self) -> usize {
        match self {
            Source::Parameters => 0,
            Source::TimestepIndex => 1,
            Source::StateHistoryWindow => 2,
            Source::PreviousState => 3,
            Source::PolicySignal => 4,
        }
    }

    /// Contexts in which a tag of this source may be declared
    pub const fn allowed_contexts(self) -> ContextSet {
        match self {
            Source::PolicySignal => ContextSet::STATE_UPDATE_ONLY,
            _ => ContextSet::ALL,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Parameters => "parameters",
            Source::TimestepIndex => "timestep index",
            Source::StateHistoryWindow => "state history",
            Source::PreviousState => "previous state",
            Source::PolicySignal => "policy signals",
        };
        f.write_str(name)
    }
}

/// The kind of step function a tag is declared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallContext {
    /// A policy producing signals
    Policy,
    /// A state update consuming signals
    StateUpdate,
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallContext::Policy => f.write_str("policy"),
            CallContext::StateUpdate => f.write_str("state update"),
        }
    }
}

/// A set of [`CallContext`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextSet {
    policy: bool,
    state_update: bool,
}

impl ContextSet {
    /// Both policies and state updates
    pub const ALL: ContextSet = ContextSet {
        policy: true,
        state_update: true,
    };

    /// State updates only
    pub const STATE_UPDATE_ONLY: ContextSet = ContextSet {
        policy: false,
        state_update: true,
    };

    /// Whether `context` is a member of this set
    pub const fn contains(self, context: CallContext) -> bool {
        match context {
            CallContext::Policy => self.policy,
            CallContext::StateUpdate => self.state_update,
        }
    }
}

/// A half-open `[start, end)` range over the oldest-first history window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistorySpan {
    pub start: usize,
    pub end: usize,
}

impl HistorySpan {
    /// Clamp this span to a window of `len` entries
    pub fn clamp(self, len: usize) -> std::ops::Range<usize> {
        let end = self.end.min(len);
        self.start.min(end)..end
    }
}

/// Immutable descriptor binding one function argument to a context source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingTag {
    name: String,
    source: Source,
    allowed: ContextSet,
    rank: usize,
    span: Option<HistorySpan>,
}

impl BindingTag {
    fn new(name: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            source,
            allowed: source.allowed_contexts(),
            rank: source.rank(),
            span: None,
        }
    }

    /// Bind to a simulation parameter
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(name, Source::Parameters)
    }

    /// Bind to the current timestep index
    pub fn timestep(name: impl Into<String>) -> Self {
        Self::new(name, Source::TimestepIndex)
    }

    /// Bind to a field's values across the whole history window
    pub fn state_history(name: impl Into<String>) -> Self {
        Self::new(name, Source::StateHistoryWindow)
    }

    /// Bind to a field's values across `[start, end)` of the history window
    pub fn state_history_span(name: impl Into<String>, start: usize, end: usize) -> Self {
        let mut tag = Self::new(name, Source::StateHistoryWindow);
        tag.span = Some(HistorySpan { start, end });
        tag
    }

    /// Bind to a field of the previous state
    pub fn state(name: impl Into<String>) -> Self {
        Self::new(name, Source::PreviousState)
    }

    /// Bind to a signal produced by a policy in the same substep
    pub fn signal(name: impl Into<String>) -> Self {
        Self::new(name, Source::PolicySignal)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn allowed_contexts(&self) -> ContextSet {
        self.allowed
    }

    /// Runtime-context slot this tag resolves against
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Window range for history tags built with [`BindingTag::state_history_span`]
    pub fn span(&self) -> Option<HistorySpan> {
        self.span
    }
}

impl fmt::Display for BindingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctor = match self.source {
            Source::Parameters => "Parameter",
            Source::TimestepIndex => "Timestep",
            Source::StateHistoryWindow => "StateHistory",
            Source::PreviousState => "State",
            Source::PolicySignal => "Signal",
        };
        match self.span {
            Some(span) => write!(f, "{}('{}', {}..{})", ctor, self.name, span.start, span.end),
            None => write!(f, "{}('{}')", ctor, self.name),
        }
    }
}

/// Shorthand for [`BindingTag::parameter`]
pub fn parameter(name: impl Into<String>) -> BindingTag {
    BindingTag::parameter(name)
}

/// Shorthand for [`BindingTag::timestep`]
pub fn timestep(name: impl Into<String>) -> BindingTag {
    BindingTag::timestep(name)
}

/// Shorthand for [`BindingTag::state_history`]
pub fn state_history(name: impl Into<String>) -> BindingTag {
    BindingTag::state_history(name)
}

/// Shorthand for [`BindingTag::state`]
pub fn state(name: impl Into<String>) -> BindingTag {
    BindingTag::state(name)
}

/// Shorthand for [`BindingTag::signal`]
pub fn signal(name: impl Into<String>) -> BindingTag {
    BindingTag::signal(name)
}
