//! Error types for stepwire-core
//!
//! Variants fall into two groups. Configuration errors surface while a
//! [`Policy`](crate::Policy), [`StateUpdate`](crate::StateUpdate),
//! [`Substep`](crate::Substep) or [`Simulation`](crate::Simulation) is being
//! built; run-time errors surface from [`Simulation::run`](crate::Simulation::run)
//! and abort the trajectory at the failing timestep.

use crate::tag::{CallContext, Source};
use thiserror::Error;

/// Boxed error returned by user step functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid binding in '{owner}': {tag} cannot be used by a {context}")]
    InvalidBinding {
        owner: String,
        tag: String,
        context: CallContext,
    },

    #[error("policy '{policy}' declares no output signals")]
    MissingOutputs { policy: String },

    #[error("signal '{name}' declared by both '{first}' and '{second}'")]
    DuplicateSignal {
        name: String,
        first: String,
        second: String,
    },

    #[error("state field '{field}' written by both '{first}' and '{second}'")]
    DuplicateFieldWrite {
        field: String,
        first: String,
        second: String,
    },

    #[error("state update '{update}' reads signal '{name}' that no policy in its substep produces")]
    UnknownSignal { update: String, name: String },

    #[error("unresolved binding in '{owner}': no '{name}' in {origin}")]
    UnresolvedBinding {
        owner: String,
        origin: Source,
        name: String,
    },

    #[error("malformed output from '{owner}': {reason}")]
    MalformedOutput { owner: String, reason: String },

    #[error("step function '{owner}' failed: {source}")]
    Function {
        owner: String,
        #[source]
        source: BoxError,
    },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Missing argument: {0}")]
    MissingArgument(String),
}

impl Error {
    /// Whether this error is raised while wiring a simulation, before any
    /// step runs
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidBinding { .. }
                | Error::MissingOutputs { .. }
                | Error::DuplicateSignal { .. }
                | Error::DuplicateFieldWrite { .. }
                | Error::UnknownSignal { .. }
        )
    }

    pub(crate) fn type_error(expected: &str, got: &crate::Value) -> Self {
        Error::TypeError {
            expected: expected.to_string(),
            got: got.type_name().to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
