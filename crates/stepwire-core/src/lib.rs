//! Stepwire Core - declarative argument binding for discrete-time simulations
//!
//! This crate provides the execution core of stepwire:
//! - Dynamic value types (`Value`, `ValueMap`)
//! - Binding tags declaring where each step-function argument comes from
//! - Validation and binding of user functions into uniform step functions
//! - Policies (produce signals) and state updates (write one field)
//! - Substep, timestep and simulation execution
//!
//! ## Example
//!
//! ```
//! use stepwire_core::{
//!     parameter, signal, state, value_map, Bindings, Policy, Simulation, StateUpdate, Substep,
//!     Timestep, Value,
//! };
//!
//! let growth = Policy::new(
//!     "growth",
//!     ["delta"],
//!     Bindings::new().arg(state("x")).arg(parameter("alpha")),
//!     |args| Ok(Value::from(args.int(0)? * args.int(1)?)),
//! )?;
//! let apply = StateUpdate::new(
//!     "apply_delta",
//!     "x",
//!     Bindings::new().arg(state("x")).arg(signal("delta")),
//!     |args| Ok(Value::from(args.int(0)? + args.int(1)?)),
//! )?;
//!
//! let timestep = Timestep::new(vec![Substep::new(vec![growth], vec![apply])?]);
//! let sim = Simulation::new(timestep, value_map! { "alpha" => 2 }, value_map! { "x" => 1 }, 3);
//!
//! let trajectory = sim.run()?;
//! assert_eq!(trajectory.last().map(|s| &s["x"]), Some(&Value::Int(27)));
//! # Ok::<(), stepwire_core::Error>(())
//! ```

mod binder;
mod config;
mod context;
mod error;
mod history;
mod policy;
mod simulation;
mod state_update;
mod substep;
pub mod tag;
mod timestep;
mod validate;
mod value;
mod write_set;

pub use binder::{bind, Args, Bindings, BoundStepFn, StepResult};
pub use config::{PreviousStateView, SimulationConfig};
pub use context::{ContextSlot, RuntimeContext};
pub use error::{BoxError, Error, Result};
pub use history::{HistoryWindow, StateHistory};
pub use policy::Policy;
pub use simulation::{Simulation, Trajectory};
pub use state_update::StateUpdate;
pub use substep::{Substep, SubstepPhase};
pub use tag::{
    parameter, signal, state, state_history, timestep, BindingTag, CallContext, ContextSet,
    HistorySpan, Source,
};
pub use timestep::Timestep;
pub use validate::validate;
pub use value::{Parameters, SignalMap, State, Value, ValueMap};
pub use write_set::{PendingWrite, WriteSet};
