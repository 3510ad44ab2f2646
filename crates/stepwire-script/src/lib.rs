//! Stepwire Script - RON loader for run definitions
//!
//! Loads the data half of a simulation from RON files:
//! - Parameters
//! - Initial state
//! - Run configuration (`SimulationConfig`)
//!
//! Step functions stay in Rust; [`RunDefs::into_simulation`] pairs the
//! loaded data with a [`Timestep`](stepwire_core::Timestep) built in code.

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{Loader, RunDefs};
pub use schema::RunFile;
