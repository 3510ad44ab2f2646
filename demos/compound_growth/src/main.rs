//! Compound Growth Example
//!
//! Demonstrates stepwire with a two-substep model loaded from `data/run.ron`:
//! 1. `growth` emits `delta = x * alpha`; `apply_delta` adds it to `x`.
//! 2. `trailing_mean` averages `x` over the history window (the last three
//!    completed timesteps); `smooth_trend` moves `trend` towards that mean.
//!
//! Set `RUST_LOG=stepwire_core=debug` (or `trace`) to watch the substep
//! phases.

use std::path::Path;
use stepwire_core::{
    parameter, signal, state, state_history, Bindings, Policy, StateUpdate, Substep, Timestep,
    Value,
};
use stepwire_script::Loader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn build_timestep() -> stepwire_core::Result<Timestep> {
    let growth = Policy::new(
        "growth",
        ["delta"],
        Bindings::new()
            .kwarg("x", state("x"))
            .kwarg("alpha", parameter("alpha")),
        |args| {
            Ok(Value::Map(stepwire_core::value_map! {
                "delta" => args.kw_int("x")? * args.kw_int("alpha")?
            }))
        },
    )?;
    let apply_delta = StateUpdate::new(
        "apply_delta",
        "x",
        Bindings::new().arg(state("x")).arg(signal("delta")),
        |args| Ok(Value::from(args.int(0)? + args.int(1)?)),
    )?;

    let trailing_mean = Policy::new(
        "trailing_mean",
        ["mean"],
        Bindings::new()
            .arg(state_history("x"))
            .kwarg("x", state("x")),
        |args| {
            let window = args.list(0)?;
            if window.is_empty() {
                return Ok(Value::Float(args.kw_float("x")?));
            }
            let total: f64 = window.iter().filter_map(Value::as_float).sum();
            Ok(Value::Float(total / window.len() as f64))
        },
    )?;
    let smooth_trend = StateUpdate::new(
        "smooth_trend",
        "trend",
        Bindings::new()
            .arg(state("trend"))
            .arg(signal("mean"))
            .kwarg("k", parameter("smoothing")),
        |args| {
            let trend = args.float(0)?;
            let mean = args.float(1)?;
            Ok(Value::Float(trend + args.kw_float("k")? * (mean - trend)))
        },
    )?;

    Ok(Timestep::new(vec![
        Substep::new(vec![growth], vec![apply_delta])?,
        Substep::new(vec![trailing_mean], vec![smooth_trend])?,
    ]))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compound_growth=info,stepwire_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Stepwire Compound Growth Example ===\n");

    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let mut loader = Loader::new();
    loader.load_directory(&data)?;
    let defs = loader.finish();
    info!(
        parameters = defs.parameters.len(),
        fields = defs.initial_state.len(),
        "run definitions loaded from {}",
        data.display()
    );

    let simulation = defs.into_simulation(build_timestep()?)?;
    let trajectory = match simulation.run() {
        Ok(trajectory) => trajectory,
        Err(e) => {
            error!("simulation failed: {e}");
            return Err(e.into());
        }
    };

    println!("t=init: {}", Value::Map(simulation.initial_state().clone()));
    for (tick, snapshot) in trajectory.iter().enumerate() {
        println!("t={tick}:    {}", Value::Map(snapshot.clone()));
    }

    println!("\n=== Simulation Complete ===");
    Ok(())
}
