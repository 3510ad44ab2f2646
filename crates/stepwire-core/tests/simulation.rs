//! End-to-end runs through the public API

use proptest::prelude::*;
use stepwire_core::{
    parameter, signal, state, state_history, value_map, Bindings, Error, Parameters, Policy,
    PreviousStateView, Simulation, SimulationConfig, State, StateUpdate, Substep, Timestep, Value,
};

/// `f -> {delta: x * alpha}`, `g -> x + delta`
fn compound_growth() -> Timestep {
    let f = Policy::new(
        "f",
        ["delta"],
        Bindings::new()
            .kwarg("x", state("x"))
            .kwarg("y", parameter("alpha")),
        |args| {
            Ok(Value::Map(
                value_map! { "delta" => args.kw_int("x")? * args.kw_int("y")? },
            ))
        },
    )
    .unwrap();
    let g = StateUpdate::new(
        "g",
        "x",
        Bindings::new()
            .kwarg("delta", signal("delta"))
            .kwarg("x", state("x")),
        |args| Ok(Value::from(args.kw_int("x")? + args.kw_int("delta")?)),
    )
    .unwrap();
    Timestep::new(vec![Substep::new(vec![f], vec![g]).unwrap()])
}

/// Two substeps: a wrapping counter update, then a float smoothing step that
/// reads the history window.
fn mixed() -> Timestep {
    let tick = StateUpdate::new("tick", "n", Bindings::new().arg(state("n")), |args| {
        Ok(Value::from(args.int(0)?.wrapping_mul(3).wrapping_add(1) % 1_000_003))
    })
    .unwrap();
    let mean = Policy::new(
        "mean",
        ["avg"],
        Bindings::new().arg(state_history("level")),
        |args| {
            let seen = args.list(0)?;
            let total: f64 = seen.iter().filter_map(Value::as_float).sum();
            Ok(Value::Float(total / (seen.len().max(1) as f64)))
        },
    )
    .unwrap();
    let smooth = StateUpdate::new(
        "smooth",
        "level",
        Bindings::new()
            .arg(state("level"))
            .arg(signal("avg"))
            .kwarg("k", parameter("k")),
        |args| {
            let level = args.float(0)?;
            let avg = args.float(1)?;
            Ok(Value::Float(level + args.kw_float("k")? * (avg - level) + 1.0))
        },
    )
    .unwrap();
    Timestep::new(vec![
        Substep::new(vec![], vec![tick]).unwrap(),
        Substep::new(vec![mean], vec![smooth]).unwrap(),
    ])
}

#[test]
fn compound_growth_scenario() {
    let sim = Simulation::new(
        compound_growth(),
        value_map! { "alpha" => 2 },
        value_map! { "x" => 1 },
        3,
    );
    let trajectory = sim.run().unwrap();
    assert_eq!(
        trajectory.into_states(),
        vec![
            value_map! { "x" => 3 },
            value_map! { "x" => 9 },
            value_map! { "x" => 27 },
        ]
    );
}

#[test]
fn history_is_empty_at_first_timestep() {
    let probe = StateUpdate::new(
        "probe",
        "history",
        Bindings::new().arg(state_history("x")),
        |args| Ok(Value::List(args.list(0)?.to_vec())),
    )
    .unwrap();
    let step = Timestep::new(vec![Substep::new(vec![], vec![probe]).unwrap()]);
    let sim = Simulation::new(step, Parameters::new(), value_map! { "x" => 1 }, 1)
        .with_history_window(2);

    let trajectory = sim.run().unwrap();
    assert_eq!(trajectory.states()[0]["history"], Value::List(vec![]));
}

#[test]
fn duplicate_signal_detected_before_updates() {
    let make = |label: &str| {
        Policy::new(label, ["delta"], Bindings::new(), |_| Ok(Value::Int(1))).unwrap()
    };
    let update = StateUpdate::new("g", "x", Bindings::new().arg(signal("delta")), |_| {
        panic!("state update must not run")
    })
    .unwrap();

    let err = Substep::new(vec![make("first"), make("second")], vec![update]).unwrap_err();
    assert!(matches!(err, Error::DuplicateSignal { ref name, .. } if name == "delta"));
    assert!(err.is_configuration());
}

#[test]
fn duplicate_targets_rejected() {
    let set = |label: &str| {
        StateUpdate::new(label, "y", Bindings::new(), |_| Ok(Value::Int(0))).unwrap()
    };
    let err = Substep::new(vec![], vec![set("a"), set("b")]).unwrap_err();
    assert!(matches!(err, Error::DuplicateFieldWrite { ref field, .. } if field == "y"));
}

#[test]
fn unbounded_history_window_from_config() {
    let config: SimulationConfig =
        ron::from_str("(steps: 2, history_window: 18446744073709551615)").unwrap();
    let sim = Simulation::new(
        compound_growth(),
        value_map! { "alpha" => 2 },
        value_map! { "x" => 1 },
        0,
    )
    .with_config(config);

    let trajectory = sim.run().unwrap();
    assert_eq!(trajectory.last(), Some(&value_map! { "x" => 9 }));
}

#[test]
fn config_round_trips_through_ron() {
    let config = SimulationConfig::new(4)
        .with_history_window(3)
        .with_previous_state(PreviousStateView::LatestSubstep);
    let text = ron::to_string(&config).unwrap();
    let parsed: SimulationConfig = ron::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

fn mixed_state(n: i64, level: f64, note: &str) -> State {
    value_map! { "n" => n, "level" => level, "note" => note }
}

proptest! {
    #[test]
    fn runs_are_deterministic(
        n in 0i64..1_000,
        level in -100.0f64..100.0,
        k in 0.0f64..1.0,
        window in 0usize..5,
        steps in 0u64..20,
    ) {
        let build = || {
            Simulation::new(mixed(), value_map! { "k" => k }, mixed_state(n, level, "fixed"), steps)
                .with_history_window(window)
        };
        let first = build().run().unwrap();
        let second = build().run().unwrap();
        prop_assert_eq!(first.len() as u64, steps);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn untouched_fields_pass_through(
        n in 0i64..1_000,
        level in -100.0f64..100.0,
        note in "[a-z]{0,12}",
        steps in 1u64..10,
    ) {
        let start = mixed_state(n, level, &note);
        let sim = Simulation::new(mixed(), value_map! { "k" => 0.5 }, start.clone(), steps);
        for snapshot in &sim.run().unwrap() {
            prop_assert_eq!(&snapshot["note"], &start["note"]);
            prop_assert_eq!(snapshot.len(), start.len());
        }
    }

    #[test]
    fn policies_never_accept_signal_bindings(name in "[a-z_]{1,10}", output in "[a-z]{1,8}") {
        let result = Policy::new("p", [output], Bindings::new().arg(signal(name)), |_| Ok(Value::Null));
        let rejected = matches!(result, Err(Error::InvalidBinding { .. }));
        prop_assert!(rejected);
    }
}
