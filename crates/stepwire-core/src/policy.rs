//! Policies: step functions that produce named signals

use crate::binder::{bind, Args, Bindings, BoundStepFn, StepResult};
use crate::context::RuntimeContext;
use crate::error::{Error, Result};
use crate::tag::CallContext;
use crate::validate::validate;
use crate::{SignalMap, Value};
use std::fmt;

/// A bound function whose result is a mapping of declared output signals
///
/// Policies are validated when built and are pure with respect to simulation
/// state: invoking one only produces its signal map.
pub struct Policy {
    label: String,
    outputs: Vec<String>,
    bindings: Bindings,
    step: BoundStepFn,
}

impl Policy {
    /// Build a policy declaring at least one output signal.
    ///
    /// Fails with [`Error::InvalidBinding`] if `bindings` contain a tag a
    /// policy may not use, [`Error::MissingOutputs`] if `outputs` is empty
    /// and [`Error::DuplicateSignal`] if an output is declared twice.
    pub fn new<F, I, S>(
        label: impl Into<String>,
        outputs: I,
        bindings: Bindings,
        function: F,
    ) -> Result<Self>
    where
        F: Fn(&Args) -> StepResult + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = label.into();
        let outputs: Vec<String> = outputs.into_iter().map(Into::into).collect();
        if outputs.is_empty() {
            return Err(Error::MissingOutputs { policy: label });
        }
        Self::build(label, outputs, bindings, function)
    }

    /// Build a policy that declares no output signals.
    ///
    /// Its function must return `Null` or an empty map.
    pub fn silent<F>(label: impl Into<String>, bindings: Bindings, function: F) -> Result<Self>
    where
        F: Fn(&Args) -> StepResult + Send + Sync + 'static,
    {
        Self::build(label.into(), Vec::new(), bindings, function)
    }

    fn build<F>(label: String, outputs: Vec<String>, bindings: Bindings, function: F) -> Result<Self>
    where
        F: Fn(&Args) -> StepResult + Send + Sync + 'static,
    {
        validate(&label, bindings.tags(), CallContext::Policy)?;

        for (i, name) in outputs.iter().enumerate() {
            if outputs[..i].contains(name) {
                return Err(Error::DuplicateSignal {
                    name: name.clone(),
                    first: label.clone(),
                    second: label,
                });
            }
        }

        let step = bind(label.clone(), bindings.clone(), function);
        Ok(Self {
            label,
            outputs,
            bindings,
            step,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared output signal names, in declaration order
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Signals this policy reads; always empty, since validation rejects
    /// signal bindings on policies
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.bindings.signal_names()
    }

    /// Run the policy and map its result onto the declared outputs.
    ///
    /// A map result must hold exactly the declared names. Any other value
    /// is taken as the single output when exactly one is declared.
    pub fn invoke(&self, ctx: &RuntimeContext<'_>) -> Result<SignalMap> {
        let raw = (self.step)(ctx)?;
        self.wrap_output(raw)
    }

    fn wrap_output(&self, raw: Value) -> Result<SignalMap> {
        match raw {
            Value::Null if self.outputs.is_empty() => Ok(SignalMap::new()),
            Value::Map(mut produced) => {
                if let Some(extra) = produced.keys().find(|k| !self.outputs.contains(*k)) {
                    return Err(self.malformed(format!("undeclared signal '{extra}'")));
                }
                let mut signals = SignalMap::with_capacity(self.outputs.len());
                for name in &self.outputs {
                    let value = produced
                        .shift_remove(name)
                        .ok_or_else(|| self.malformed(format!("missing signal '{name}'")))?;
                    signals.insert(name.clone(), value);
                }
                Ok(signals)
            }
            Value::Null => Err(self.malformed("returned null".to_string())),
            value if self.outputs.len() == 1 => {
                let mut signals = SignalMap::with_capacity(1);
                signals.insert(self.outputs[0].clone(), value);
                Ok(signals)
            }
            value => Err(self.malformed(format!(
                "expected a map of {} signals, got {}",
                self.outputs.len(),
                value.type_name()
            ))),
        }
    }

    fn malformed(&self, reason: String) -> Error {
        Error::MalformedOutput {
            owner: self.label.clone(),
            reason,
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("label", &self.label)
            .field("outputs", &self.outputs)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
