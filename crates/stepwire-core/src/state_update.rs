//! State updates: step functions that produce one state field's next value

use crate::binder::{bind, Args, Bindings, BoundStepFn, StepResult};
use crate::context::RuntimeContext;
use crate::error::{Error, Result};
use crate::tag::CallContext;
use crate::validate::validate;
use crate::Value;
use std::fmt;

/// A bound function licensed to write exactly one state field
pub struct StateUpdate {
    label: String,
    target: String,
    bindings: Bindings,
    step: BoundStepFn,
}

impl StateUpdate {
    /// Build a state update writing `target`.
    ///
    /// The function's result is the new value of `target`, except that a map
    /// is always read as the envelope `{target: value}`. To store a map in
    /// the field, wrap it: `{target: Map(..)}`.
    ///
    /// Fails with [`Error::InvalidBinding`] if `bindings` contain a tag a
    /// state update may not use.
    pub fn new<F>(
        label: impl Into<String>,
        target: impl Into<String>,
        bindings: Bindings,
        function: F,
    ) -> Result<Self>
    where
        F: Fn(&Args) -> StepResult + Send + Sync + 'static,
    {
        let label = label.into();
        validate(&label, bindings.tags(), CallContext::StateUpdate)?;
        let step = bind(label.clone(), bindings.clone(), function);
        Ok(Self {
            label,
            target: target.into(),
            bindings,
            step,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The state field this update writes
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Names of the signals this update consumes
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.bindings.signal_names()
    }

    /// Run the update and return `(target, new_value)`.
    ///
    /// `ctx` must carry the substep's merged signal map. A map result is
    /// accepted only as `{target: value}`; `Null` is never a new value.
    pub fn invoke(&self, ctx: &RuntimeContext<'_>) -> Result<(&str, Value)> {
        let value = match (self.step)(ctx)? {
            Value::Null => return Err(self.malformed("returned null".to_string())),
            Value::Map(mut map) => {
                if map.len() != 1 {
                    return Err(self.malformed(format!("returned a map of {} entries", map.len())));
                }
                map.swap_remove(&self.target).ok_or_else(|| {
                    let key = map.keys().next().cloned().unwrap_or_default();
                    self.malformed(format!("returned field '{key}'"))
                })?
            }
            value => value,
        };
        Ok((&self.target, value))
    }

    fn malformed(&self, reason: String) -> Error {
        Error::MalformedOutput {
            owner: self.label.clone(),
            reason: format!("{reason}, expected a value for field '{}'", self.target),
        }
    }
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateUpdate")
            .field("label", &self.label)
            .field("target", &self.target)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
