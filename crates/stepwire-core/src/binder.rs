//! Binding user functions to the runtime context
//!
//! A user step function takes resolved [`Args`] and returns a [`Value`].
//! [`bind`] wraps it into a [`BoundStepFn`] with the uniform signature
//! `Fn(&RuntimeContext) -> Result<Value>`: it resolves every declared tag,
//! positional tags first and keyword tags second, invokes the function and
//! returns its raw result.

use crate::context::RuntimeContext;
use crate::error::{BoxError, Error, Result};
use crate::tag::{BindingTag, Source};
use crate::{Value, ValueMap};
use indexmap::IndexMap;

/// Result type returned by user step functions
pub type StepResult = std::result::Result<Value, BoxError>;

/// A user function bound to its declared tags
pub type BoundStepFn = Box<dyn Fn(&RuntimeContext<'_>) -> Result<Value> + Send + Sync>;

/// Declared tags of a step function: positional first, then keyword
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    positional: Vec<BindingTag>,
    keyword: IndexMap<String, BindingTag>,
}

impl Bindings {
    /// No declared arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, tag: BindingTag) -> Self {
        self.positional.push(tag);
        self
    }

    /// Declare a keyword argument; a repeated name replaces the earlier tag
    pub fn kwarg(mut self, name: impl Into<String>, tag: BindingTag) -> Self {
        self.keyword.insert(name.into(), tag);
        self
    }

    pub fn positional(&self) -> &[BindingTag] {
        &self.positional
    }

    pub fn keyword(&self) -> &IndexMap<String, BindingTag> {
        &self.keyword
    }

    /// Every declared tag, positional first
    pub fn tags(&self) -> impl Iterator<Item = &BindingTag> {
        self.positional.iter().chain(self.keyword.values())
    }

    /// Names of the signals these bindings read
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.tags()
            .filter(|tag| tag.source() == Source::PolicySignal)
            .map(BindingTag::name)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Resolved arguments passed to a user step function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keyword: ValueMap,
}

impl Args {
    pub fn new(positional: Vec<Value>, keyword: ValueMap) -> Self {
        Self {
            positional,
            keyword,
        }
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &ValueMap {
        &self.keyword
    }

    /// Positional argument at `index`
    pub fn arg(&self, index: usize) -> Result<&Value> {
        self.positional
            .get(index)
            .ok_or_else(|| Error::MissingArgument(format!("positional #{index}")))
    }

    /// Keyword argument `name`
    pub fn kwarg(&self, name: &str) -> Result<&Value> {
        self.keyword
            .get(name)
            .ok_or_else(|| Error::MissingArgument(format!("keyword '{name}'")))
    }

    pub fn int(&self, index: usize) -> Result<i64> {
        let value = self.arg(index)?;
        value.as_int().ok_or_else(|| Error::type_error("int", value))
    }

    pub fn float(&self, index: usize) -> Result<f64> {
        let value = self.arg(index)?;
        value.as_float().ok_or_else(|| Error::type_error("float", value))
    }

    pub fn list(&self, index: usize) -> Result<&[Value]> {
        let value = self.arg(index)?;
        value.as_list().ok_or_else(|| Error::type_error("list", value))
    }

    pub fn kw_int(&self, name: &str) -> Result<i64> {
        let value = self.kwarg(name)?;
        value.as_int().ok_or_else(|| Error::type_error("int", value))
    }

    pub fn kw_float(&self, name: &str) -> Result<f64> {
        let value = self.kwarg(name)?;
        value.as_float().ok_or_else(|| Error::type_error("float", value))
    }

    pub fn kw_list(&self, name: &str) -> Result<&[Value]> {
        let value = self.kwarg(name)?;
        value.as_list().ok_or_else(|| Error::type_error("list", value))
    }
}

/// Bind `function` to `bindings`.
///
/// The tags must already have passed [`validate`](crate::validate) for the
/// context the bound function will run in. Missing keys surface as
/// [`Error::UnresolvedBinding`] and failures of `function` as
/// [`Error::Function`], both labelled with `owner`.
pub fn bind<F>(owner: impl Into<String>, bindings: Bindings, function: F) -> BoundStepFn
where
    F: Fn(&Args) -> StepResult + Send + Sync + 'static,
{
    let owner = owner.into();
    Box::new(move |ctx: &RuntimeContext<'_>| {
        let positional = bindings
            .positional
            .iter()
            .map(|tag| ctx.resolve(&owner, tag))
            .collect::<Result<Vec<_>>>()?;
        let keyword = bindings
            .keyword
            .iter()
            .map(|(name, tag)| ctx.resolve(&owner, tag).map(|value| (name.clone(), value)))
            .collect::<Result<ValueMap>>()?;

        function(&Args::new(positional, keyword)).map_err(|source| Error::Function {
            owner: owner.clone(),
            source,
        })
    })
}
