//! Construction-time checks for declared bindings

use crate::error::{Error, Result};
use crate::tag::{BindingTag, CallContext, Source};

/// Check every tag against the rules for `context`, reporting the first
/// violation.
///
/// A tag is rejected when its allowed contexts exclude `context`. Policies
/// additionally may never declare a [`Source::PolicySignal`] tag: signals are
/// only resolved after every policy of a substep has run.
pub fn validate<'a, I>(owner: &str, tags: I, context: CallContext) -> Result<()>
where
    I: IntoIterator<Item = &'a BindingTag>,
{
    for tag in tags {
        let excluded = !tag.allowed_contexts().contains(context);
        let policy_signal = context == CallContext::Policy && tag.source() == Source::PolicySignal;
        if excluded || policy_signal {
            return Err(Error::InvalidBinding {
                owner: owner.to_string(),
                tag: tag.to_string(),
                context,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{parameter, signal, state, state_history, timestep};

    #[test]
    fn test_policy_accepts_context_tags() {
        let tags = [parameter("a"), timestep("t"), state_history("x"), state("x")];
        assert!(validate("p", &tags, CallContext::Policy).is_ok());
    }

    #[test]
    fn test_policy_rejects_signal() {
        let tags = [state("x"), signal("delta")];
        let err = validate("growth", &tags, CallContext::Policy).unwrap_err();
        match err {
            Error::InvalidBinding {
                owner,
                tag,
                context,
            } => {
                assert_eq!(owner, "growth");
                assert_eq!(tag, "Signal('delta')");
                assert_eq!(context, CallContext::Policy);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_state_update_accepts_signal() {
        let tags = [signal("delta"), state("x"), parameter("alpha")];
        assert!(validate("u", &tags, CallContext::StateUpdate).is_ok());
    }

    #[test]
    fn test_reports_first_violation() {
        let tags = [signal("first"), signal("second")];
        let err = validate("p", &tags, CallContext::Policy).unwrap_err();
        assert!(err.to_string().contains("Signal('first')"));
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(validate("p", std::iter::empty(), CallContext::Policy).is_ok());
    }
}
