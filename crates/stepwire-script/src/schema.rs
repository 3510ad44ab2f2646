//! Schema of a RON run file
//!
//! ```ron
//! (
//!     parameters: { "alpha": Int(2) },
//!     initial_state: { "x": Int(1) },
//!     config: (steps: 3, history_window: 2),
//! )
//! ```
//!
//! Every section is optional so a run can be split across several files.

use serde::{Deserialize, Deserializer};
use stepwire_core::{Parameters, SimulationConfig, State};

/// One parsed run file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub initial_state: State,
    /// Written as a bare struct, without `Some(..)`
    #[serde(default, deserialize_with = "present")]
    pub config: Option<SimulationConfig>,
}

impl RunFile {
    /// Whether the file defines nothing at all
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.initial_state.is_empty() && self.config.is_none()
    }
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<SimulationConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    SimulationConfig::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwire_core::{PreviousStateView, Value};

    #[test]
    fn test_full_file() {
        let file: RunFile = ron::from_str(
            r#"(
                parameters: { "alpha": Int(2), "rate": Float(0.5) },
                initial_state: { "x": Int(1) },
                config: (steps: 3, previous_state: LatestSubstep),
            )"#,
        )
        .unwrap();

        assert_eq!(file.parameters["alpha"], Value::Int(2));
        assert_eq!(file.initial_state["x"], Value::Int(1));
        let config = file.config.unwrap();
        assert_eq!(config.steps(), 3);
        assert_eq!(config.history_window(), 1);
        assert_eq!(config.previous_state(), PreviousStateView::LatestSubstep);
    }

    #[test]
    fn test_sections_are_optional() {
        let file: RunFile = ron::from_str(r#"(parameters: { "alpha": Int(2) })"#).unwrap();
        assert!(file.config.is_none());
        assert!(file.initial_state.is_empty());
        assert!(!file.is_empty());

        let empty: RunFile = ron::from_str("()").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(ron::from_str::<RunFile>(r#"(paramters: {})"#).is_err());
    }
}
