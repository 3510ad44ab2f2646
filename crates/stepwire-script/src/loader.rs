//! RON run-definition loader

use crate::error::{Error, Result};
use crate::schema::RunFile;
use std::fs;
use std::path::Path;
use stepwire_core::{Parameters, Simulation, SimulationConfig, State, Timestep, Trajectory};
use tracing::debug;

/// Run definitions merged from one or more RON documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunDefs {
    /// Parameters by name
    pub parameters: Parameters,
    /// Initial state fields by name
    pub initial_state: State,
    /// Run configuration, if any document supplied one
    pub config: Option<SimulationConfig>,
}

impl RunDefs {
    /// Create empty run definitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a simulation of `timestep` from these definitions
    pub fn into_simulation(self, timestep: Timestep) -> Result<Simulation> {
        let config = self
            .config
            .ok_or_else(|| Error::MissingField("config".to_string()))?;
        let steps = config.steps();
        Ok(Simulation::new(timestep, self.parameters, self.initial_state, steps).with_config(config))
    }

    /// Build and run a simulation of `timestep`
    pub fn run(self, timestep: Timestep) -> Result<Trajectory> {
        Ok(self.into_simulation(timestep)?.run()?)
    }

    fn merge(&mut self, file: RunFile) -> Result<()> {
        for (name, value) in file.parameters {
            if self.parameters.contains_key(&name) {
                return Err(Error::DuplicateDefinition(format!("parameter '{name}'")));
            }
            self.parameters.insert(name, value);
        }
        for (name, value) in file.initial_state {
            if self.initial_state.contains_key(&name) {
                return Err(Error::DuplicateDefinition(format!("state field '{name}'")));
            }
            self.initial_state.insert(name, value);
        }
        if let Some(config) = file.config {
            if self.config.as_ref().is_some_and(|existing| *existing != config) {
                return Err(Error::DuplicateDefinition("config".to_string()));
            }
            self.config = Some(config);
        }
        Ok(())
    }
}

/// Loader for RON run files
pub struct Loader {
    defs: RunDefs,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            defs: RunDefs::new(),
        }
    }

    /// Load run definitions from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: RunFile = ron::from_str(content)?;
        if file.is_empty() {
            return Err(Error::InvalidSchema(
                "run file defines no parameters, initial_state or config".to_string(),
            ));
        }
        debug!(
            parameters = file.parameters.len(),
            state_fields = file.initial_state.len(),
            has_config = file.config.is_some(),
            "run definitions parsed"
        );
        self.defs.merge(file)
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading run file");
        let content = fs::read_to_string(path)?;
        self.load_str(&content)
    }

    /// Load all RON files from a directory
    ///
    /// Files are visited in name order and subdirectories are loaded
    /// recursively.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the run definitions
    pub fn finish(self) -> RunDefs {
        self.defs
    }

    /// Get the current definitions (for inspection during loading)
    pub fn defs(&self) -> &RunDefs {
        &self.defs
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwire_core::{
        parameter, signal, state, value_map, Bindings, Policy, StateUpdate, Substep, Value,
    };

    fn growth() -> Timestep {
        let f = Policy::new(
            "f",
            ["delta"],
            Bindings::new().arg(state("x")).arg(parameter("alpha")),
            |args| Ok(Value::from(args.int(0)? * args.int(1)?)),
        )
        .unwrap();
        let g = StateUpdate::new(
            "g",
            "x",
            Bindings::new().arg(state("x")).arg(signal("delta")),
            |args| Ok(Value::from(args.int(0)? + args.int(1)?)),
        )
        .unwrap();
        Timestep::new(vec![Substep::new(vec![f], vec![g]).unwrap()])
    }

    #[test]
    fn test_load_and_run() {
        let content = r#"
        (
            parameters: { "alpha": Int(2) },
            initial_state: { "x": Int(1) },
            config: (steps: 3),
        )
        "#;

        let mut loader = Loader::new();
        loader.load_str(content).unwrap();

        let trajectory = loader.finish().run(growth()).unwrap();
        assert_eq!(trajectory.last(), Some(&value_map! { "x" => 27 }));
    }

    #[test]
    fn test_merge_documents() {
        let mut loader = Loader::new();
        loader
            .load_str(r#"(parameters: { "alpha": Int(2) })"#)
            .unwrap();
        loader
            .load_str(r#"(initial_state: { "x": Int(1) }, config: (steps: 1))"#)
            .unwrap();

        let defs = loader.defs();
        assert_eq!(defs.parameters, value_map! { "alpha" => 2 });
        assert_eq!(defs.initial_state, value_map! { "x" => 1 });
        assert_eq!(defs.config.as_ref().map(SimulationConfig::steps), Some(1));
    }

    #[test]
    fn test_duplicate_parameter() {
        let mut loader = Loader::new();
        loader.load_str(r#"(parameters: { "alpha": Int(2) })"#).unwrap();
        let err = loader
            .load_str(r#"(parameters: { "alpha": Int(3) })"#)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(ref what) if what.contains("alpha")));
    }

    #[test]
    fn test_conflicting_config() {
        let mut loader = Loader::new();
        loader.load_str("(config: (steps: 3))").unwrap();
        loader.load_str("(config: (steps: 3))").unwrap();
        let err = loader.load_str("(config: (steps: 4))").unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(ref what) if what == "config"));
    }

    #[test]
    fn test_missing_config() {
        let mut loader = Loader::new();
        loader.load_str(r#"(initial_state: { "x": Int(1) })"#).unwrap();
        let err = loader.finish().into_simulation(growth()).unwrap_err();
        assert!(matches!(err, Error::MissingField(ref field) if field == "config"));
    }

    #[test]
    fn test_empty_document_rejected() {
        let mut loader = Loader::new();
        assert!(matches!(loader.load_str("()"), Err(Error::InvalidSchema(_))));
        assert!(matches!(loader.load_str("(steps: 3)"), Err(Error::Ron(_))));
    }

    #[test]
    fn test_core_errors_propagate() {
        let mut loader = Loader::new();
        loader
            .load_str(r#"(initial_state: { "x": Int(1) }, config: (steps: 1))"#)
            .unwrap();
        let err = loader.finish().run(growth()).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(stepwire_core::Error::UnresolvedBinding { ref name, .. }) if name == "alpha"
        ));
    }

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_params.ron"), r#"(parameters: { "alpha": Int(2) })"#).unwrap();
        fs::create_dir(dir.path().join("run")).unwrap();
        fs::write(
            dir.path().join("run").join("state.ron"),
            r#"(initial_state: { "x": Int(1) }, config: (steps: 2))"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = Loader::new();
        loader.load_directory(dir.path()).unwrap();

        let trajectory = loader.finish().run(growth()).unwrap();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.last(), Some(&value_map! { "x" => 9 }));
    }

    #[test]
    fn test_load_directory_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("run.ron");
        fs::write(&file, "(config: (steps: 1))").unwrap();

        let mut loader = Loader::new();
        assert!(matches!(loader.load_directory(&file), Err(Error::Io(_))));
        loader.load_file(&file).unwrap();
        assert!(loader.defs().config.is_some());
    }
}
