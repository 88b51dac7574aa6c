use std::path::Path;

use schemagen_core::Value;

use crate::description::compile_description;
use crate::engine::Session;
use crate::errors::GenerationError;
use crate::generators::GeneratorRegistry;

/// A named piece of generated data, exported as `<name>.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub data: Value,
}

impl Dataset {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A named generation procedure. Routines run in order against one shared
/// session, so a later routine can read what an earlier one stored.
pub trait Routine {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn run(&self, session: &mut Session) -> Result<Vec<Dataset>, GenerationError>;
}

/// Routine backed by a JSON schema description. Produces one dataset named
/// after the routine.
pub struct DescriptionRoutine<'r> {
    name: String,
    description: serde_json::Value,
    registry: &'r GeneratorRegistry,
}

impl<'r> DescriptionRoutine<'r> {
    pub fn new(
        name: impl Into<String>,
        description: serde_json::Value,
        registry: &'r GeneratorRegistry,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            registry,
        }
    }

    /// Load a description file. The routine is named after the file stem, so
    /// `users.json` produces a `users` dataset.
    pub fn from_path(
        path: &Path,
        registry: &'r GeneratorRegistry,
    ) -> Result<Self, GenerationError> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                GenerationError::InvalidDataset(format!(
                    "cannot derive a dataset name from {}",
                    path.display()
                ))
            })?;
        let raw = std::fs::read_to_string(path)?;
        let description = serde_json::from_str(&raw)?;
        Ok(Self::new(name, description, registry))
    }
}

impl Routine for DescriptionRoutine<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "schema description file"
    }

    fn run(&self, session: &mut Session) -> Result<Vec<Dataset>, GenerationError> {
        let mut schema = compile_description(&self.description, self.registry)?;
        let data = session.generate(&mut schema)?;
        Ok(vec![Dataset::new(self.name.clone(), data)])
    }
}
