use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::generators::{Generator, constant, faker, id_fn, primitives, store_get};
use crate::params::{ParamKind, ParamMap, ParamSpec, validate_params};

/// Builds a fresh generator from validated params.
pub type GeneratorFactory = fn(&ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError>;

const STORE_GET_PARAMS: &[ParamSpec] = &[ParamSpec::new("key", ParamKind::String, true)];
const CONST_PARAMS: &[ParamSpec] = &[ParamSpec::new("value", ParamKind::Any, true)];

/// Registered generator: its id, accepted params and factory.
#[derive(Clone)]
pub struct GeneratorEntry {
    pub id: &'static str,
    pub params: &'static [ParamSpec],
    pub summary: &'static str,
    build: GeneratorFactory,
}

/// Generator ids usable from JSON schema descriptions.
///
/// Every lookup builds a new instance, so stateful generators (counters,
/// uniqueness sets) are never shared between two leaves.
#[derive(Clone)]
pub struct GeneratorRegistry {
    entries: BTreeMap<&'static str, GeneratorEntry>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("id.sequence", &[], "increasing integer starting at 1", |_| {
            Ok(Box::new(id_fn()))
        });
        registry.register(
            "store.get",
            STORE_GET_PARAMS,
            "value last stored under params.key",
            |params| Ok(Box::new(store_get(params.require_str("key", "store.get")?))),
        );
        registry.register(
            "const",
            CONST_PARAMS,
            "params.value, unchanged",
            |params| {
                let value = params.get("value").cloned().unwrap_or(JsonValue::Null);
                Ok(Box::new(constant(Value::from(value))))
            },
        );
        primitives::register(&mut registry);
        faker::register(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        id: &'static str,
        params: &'static [ParamSpec],
        summary: &'static str,
        build: GeneratorFactory,
    ) {
        self.entries.insert(
            id,
            GeneratorEntry {
                id,
                params,
                summary,
                build,
            },
        );
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn generator_ids(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &GeneratorEntry> {
        self.entries.values()
    }

    /// Validate `params` against the generator's declared params and build
    /// a new instance.
    pub fn build(
        &self,
        id: &str,
        params: Option<&JsonValue>,
    ) -> Result<Box<dyn Generator>, GenerationError> {
        let entry = self.entries.get(id).ok_or_else(|| {
            GenerationError::InvalidSchema(format!("unknown generator id '{id}'"))
        })?;
        let params = validate_params(params, entry.params, entry.id)?;
        (entry.build)(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_sorted_and_complete() {
        let registry = GeneratorRegistry::new();
        let ids = registry.generator_ids();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        for id in [
            "id.sequence",
            "primitive.int.range",
            "primitive.elements",
            "faker.internet.email",
            "store.get",
        ] {
            assert!(registry.contains(id), "missing {id}");
        }
    }

    #[test]
    fn build_validates_params() {
        let registry = GeneratorRegistry::new();
        assert!(matches!(
            registry.build("primitive.int.range", Some(&json!({"min": 1}))),
            Err(GenerationError::InvalidSchema(_))
        ));
        assert!(matches!(
            registry.build("primitive.nope", None),
            Err(GenerationError::InvalidSchema(_))
        ));
        let generator = registry
            .build("primitive.int.range", Some(&json!({"min": 1, "max": 3})))
            .expect("valid params");
        assert_eq!(generator.id(), "primitive.int.range");
    }
}
