//! Compiles JSON schema descriptions into [`SchemaNode`] trees.
//!
//! Shapes:
//! - `[element]`, `[element, n]`, `[element, [min, max]]`: array node.
//! - `"id"`: leaf built by the registry with no params.
//! - `{"$generator": "id", "params": {..}, "unique": true, "max_attempts": n, "store": "key"}`:
//!   leaf with params and optional wrappers.
//! - any other object: object node, fields in document order.
//!
//! Errors carry the JSON path of the offending node (`$.users[0].email`).

use serde_json::{Map, Value as JsonValue};

use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorRegistry, stored, unique::Unique};
use crate::schema::{Cardinality, ObjectNode, SchemaNode};

pub const GENERATOR_KEY: &str = "$generator";
const LEAF_KEYS: &[&str] = &[GENERATOR_KEY, "params", "unique", "max_attempts", "store"];

/// Compile `description` into a schema. Fails on the first invalid node.
pub fn compile_description(
    description: &JsonValue,
    registry: &GeneratorRegistry,
) -> Result<SchemaNode, GenerationError> {
    compile_node(description, registry, "$")
}

fn compile_node(
    node: &JsonValue,
    registry: &GeneratorRegistry,
    path: &str,
) -> Result<SchemaNode, GenerationError> {
    match node {
        JsonValue::Array(items) => compile_array(items, registry, path),
        JsonValue::String(id) => build_leaf(registry, id, None, path),
        JsonValue::Object(map) if map.contains_key(GENERATOR_KEY) => {
            compile_leaf(map, registry, path)
        }
        JsonValue::Object(map) => {
            let mut object = ObjectNode::new();
            for (name, field) in map {
                let field_path = format!("{path}.{name}");
                object.insert(name.clone(), compile_node(field, registry, &field_path)?);
            }
            Ok(SchemaNode::Object(object))
        }
        JsonValue::Null => Err(invalid(path, "null is not a schema node")),
        JsonValue::Bool(_) | JsonValue::Number(_) => Err(invalid(
            path,
            "expected an array, object or generator id",
        )),
    }
}

fn compile_array(
    items: &[JsonValue],
    registry: &GeneratorRegistry,
    path: &str,
) -> Result<SchemaNode, GenerationError> {
    let (element, cardinality) = match items {
        [element] => (element, Cardinality::Default),
        [element, count] => (element, parse_cardinality(count, path)?),
        _ => {
            return Err(invalid(
                path,
                "array schema must be [element], [element, n] or [element, [min, max]]",
            ));
        }
    };
    let element = compile_node(element, registry, &format!("{path}[0]"))?;
    Ok(SchemaNode::array(element, cardinality))
}

fn parse_cardinality(count: &JsonValue, path: &str) -> Result<Cardinality, GenerationError> {
    match count {
        JsonValue::Number(_) => Ok(Cardinality::Exact(parse_count(count, path)?)),
        JsonValue::Array(bounds) => match bounds.as_slice() {
            [min, max] => {
                let min = parse_count(min, path)?;
                let max = parse_count(max, path)?;
                if min > max {
                    return Err(invalid(
                        path,
                        &format!("cardinality min {min} must be <= max {max}"),
                    ));
                }
                Ok(Cardinality::Range(min, max))
            }
            _ => Err(invalid(path, "cardinality range must be [min, max]")),
        },
        _ => Err(invalid(
            path,
            "cardinality must be a count or a [min, max] pair",
        )),
    }
}

fn parse_count(value: &JsonValue, path: &str) -> Result<usize, GenerationError> {
    value
        .as_u64()
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| invalid(path, "cardinality must be a non-negative integer"))
}

fn compile_leaf(
    map: &Map<String, JsonValue>,
    registry: &GeneratorRegistry,
    path: &str,
) -> Result<SchemaNode, GenerationError> {
    if let Some(key) = map.keys().find(|key| !LEAF_KEYS.contains(&key.as_str())) {
        return Err(invalid(path, &format!("unknown generator key '{key}'")));
    }

    let id = map
        .get(GENERATOR_KEY)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| invalid(path, "'$generator' must be a string"))?;

    let is_unique = match map.get("unique") {
        None => false,
        Some(JsonValue::Bool(flag)) => *flag,
        Some(_) => return Err(invalid(path, "'unique' must be a boolean")),
    };
    let max_attempts = match map.get("max_attempts") {
        None => None,
        Some(value) => Some(
            value
                .as_u64()
                .filter(|attempts| *attempts > 0)
                .ok_or_else(|| invalid(path, "'max_attempts' must be a positive integer"))?,
        ),
    };
    if max_attempts.is_some() && !is_unique {
        return Err(invalid(path, "'max_attempts' requires 'unique': true"));
    }
    let store_key = match map.get("store") {
        None => None,
        Some(JsonValue::String(key)) if !key.is_empty() => Some(key.clone()),
        Some(_) => return Err(invalid(path, "'store' must be a non-empty string")),
    };

    let generator = registry
        .build(id, map.get("params"))
        .map_err(|err| at_path(path, err))?;

    let generator: Box<dyn Generator> = if is_unique {
        let wrapped = Unique::new(generator);
        match max_attempts {
            Some(attempts) => Box::new(wrapped.with_max_attempts(attempts)),
            None => Box::new(wrapped),
        }
    } else {
        generator
    };

    Ok(match store_key {
        Some(key) => SchemaNode::leaf(stored(key, generator)),
        None => SchemaNode::Leaf(generator),
    })
}

fn build_leaf(
    registry: &GeneratorRegistry,
    id: &str,
    params: Option<&JsonValue>,
    path: &str,
) -> Result<SchemaNode, GenerationError> {
    let generator = registry
        .build(id, params)
        .map_err(|err| at_path(path, err))?;
    Ok(SchemaNode::Leaf(generator))
}

fn invalid(path: &str, message: &str) -> GenerationError {
    GenerationError::InvalidSchema(format!("{path}: {message}"))
}

fn at_path(path: &str, err: GenerationError) -> GenerationError {
    match err {
        GenerationError::InvalidSchema(message) => {
            GenerationError::InvalidSchema(format!("{path}: {message}"))
        }
        other => other,
    }
}
