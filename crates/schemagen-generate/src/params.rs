use serde_json::{Map, Value};

use schemagen_core::parse_date;

use crate::errors::GenerationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    String,
    Date,
    Array,
    Any,
}

#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn new(key: &'static str, kind: ParamKind, required: bool) -> Self {
        Self {
            key,
            kind,
            required,
        }
    }
}

pub struct ParamMap<'a> {
    map: Option<&'a Map<String, Value>>,
}

pub fn validate_params<'a>(
    params: Option<&'a Value>,
    specs: &[ParamSpec],
    ctx: &str,
) -> Result<ParamMap<'a>, GenerationError> {
    let map = match params {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(GenerationError::InvalidSchema(format!(
                "{ctx}: params must be a JSON object"
            )));
        }
    };

    if let Some(map) = map {
        for (key, value) in map {
            let Some(spec) = specs.iter().find(|spec| spec.key == key.as_str()) else {
                return Err(GenerationError::InvalidSchema(format!(
                    "{ctx}: unknown param '{key}'"
                )));
            };
            validate_kind(ctx, key, spec.kind, value)?;
        }
    }

    for spec in specs {
        if spec.required && !map.is_some_and(|map| map.contains_key(spec.key)) {
            return Err(GenerationError::InvalidSchema(format!(
                "{ctx}: missing required param '{}'",
                spec.key
            )));
        }
    }

    Ok(ParamMap { map })
}

impl<'a> ParamMap<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(key))
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|value| value.as_i64())
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key)
            .and_then(|value| value.as_u64())
            .and_then(|value| u32::try_from(value).ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.as_f64())
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(|value| value.as_str())
    }

    pub fn get_array(&self, key: &str) -> Option<&'a [Value]> {
        self.get(key)
            .and_then(|value| value.as_array())
            .map(|values| values.as_slice())
    }

    /// Required integer param. Presence is checked by [`validate_params`].
    pub fn require_i64(&self, key: &str, ctx: &str) -> Result<i64, GenerationError> {
        self.get_i64(key).ok_or_else(|| missing(ctx, key))
    }

    pub fn require_f64(&self, key: &str, ctx: &str) -> Result<f64, GenerationError> {
        self.get_f64(key).ok_or_else(|| missing(ctx, key))
    }

    pub fn require_str(&self, key: &str, ctx: &str) -> Result<&'a str, GenerationError> {
        self.get_str(key).ok_or_else(|| missing(ctx, key))
    }

    pub fn require_array(&self, key: &str, ctx: &str) -> Result<&'a [Value], GenerationError> {
        self.get_array(key).ok_or_else(|| missing(ctx, key))
    }
}

fn missing(ctx: &str, key: &str) -> GenerationError {
    GenerationError::InvalidSchema(format!("{ctx}: missing required param '{key}'"))
}

fn validate_kind(
    ctx: &str,
    key: &str,
    kind: ParamKind,
    value: &Value,
) -> Result<(), GenerationError> {
    let valid = match kind {
        ParamKind::Int => value.as_i64().is_some(),
        ParamKind::Float => value.as_f64().is_some(),
        ParamKind::String => value.is_string(),
        ParamKind::Date => value.as_str().is_some_and(|text| parse_date(text).is_ok()),
        ParamKind::Array => value.is_array(),
        ParamKind::Any => true,
    };

    if valid {
        Ok(())
    } else {
        Err(GenerationError::InvalidSchema(format!(
            "{ctx}: invalid value for param '{key}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPECS: &[ParamSpec] = &[
        ParamSpec::new("min", ParamKind::Int, true),
        ParamSpec::new("since", ParamKind::Date, false),
    ];

    #[test]
    fn rejects_unknown_and_mistyped_params() {
        let unknown = json!({"min": 1, "oops": true});
        assert!(matches!(
            validate_params(Some(&unknown), SPECS, "test"),
            Err(GenerationError::InvalidSchema(_))
        ));

        let mistyped = json!({"min": "one"});
        assert!(matches!(
            validate_params(Some(&mistyped), SPECS, "test"),
            Err(GenerationError::InvalidSchema(_))
        ));

        let bad_date = json!({"min": 1, "since": "last week"});
        assert!(validate_params(Some(&bad_date), SPECS, "test").is_err());
    }

    #[test]
    fn requires_declared_params() {
        assert!(validate_params(None, SPECS, "test").is_err());
        let params = json!({"min": 4, "since": "2024-01-01"});
        let map = validate_params(Some(&params), SPECS, "test").expect("valid params");
        assert_eq!(map.get_i64("min"), Some(4));
        assert_eq!(map.get_str("since"), Some("2024-01-01"));
    }
}
