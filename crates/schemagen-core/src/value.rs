use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A generated value.
///
/// Leaves produce scalars (or, through the escape hatch, whole composites);
/// array and object nodes assemble them into `Array` and `Object`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    /// Fields keep insertion order.
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn object() -> Self {
        Value::Object(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field lookup on an object; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Canonical, type-tagged key used to detect repeated values.
    ///
    /// Structurally equal values share a key; `Int(1)` and `Text("1")` do not.
    /// `0.0` and `-0.0` share a key, as do all NaNs.
    pub fn unique_key(&self) -> String {
        let mut key = String::new();
        self.write_key(&mut key);
        key
    }

    fn write_key(&self, out: &mut String) {
        match self {
            Value::Null => out.push('n'),
            Value::Bool(value) => {
                let _ = write!(out, "b:{value}");
            }
            Value::Int(value) => {
                let _ = write!(out, "i:{value}");
            }
            Value::Float(value) => {
                let bits = if value.is_nan() {
                    f64::NAN.to_bits()
                } else if *value == 0.0 {
                    0.0_f64.to_bits()
                } else {
                    value.to_bits()
                };
                let _ = write!(out, "f:{bits:016x}");
            }
            Value::Text(value) => {
                let _ = write!(out, "s{}:{value}", value.len());
            }
            Value::Date(value) => {
                let _ = write!(out, "d:{}", value.timestamp_millis());
            }
            Value::Array(values) => {
                out.push('[');
                for value in values {
                    value.write_key(out);
                    out.push(',');
                }
                out.push(']');
            }
            Value::Object(fields) => {
                out.push('{');
                for (name, value) in fields {
                    let _ = write!(out, "{}:{name}=", name.len());
                    value.write_key(out);
                    out.push(',');
                }
                out.push('}');
            }
        }
    }

    /// Parse a JSON document into a value tree.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(json))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let encoded = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(encoded)
    }
}

/// Render a date the way the export layer writes it: RFC 3339, millisecond
/// precision, `Z` suffix.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS` timestamp
/// (read as UTC), or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(parsed.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
        .ok_or_else(|| Error::InvalidValue(format!("unrecognised date '{value}'")))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Text(value) => serializer.serialize_str(value),
            Value::Date(value) => serializer.serialize_str(&format_date(value)),
            Value::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Int(value),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(value) => Value::Text(value),
            serde_json::Value::Array(values) => {
                Value::Array(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::Int(value) => serde_json::Value::from(*value),
            Value::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(value) => serde_json::Value::String(value.clone()),
            Value::Date(value) => serde_json::Value::String(format_date(value)),
            Value::Array(values) => {
                serde_json::Value::Array(values.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Value::Object(fields)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_serialize_with_millis_and_zulu() {
        let date = Utc
            .with_ymd_and_hms(2024, 1, 1, 8, 30, 0)
            .single()
            .expect("valid date");
        let encoded = serde_json::to_string(&Value::Date(date)).expect("serialize");
        assert_eq!(encoded, "\"2024-01-01T08:30:00.000Z\"");
    }

    #[test]
    fn objects_keep_field_order() {
        let mut fields = IndexMap::new();
        fields.insert("zeta".to_string(), Value::Int(1));
        fields.insert("alpha".to_string(), Value::Int(2));
        let encoded = serde_json::to_string(&Value::Object(fields)).expect("serialize");
        assert_eq!(encoded, r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn non_finite_floats_become_null() {
        let encoded = serde_json::to_string(&Value::Float(f64::NAN)).expect("serialize");
        assert_eq!(encoded, "null");
    }

    #[test]
    fn unique_key_separates_types() {
        assert_ne!(
            Value::Int(1).unique_key(),
            Value::Text("1".to_string()).unique_key()
        );
        assert_eq!(
            Value::Float(0.0).unique_key(),
            Value::Float(-0.0).unique_key()
        );
        let left = Value::Array(vec![Value::from("a,b")]);
        let right = Value::Array(vec![Value::from("a"), Value::from("b")]);
        assert_ne!(left.unique_key(), right.unique_key());
    }

    #[test]
    fn parses_plain_dates_and_timestamps() {
        let date = parse_date("2024-03-05").expect("plain date");
        assert_eq!(format_date(&date), "2024-03-05T00:00:00.000Z");
        let stamp = parse_date("2024-03-05T10:00:00+02:00").expect("rfc3339");
        assert_eq!(format_date(&stamp), "2024-03-05T08:00:00.000Z");
        assert!(matches!(parse_date("yesterday"), Err(Error::InvalidValue(_))));
    }

    #[test]
    fn json_round_trip_keeps_integers_integral() {
        let value = Value::from_json_str(r#"{"id": 3, "ratio": 0.5, "tags": ["a"]}"#)
            .expect("parse json");
        assert_eq!(value.get("id"), Some(&Value::Int(3)));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(
            value.to_json(),
            serde_json::json!({"id": 3, "ratio": 0.5, "tags": ["a"]})
        );
    }
}
