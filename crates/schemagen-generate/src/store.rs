use std::collections::HashMap;

use schemagen_core::Value;

/// Key/value scratch space shared by every generator of one session.
///
/// A field generator publishes a value with [`Store::set`] and a later field
/// reads it back with [`Store::get`]. Object fields are expanded in
/// declaration order, so producers must be declared before consumers.
/// Entries are never scoped or removed: they survive across objects and
/// array elements until overwritten.
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` under `key` and hand the same value back, so a
    /// generator can store and return in one expression.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Value {
        self.data.insert(key.into(), value.clone());
        value
    }

    /// Last value written under `key`, `None` if it was never set.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_returns_value_and_overwrites() {
        let mut store = Store::new();
        assert!(store.get("driver").is_none());

        let returned = store.set("driver", Value::Int(7));
        assert_eq!(returned, Value::Int(7));
        assert_eq!(store.get("driver"), Some(&Value::Int(7)));

        store.set("driver", Value::Null);
        assert_eq!(store.get("driver"), Some(&Value::Null));
        assert!(store.contains("driver"));
        assert_eq!(store.len(), 1);
    }
}
