use alloc::string::String;

use serde_json::{Map, Number};
use thiserror::Error;

use crate::value::Value;

// -----------------------------------------------------------------------------
// TreeError

/// A [`Value`] could not be turned into JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// The value contains a runtime-only variant.
    #[error("`{0}` is not part of the serialized tree")]
    NotTree(&'static str),
    /// NaN and infinities have no JSON representation.
    #[error("non-finite float `{0}` cannot be represented in JSON")]
    NonFinite(f64),
}

// -----------------------------------------------------------------------------
// Bridge

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(entries) => {
                Value::Object(entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Value {
    /// Parse a tree from a [`serde_json::Value`].
    #[inline]
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::from(value)
    }

    /// Convert a tree into a [`serde_json::Value`].
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use vc_bind::Value;
    ///
    /// let tree = Value::from_json(json!({"a": [1, 2.5, null]}));
    /// assert_eq!(tree.to_json().unwrap(), json!({"a": [1, 2.5, null]}));
    ///
    /// assert!(Value::Bytes(vec![1]).to_json().is_err());
    /// ```
    pub fn to_json(&self) -> Result<serde_json::Value, TreeError> {
        Ok(match self {
            Value::None => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
            Value::Float(f) => match Number::from_f64(*f) {
                Some(n) => serde_json::Value::Number(n),
                None => return Err(TreeError::NonFinite(*f)),
            },
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_, _>>()?,
            ),
            Value::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(String::clone(key), value.to_json()?);
                }
                serde_json::Value::Object(map)
            }
            other => return Err(TreeError::NotTree(other.kind_name())),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn object_order_is_preserved() {
        let tree = Value::from_json(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = tree.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);

        let text = serde_json::to_string(&tree.to_json().unwrap()).unwrap();
        assert_eq!(text, r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn large_unsigned_becomes_float() {
        let tree = Value::from_json(json!(u64::MAX));
        assert!(matches!(tree, Value::Float(_)));
    }

    #[test]
    fn non_finite_is_rejected() {
        assert_eq!(
            Value::Float(f64::INFINITY).to_json(),
            Err(TreeError::NonFinite(f64::INFINITY))
        );
    }

    #[test]
    fn runtime_variants_are_rejected() {
        let value = Value::List(alloc::vec![Value::Tuple(alloc::vec![])]);
        assert_eq!(value.to_json(), Err(TreeError::NotTree("tuple")));
    }
}
