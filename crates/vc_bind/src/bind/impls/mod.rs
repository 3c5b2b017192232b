//! `Bind` implementations for foreign types.

// bool, i8 - i64, u8 - u64, isize, usize, f32, f64, String
mod native;

// Option<T>, Box<T>, Vec<T>, BTreeMap<String, V>, tuples of 2 to 4 items
mod alloc;

// HashMap<String, V, S>, PathBuf
mod std;

// IndexMap<String, V>, Uuid, chrono dates and times, Decimal, Value
mod external;

use ::alloc::format;
use ::alloc::string::String;
use ::alloc::vec::Vec;

use crate::bind::{Bind, BindError};
use crate::value::Value;

/// Returns the entries of a string keyed mapping.
///
/// Accepts a runtime mapping with string keys, or an object.
pub(super) fn map_entries(value: Value, expected: &'static str) -> Result<Vec<(String, Value)>, BindError> {
    match value {
        Value::Object(entries) => Ok(entries.into_iter().collect()),
        Value::Map(entries) => entries
            .into_iter()
            .map(|(key, value)| match key {
                Value::Str(key) => Ok((key, value)),
                other => Err(BindError::mismatch("str", other.kind_name()).in_field("<key>")),
            })
            .collect(),
        other => Err(BindError::mismatch(expected, other.kind_name())),
    }
}

/// Read every item of a list or tuple as `T`.
pub(super) fn items<T: Bind>(value: Value, expected: &'static str) -> Result<Vec<T>, BindError> {
    match value {
        Value::List(items) | Value::Tuple(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| T::from_value(item).map_err(|err| err.in_field(format!("[{idx}]"))))
            .collect(),
        other => Err(BindError::mismatch(expected, other.kind_name())),
    }
}
