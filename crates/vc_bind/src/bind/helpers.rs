//! Functions used by derived `Bind` implementations.

use alloc::string::String;
use alloc::sync::Arc;

use indexmap::IndexMap;

use crate::bind::{Bind, BindError};
use crate::value::Value;

/// Returns the fields of a record, or the entries of an object.
pub fn record_fields(value: Value, ty: &'static str) -> Result<IndexMap<String, Value>, BindError> {
    match value {
        Value::Record(record) => Ok(record.fields),
        Value::Object(entries) => Ok(entries),
        other => Err(BindError::mismatch(ty, other.kind_name())),
    }
}

/// Remove a field from `fields` and read it as `T`.
///
/// A missing field is read from [`Value::None`], so optional fields may be
/// absent; any other type reports [`BindError::MissingField`].
pub fn take_field<T: Bind>(
    fields: &mut IndexMap<String, Value>,
    ty: &'static str,
    field: &'static str,
) -> Result<T, BindError> {
    match fields.shift_remove(field) {
        Some(value) => T::from_value(value).map_err(|err| err.in_field(field)),
        None => T::from_value(Value::None).map_err(|_| BindError::MissingField { ty, field }),
    }
}

/// Remove a field from `fields` and read it as `T`, or build it with `default`.
pub fn take_field_or<T: Bind>(
    fields: &mut IndexMap<String, Value>,
    field: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, BindError> {
    match fields.shift_remove(field) {
        Some(value) => T::from_value(value).map_err(|err| err.in_field(field)),
        None => Ok(default()),
    }
}

/// Returns the member name of an enum value.
pub fn enum_member(value: Value, ty: &'static str) -> Result<Arc<str>, BindError> {
    match value {
        Value::Enum(member) if member.ty == *ty => Ok(member.member),
        other => Err(BindError::mismatch(ty, other.kind_name())),
    }
}
