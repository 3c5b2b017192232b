use alloc::string::String;
use core::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::bind::{Bind, BindError, describe};
use crate::info::TypeDesc;
use crate::registry::{TypeDef, TypeRegistry};
use crate::value::{Opaque, Value};

impl<V: Bind> Bind for IndexMap<String, V> {
    fn describe() -> TypeDesc {
        TypeDesc::map(TypeDesc::str(), describe::<V>())
    }

    fn register(registry: &mut TypeRegistry) {
        V::register(registry);
    }

    fn to_value(&self) -> Value {
        Value::map(self.iter().map(|(k, v)| (Value::Str(k.clone()), v.to_value())))
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        super::map_entries(value, "map")?
            .into_iter()
            .map(|(key, value)| match V::from_value(value) {
                Ok(value) => Ok((key, value)),
                Err(err) => Err(err.in_field(key)),
            })
            .collect()
    }
}

/// Bind a `Copy` leaf type as an opaque value, also reading its string form.
macro_rules! impl_opaque_bind {
    ($ty:ty, $name:literal, $parse:expr, $expected:literal) => {
        impl Bind for $ty {
            fn describe() -> TypeDesc {
                TypeDesc::class($name)
            }

            fn register(registry: &mut TypeRegistry) {
                registry.try_insert(TypeDef::opaque($name));
            }

            fn to_value(&self) -> Value {
                Value::Opaque(Opaque::new($name, *self))
            }

            fn from_value(value: Value) -> Result<Self, BindError> {
                match value {
                    Value::Opaque(opaque) => opaque
                        .downcast_ref::<$ty>()
                        .copied()
                        .ok_or_else(|| BindError::mismatch($name, "opaque")),
                    Value::Str(text) => $parse(text.as_str()).map_err(|_| BindError::mismatch($expected, "str")),
                    other => Err(BindError::mismatch($name, other.kind_name())),
                }
            }
        }
    };
}

impl_opaque_bind!(Uuid, "uuid::Uuid", Uuid::parse_str, "hyphenated uuid");
impl_opaque_bind!(NaiveDate, "chrono::NaiveDate", NaiveDate::from_str, "ISO 8601 date");
impl_opaque_bind!(NaiveTime, "chrono::NaiveTime", NaiveTime::from_str, "ISO 8601 time");
impl_opaque_bind!(NaiveDateTime, "chrono::NaiveDateTime", NaiveDateTime::from_str, "ISO 8601 date time");
impl_opaque_bind!(
    DateTime<FixedOffset>,
    "chrono::DateTime",
    DateTime::parse_from_rfc3339,
    "RFC 3339 date time"
);
impl_opaque_bind!(Decimal, "rust_decimal::Decimal", Decimal::from_str, "decimal");

/// Bound as `chrono::DateTime`, read back in UTC.
impl Bind for DateTime<Utc> {
    fn describe() -> TypeDesc {
        <DateTime<FixedOffset>>::describe()
    }

    fn register(registry: &mut TypeRegistry) {
        <DateTime<FixedOffset>>::register(registry);
    }

    fn to_value(&self) -> Value {
        self.fixed_offset().to_value()
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        <DateTime<FixedOffset>>::from_value(value).map(|dt| dt.with_timezone(&Utc))
    }
}

/// A [`Value`] is bound as [`TypeDesc::Any`], it is passed through unchanged.
impl Bind for Value {
    #[inline]
    fn describe() -> TypeDesc {
        TypeDesc::Any
    }

    #[inline]
    fn to_value(&self) -> Value {
        self.clone()
    }

    #[inline]
    fn from_value(value: Value) -> Result<Self, BindError> {
        Ok(value)
    }
}
