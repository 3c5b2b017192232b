use alloc::string::String;
use core::hash::BuildHasher;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::bind::{Bind, BindError, describe};
use crate::info::TypeDesc;
use crate::registry::{TypeDef, TypeRegistry};
use crate::value::{Opaque, Value};

impl<V: Bind, S: BuildHasher + Default + 'static> Bind for HashMap<String, V, S> {
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

const PATH_BUF: &str = "std::path::PathBuf";

impl Bind for PathBuf {
    fn describe() -> TypeDesc {
        TypeDesc::class(PATH_BUF)
    }

    fn register(registry: &mut TypeRegistry) {
        registry.try_insert(TypeDef::opaque(PATH_BUF));
    }

    fn to_value(&self) -> Value {
        Value::Opaque(Opaque::new(PATH_BUF, self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Opaque(opaque) => opaque
                .downcast_ref::<PathBuf>()
                .cloned()
                .ok_or_else(|| BindError::mismatch(PATH_BUF, "opaque")),
            Value::Str(text) => Ok(PathBuf::from(text)),
            other => Err(BindError::mismatch(PATH_BUF, other.kind_name())),
        }
    }
}
