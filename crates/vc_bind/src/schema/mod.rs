//! Schemas: the resolved, ordered field list of a record type.
//!
//! A [`Schema`] is derived from a [`TypeDef`](crate::registry::TypeDef) and its
//! bases by [`derive_schema`], usually through the cache in
//! [`TypeRegistry::schema`](crate::TypeRegistry::schema).
//! [`get_fields_expanded`] computes the fields inlined by flattened fields.

// -----------------------------------------------------------------------------
// Modules

mod derive;
mod error;
mod expand;

// -----------------------------------------------------------------------------
// Exports

pub use derive::derive_schema;
pub use error::SchemaError;
pub use expand::{ExpandedFields, get_fields_expanded};

// -----------------------------------------------------------------------------
// Schema

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;

use crate::info::TypeDesc;
use crate::settings::{Flattened, Remainder, Setting, SettingRef};
use crate::value::{Record, Value};

/// Builds the runtime value of a record from its converted keyword map.
pub type Constructor = Arc<dyn Fn(IndexMap<String, Value>) -> Result<Value, String> + Send + Sync>;

/// The default of a field.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Value(Value),
    /// Called for every use of the default.
    Factory(fn() -> Value),
}

impl DefaultValue {
    /// Returns the default value.
    pub fn get(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

/// A field of a [`Schema`].
#[derive(Debug, Clone)]
pub struct Field {
    /// The resolved datatype, including its `Annotated` settings.
    pub datatype: TypeDesc,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub flattened: bool,
}

impl Field {
    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns the default value, if any.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::get)
    }

    /// Returns `true` if the datatype is annotated with an enabled [`Remainder`].
    pub fn is_remainder(&self) -> bool {
        annotation::<Remainder>(&self.datatype).is_some_and(|r| r.enabled)
    }
}

/// The ordered fields of a record type, with the constructor that builds it.
#[derive(Clone)]
pub struct Schema {
    pub fields: IndexMap<String, Field>,
    pub constructor: Constructor,
    /// The record descriptor the schema was derived for.
    pub ty: TypeDesc,
    /// Settings declared on the record type.
    pub annotations: Vec<SettingRef>,
}

impl Schema {
    #[inline]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Iterate over flattened fields.
    pub fn flattened_fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter().filter(|(_, f)| f.flattened)
    }

    /// Returns the field collecting unclaimed keys, if any.
    pub fn remainder_field(&self) -> Option<(&String, &Field)> {
        self.fields.iter().find(|(_, f)| f.is_remainder())
    }

    /// Build the runtime value.
    #[inline]
    pub fn construct(&self, values: IndexMap<String, Value>) -> Result<Value, String> {
        (self.constructor)(values)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("ty", &self.ty)
            .field("fields", &self.fields)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

/// A constructor building a [`Record`] of the given descriptor's class.
pub(crate) fn record_constructor(ty: &TypeDesc) -> Constructor {
    let name = ty.class_name().cloned();
    Arc::new(move |fields| match &name {
        Some(name) => Ok(Value::Record(Record {
            ty: name.clone(),
            fields,
        })),
        None => Ok(Value::Object(fields)),
    })
}

/// Returns the highest priority setting of type `S` in `desc`'s `Annotated` metadata.
pub(crate) fn annotation<S: Setting + Clone>(desc: &TypeDesc) -> Option<S> {
    let mut best: Option<S> = None;
    for setting in desc.unwrap_annotated().1 {
        if let Some(found) = setting.downcast_ref::<S>()
            && best.as_ref().is_none_or(|b| found.priority() > b.priority())
        {
            best = Some(found.clone());
        }
    }
    best
}

/// Returns `true` if `desc` is annotated with an enabled [`Flattened`].
pub(crate) fn is_flattened(desc: &TypeDesc) -> bool {
    annotation::<Flattened>(desc).is_some_and(|f| f.enabled)
}
