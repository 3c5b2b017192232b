//! The dynamic value model.
//!
//! A single [`Value`] type describes both sides of a conversion:
//!
//! - runtime values: [`Record`], [`EnumValue`], [`Opaque`], [`Value::Map`],
//!   [`Value::Tuple`], [`Value::Bytes`] and the scalar variants;
//! - the serialized tree: the subset `None | Bool | Int | Float | Str | List | Object`,
//!   see [`Value::is_tree`].
//!
//! The tree maps one-to-one onto [`serde_json::Value`], see [`Value::to_json`].

// -----------------------------------------------------------------------------
// Modules

mod json;
mod record;

// -----------------------------------------------------------------------------
// Exports

pub use json::TreeError;
pub use record::{EnumValue, Opaque, Record};

// -----------------------------------------------------------------------------
// Value

use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::info::{PrimitiveKind, TypeDesc};

/// A dynamically typed value.
///
/// # Examples
///
/// ```
/// use vc_bind::Value;
///
/// let tree = Value::object([("a", Value::Int(1)), ("b", Value::from("x"))]);
/// assert!(tree.is_tree());
/// assert_eq!(tree.get("a"), Some(&Value::Int(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    /// A runtime tuple, serialized as a list.
    Tuple(Vec<Value>),
    /// A runtime mapping with arbitrary keys, in insertion order.
    Map(Vec<(Value, Value)>),
    /// An ordered, string keyed object. The tree form of records and mappings.
    Object(IndexMap<String, Value>),
    Record(Record),
    Enum(EnumValue),
    Opaque(Opaque),
}

impl Value {
    /// Build an object from key/value pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a runtime mapping from key/value pairs.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Map(entries.into_iter().collect())
    }

    /// Returns the name of this value's kind, used in error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Record(_) => "record",
            Self::Enum(_) => "enum",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Returns a descriptor for the concrete runtime type of this value.
    ///
    /// Container descriptors use [`TypeDesc::Any`] for their items, they are
    /// only meant for origin matching with [`TypeDesc::same_origin`].
    pub fn runtime_type(&self) -> TypeDesc {
        match self {
            Self::None => TypeDesc::none(),
            Self::Bool(_) => TypeDesc::Primitive(PrimitiveKind::Bool),
            Self::Int(_) => TypeDesc::int(),
            Self::Float(_) => TypeDesc::float(),
            Self::Str(_) => TypeDesc::str(),
            Self::Bytes(_) => TypeDesc::bytes(),
            Self::List(_) => TypeDesc::list(TypeDesc::Any),
            Self::Tuple(_) => TypeDesc::repeated(TypeDesc::Any),
            Self::Map(_) | Self::Object(_) => TypeDesc::map(TypeDesc::Any, TypeDesc::Any),
            Self::Record(record) => TypeDesc::class(record.ty.clone()),
            Self::Enum(member) => TypeDesc::class(member.ty.clone()),
            Self::Opaque(opaque) => TypeDesc::class(opaque.ty().clone()),
        }
    }

    /// Returns `true` if this value only consists of tree variants.
    pub fn is_tree(&self) -> bool {
        match self {
            Self::None | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_) => true,
            Self::List(items) => items.iter().all(Self::is_tree),
            Self::Object(entries) => entries.values().all(Self::is_tree),
            _ => false,
        }
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in an object or a field of a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(entries) => entries.get(key),
            Self::Record(record) => record.fields.get(key),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float,
    String => Str,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(String::from(value))
    }
}

impl From<Record> for Value {
    #[inline]
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<EnumValue> for Value {
    #[inline]
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}

impl From<Opaque> for Value {
    #[inline]
    fn from(value: Opaque) -> Self {
        Self::Opaque(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::None,
        }
    }
}
