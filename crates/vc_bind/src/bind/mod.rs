//! The bridge between Rust types and the engine.
//!
//! A [`Bind`] type describes itself with a [`TypeDesc`], registers the
//! definitions it needs in a [`TypeRegistry`], and converts to and from the
//! runtime [`Value`] that converters work on.
//!
//! `Bind` is implemented for the common std types and can be derived:
//!
//! - named structs become records;
//! - enums with unit variants become enumerations;
//! - enums with single field tuple variants become unions.
//!
//! See [`derive::Bind`](crate::derive::Bind) for the attributes.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod error;
mod helpers;
mod impls;

// -----------------------------------------------------------------------------
// Exports

pub use error::BindError;
pub use helpers::{enum_member, record_fields, take_field, take_field_or};

// -----------------------------------------------------------------------------
// Bind

use core::any::TypeId;

use crate::info::TypeDesc;
use crate::registry::TypeRegistry;
use crate::value::Value;

/// A Rust type that can be converted by an [`ObjectMapper`](crate::ObjectMapper).
///
/// `to_value` and `from_value` only move between the Rust value and its
/// runtime [`Value`]. Aliases, defaults, unions and every other policy are
/// applied by the converters, according to the descriptor and the
/// definitions registered by [`register`](Bind::register).
///
/// # Examples
///
/// ```
/// use vc_bind::{Bind, BindError, TypeDesc, Value};
///
/// struct Celsius(f64);
///
/// impl Bind for Celsius {
///     fn describe() -> TypeDesc {
///         TypeDesc::float()
///     }
///
///     fn to_value(&self) -> Value {
///         Value::Float(self.0)
///     }
///
///     fn from_value(value: Value) -> Result<Self, BindError> {
///         f64::from_value(value).map(Celsius)
///     }
/// }
///
/// assert_eq!(vc_bind::describe::<Celsius>(), TypeDesc::float());
/// assert_eq!(Celsius(1.5).to_value(), Value::Float(1.5));
/// ```
pub trait Bind: Sized + 'static {
    /// Returns the descriptor of this type.
    ///
    /// Prefer [`describe`], which memoizes the result.
    fn describe() -> TypeDesc;

    /// Register the definitions of this type and of the types it refers to.
    ///
    /// Implementations must insert their own definition before registering
    /// their fields, so that recursive types terminate.
    fn register(registry: &mut TypeRegistry) {
        let _ = registry;
    }

    /// Returns the runtime value of `self`.
    fn to_value(&self) -> Value;

    /// Rebuild `Self` from a runtime value.
    fn from_value(value: Value) -> Result<Self, BindError>;
}

/// Returns the descriptor of `T`, computed once per type.
///
/// ```
/// use vc_bind::{TypeDesc, describe};
///
/// assert_eq!(describe::<Vec<Option<i32>>>(), TypeDesc::list(TypeDesc::optional(TypeDesc::int())));
/// assert_eq!(describe::<u8>(), describe::<u8>());
/// ```
pub fn describe<T: Bind>() -> TypeDesc {
    static CELL: cell::DescCell = cell::DescCell::new();
    CELL.get_or_insert(TypeId::of::<T>(), T::describe)
}

// -----------------------------------------------------------------------------
// Tests
