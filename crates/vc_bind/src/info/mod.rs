//! Type descriptors.
//!
//! - [`TypeDesc`]: a tagged description of a target shape.
//! - [`TypeName`]: the identity of a registered record, enum or opaque type.
//! - [`PrimitiveKind`]: leaf kinds.
//! - [`Literal`]: allowed values of a literal type.
//!
//! Descriptors for Rust types are produced by [`describe`](crate::describe),
//! which memoizes per type.

// -----------------------------------------------------------------------------
// Modules

mod type_desc;
mod type_name;

// -----------------------------------------------------------------------------
// Exports

pub use type_desc::{ClassDesc, Literal, TypeDesc};
pub use type_name::{PrimitiveKind, TypeName};
