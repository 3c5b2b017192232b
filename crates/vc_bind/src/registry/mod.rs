//! Provide the type registry for definitions of records, enums and opaque types.
//!
//! ## Menu
//!
//! - [`TypeDef`]: the definition of a registered type, see [`TypeKind`].
//! - [`FieldDef`]: a field declared by a record.
//! - [`EnumMember`]: a member of an enum, with aliases and an optional integer.
//! - [`TypeRegistry`]: a container storing definitions and derived schemas.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`] .
//!
//! We use [`inventory`] crate to implement static registration,
//! not all platforms support it (although major platforms do).
//! If it is not supported, the function returns `false` without causing any errors.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod type_def;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use type_def::{EnumDef, EnumMember, FieldDef, RecordDef, TypeDef, TypeKind};
pub use type_registry::{BaseOrder, TypeRegistry};
