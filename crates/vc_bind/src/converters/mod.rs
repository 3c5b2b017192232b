//! The builtin converters.
//!
//! [`standard_module`] chains them in the order used by
//! [`ObjectMapper::standard`](crate::ObjectMapper::standard):
//!
//! 1. [`OverrideSupport`]
//! 2. [`AnyConverter`]
//! 3. [`OptionalConverter`]
//! 4. [`UnionConverter`]
//! 5. [`PrimitiveConverter`]
//! 6. [`LiteralConverter`]
//! 7. [`CollectionConverter`], [`TupleConverter`], [`MappingConverter`]
//! 8. [`EnumConverter`]
//! 9. [`StringifyConverter`] for `uuid::Uuid` and `std::path::PathBuf`
//! 10. [`DatetimeConverter`] and [`DecimalConverter`]
//! 11. [`SchemaConverter`]

// -----------------------------------------------------------------------------
// Modules

mod any;
mod collection;
mod datetime;
mod decimal;
mod enums;
mod literal;
mod mapping;
mod optional;
mod overrides;
mod primitive;
mod schema;
mod stringify;
mod union;

#[cfg(test)]
pub(crate) mod testing;

// -----------------------------------------------------------------------------
// Exports

pub use any::AnyConverter;
pub use collection::{CollectionConverter, TupleConverter};
pub use datetime::DatetimeConverter;
pub use decimal::DecimalConverter;
pub use enums::EnumConverter;
pub use literal::LiteralConverter;
pub use mapping::MappingConverter;
pub use optional::OptionalConverter;
pub use overrides::OverrideSupport;
pub use primitive::PrimitiveConverter;
pub use schema::SchemaConverter;
pub use stringify::StringifyConverter;
pub use union::UnionConverter;

// -----------------------------------------------------------------------------
// standard_module

use crate::converter::Module;

/// Returns a module with every builtin converter.
pub fn standard_module() -> Module {
    let mut module = Module::new("standard");
    module
        .register(OverrideSupport)
        .register(AnyConverter)
        .register(OptionalConverter)
        .register(UnionConverter)
        .register(PrimitiveConverter)
        .register(LiteralConverter)
        .register(CollectionConverter)
        .register(TupleConverter)
        .register(MappingConverter)
        .register(EnumConverter)
        .register(StringifyConverter::uuid())
        .register(StringifyConverter::path())
        .register(DatetimeConverter)
        .register(DecimalConverter)
        .register(SchemaConverter);
    module
}
