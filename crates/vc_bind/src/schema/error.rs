use alloc::string::String;

use thiserror::Error;

/// An error raised while deriving or expanding a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The type is not registered, or has no shape the engine understands.
    #[error("unsupported type `{0}`")]
    UnsupportedType(String),
    /// A base type is not a class.
    #[error("type `{ty}` declares `{base}` as a base, but only registered types can be bases")]
    InvalidBase { ty: String, base: String },
    /// A type inherits or flattens into itself.
    #[error("cyclic type graph through `{0}`")]
    Cycle(String),
    /// Two fields, after flattening, share a serialized name.
    #[error("duplicate field `{field}` in schema `{schema}`")]
    DuplicateField { field: String, schema: String },
    /// More than one field collects the remaining keys.
    #[error("schema `{schema}` has two remainder fields, `{first}` and `{second}`")]
    MultipleRemainders {
        schema: String,
        first: String,
        second: String,
    },
    /// A flattened field's type has no schema.
    #[error("field `{field}` is flattened, but `{ty}` is not a record")]
    NotFlattenable { field: String, ty: String },
    /// A best-match union member still has generic parameters.
    #[error("union member `{0}` is not a concrete type")]
    NonConcreteMember(String),
    /// Two best-match union members share a runtime type.
    #[error("union members `{first}` and `{second}` cannot be told apart at runtime")]
    OverlappingMembers { first: String, second: String },
}
