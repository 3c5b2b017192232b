use alloc::boxed::Box;
use alloc::string::String;

use thiserror::Error;

/// A runtime [`Value`](crate::Value) does not fit the Rust type it is read into.
///
/// Values produced by a successful deserialization always fit, this error
/// points at a mismatch between a hand written descriptor and its `from_value`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("expected {expected}, got {got}")]
    Mismatch { expected: String, got: &'static str },
    #[error("missing field `{field}` of `{ty}`")]
    MissingField { ty: &'static str, field: &'static str },
    #[error("`{variant}` is not a variant of `{ty}`")]
    UnknownVariant { ty: &'static str, variant: String },
    #[error("{value} is out of range for `{ty}`")]
    OutOfRange { value: String, ty: &'static str },
    #[error("in `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<BindError>,
    },
}

impl BindError {
    /// Shorthand for [`BindError::Mismatch`].
    #[inline]
    pub fn mismatch(expected: impl Into<String>, got: &'static str) -> Self {
        Self::Mismatch {
            expected: expected.into(),
            got,
        }
    }

    /// Shorthand for [`BindError::UnknownVariant`].
    #[inline]
    pub fn unknown_variant(ty: &'static str, variant: &str) -> Self {
        Self::UnknownVariant {
            ty,
            variant: String::from(variant),
        }
    }

    /// Wrap `self` as the error of a field or an item.
    #[inline]
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }
}
