use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::context::{Context, ContextTrace};
use crate::schema::SchemaError;

// -----------------------------------------------------------------------------
// ErrorKind

/// The category of a [`ConversionError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// No descriptor or schema could be derived for the type.
    #[error("unsupported type")]
    UnsupportedType,
    /// Two fields share a serialized name.
    #[error("duplicate field `{0}`")]
    DuplicateField(String),
    /// A required field is absent, `aliases` lists every accepted key.
    #[error("missing required field")]
    MissingRequiredField { aliases: Vec<String> },
    /// The value does not have the expected shape.
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    /// The input contains keys no field claims.
    #[error("extra keys rejected")]
    ExtraKeysRejected { keys: Vec<String> },
    /// No best-match member converted, or a keyed union saw several keys.
    #[error("ambiguous union match")]
    AmbiguousUnionMatch,
    /// The discriminator or nesting key of a union is missing or invalid.
    #[error("malformed discriminator")]
    MalformedDiscriminator,
    /// The converter chain found no converter that succeeded.
    #[error("no matching converter")]
    NoMatchingConverter,
    /// The nesting exceeded the configured maximum depth.
    #[error("maximum depth exceeded")]
    DepthExceeded,
    /// Any other invalid value.
    #[error("invalid value")]
    Invalid,
}

impl From<&SchemaError> for ErrorKind {
    fn from(value: &SchemaError) -> Self {
        match value {
            SchemaError::DuplicateField { field, .. } => Self::DuplicateField(field.clone()),
            _ => Self::UnsupportedType,
        }
    }
}

// -----------------------------------------------------------------------------
// ConversionError

/// A definite conversion failure.
///
/// Carries the converter that raised it, the trace from the root to the
/// failing node, and the errors of converters that were tried before.
///
/// The `Display` form looks like this:
///
/// ```text
/// expected int, got str instead
///
/// Trace:
///     $: Point
///     .x: int
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    /// The `Debug` name of the converter that raised the error.
    pub origin: String,
    pub kind: ErrorKind,
    pub message: String,
    pub trace: ContextTrace,
    /// Errors reported by the converters of a chain, by converter name.
    pub errors: Vec<(String, ConversionError)>,
}

impl ConversionError {
    pub fn new(origin: String, ctx: &Context<'_>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            origin,
            kind,
            message: message.into(),
            trace: ctx.trace(),
            errors: Vec::new(),
        }
    }

    /// Attach the errors of converters tried before.
    pub fn with_errors(mut self, errors: Vec<(String, ConversionError)>) -> Self {
        self.errors = errors;
        self
    }

    /// Wrap a schema error raised at `ctx`.
    pub fn from_schema(origin: String, ctx: &Context<'_>, err: &SchemaError) -> Self {
        Self::new(origin, ctx, ErrorKind::from(err), alloc::format!("{err}"))
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\nTrace:\n{}", self.message, self.trace.render("  "))?;
        if !self.errors.is_empty() {
            f.write_str("\n\nThe following errors have been reported by converters:")?;
            for (converter, err) in &self.errors {
                let nested = alloc::format!("{err}");
                write!(f, "\n\n  {converter}: ")?;
                for (idx, line) in nested.lines().enumerate() {
                    if idx > 0 {
                        f.write_str("\n    ")?;
                    }
                    f.write_str(line)?;
                }
            }
        }
        Ok(())
    }
}

impl core::error::Error for ConversionError {}
