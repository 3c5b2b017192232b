use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::Context;
use crate::converter::ConversionError;
use crate::value::Value;

/// The result of a conversion attempt.
pub type ConvertResult = Result<Value, ConvertError>;

// -----------------------------------------------------------------------------
// ConvertError

/// The outcome of a failed conversion attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The converter does not handle this context, the next one is tried.
    NotApplicable,
    /// The converter handles this context, but the value is wrong.
    Failed(Box<ConversionError>),
}

impl ConvertError {
    #[inline]
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    /// Returns the conversion error, if any.
    pub fn into_failure(self) -> Option<ConversionError> {
        match self {
            Self::NotApplicable => None,
            Self::Failed(err) => Some(*err),
        }
    }
}

impl From<ConversionError> for ConvertError {
    #[inline]
    fn from(value: ConversionError) -> Self {
        Self::Failed(Box::new(value))
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => f.write_str("not applicable"),
            Self::Failed(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for ConvertError {}

// -----------------------------------------------------------------------------
// Converter

/// Converts a [`Context`] in either direction.
///
/// A converter returns [`ConvertError::NotApplicable`] for contexts it does
/// not handle, so that a [`Module`](crate::Module) tries the next one.
/// Nested values are converted by spawning child contexts and calling
/// [`Context::convert`], which goes through the mapper's dispatch chain.
///
/// The `Debug` form of a converter names it in error reports.
pub trait Converter: fmt::Debug + Send + Sync {
    /// Convert the value of `ctx` to `ctx.datatype`.
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult;

    /// Returns the converters this converter stands for at `ctx`.
    ///
    /// A [`Module`](crate::Module) tries the returned converters in place of
    /// this one, which lets a converter group or replace others.
    fn delegates(&self, ctx: &Context<'_>) -> Option<Vec<Arc<dyn Converter>>> {
        let _ = ctx;
        None
    }

    /// Returns `true` if a definite failure of this converter ends a
    /// [`Module`](crate::Module) chain instead of letting the next converter try.
    fn short_circuits(&self) -> bool {
        false
    }
}

impl<C: Converter + ?Sized> Converter for Arc<C> {
    #[inline]
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        (**self).convert(ctx)
    }

    #[inline]
    fn delegates(&self, ctx: &Context<'_>) -> Option<Vec<Arc<dyn Converter>>> {
        (**self).delegates(ctx)
    }

    #[inline]
    fn short_circuits(&self) -> bool {
        (**self).short_circuits()
    }
}

// -----------------------------------------------------------------------------
// FnConverter

type ConvertFn = dyn Fn(&Context<'_>) -> ConvertResult + Send + Sync;

/// A converter backed by a closure.
///
/// # Examples
///
/// ```
/// use vc_bind::converter::{ConvertError, FnConverter};
/// use vc_bind::{TypeDesc, Value};
///
/// let upper = FnConverter::new("Upper", |ctx| match ctx.value.as_str() {
///     Some(text) if ctx.datatype == TypeDesc::str() => Ok(Value::from(text.to_uppercase())),
///     _ => Err(ConvertError::NotApplicable),
/// });
/// assert_eq!(format!("{upper:?}"), "Upper");
/// ```
#[derive(Clone)]
pub struct FnConverter {
    name: &'static str,
    func: Arc<ConvertFn>,
}

impl FnConverter {
    pub fn new<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(&Context<'_>) -> ConvertResult + Send + Sync + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }
}

impl Converter for FnConverter {
    #[inline]
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        (self.func)(ctx)
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
