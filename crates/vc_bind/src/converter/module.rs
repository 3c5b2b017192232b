use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::Context;
use crate::converter::{ConversionError, ConvertError, ConvertResult, Converter, ErrorKind};

// -----------------------------------------------------------------------------
// Module

/// An ordered chain of converters.
///
/// [`convert`](Converter::convert) tries every converter in order and returns
/// the first success. Converters returning
/// [`NotApplicable`](ConvertError::NotApplicable) are skipped, failures are
/// collected:
///
/// - a failure of a converter that [short-circuits](Converter::short_circuits)
///   is returned at once;
/// - if exactly one converter failed, its error is returned unchanged;
/// - otherwise a [`ErrorKind::NoMatchingConverter`] error carrying every
///   collected failure is returned.
///
/// A module nested in another module is flattened into it, as is any
/// converter reporting [`delegates`](Converter::delegates).
#[derive(Clone)]
pub struct Module {
    name: Cow<'static, str>,
    converters: Vec<Arc<dyn Converter>>,
}

impl Module {
    /// Create an empty module.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            converters: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn converters(&self) -> &[Arc<dyn Converter>] {
        &self.converters
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Append a converter, it is tried after the existing ones.
    pub fn register(&mut self, converter: impl Converter + 'static) -> &mut Self {
        self.register_arc(Arc::new(converter))
    }

    /// Append a shared converter.
    pub fn register_arc(&mut self, converter: Arc<dyn Converter>) -> &mut Self {
        self.converters.push(converter);
        self
    }

    /// Prepend a converter, it is tried before the existing ones.
    pub fn register_first(&mut self, converter: impl Converter + 'static) -> &mut Self {
        self.converters.insert(0, Arc::new(converter));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, converter: impl Converter + 'static) -> Self {
        self.register(converter);
        self
    }

    /// Returns the flattened converter chain for `ctx`.
    pub fn resolve(&self, ctx: &Context<'_>) -> Vec<Arc<dyn Converter>> {
        let mut out = Vec::with_capacity(self.converters.len());
        flatten(&self.converters, ctx, &mut out);
        out
    }
}

fn flatten(converters: &[Arc<dyn Converter>], ctx: &Context<'_>, out: &mut Vec<Arc<dyn Converter>>) {
    for converter in converters {
        match converter.delegates(ctx) {
            Some(delegates) => flatten(&delegates, ctx, out),
            None => out.push(Arc::clone(converter)),
        }
    }
}

impl Converter for Module {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let mut errors: Vec<(String, ConversionError)> = Vec::new();

        for converter in self.resolve(ctx) {
            log::trace!("{self:?}: trying {converter:?} for {} at {}", ctx.datatype, ctx.key);
            match converter.convert(ctx) {
                Ok(value) => return Ok(value),
                Err(ConvertError::NotApplicable) => {}
                Err(ConvertError::Failed(err)) if converter.short_circuits() => return Err(ConvertError::Failed(err)),
                Err(ConvertError::Failed(err)) => errors.push((format!("{converter:?}"), *err)),
            }
        }

        if errors.len() == 1
            && let Some((_, err)) = errors.pop()
        {
            return Err(err.into());
        }

        let message = format!(
            "no {}r for `{}` and payload of type `{}`",
            ctx.direction.name(),
            ctx.datatype,
            ctx.value.kind_name(),
        );
        let err = ConversionError::new(format!("{self:?}"), ctx, ErrorKind::NoMatchingConverter, message);
        Err(err.with_errors(errors).into())
    }

    fn delegates(&self, _ctx: &Context<'_>) -> Option<Vec<Arc<dyn Converter>>> {
        Some(self.converters.clone())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Module").field(&self.name).finish()
    }
}
