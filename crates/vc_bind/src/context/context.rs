use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::context::{ContextTrace, Direction, Key, Location};
use crate::converter::{ConversionError, ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::TypeDesc;
use crate::mapper::MapperConfig;
use crate::registry::TypeRegistry;
use crate::settings::{Setting, Settings};
use crate::value::Value;

// -----------------------------------------------------------------------------
// Context

/// One node of a conversion: the value to convert, its target type, and
/// everything needed to convert it.
///
/// Contexts are immutable. Children created with [`spawn`](Self::spawn) borrow
/// their parent, so a context never outlives the call that created it.
pub struct Context<'a> {
    parent: Option<&'a Context<'a>>,
    pub direction: Direction,
    pub value: Cow<'a, Value>,
    pub datatype: TypeDesc,
    pub settings: &'a Settings,
    pub registry: &'a TypeRegistry,
    pub key: Key,
    pub location: Location,
    dispatch: &'a dyn Converter,
    config: &'a MapperConfig,
    depth: usize,
}

impl<'a> Context<'a> {
    /// Create a root context.
    pub fn new(
        direction: Direction,
        value: Cow<'a, Value>,
        datatype: TypeDesc,
        settings: &'a Settings,
        registry: &'a TypeRegistry,
        dispatch: &'a dyn Converter,
        config: &'a MapperConfig,
    ) -> Self {
        Self {
            parent: None,
            direction,
            value,
            datatype,
            settings,
            registry,
            key: Key::Root,
            location: Location::default(),
            dispatch,
            config,
            depth: 0,
        }
    }

    /// Returns a copy with a different location.
    #[inline]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    #[inline]
    pub fn parent(&self) -> Option<&'a Context<'a>> {
        self.parent
    }

    /// Returns the number of ancestors.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn config(&self) -> &'a MapperConfig {
        self.config
    }

    /// Returns the converter used by [`convert`](Self::convert).
    #[inline]
    pub fn dispatch(&self) -> &'a dyn Converter {
        self.dispatch
    }

    fn child<'b>(&'b self, value: Cow<'b, Value>, datatype: TypeDesc, key: Key, location: Location) -> Context<'b> {
        Context {
            parent: Some(self),
            direction: self.direction,
            value,
            datatype,
            settings: self.settings,
            registry: self.registry,
            key,
            location,
            dispatch: self.dispatch,
            config: self.config,
            depth: self.depth + 1,
        }
    }

    /// Create a child context for a borrowed value.
    ///
    /// The child inherits the filename, but not the line and column.
    pub fn spawn<'b>(&'b self, value: &'b Value, datatype: TypeDesc, key: impl Into<Key>) -> Context<'b> {
        let location = Location {
            filename: self.location.filename.clone(),
            ..Location::default()
        };
        self.child(Cow::Borrowed(value), datatype, key.into(), location)
    }

    /// Create a child context for an owned value.
    pub fn spawn_owned<'b>(&'b self, value: Value, datatype: TypeDesc, key: impl Into<Key>) -> Context<'b> {
        let location = Location {
            filename: self.location.filename.clone(),
            ..Location::default()
        };
        self.child(Cow::Owned(value), datatype, key.into(), location)
    }

    /// Create a child context with an explicit location.
    pub fn spawn_at<'b>(
        &'b self,
        value: &'b Value,
        datatype: TypeDesc,
        key: impl Into<Key>,
        location: Location,
    ) -> Context<'b> {
        self.child(Cow::Borrowed(value), datatype, key.into(), location)
    }

    /// Convert this context with the dispatch converter.
    ///
    /// Fails with [`ErrorKind::DepthExceeded`] once the nesting exceeds
    /// [`MapperConfig::max_depth`].
    pub fn convert(&self) -> ConvertResult {
        if self.depth > self.config.max_depth {
            return Err(self.error(
                format_args!("Context"),
                ErrorKind::DepthExceeded,
                format!("maximum conversion depth of {} exceeded", self.config.max_depth),
            ));
        }
        self.dispatch.convert(self)
    }

    /// Returns the highest priority setting of type `S` visible to this context.
    #[inline]
    pub fn get_setting<S: Setting + Clone>(&self) -> Option<S> {
        self.settings.get_setting::<S>(self)
    }

    /// Iterate from this context up to the root.
    pub fn iter_hierarchy_up(&self) -> impl Iterator<Item = &Context<'a>> {
        let mut current = Some(self);
        core::iter::from_fn(move || {
            let ctx = current?;
            current = ctx.parent;
            Some(ctx)
        })
    }

    /// Capture an owned trace of this context.
    #[inline]
    pub fn trace(&self) -> ContextTrace {
        ContextTrace::capture(self)
    }

    // -------------------------------------------------------------------------
    // Errors

    /// Build a definite conversion error at this context.
    pub fn error(&self, origin: impl fmt::Debug, kind: ErrorKind, message: impl Into<String>) -> ConvertError {
        ConvertError::Failed(Box::new(ConversionError::new(
            format!("{origin:?}"),
            self,
            kind,
            message,
        )))
    }

    /// Build a [`ErrorKind::TypeMismatch`] error against this context's value.
    pub fn mismatch(&self, origin: impl fmt::Debug, expected: impl fmt::Display) -> ConvertError {
        let got = self.value.kind_name();
        let expected = format!("{expected}");
        let message = format!("expected {expected}, got {got} instead");
        self.error(
            origin,
            ErrorKind::TypeMismatch {
                expected,
                got: String::from(got),
            },
            message,
        )
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("direction", &self.direction)
            .field("key", &self.key)
            .field("datatype", &self.datatype)
            .field("value", &self.value)
            .field("location", &self.location)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
