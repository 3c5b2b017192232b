use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;
use std::path::PathBuf;

use uuid::Uuid;

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::TypeName;
use crate::value::{Opaque, Value};

type ParseFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;
type FormatFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// Converts an opaque type from and to its string form.
///
/// Applies to the registered type `ty` and its subclasses.
///
/// # Examples
///
/// ```
/// use vc_bind::converters::StringifyConverter;
/// use vc_bind::value::{Opaque, Value};
///
/// let converter = StringifyConverter::new(
///     "std::net::Ipv4Addr",
///     |text| {
///         text.parse::<std::net::Ipv4Addr>()
///             .map(|ip| Value::Opaque(Opaque::new("std::net::Ipv4Addr", ip)))
///             .map_err(|e| e.to_string())
///     },
///     |value| match value {
///         Value::Opaque(o) => o.downcast_ref::<std::net::Ipv4Addr>().map(|ip| ip.to_string()),
///         _ => None,
///     },
/// );
/// assert_eq!(format!("{converter:?}"), "StringifyConverter(std::net::Ipv4Addr)");
/// ```
#[derive(Clone)]
pub struct StringifyConverter {
    ty: TypeName,
    parse: Arc<ParseFn>,
    format: Arc<FormatFn>,
}

impl StringifyConverter {
    pub fn new<P, F>(ty: impl Into<TypeName>, parse: P, format: F) -> Self
    where
        P: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            ty: ty.into(),
            parse: Arc::new(parse),
            format: Arc::new(format),
        }
    }

    /// Converts [`Uuid`] from and to its hyphenated form.
    pub fn uuid() -> Self {
        Self::new(
            "uuid::Uuid",
            |text| {
                Uuid::parse_str(text)
                    .map(|id| Value::Opaque(Opaque::new("uuid::Uuid", id)))
                    .map_err(|e| e.to_string())
            },
            |value| match value {
                Value::Opaque(opaque) => opaque.downcast_ref::<Uuid>().map(ToString::to_string),
                _ => None,
            },
        )
    }

    /// Converts [`PathBuf`] from and to a string.
    pub fn path() -> Self {
        Self::new(
            "std::path::PathBuf",
            |text| Ok(Value::Opaque(Opaque::new("std::path::PathBuf", PathBuf::from(text)))),
            |value| match value {
                Value::Opaque(opaque) => opaque
                    .downcast_ref::<PathBuf>()
                    .and_then(|p| p.to_str())
                    .map(String::from),
                _ => None,
            },
        )
    }

    #[inline]
    pub fn type_name(&self) -> &TypeName {
        &self.ty
    }
}

impl Converter for StringifyConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let Some(name) = ctx.datatype.class_name() else {
            return Err(ConvertError::NotApplicable);
        };
        if !ctx.registry.is_subclass(name.as_str(), self.ty.as_str()) {
            return Err(ConvertError::NotApplicable);
        }

        if ctx.direction.is_serialize() {
            return match (self.format)(&ctx.value) {
                Some(text) => Ok(Value::Str(text)),
                None => Err(ctx.mismatch(self, name.short_name())),
            };
        }

        let Some(text) = ctx.value.as_str() else {
            return Err(ctx.mismatch(self, "str"));
        };
        (self.parse)(text).map_err(|message| ctx.error(self, ErrorKind::Invalid, message))
    }
}

impl fmt::Debug for StringifyConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringifyConverter({})", self.ty)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::value::{Opaque, Value};

    #[test]
    fn uuids_round_trip() {
        let h = Harness::new();
        let desc = TypeDesc::class("uuid::Uuid");
        let text = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let id = Uuid::parse_str(text).unwrap();

        let runtime = h.deserialize(Value::from(text), desc.clone()).unwrap();
        let Value::Opaque(opaque) = &runtime else {
            panic!("expected an opaque value, got {runtime:?}");
        };
        assert_eq!(opaque.downcast_ref::<Uuid>(), Some(&id));
        assert_eq!(h.serialize(runtime, desc.clone()).unwrap(), Value::from(text));

        let err = h.deserialize(Value::from("nope"), desc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
    }

    #[test]
    fn paths_round_trip() {
        let h = Harness::new();
        let desc = TypeDesc::class("std::path::PathBuf");
        let path = Value::Opaque(Opaque::new("std::path::PathBuf", PathBuf::from("/tmp/x")));

        assert_eq!(h.serialize(path.clone(), desc.clone()).unwrap(), Value::from("/tmp/x"));
        assert_eq!(h.deserialize(Value::from("/tmp/x"), desc).unwrap(), path);
    }
}
