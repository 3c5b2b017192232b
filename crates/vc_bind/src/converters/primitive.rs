use alloc::format;
use alloc::string::{String, ToString};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::{PrimitiveKind, TypeDesc};
use crate::settings::{Precision, Strict};
use crate::value::Value;

const TRUE_WORDS: &[&str] = &["true", "yes", "on", "enabled"];
const FALSE_WORDS: &[&str] = &["false", "no", "off", "disabled"];

/// Converts primitive values: `None`, `bool`, `int`, `float`, `str` and `bytes`.
///
/// Both directions accept exactly the matching kind, plus:
///
/// - an `int` where a `float` is expected;
/// - a `float` without fractional part where an `int` is expected.
///
/// Deserialization also accepts base64 text where `bytes` are expected.
///
/// With [`Strict`] disabled, deserialization additionally parses numbers and
/// booleans from strings, and formats numbers and booleans as strings.
/// Serialization is always strict. Floats are rounded according to
/// [`Precision`] in both directions.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveConverter;

impl Converter for PrimitiveConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let TypeDesc::Primitive(kind) = *ctx.datatype.strip_annotated() else {
            return Err(ConvertError::NotApplicable);
        };

        let strict = ctx.direction.is_serialize()
            || ctx.get_setting::<Strict>().map_or(ctx.config().strict, |s| s.enabled);

        let converted = match (kind, &*ctx.value) {
            (PrimitiveKind::None, Value::None) => Some(Value::None),
            (PrimitiveKind::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
            (PrimitiveKind::Int, Value::Int(i)) => Some(Value::Int(*i)),
            (PrimitiveKind::Int, Value::Float(f)) => lossless_int(*f).map(Value::Int),
            (PrimitiveKind::Float, Value::Float(f)) => Some(Value::Float(*f)),
            (PrimitiveKind::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (PrimitiveKind::Str, Value::Str(s)) => Some(Value::Str(s.clone())),
            (PrimitiveKind::Bytes, Value::Bytes(b)) => Some(if ctx.direction.is_serialize() {
                Value::Str(STANDARD.encode(b))
            } else {
                Value::Bytes(b.clone())
            }),
            (PrimitiveKind::Bytes, Value::Str(text)) if ctx.direction.is_deserialize() => {
                let bytes = STANDARD.decode(text).map_err(|e| {
                    ctx.error(self, ErrorKind::Invalid, format!("invalid base64 payload: {e}"))
                })?;
                Some(Value::Bytes(bytes))
            }
            (_, value) if !strict => lenient(kind, value),
            _ => None,
        };

        match converted {
            Some(Value::Float(f)) => Ok(Value::Float(match ctx.get_setting::<Precision>() {
                Some(precision) => precision.apply(f),
                None => f,
            })),
            Some(value) => Ok(value),
            None => Err(ctx.mismatch(self, kind)),
        }
    }
}

fn lossless_int(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn lenient(kind: PrimitiveKind, value: &Value) -> Option<Value> {
    match (kind, value) {
        (PrimitiveKind::Int, Value::Str(s)) => s.trim().parse().ok().map(Value::Int),
        (PrimitiveKind::Float, Value::Str(s)) => s.trim().parse().ok().map(Value::Float),
        (PrimitiveKind::Bool, Value::Str(s)) => {
            let word = s.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Some(Value::Bool(true))
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        (PrimitiveKind::Str, Value::Int(i)) => Some(Value::Str(i.to_string())),
        (PrimitiveKind::Str, Value::Float(f)) => Some(Value::Str(f.to_string())),
        (PrimitiveKind::Str, Value::Bool(b)) => Some(Value::Str(String::from(if *b { "true" } else { "false" }))),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::settings::{Precision, Strict};
    use crate::value::Value;

    #[test]
    fn strict_deserialization() {
        let h = Harness::new();
        assert_eq!(h.deserialize(Value::Int(3), TypeDesc::int()).unwrap(), Value::Int(3));
        assert_eq!(h.deserialize(Value::Int(3), TypeDesc::float()).unwrap(), Value::Float(3.0));
        assert_eq!(h.deserialize(Value::Float(4.0), TypeDesc::int()).unwrap(), Value::Int(4));
        assert_eq!(h.deserialize(Value::None, TypeDesc::none()).unwrap(), Value::None);

        let err = h.deserialize(Value::Float(4.5), TypeDesc::int()).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "int".into(),
                got: "float".into(),
            }
        );
        assert_eq!(err.message, "expected int, got float instead");

        assert!(h.deserialize(Value::from("1"), TypeDesc::int()).is_err());
        assert!(h.deserialize(Value::Int(1), TypeDesc::str()).is_err());
        assert!(h.deserialize(Value::Int(1), TypeDesc::bool()).is_err());
    }

    #[test]
    fn whole_floats_serialize_as_int() {
        let h = Harness::new();
        assert_eq!(h.serialize(Value::Float(4.0), TypeDesc::int()).unwrap(), Value::Int(4));
        assert_eq!(h.serialize(Value::Int(4), TypeDesc::float()).unwrap(), Value::Float(4.0));

        let err = h.serialize(Value::Float(4.5), TypeDesc::int()).unwrap_err();
        assert_eq!(err.message, "expected int, got float instead");
        assert!(h.serialize(Value::Float(f64::NAN), TypeDesc::int()).is_err());
    }

    #[test]
    fn lenient_deserialization() {
        let mut h = Harness::new();
        h.mapper.settings_mut().add_global(Strict::new(false));

        assert_eq!(h.deserialize(Value::from(" 12 "), TypeDesc::int()).unwrap(), Value::Int(12));
        assert_eq!(h.deserialize(Value::from("1.5"), TypeDesc::float()).unwrap(), Value::Float(1.5));
        assert_eq!(h.deserialize(Value::from("Yes"), TypeDesc::bool()).unwrap(), Value::Bool(true));
        assert_eq!(h.deserialize(Value::from("off"), TypeDesc::bool()).unwrap(), Value::Bool(false));
        assert_eq!(h.deserialize(Value::Int(7), TypeDesc::str()).unwrap(), Value::from("7"));
        assert_eq!(h.deserialize(Value::Bool(true), TypeDesc::str()).unwrap(), Value::from("true"));
        assert!(h.deserialize(Value::from("maybe"), TypeDesc::bool()).is_err());

        // serialization stays strict
        assert!(h.serialize(Value::Int(7), TypeDesc::str()).is_err());
    }

    #[test]
    fn bytes_use_base64() {
        let h = Harness::new();
        let bytes = Value::Bytes(b"hello".to_vec());
        assert_eq!(h.serialize(bytes.clone(), TypeDesc::bytes()).unwrap(), Value::from("aGVsbG8="));
        assert_eq!(h.deserialize(Value::from("aGVsbG8="), TypeDesc::bytes()).unwrap(), bytes);

        let err = h.deserialize(Value::from("not base64!"), TypeDesc::bytes()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
    }

    #[test]
    fn precision_rounds_floats() {
        let h = Harness::new();
        let desc = TypeDesc::annotated(TypeDesc::float(), [Precision::new(2).into()]);
        assert_eq!(h.serialize(Value::Float(1.23456), desc.clone()).unwrap(), Value::Float(1.23));
        assert_eq!(h.deserialize(Value::Float(0.999), desc).unwrap(), Value::Float(1.0));
    }
}
