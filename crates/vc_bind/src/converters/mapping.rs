use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::context::{Context, Key};
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::TypeDesc;
use crate::value::Value;

/// Converts `dict[K, V]`.
///
/// The tree form is an object. Deserialization converts every key as `K` and
/// produces a [`Value::Map`]. Serialization accepts a map or an object, and
/// every key must serialize to a string.
#[derive(Debug, Default, Clone, Copy)]
pub struct MappingConverter;

impl Converter for MappingConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let TypeDesc::Map(key_type, value_type) = ctx.datatype.strip_annotated() else {
            return Err(ConvertError::NotApplicable);
        };

        if ctx.direction.is_deserialize() {
            let Value::Object(entries) = &*ctx.value else {
                return Err(ctx.mismatch(self, ctx.datatype.strip_annotated()));
            };
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let converted_key = ctx
                    .spawn_owned(Value::Str(key.clone()), (**key_type).clone(), key.as_str())
                    .convert()?;
                let converted = ctx.spawn(value, (**value_type).clone(), key.as_str()).convert()?;
                pairs.push((converted_key, converted));
            }
            return Ok(Value::Map(pairs));
        }

        let pairs: Vec<(&Value, &Value)> = match &*ctx.value {
            Value::Map(pairs) => pairs.iter().map(|(k, v)| (k, v)).collect(),
            Value::Object(entries) => {
                return self.serialize_object(ctx, entries, key_type, value_type);
            }
            _ => return Err(ctx.mismatch(self, ctx.datatype.strip_annotated())),
        };

        let mut out = IndexMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key_ctx = ctx.spawn(key, (**key_type).clone(), Key::None);
            let serialized_key = match key_ctx.convert()? {
                Value::Str(text) => text,
                other => {
                    let message = format!("mapping keys must serialize to str, got {} instead", other.kind_name());
                    let kind = ErrorKind::TypeMismatch {
                        expected: String::from("str"),
                        got: String::from(other.kind_name()),
                    };
                    return Err(key_ctx.error(self, kind, message));
                }
            };
            let converted = ctx.spawn(value, (**value_type).clone(), serialized_key.as_str()).convert()?;
            out.insert(serialized_key, converted);
        }
        Ok(Value::Object(out))
    }
}

impl MappingConverter {
    fn serialize_object(
        &self,
        ctx: &Context<'_>,
        entries: &IndexMap<String, Value>,
        key_type: &TypeDesc,
        value_type: &TypeDesc,
    ) -> ConvertResult {
        let mut out = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            if !matches!(key_type.strip_annotated(), TypeDesc::Any) {
                let key_value = Value::Str(key.clone());
                ctx.spawn(&key_value, key_type.clone(), Key::None).convert()?;
            }
            let converted = ctx.spawn(value, value_type.clone(), key.as_str()).convert()?;
            out.insert(key.clone(), converted);
        }
        Ok(Value::Object(out))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::value::Value;

    #[test]
    fn objects_become_maps() {
        let h = Harness::new();
        let desc = TypeDesc::map(TypeDesc::str(), TypeDesc::int());
        let tree = Value::object([("a", Value::Int(1)), ("b", Value::Int(2))]);
        let runtime = Value::map([
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(2)),
        ]);

        assert_eq!(h.deserialize(tree.clone(), desc.clone()).unwrap(), runtime);
        assert_eq!(h.serialize(runtime, desc.clone()).unwrap(), tree);
        assert_eq!(h.serialize(tree.clone(), desc).unwrap(), tree);
    }

    #[test]
    fn value_errors_name_the_key() {
        let h = Harness::new();
        let desc = TypeDesc::map(TypeDesc::str(), TypeDesc::int());
        let err = h
            .deserialize(Value::object([("port", Value::from("x"))]), desc)
            .unwrap_err();
        assert!(err.to_string().contains(".port: int"));
    }

    #[test]
    fn keys_must_serialize_to_strings() {
        let h = Harness::new();
        let desc = TypeDesc::map(TypeDesc::int(), TypeDesc::int());
        let err = h
            .serialize(Value::map([(Value::Int(1), Value::Int(2))]), desc)
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "str".into(),
                got: "int".into(),
            }
        );
    }
}
