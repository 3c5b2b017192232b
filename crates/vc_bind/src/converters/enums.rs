use alloc::format;

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::value::{EnumValue, Value};

/// Converts enumerations registered with [`TypeDef::enumeration`](crate::registry::TypeDef::enumeration).
///
/// Members serialize to their first alias, or their name. Members of an
/// int-backed enum with a value serialize to that integer. Deserialization
/// matches aliases first, then names, then (for int-backed enums) values.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumConverter;

impl Converter for EnumConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let Some(name) = ctx.datatype.class_name() else {
            return Err(ConvertError::NotApplicable);
        };
        let Some(def) = ctx.registry.get(name.as_str()).and_then(|d| d.as_enum()) else {
            return Err(ConvertError::NotApplicable);
        };

        if ctx.direction.is_serialize() {
            let member = match &*ctx.value {
                Value::Enum(value) if value.ty == *name => def.member(&value.member),
                _ => return Err(ctx.mismatch(self, name.short_name())),
            };
            return match member {
                Some(member) => match (def.int_backed, member.value) {
                    (true, Some(value)) => Ok(Value::Int(value)),
                    _ => Ok(Value::from(member.serialized_name())),
                },
                None => Err(ctx.error(
                    self,
                    ErrorKind::Invalid,
                    format!("{:?} is not a member of {}", ctx.value, name.short_name()),
                )),
            };
        }

        let (member, shown) = match &*ctx.value {
            Value::Str(text) => (def.find(text), format!("'{text}'")),
            Value::Int(value) if def.int_backed => (def.find_value(*value), format!("{value}")),
            _ => {
                let expected = if def.int_backed { "str or int" } else { "str" };
                return Err(ctx.mismatch(self, expected));
            }
        };
        match member {
            Some(member) => Ok(Value::Enum(EnumValue::new(name.clone(), &member.name))),
            None => Err(ctx.error(
                self,
                ErrorKind::Invalid,
                format!("{shown} is not a valid {}", name.short_name()),
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::registry::{EnumMember, TypeDef};
    use crate::value::{EnumValue, Value};

    fn harness() -> Harness {
        Harness::with(|r| {
            r.insert(
                TypeDef::enumeration("app::Color")
                    .with_member(EnumMember::new("Red").with_alias("red"))
                    .with_member(EnumMember::new("Green")),
            );
            r.insert(
                TypeDef::enumeration("app::Level")
                    .with_int_backed()
                    .with_member(EnumMember::new("Low").with_value(1))
                    .with_member(EnumMember::new("High").with_value(9)),
            );
        })
    }

    #[test]
    fn names_and_aliases() {
        let h = harness();
        let color = TypeDesc::class("app::Color");
        let red = Value::Enum(EnumValue::new("app::Color", "Red"));

        assert_eq!(h.serialize(red.clone(), color.clone()).unwrap(), Value::from("red"));
        assert_eq!(h.deserialize(Value::from("red"), color.clone()).unwrap(), red);
        assert_eq!(h.deserialize(Value::from("Red"), color.clone()).unwrap(), red);
        assert_eq!(
            h.serialize(Value::Enum(EnumValue::new("app::Color", "Green")), color.clone())
                .unwrap(),
            Value::from("Green")
        );

        let err = h.deserialize(Value::from("blue"), color).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
        assert_eq!(err.message, "'blue' is not a valid Color");
    }

    #[test]
    fn int_backed_members() {
        let h = harness();
        let level = TypeDesc::class("app::Level");
        let high = Value::Enum(EnumValue::new("app::Level", "High"));

        assert_eq!(h.serialize(high.clone(), level.clone()).unwrap(), Value::Int(9));
        assert_eq!(h.deserialize(Value::Int(9), level.clone()).unwrap(), high);
        assert_eq!(h.deserialize(Value::from("High"), level.clone()).unwrap(), high);
        assert!(h.deserialize(Value::Int(5), level).is_err());
    }
}
