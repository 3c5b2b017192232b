use crate::context::{Context, Key};
use crate::converter::{ConvertError, ConvertResult, Converter};
use crate::info::TypeDesc;

/// Converts values declared as [`TypeDesc::Any`].
///
/// Tree values pass through unchanged in both directions. When serializing,
/// any other value is converted as its runtime type, so a record nested in an
/// `Any` field is still serialized through its schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyConverter;

impl Converter for AnyConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        if *ctx.datatype.strip_annotated() != TypeDesc::Any {
            return Err(ConvertError::NotApplicable);
        }
        if ctx.direction.is_deserialize() || ctx.value.is_tree() {
            return Ok(ctx.value.clone().into_owned());
        }
        ctx.spawn(&ctx.value, ctx.value.runtime_type(), Key::None).convert()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::value::{Record, Value};
    use crate::registry::{FieldDef, TypeDef};

    #[test]
    fn tree_values_pass_through() {
        let h = Harness::new();
        let tree = Value::object([("a", Value::List(vec![Value::Int(1), Value::None]))]);
        assert_eq!(h.deserialize(tree.clone(), TypeDesc::Any).unwrap(), tree);
        assert_eq!(h.serialize(tree.clone(), TypeDesc::Any).unwrap(), tree);
    }

    #[test]
    fn records_serialize_by_runtime_type() {
        let h = Harness::with(|r| {
            r.insert(TypeDef::record("app::Tag").with_field(FieldDef::new("name", TypeDesc::str())));
        });
        let value = Value::Record(Record::new("app::Tag").with("name", "x"));
        assert_eq!(
            h.serialize(value, TypeDesc::Any).unwrap(),
            Value::object([("name", Value::from("x"))])
        );
    }
}
