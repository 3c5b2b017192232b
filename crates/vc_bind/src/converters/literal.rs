use alloc::format;

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::TypeDesc;

/// Converts `Literal[...]`: the value must equal one of the literals.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralConverter;

impl Converter for LiteralConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let TypeDesc::Literal(literals) = ctx.datatype.strip_annotated() else {
            return Err(ConvertError::NotApplicable);
        };
        match literals.iter().find(|l| l.matches(&ctx.value)) {
            Some(literal) => Ok(literal.to_value()),
            None => Err(ctx.error(
                self,
                ErrorKind::Invalid,
                format!("expected one of {}, got {:?} instead", ctx.datatype.strip_annotated(), ctx.value),
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
    use crate::info::{Literal, TypeDesc};
    use crate::value::Value;

    #[test]
    fn only_listed_values_pass() {
        let h = Harness::new();
        let desc = TypeDesc::literal([Literal::from("a"), Literal::from(3)]);

        assert_eq!(h.deserialize(Value::from("a"), desc.clone()).unwrap(), Value::from("a"));
        assert_eq!(h.serialize(Value::Int(3), desc.clone()).unwrap(), Value::Int(3));

        let err = h.deserialize(Value::from("b"), desc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
        assert!(err.message.starts_with("expected one of Literal['a', 3]"));
    }
}
