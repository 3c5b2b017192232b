use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter};
use crate::settings::ConverterOverride;

/// Converts a node with the converter of its [`ConverterOverride`] setting.
///
/// Without an override this converter is not applicable. With one, the
/// override decides alone: a definite failure ends the chain, only a
/// [`NotApplicable`](ConvertError::NotApplicable) override lets the regular
/// converters run.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverrideSupport;

impl Converter for OverrideSupport {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        match ctx.get_setting::<ConverterOverride>() {
            Some(setting) => setting.converter.convert(ctx),
            None => Err(ConvertError::NotApplicable),
        }
    }

    #[inline]
    fn short_circuits(&self) -> bool {
        true
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converter::{ConvertError, ErrorKind, FnConverter};
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::settings::ConverterOverride;
    use crate::value::Value;

    #[test]
    fn override_runs_first() {
        let h = Harness::new();
        let doubled = FnConverter::new("Doubled", |ctx| match ctx.value.as_int() {
            Some(i) => Ok(Value::Int(i * 2)),
            None => Err(ConvertError::NotApplicable),
        });
        let desc = TypeDesc::annotated(TypeDesc::int(), [ConverterOverride::new(doubled).into()]);

        assert_eq!(h.deserialize(Value::Int(21), desc.clone()).unwrap(), Value::Int(42));
        // A declined override falls back to the regular chain.
        assert!(h.deserialize(Value::from("x"), desc).is_err());
        assert_eq!(h.deserialize(Value::Int(21), TypeDesc::int()).unwrap(), Value::Int(21));
    }

    #[test]
    fn failing_override_is_final() {
        let h = Harness::new();
        let positive = FnConverter::new("Positive", |ctx| match ctx.value.as_int() {
            Some(i) if i < 0 => Err(ctx.error("Positive", ErrorKind::Invalid, "negative")),
            _ => Err(ConvertError::NotApplicable),
        });
        let desc = TypeDesc::annotated(TypeDesc::int(), [ConverterOverride::new(positive).into()]);

        let err = h.deserialize(Value::Int(-5), desc.clone()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
        assert_eq!(err.message, "negative");
        assert!(err.errors.is_empty());

        assert_eq!(h.deserialize(Value::Int(5), desc.clone()).unwrap(), Value::Int(5));
        assert_eq!(h.serialize(Value::Int(-5), desc).unwrap_err().kind, ErrorKind::Invalid);
    }
}
