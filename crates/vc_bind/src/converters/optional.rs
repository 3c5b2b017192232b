use crate::context::{Context, Key};
use crate::converter::{ConvertError, ConvertResult, Converter};
use crate::info::TypeDesc;
use crate::value::Value;

/// Converts `Optional[T]`: `None` stays `None`, anything else is converted as `T`.
///
/// Settings attached to the optional node are kept on the inner node.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalConverter;

impl Converter for OptionalConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        if !ctx.datatype.is_optional() {
            return Err(ConvertError::NotApplicable);
        }
        if ctx.value.is_none() {
            return Ok(Value::None);
        }

        let (_, metadata) = ctx.datatype.unwrap_annotated();
        let inner = match metadata {
            [] => ctx.datatype.without_none(),
            _ => TypeDesc::annotated(ctx.datatype.without_none(), metadata.iter().cloned()),
        };
        ctx.spawn(&ctx.value, inner, Key::None).convert()
    }
}

// -----------------------------------------------------------------------------
// Tests
