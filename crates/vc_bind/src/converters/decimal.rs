use alloc::format;
use alloc::string::ToString;
use core::str::FromStr;

use rust_decimal::Decimal;

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::settings::{Precision, Strict};
use crate::value::{Opaque, Value};

const DECIMAL: &str = "rust_decimal::Decimal";

/// Converts [`Decimal`] values from and to strings.
///
/// Applies to `rust_decimal::Decimal` and its registered subclasses.
/// Deserialization accepts decimal text, in plain or scientific notation.
/// With [`Strict`] disabled it also accepts ints and floats. Values are
/// rounded according to [`Precision`] in both directions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let Some(name) = ctx.datatype.class_name() else {
            return Err(ConvertError::NotApplicable);
        };
        if !ctx.registry.is_subclass(name.as_str(), DECIMAL) {
            return Err(ConvertError::NotApplicable);
        }

        let round = |value: Decimal| match ctx.get_setting::<Precision>() {
            Some(precision) => value.round_dp(precision.digits),
            None => value,
        };

        if ctx.direction.is_serialize() {
            return match &*ctx.value {
                Value::Opaque(opaque) => match opaque.downcast_ref::<Decimal>() {
                    Some(value) => Ok(Value::Str(round(*value).to_string())),
                    None => Err(ctx.mismatch(self, "Decimal")),
                },
                _ => Err(ctx.mismatch(self, "Decimal")),
            };
        }

        let strict = ctx.get_setting::<Strict>().map_or(ctx.config().strict, |s| s.enabled);
        let parsed = match &*ctx.value {
            Value::Str(text) => parse(text.trim()).ok_or_else(|| {
                ctx.error(self, ErrorKind::Invalid, format!("`{text}` is not a valid decimal"))
            })?,
            Value::Int(i) if !strict => Decimal::from(*i),
            Value::Float(f) if !strict => Decimal::try_from(*f).map_err(|e| {
                ctx.error(self, ErrorKind::Invalid, format!("{f} cannot be represented as a decimal: {e}"))
            })?,
            _ => return Err(ctx.mismatch(self, "str")),
        };
        Ok(Value::Opaque(Opaque::new(DECIMAL, round(parsed))))
    }
}

fn parse(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// -----------------------------------------------------------------------------
// Tests
