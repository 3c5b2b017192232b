use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::{self, Write};

use chrono::format::{DelayedFormat, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, ParseResult};

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::settings::DateFormat;
use crate::value::{Opaque, Value};

// -----------------------------------------------------------------------------
// Temporal

/// A `chrono` type handled by [`DatetimeConverter`].
trait Temporal: Any + Send + Sync + PartialEq + fmt::Debug + Sized {
    const NAME: &'static str;

    fn parse_iso(text: &str) -> ParseResult<Self>;

    fn parse_with(text: &str, format: &str) -> ParseResult<Self>;

    fn format_iso(&self) -> String;

    fn format_with<'a>(&self, format: &'a str) -> DelayedFormat<StrftimeItems<'a>>;
}

impl Temporal for NaiveDate {
    const NAME: &'static str = "chrono::NaiveDate";

    fn parse_iso(text: &str) -> ParseResult<Self> {
        text.parse()
    }

    fn parse_with(text: &str, format: &str) -> ParseResult<Self> {
        NaiveDate::parse_from_str(text, format)
    }

    fn format_iso(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }

    fn format_with<'a>(&self, format: &'a str) -> DelayedFormat<StrftimeItems<'a>> {
        self.format(format)
    }
}

impl Temporal for NaiveTime {
    const NAME: &'static str = "chrono::NaiveTime";

    fn parse_iso(text: &str) -> ParseResult<Self> {
        text.parse()
    }

    fn parse_with(text: &str, format: &str) -> ParseResult<Self> {
        NaiveTime::parse_from_str(text, format)
    }

    fn format_iso(&self) -> String {
        self.format("%H:%M:%S%.f").to_string()
    }

    fn format_with<'a>(&self, format: &'a str) -> DelayedFormat<StrftimeItems<'a>> {
        self.format(format)
    }
}

impl Temporal for NaiveDateTime {
    const NAME: &'static str = "chrono::NaiveDateTime";

    fn parse_iso(text: &str) -> ParseResult<Self> {
        text.parse()
    }

    fn parse_with(text: &str, format: &str) -> ParseResult<Self> {
        NaiveDateTime::parse_from_str(text, format)
    }

    fn format_iso(&self) -> String {
        self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }

    fn format_with<'a>(&self, format: &'a str) -> DelayedFormat<StrftimeItems<'a>> {
        self.format(format)
    }
}

impl Temporal for DateTime<FixedOffset> {
    const NAME: &'static str = "chrono::DateTime";

    fn parse_iso(text: &str) -> ParseResult<Self> {
        DateTime::parse_from_rfc3339(text)
    }

    fn parse_with(text: &str, format: &str) -> ParseResult<Self> {
        DateTime::parse_from_str(text, format)
    }

    fn format_iso(&self) -> String {
        self.to_rfc3339()
    }

    fn format_with<'a>(&self, format: &'a str) -> DelayedFormat<StrftimeItems<'a>> {
        self.format(format)
    }
}

// -----------------------------------------------------------------------------
// DatetimeConverter

/// Converts `chrono` dates and times from and to strings.
///
/// Applies to `chrono::NaiveDate`, `chrono::NaiveTime`,
/// `chrono::NaiveDateTime` and `chrono::DateTime`, the latter holding a
/// `DateTime<FixedOffset>`. The formats come from the [`DateFormat`] setting,
/// ISO 8601 (RFC 3339 for offset date times) without one.
///
/// ```text
/// NaiveDate:     "2024-02-29"
/// NaiveTime:     "13:45:00"
/// NaiveDateTime: "2024-02-29T13:45:00"
/// DateTime:      "2024-02-29T13:45:00+01:00"
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DatetimeConverter;

impl Converter for DatetimeConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let Some(name) = ctx.datatype.class_name() else {
            return Err(ConvertError::NotApplicable);
        };
        let name = name.as_str();
        if name == NaiveDate::NAME {
            self.convert_as::<NaiveDate>(ctx)
        } else if name == NaiveTime::NAME {
            self.convert_as::<NaiveTime>(ctx)
        } else if name == NaiveDateTime::NAME {
            self.convert_as::<NaiveDateTime>(ctx)
        } else if name == <DateTime<FixedOffset>>::NAME {
            self.convert_as::<DateTime<FixedOffset>>(ctx)
        } else {
            Err(ConvertError::NotApplicable)
        }
    }
}

impl DatetimeConverter {
    fn convert_as<T: Temporal>(&self, ctx: &Context<'_>) -> ConvertResult {
        let format = ctx.get_setting::<DateFormat>().unwrap_or_default();
        let opaque = match &*ctx.value {
            Value::Opaque(opaque) => opaque.downcast_ref::<T>(),
            _ => None,
        };

        if ctx.direction.is_serialize() {
            let Some(value) = opaque else {
                return Err(ctx.mismatch(self, short_name(T::NAME)));
            };
            return self.format(ctx, value, format.primary()).map(Value::Str);
        }

        if opaque.is_some() {
            return Ok(ctx.value.clone().into_owned());
        }
        let Some(text) = ctx.value.as_str() else {
            return Err(ctx.mismatch(self, "str"));
        };

        let mut tried: Vec<&str> = Vec::new();
        for candidate in format.parse_order() {
            let parsed = if candidate == DateFormat::ISO_8601 {
                T::parse_iso(text)
            } else {
                T::parse_with(text, candidate)
            };
            match parsed {
                Ok(value) => return Ok(Value::Opaque(Opaque::new(T::NAME, value))),
                Err(err) => log::trace!("{self:?}: `{text}` does not match `{candidate}`: {err}"),
            }
            tried.push(candidate);
        }

        Err(ctx.error(
            self,
            ErrorKind::Invalid,
            format!(
                "`{text}` is not a valid {}, tried {}",
                short_name(T::NAME),
                tried.join(", ")
            ),
        ))
    }

    fn format<T: Temporal>(&self, ctx: &Context<'_>, value: &T, format: &str) -> Result<String, ConvertError> {
        if format == DateFormat::ISO_8601 {
            return Ok(value.format_iso());
        }
        let mut out = String::new();
        write!(out, "{}", value.format_with(format)).map_err(|_| {
            ctx.error(
                self,
                ErrorKind::Invalid,
                format!("`{format}` cannot format a {}", short_name(T::NAME)),
            )
        })?;
        Ok(out)
    }
}

fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

// -----------------------------------------------------------------------------
// Tests
