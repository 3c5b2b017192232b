use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::Context;
use crate::converter::Converter;
use crate::info::TypeDesc;
use crate::settings::Priority;

// -----------------------------------------------------------------------------
// Boolean settings

macro_rules! boolean_setting {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name {
                pub enabled: bool,
                pub priority: Priority,
            }

            impl $name {
                #[inline]
                pub const fn new(enabled: bool) -> Self {
                    Self {
                        enabled,
                        priority: Priority::Normal,
                    }
                }
            }

            impl Default for $name {
                /// An enabled setting of normal priority.
                #[inline]
                fn default() -> Self {
                    Self::new(true)
                }
            }

            crate::impl_setting!($name);
        )*
    };
}

boolean_setting! {
    /// Force a field to be required (or not), regardless of whether its type is optional.
    Required;
    /// Inline the fields of a record typed field into the parent's serialized object.
    Flattened;
    /// Disable lossy coercions of primitives and decimals while deserializing.
    Strict;
    /// When disabled, fields equal to their default are omitted on serialization.
    SerializeDefaults;
    /// Mark the mapping field that absorbs every key not claimed by another field.
    Remainder;
}

// -----------------------------------------------------------------------------
// Alias

/// Alternate names for a field's serialized key.
///
/// The first alias is used for serialization, deserialization accepts the
/// first alias present in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub aliases: Vec<Arc<str>>,
    pub priority: Priority,
}

impl Alias {
    pub fn new<S: AsRef<str>>(aliases: impl IntoIterator<Item = S>) -> Self {
        Self {
            aliases: aliases.into_iter().map(|a| Arc::from(a.as_ref())).collect(),
            priority: Priority::Normal,
        }
    }

    /// Returns the alias used for serialization.
    #[inline]
    pub fn primary(&self) -> Option<&str> {
        self.aliases.first().map(|a| &**a)
    }
}

// -----------------------------------------------------------------------------
// DeserializeAs

/// Deserialize a node as a different (usually more concrete) record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeserializeAs {
    pub ty: TypeDesc,
    pub priority: Priority,
}

impl DeserializeAs {
    pub fn new(ty: TypeDesc) -> Self {
        Self {
            ty,
            priority: Priority::Normal,
        }
    }
}

// -----------------------------------------------------------------------------
// Precision

/// Round floats and decimals to a number of decimal places, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub digits: u32,
    pub priority: Priority,
}

impl Precision {
    pub const fn new(digits: u32) -> Self {
        Self {
            digits,
            priority: Priority::Normal,
        }
    }

    /// Round `value` to this precision.
    pub fn apply(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.digits.min(i32::MAX as u32) as i32);
        let rounded = (value * factor).round() / factor;
        if rounded.is_finite() { rounded } else { value }
    }
}

// -----------------------------------------------------------------------------
// DateFormat

/// The formats of date and time values, as `chrono` format strings.
///
/// Serialization uses the first format, deserialization tries every format in
/// order. [`DateFormat::ISO_8601`] stands for the ISO 8601 form of the value's
/// type, which is also used without a `DateFormat` and when the list is empty.
///
/// # Examples
///
/// ```
/// use vc_bind::settings::DateFormat;
///
/// let format = DateFormat::new(["%d.%m.%Y", DateFormat::ISO_8601]);
/// assert_eq!(format.primary(), "%d.%m.%Y");
/// assert_eq!(DateFormat::default().primary(), DateFormat::ISO_8601);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pub formats: Vec<Arc<str>>,
    pub priority: Priority,
}

impl DateFormat {
    /// The name of the builtin ISO 8601 format.
    pub const ISO_8601: &'static str = ".ISO_8601";

    pub fn new<S: AsRef<str>>(formats: impl IntoIterator<Item = S>) -> Self {
        Self {
            formats: formats.into_iter().map(|f| Arc::from(f.as_ref())).collect(),
            priority: Priority::Normal,
        }
    }

    /// Returns the format used for serialization.
    #[inline]
    pub fn primary(&self) -> &str {
        self.formats.first().map_or(Self::ISO_8601, |f| &**f)
    }

    /// Returns the formats tried during deserialization.
    pub fn parse_order(&self) -> impl Iterator<Item = &str> {
        let fallback = self.formats.is_empty().then_some(Self::ISO_8601);
        self.formats.iter().map(|f| &**f).chain(fallback)
    }
}

impl Default for DateFormat {
    /// ISO 8601 of normal priority.
    #[inline]
    fn default() -> Self {
        Self::new([Self::ISO_8601])
    }
}

// -----------------------------------------------------------------------------
// ExtraKeys

/// Receives the unclaimed keys of an object that allows extra keys.
pub type ExtraKeysRecorder = Arc<dyn Fn(&Context<'_>, &[String]) + Send + Sync>;

/// Decide what happens to input keys that no field claims.
///
/// Without this setting extra keys are rejected.
#[derive(Clone)]
pub struct ExtraKeys {
    pub allow: bool,
    pub recorder: Option<ExtraKeysRecorder>,
    pub priority: Priority,
}

impl ExtraKeys {
    pub fn new(allow: bool) -> Self {
        Self {
            allow,
            recorder: None,
            priority: Priority::Normal,
        }
    }

    /// Allow extra keys and report them to `recorder`.
    pub fn record(recorder: impl Fn(&Context<'_>, &[String]) + Send + Sync + 'static) -> Self {
        Self {
            allow: true,
            recorder: Some(Arc::new(recorder)),
            priority: Priority::Normal,
        }
    }
}

impl Default for ExtraKeys {
    /// Allow extra keys.
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for ExtraKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraKeys")
            .field("allow", &self.allow)
            .field("recorder", &self.recorder.is_some())
            .field("priority", &self.priority)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ConverterOverride

/// Convert a node with an explicit converter before the rest of the chain is consulted.
#[derive(Debug, Clone)]
pub struct ConverterOverride {
    pub converter: Arc<dyn Converter>,
    pub priority: Priority,
}

impl ConverterOverride {
    pub fn new(converter: impl Converter + 'static) -> Self {
        Self {
            converter: Arc::new(converter),
            priority: Priority::Normal,
        }
    }
}

crate::impl_setting!(Alias, DeserializeAs, Precision, DateFormat, ExtraKeys, ConverterOverride);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingRef;

    #[test]
    fn boolean_defaults_to_enabled() {
        assert!(Required::default().enabled);
        assert!(!Strict::new(false).enabled);
        assert_eq!(Remainder::default().priority, Priority::Normal);
    }

    #[test]
    fn alias_primary() {
        let alias = Alias::new(["id", "identifier"]);
        assert_eq!(alias.primary(), Some("id"));
    }

    #[test]
    fn precision_rounds() {
        let precision = Precision::new(2);
        assert_eq!(precision.apply(1.23456), 1.23);
        assert_eq!(precision.apply(0.999), 1.0);
    }

    #[test]
    fn priority_roundtrips_through_ref() {
        let setting = SettingRef::from(Strict::new(false).with_priority(Priority::Ultimate));
        assert_eq!(setting.priority(), Priority::Ultimate);
        assert!(setting.is::<Strict>());
        assert!(!setting.is::<Required>());
    }
}
