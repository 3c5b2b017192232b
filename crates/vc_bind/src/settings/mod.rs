//! Priority ranked conversion policies.
//!
//! ## Menu
//!
//! - [`Setting`]: a typed policy, see [`impl_setting`](crate::impl_setting).
//! - [`SettingRef`]: a shared, identity compared setting.
//! - [`Settings`]: the lookup chain consulted for every conversion node.
//! - Builtin settings:
//!     - [`Alias`]: alternate serialized keys of a field.
//!     - [`Required`]: force a field's requiredness.
//!     - [`Flattened`]: inline a record field into its parent.
//!     - [`Remainder`]: collect unclaimed keys into a mapping field.
//!     - [`Strict`]: disable lossy primitive coercions.
//!     - [`SerializeDefaults`]: omit default valued fields.
//!     - [`DeserializeAs`]: substitute the record type to deserialize.
//!     - [`Precision`]: round floats and decimals.
//!     - [`DateFormat`]: format and parse dates and times.
//!     - [`ExtraKeys`]: permit, reject or record unclaimed keys.
//!     - [`UnionSetting`]: declare a polymorphic union.
//!     - [`ConverterOverride`]: convert a node with an explicit converter.
//!
//! Settings reach a node through `Annotated` metadata, the settings declared
//! on a type definition, or a [`Settings`] registry.

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod registry;
mod setting;
mod union;

// -----------------------------------------------------------------------------
// Exports

pub use builtin::{Alias, ConverterOverride, DateFormat, DeserializeAs, ExtraKeys, ExtraKeysRecorder};
pub use builtin::{Flattened, Precision, Remainder, Required, SerializeDefaults, Strict};
pub use registry::{Settings, SettingsProvider};
pub use setting::{Priority, Setting, SettingRef};
pub use union::{ChainMembers, MemberThunk, RegistryMembers, StaticMembers};
pub use union::{UnionMembers, UnionSetting, UnionStyle};
