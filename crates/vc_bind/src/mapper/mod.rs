//! The [`ObjectMapper`]: a converter chain, a settings registry and a type
//! registry bundled behind `serialize` / `deserialize`.

// -----------------------------------------------------------------------------
// Modules

mod config;
mod object_mapper;

// -----------------------------------------------------------------------------
// Exports

pub use config::MapperConfig;
pub use object_mapper::{ObjectMapper, SettingsArg};
