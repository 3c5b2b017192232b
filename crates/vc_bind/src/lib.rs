//! A bidirectional data-binding engine.
//!
//! `vc_bind` converts between structured values described by a [`TypeDesc`]
//! (records, unions, collections, enums and primitives) and a generic tree
//! (null / bool / int / float / string / list / ordered object), which maps
//! one-to-one onto JSON.
//!
//! ## Menu
//!
//! - [`info`]: type descriptors ([`TypeDesc`], [`TypeName`]).
//! - [`value`]: the dynamic [`Value`] model shared by both sides of a conversion.
//! - [`registry`]: the [`TypeRegistry`] of record, enum and opaque definitions.
//! - [`schema`]: schema derivation over inheritance and generic parameters.
//! - [`settings`]: priority ranked policies and their lookup chain.
//! - [`context`]: one node of a conversion traversal.
//! - [`converter`]: the converter SPI and converter chains ([`Module`]).
//! - [`converters`]: the builtin converters.
//! - [`mapper`]: the [`ObjectMapper`] facade.
//! - [`bind`]: the [`Bind`] trait bridging Rust types and [`Value`].
//!
//! # Examples
//!
//! ```
//! use vc_bind::{Bind, ObjectMapper, TypeRegistry};
//!
//! #[derive(Bind, Debug, PartialEq)]
//! struct Point {
//!     x: i64,
//!     #[bind(alias("why", "y"))]
//!     y: i64,
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Point>();
//!
//! let mapper = ObjectMapper::standard(registry);
//! let json = mapper.to_string(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(json, r#"{"x":1,"why":2}"#);
//!
//! let point: Point = mapper.from_str(r#"{"x":1,"y":2}"#).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```

// -----------------------------------------------------------------------------
// Extern Self

// Derive output refers to `vc_bind::...`, the alias keeps that path valid
// inside this crate and its unit tests.
extern crate self as vc_bind;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod bind;
pub mod context;
pub mod converter;
pub mod converters;
pub mod info;
pub mod mapper;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod utils;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use bind::{Bind, BindError, describe};
pub use context::{Context, Direction, Key, Location};
pub use converter::{ConversionError, ConvertError, ConvertResult, Converter, ErrorKind, Module};
pub use error::Error;
pub use info::{PrimitiveKind, TypeDesc, TypeName};
pub use mapper::{MapperConfig, ObjectMapper, SettingsArg};
pub use registry::TypeRegistry;
pub use schema::{Field, Schema, SchemaError};
pub use settings::{Priority, Setting, SettingRef, Settings};
pub use value::Value;

pub use vc_bind_derive as derive;
pub use vc_bind_derive::Bind;
