//! Provide some tools for parsing token stream.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod bind_derive;
mod bind_meta;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{DefaultAttr, FieldAttributes, TypeAttributes};
pub(crate) use bind_derive::{BindDerive, BindEnum, BindField, BindStruct};
pub(crate) use bind_meta::BindMeta;
