#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_bind as bind;

pub use vc_bind::{Bind, Error, ObjectMapper, TypeDesc, TypeRegistry, Value};
