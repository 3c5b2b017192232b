//! The conversion context: one node of a conversion traversal.
//!
//! A root [`Context`] is created per conversion call. Converters create
//! children with [`Context::spawn`] for fields, items and union members, which
//! links them to their parent for settings lookup and error traces.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod trace;

// -----------------------------------------------------------------------------
// Exports

pub use context::Context;
pub use trace::{ContextTrace, TraceFrame};

// -----------------------------------------------------------------------------
// Direction / Key / Location

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

/// The direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Runtime value to tree.
    Serialize,
    /// Tree to runtime value.
    Deserialize,
}

impl Direction {
    #[inline]
    pub const fn is_serialize(self) -> bool {
        matches!(self, Self::Serialize)
    }

    #[inline]
    pub const fn is_deserialize(self) -> bool {
        matches!(self, Self::Deserialize)
    }

    /// Returns `"serialize"` or `"deserialize"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
        }
    }
}

/// The position of a context in its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// The root of a conversion.
    Root,
    /// The same value as the parent, converted as another type.
    None,
    /// An item of a list or tuple.
    Index(usize),
    /// A key of an object or a field of a record.
    Name(String),
}

impl From<&str> for Key {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Name(String::from(value))
    }
}

impl From<String> for Key {
    #[inline]
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<usize> for Key {
    #[inline]
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("$"),
            Self::None => f.write_str("^"),
            Self::Index(idx) => write!(f, "[{idx}]"),
            Self::Name(name) => write!(f, ".{name}"),
        }
    }
}

/// Where the value of a context came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub filename: Option<Arc<str>>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Location {
    /// A location naming only the source file.
    pub fn file(filename: &str) -> Self {
        Self {
            filename: Some(filename.into()),
            line: None,
            column: None,
        }
    }

    /// Returns a copy with a line and column.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}
