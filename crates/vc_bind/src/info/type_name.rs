use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

// -----------------------------------------------------------------------------
// TypeName

/// The identity of a registered type, its full path such as `"app::models::User"`.
///
/// Cheap to clone; compares and hashes like the underlying string, so maps
/// keyed by `TypeName` can be queried with a `&str`.
///
/// # Examples
///
/// ```
/// use vc_bind::TypeName;
///
/// let name = TypeName::new("app::models::User");
/// assert_eq!(name.short_name(), "User");
/// assert_eq!(name.module(), Some("app::models"));
/// assert_eq!(name, "app::models::User");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Create a type name from a full path.
    #[inline]
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self(path.into())
    }

    /// Returns the full path.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last path segment.
    pub fn short_name(&self) -> &str {
        match self.0.rfind("::") {
            Some(idx) => &self.0[idx + 2..],
            None => &self.0,
        }
    }

    /// Returns the module path, or `None` for a top-level name.
    pub fn module(&self) -> Option<&str> {
        self.0.rfind("::").map(|idx| &self.0[..idx])
    }

    /// Join a (possibly qualified) name onto this type's module.
    ///
    /// Used to resolve forward references in the scope of a declaring type.
    pub fn sibling(&self, name: &str) -> TypeName {
        match self.module() {
            Some(module) => TypeName::new(alloc::format!("{module}::{name}")),
            None => TypeName::new(name),
        }
    }
}

impl Borrow<str> for TypeName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for TypeName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for TypeName {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    #[inline]
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// -----------------------------------------------------------------------------
// PrimitiveKind

/// The leaf kinds understood by the primitive converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// The none marker, also used as the `Optional` member.
    None,
    Bool,
    Int,
    Float,
    Str,
    /// Raw bytes, serialized as base64 text.
    Bytes,
}

impl PrimitiveKind {
    /// Returns the name used in descriptors and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
