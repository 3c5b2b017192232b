use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use indexmap::IndexMap;

use crate::info::TypeName;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Record

/// A runtime instance of a registered record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub ty: TypeName,
    pub fields: IndexMap<String, Value>,
}

impl Record {
    /// Create a record without fields.
    pub fn new(ty: impl Into<TypeName>) -> Self {
        Self {
            ty: ty.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder style field insertion.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(String::from(name), value.into());
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

// -----------------------------------------------------------------------------
// EnumValue

/// A runtime member of a registered enum type, identified by member name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: TypeName,
    pub member: Arc<str>,
}

impl EnumValue {
    pub fn new(ty: impl Into<TypeName>, member: &str) -> Self {
        Self {
            ty: ty.into(),
            member: member.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// Opaque

/// A leaf value of a registered opaque type, such as an identifier or a path.
///
/// Opaque values are never inspected by the engine, converters that know the
/// concrete type access them through [`Opaque::downcast_ref`].
#[derive(Clone)]
pub struct Opaque {
    ty: TypeName,
    value: Arc<dyn Any + Send + Sync>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
    debug: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl Opaque {
    /// Wrap a value under its registered type name.
    pub fn new<T>(ty: impl Into<TypeName>, value: T) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        fn eq_impl<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
            match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }

        fn debug_impl<T: Any + fmt::Debug>(v: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match v.downcast_ref::<T>() {
                Some(v) => fmt::Debug::fmt(v, f),
                None => f.write_str("<opaque>"),
            }
        }

        Self {
            ty: ty.into(),
            value: Arc::new(value),
            eq: eq_impl::<T>,
            debug: debug_impl::<T>,
        }
    }

    /// Returns the registered type name.
    #[inline]
    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && (self.eq)(&*self.value, &*other.value)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.ty.short_name())?;
        (self.debug)(&*self.value, f)?;
        f.write_str(")")
    }
}
