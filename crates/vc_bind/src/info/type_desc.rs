use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::info::{PrimitiveKind, TypeName};
use crate::settings::SettingRef;
use crate::utils::HashMap;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Literal

/// One allowed value of a [`TypeDesc::Literal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl Literal {
    /// Returns `true` if `value` is equal to this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::None, Value::None) => true,
            (Self::Bool(a), Value::Bool(b)) => a == b,
            (Self::Int(a), Value::Int(b)) => a == b,
            (Self::Str(a), Value::Str(b)) => **a == **b,
            _ => false,
        }
    }

    /// Returns the literal as a [`Value`].
    pub fn to_value(&self) -> Value {
        match self {
            Self::None => Value::None,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Int(*i),
            Self::Str(s) => Value::Str(String::from(&**s)),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "'{s}'"),
        }
    }
}

// -----------------------------------------------------------------------------
// ClassDesc

/// A reference to a registered type, optionally with generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassDesc {
    pub name: TypeName,
    pub args: Vec<TypeDesc>,
}

// -----------------------------------------------------------------------------
// TypeDesc

/// An immutable, structurally comparable description of a target shape.
///
/// Converters pattern-match on the descriptor of the current node to decide
/// whether they apply. Settings attached through [`TypeDesc::Annotated`]
/// compare by identity, so two descriptors are equal only if they carry the
/// very same setting instances.
///
/// # Examples
///
/// ```
/// use vc_bind::TypeDesc;
///
/// let desc = TypeDesc::optional(TypeDesc::list(TypeDesc::int()));
/// assert!(desc.is_optional());
/// assert_eq!(desc.to_string(), "Optional[list[int]]");
/// assert_eq!(desc.without_none(), TypeDesc::list(TypeDesc::int()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// Accepts any value unchanged.
    Any,
    Primitive(PrimitiveKind),
    /// A record, enum or opaque type registered in the `TypeRegistry`.
    Class(ClassDesc),
    /// A homogeneous collection.
    List(Box<TypeDesc>),
    /// A mapping, `Map(key, value)`.
    Map(Box<TypeDesc>, Box<TypeDesc>),
    /// A positional sequence, `repeated` marks the variadic `tuple[T, ...]` form.
    Tuple { items: Vec<TypeDesc>, repeated: bool },
    Union(Vec<TypeDesc>),
    Literal(Vec<Literal>),
    Annotated(Box<TypeDesc>, Vec<SettingRef>),
    /// A generic parameter of the declaring record.
    Param(Arc<str>),
    /// A forward reference, resolved in the scope of the declaring record.
    Ref(Arc<str>),
}

impl TypeDesc {
    #[inline]
    pub const fn none() -> Self {
        Self::Primitive(PrimitiveKind::None)
    }

    #[inline]
    pub const fn bool() -> Self {
        Self::Primitive(PrimitiveKind::Bool)
    }

    #[inline]
    pub const fn int() -> Self {
        Self::Primitive(PrimitiveKind::Int)
    }

    #[inline]
    pub const fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    #[inline]
    pub const fn str() -> Self {
        Self::Primitive(PrimitiveKind::Str)
    }

    #[inline]
    pub const fn bytes() -> Self {
        Self::Primitive(PrimitiveKind::Bytes)
    }

    /// A non-generic registered type.
    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::Class(ClassDesc {
            name: name.into(),
            args: Vec::new(),
        })
    }

    /// A registered generic type with arguments.
    pub fn generic(name: impl Into<TypeName>, args: impl IntoIterator<Item = TypeDesc>) -> Self {
        Self::Class(ClassDesc {
            name: name.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn list(item: TypeDesc) -> Self {
        Self::List(Box::new(item))
    }

    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// A fixed-length tuple.
    pub fn tuple(items: impl IntoIterator<Item = TypeDesc>) -> Self {
        Self::Tuple {
            items: items.into_iter().collect(),
            repeated: false,
        }
    }

    /// A variadic tuple, `tuple[item, ...]`.
    pub fn repeated(item: TypeDesc) -> Self {
        Self::Tuple {
            items: alloc::vec![item],
            repeated: true,
        }
    }

    pub fn union(members: impl IntoIterator<Item = TypeDesc>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    /// `Union[inner, None]`, returns `inner` unchanged if it is already optional.
    pub fn optional(inner: TypeDesc) -> Self {
        if inner.is_optional() {
            return inner;
        }
        match inner {
            Self::Union(mut members) => {
                members.push(Self::none());
                Self::Union(members)
            }
            other => Self::Union(alloc::vec![other, Self::none()]),
        }
    }

    pub fn literal(values: impl IntoIterator<Item = Literal>) -> Self {
        Self::Literal(values.into_iter().collect())
    }

    /// Attach settings to a descriptor.
    ///
    /// Nested annotations are merged so that [`unwrap_annotated`](Self::unwrap_annotated)
    /// only ever needs to strip one layer.
    pub fn annotated(inner: TypeDesc, settings: impl IntoIterator<Item = SettingRef>) -> Self {
        match inner {
            Self::Annotated(inner, mut existing) => {
                existing.extend(settings);
                Self::Annotated(inner, existing)
            }
            other => Self::Annotated(Box::new(other), settings.into_iter().collect()),
        }
    }

    pub fn param(name: &str) -> Self {
        Self::Param(name.into())
    }

    pub fn reference(name: &str) -> Self {
        Self::Ref(name.into())
    }

    /// Strip one layer of `Annotated`, returning the inner descriptor and its metadata.
    #[inline]
    pub fn unwrap_annotated(&self) -> (&TypeDesc, &[SettingRef]) {
        match self {
            Self::Annotated(inner, metadata) => (inner, metadata),
            other => (other, &[]),
        }
    }

    /// Returns the descriptor without its `Annotated` layer.
    #[inline]
    pub fn strip_annotated(&self) -> &TypeDesc {
        self.unwrap_annotated().0
    }

    /// Returns the class name if this is a (possibly annotated) class descriptor.
    pub fn class_name(&self) -> Option<&TypeName> {
        match self.strip_annotated() {
            Self::Class(class) => Some(&class.name),
            _ => None,
        }
    }

    /// Returns `true` for a union that contains the none marker.
    pub fn is_optional(&self) -> bool {
        match self.strip_annotated() {
            Self::Union(members) => members.iter().any(|m| *m == Self::none()),
            _ => false,
        }
    }

    /// Remove the none marker from a union.
    ///
    /// A single remaining member is returned on its own; non-union
    /// descriptors are returned unchanged.
    pub fn without_none(&self) -> TypeDesc {
        match self.strip_annotated() {
            Self::Union(members) => {
                let mut rest: Vec<TypeDesc> = members
                    .iter()
                    .filter(|m| **m != Self::none())
                    .cloned()
                    .collect();
                if rest.len() == 1 {
                    rest.remove(0)
                } else {
                    Self::Union(rest)
                }
            }
            other => other.clone(),
        }
    }

    /// Returns `true` if no generic parameter or forward reference remains.
    pub fn is_concrete(&self) -> bool {
        match self {
            Self::Any | Self::Primitive(_) | Self::Literal(_) => true,
            Self::Param(_) | Self::Ref(_) => false,
            Self::Class(class) => class.args.iter().all(Self::is_concrete),
            Self::List(item) => item.is_concrete(),
            Self::Map(k, v) => k.is_concrete() && v.is_concrete(),
            Self::Tuple { items, .. } | Self::Union(items) => items.iter().all(Self::is_concrete),
            Self::Annotated(inner, _) => inner.is_concrete(),
        }
    }

    /// Substitute generic parameters.
    ///
    /// Parameters missing from `map` are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_bind::TypeDesc;
    /// use vc_bind::utils::HashMap;
    ///
    /// let mut map = HashMap::default();
    /// map.insert("T".into(), TypeDesc::int());
    ///
    /// let desc = TypeDesc::list(TypeDesc::param("T"));
    /// assert_eq!(desc.parameterize(&map), TypeDesc::list(TypeDesc::int()));
    /// ```
    pub fn parameterize(&self, map: &HashMap<Arc<str>, TypeDesc>) -> TypeDesc {
        if map.is_empty() {
            return self.clone();
        }
        match self {
            Self::Param(name) => map.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Any | Self::Primitive(_) | Self::Literal(_) | Self::Ref(_) => self.clone(),
            Self::Class(class) => Self::Class(ClassDesc {
                name: class.name.clone(),
                args: class.args.iter().map(|a| a.parameterize(map)).collect(),
            }),
            Self::List(item) => Self::List(Box::new(item.parameterize(map))),
            Self::Map(k, v) => Self::Map(Box::new(k.parameterize(map)), Box::new(v.parameterize(map))),
            Self::Tuple { items, repeated } => Self::Tuple {
                items: items.iter().map(|i| i.parameterize(map)).collect(),
                repeated: *repeated,
            },
            Self::Union(members) => Self::Union(members.iter().map(|m| m.parameterize(map)).collect()),
            Self::Annotated(inner, metadata) => {
                Self::Annotated(Box::new(inner.parameterize(map)), metadata.clone())
            }
        }
    }

    /// Returns `true` if both descriptors have the same origin.
    ///
    /// Classes compare by name only, generic arguments and annotations are
    /// ignored. This is how a runtime type is matched against union members.
    pub fn same_origin(&self, other: &TypeDesc) -> bool {
        match (self.strip_annotated(), other.strip_annotated()) {
            (Self::Class(a), Self::Class(b)) => a.name == b.name,
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::List(_), Self::List(_)) => true,
            (Self::Map(..), Self::Map(..)) => true,
            (Self::Tuple { .. }, Self::Tuple { .. }) => true,
            (a, b) => a == b,
        }
    }
}

// -----------------------------------------------------------------------------
// Display

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDesc]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(item, f)?;
    }
    Ok(())
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Class(class) => {
                f.write_str(class.name.short_name())?;
                if !class.args.is_empty() {
                    f.write_str("[")?;
                    write_joined(f, &class.args)?;
                    f.write_str("]")?;
                }
                Ok(())
            }
            Self::List(item) => write!(f, "list[{item}]"),
            Self::Map(k, v) => write!(f, "dict[{k}, {v}]"),
            Self::Tuple { items, repeated } => {
                f.write_str("tuple[")?;
                write_joined(f, items)?;
                if *repeated {
                    f.write_str(", ...")?;
                }
                f.write_str("]")
            }
            Self::Union(members) => {
                if members.len() == 2 && self.is_optional() {
                    write!(f, "Optional[{}]", self.without_none())
                } else {
                    f.write_str("Union[")?;
                    write_joined(f, members)?;
                    f.write_str("]")
                }
            }
            Self::Literal(values) => {
                f.write_str("Literal[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Annotated(inner, metadata) => {
                write!(f, "Annotated[{inner}")?;
                for setting in metadata {
                    write!(f, ", {setting:?}")?;
                }
                f.write_str("]")
            }
            Self::Param(name) => f.write_str(name),
            Self::Ref(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<PrimitiveKind> for TypeDesc {
    #[inline]
    fn from(value: PrimitiveKind) -> Self {
        Self::Primitive(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Alias, SettingRef};

    #[test]
    fn optional_is_idempotent() {
        let once = TypeDesc::optional(TypeDesc::int());
        let twice = TypeDesc::optional(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.to_string(), "Optional[int]");
    }

    #[test]
    fn without_none_keeps_remaining_union() {
        let desc = TypeDesc::union([TypeDesc::int(), TypeDesc::str(), TypeDesc::none()]);
        assert_eq!(
            desc.without_none(),
            TypeDesc::union([TypeDesc::int(), TypeDesc::str()])
        );
    }

    #[test]
    fn annotated_merges_layers() {
        let a = SettingRef::new(Alias::new(["a"]));
        let b = SettingRef::new(Alias::new(["b"]));
        let desc = TypeDesc::annotated(TypeDesc::annotated(TypeDesc::int(), [a.clone()]), [b.clone()]);

        let (inner, metadata) = desc.unwrap_annotated();
        assert_eq!(*inner, TypeDesc::int());
        assert_eq!(metadata, &[a, b]);
    }

    #[test]
    fn annotated_compares_settings_by_identity() {
        let a = TypeDesc::annotated(TypeDesc::int(), [SettingRef::new(Alias::new(["a"]))]);
        let b = TypeDesc::annotated(TypeDesc::int(), [SettingRef::new(Alias::new(["a"]))]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn parameterize_reaches_nested_positions() {
        let mut map = HashMap::default();
        map.insert(Arc::from("K"), TypeDesc::str());
        map.insert(Arc::from("V"), TypeDesc::float());

        let desc = TypeDesc::generic(
            "app::Pair",
            [TypeDesc::map(TypeDesc::param("K"), TypeDesc::list(TypeDesc::param("V")))],
        );
        assert!(!desc.is_concrete());

        let resolved = desc.parameterize(&map);
        assert!(resolved.is_concrete());
        assert_eq!(resolved.to_string(), "Pair[dict[str, list[float]]]");
    }

    #[test]
    fn same_origin_ignores_generic_args() {
        let a = TypeDesc::generic("app::Box", [TypeDesc::int()]);
        let b = TypeDesc::class("app::Box");
        assert!(a.same_origin(&b));
        assert!(!a.same_origin(&TypeDesc::class("app::Crate")));
        assert!(TypeDesc::list(TypeDesc::int()).same_origin(&TypeDesc::list(TypeDesc::Any)));
    }

    #[test]
    fn literal_display_and_match() {
        let desc = TypeDesc::literal([Literal::from("a"), Literal::from(1)]);
        assert_eq!(desc.to_string(), "Literal['a', 1]");
        assert!(Literal::from("a").matches(&Value::from("a")));
        assert!(!Literal::from(1).matches(&Value::Bool(true)));
    }
}
