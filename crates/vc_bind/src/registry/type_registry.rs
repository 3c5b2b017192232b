use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use crate::bind::Bind;
use crate::info::{ClassDesc, TypeDesc, TypeName};
use crate::registry::TypeDef;
use crate::schema::{Schema, SchemaError, derive_schema};
use crate::utils::{HashMap, HashSet};

/// The order in which [`TypeRegistry::recurse_bases`] visits ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseOrder {
    Bfs,
    Dfs,
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of record, enum and opaque type definitions.
///
/// This is the central store of type information, consulted while deriving
/// schemas and during conversion. Derived schemas are cached per descriptor.
///
/// # Example
///
/// ```
/// use vc_bind::TypeDesc;
/// use vc_bind::registry::{FieldDef, TypeDef, TypeRegistry};
///
/// let mut registry = TypeRegistry::empty();
/// registry.insert(TypeDef::record("app::Base").with_field(FieldDef::new("id", TypeDesc::int())));
/// registry.insert(
///     TypeDef::record("app::User")
///         .with_base(TypeDesc::class("app::Base"))
///         .with_field(FieldDef::new("name", TypeDesc::str())),
/// );
///
/// assert!(registry.is_subclass("app::User", "app::Base"));
///
/// let schema = registry.schema(&TypeDesc::class("app::User")).unwrap().unwrap();
/// let names: Vec<_> = schema.fields.keys().map(String::as_str).collect();
/// assert_eq!(names, ["id", "name"]);
/// ```
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeDef>,
    schemas: RwLock<HashMap<TypeDesc, Arc<Schema>>>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty [`TypeRegistry`].
    pub fn empty() -> Self {
        Self {
            types: HashMap::default(),
            schemas: RwLock::new(HashMap::default()),
        }
    }

    /// Create a type registry with the builtin opaque types.
    ///
    /// - `uuid::Uuid`
    /// - `std::path::PathBuf`
    /// - `chrono::NaiveDate`, `chrono::NaiveTime`, `chrono::NaiveDateTime`, `chrono::DateTime`
    /// - `rust_decimal::Decimal`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<uuid::Uuid>();
        registry.register::<std::path::PathBuf>();
        registry.register::<chrono::NaiveDate>();
        registry.register::<chrono::NaiveTime>();
        registry.register::<chrono::NaiveDateTime>();
        registry.register::<chrono::DateTime<chrono::FixedOffset>>();
        registry.register::<rust_decimal::Decimal>();
        registry
    }

    /// Insert or **overwrite** a definition, returning the previous one.
    ///
    /// Clears the schema cache.
    pub fn insert(&mut self, def: TypeDef) -> Option<TypeDef> {
        self.schemas
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.types.insert(def.name().clone(), def)
    }

    /// Insert a definition if its name is not registered yet.
    ///
    /// Returns `false` and does nothing if the name already exists.
    pub fn try_insert(&mut self, def: TypeDef) -> bool {
        if self.types.contains_key(def.name()) {
            return false;
        }
        self.insert(def);
        true
    }

    /// Register the type `T` and, recursively, the types it refers to.
    ///
    /// Registering an already registered type does nothing.
    #[inline]
    pub fn register<T: Bind>(&mut self) {
        T::register(self);
    }

    /// Automatically registers all types marked with `#[bind(auto_register)]`.
    ///
    /// Returns `true` if automatic registration is supported on the current
    /// platform. Without the `auto_register` feature this does nothing and
    /// returns `false`.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register;

            // Registration functions only run once per registry.
            if self.contains(auto_register::AVAIL_FLAG) {
                return true;
            }
            auto_register::__register_types(self);
            self.contains(auto_register::AVAIL_FLAG)
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Iterate over all definitions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    // -------------------------------------------------------------------------
    // Resolution

    /// Resolve a forward reference.
    ///
    /// `name` is first looked up next to `scope` (the declaring type), then as a full path.
    pub fn resolve(&self, name: &str, scope: Option<&TypeName>) -> Result<TypeDesc, SchemaError> {
        if let Some(scope) = scope {
            let sibling = scope.sibling(name);
            if self.contains(sibling.as_str()) {
                return Ok(TypeDesc::class(sibling));
            }
        }
        if self.contains(name) {
            return Ok(TypeDesc::class(name));
        }
        Err(SchemaError::UnsupportedType(name.to_string()))
    }

    /// Resolve every forward reference inside `desc`.
    pub fn resolve_refs(&self, desc: &TypeDesc, scope: Option<&TypeName>) -> Result<TypeDesc, SchemaError> {
        let each = |items: &[TypeDesc]| -> Result<Vec<TypeDesc>, SchemaError> {
            items.iter().map(|d| self.resolve_refs(d, scope)).collect()
        };
        Ok(match desc {
            TypeDesc::Ref(name) => self.resolve(name, scope)?,
            TypeDesc::Any | TypeDesc::Primitive(_) | TypeDesc::Literal(_) | TypeDesc::Param(_) => desc.clone(),
            TypeDesc::Class(class) => TypeDesc::Class(ClassDesc {
                name: class.name.clone(),
                args: each(&class.args)?,
            }),
            TypeDesc::List(item) => TypeDesc::list(self.resolve_refs(item, scope)?),
            TypeDesc::Map(k, v) => TypeDesc::map(self.resolve_refs(k, scope)?, self.resolve_refs(v, scope)?),
            TypeDesc::Tuple { items, repeated } => TypeDesc::Tuple {
                items: each(items)?,
                repeated: *repeated,
            },
            TypeDesc::Union(members) => TypeDesc::Union(each(members)?),
            TypeDesc::Annotated(inner, metadata) => {
                TypeDesc::Annotated(Box::new(self.resolve_refs(inner, scope)?), metadata.clone())
            }
        })
    }

    // -------------------------------------------------------------------------
    // Inheritance

    /// Returns the resolved, parameterized direct bases of a class.
    fn direct_bases(&self, class: &ClassDesc) -> Result<Vec<ClassDesc>, SchemaError> {
        let def = self
            .get(class.name.as_str())
            .ok_or_else(|| SchemaError::UnsupportedType(class.name.to_string()))?;
        let map = def.param_map(&class.args);

        def.bases()
            .iter()
            .map(|base| {
                match self.resolve_refs(base, Some(def.name()))?.parameterize(&map) {
                    TypeDesc::Class(base) => Ok(base),
                    other => Err(SchemaError::InvalidBase {
                        ty: def.name().to_string(),
                        base: other.to_string(),
                    }),
                }
            })
            .collect()
    }

    fn walk_dfs(
        &self,
        class: ClassDesc,
        path: &mut Vec<TypeName>,
        visited: &mut HashSet<TypeName>,
        out: &mut Vec<TypeDesc>,
    ) -> Result<(), SchemaError> {
        if path.contains(&class.name) {
            return Err(SchemaError::Cycle(class.name.to_string()));
        }
        if !visited.insert(class.name.clone()) {
            return Ok(());
        }
        let bases = self.direct_bases(&class)?;
        path.push(class.name.clone());
        out.push(TypeDesc::Class(class));
        for base in bases {
            self.walk_dfs(base, path, visited, out)?;
        }
        path.pop();
        Ok(())
    }

    /// Returns `desc` followed by its ancestors, with generic arguments
    /// substituted along the way.
    ///
    /// Each ancestor is listed once. Fails with [`SchemaError::Cycle`] if a
    /// type inherits from itself.
    pub fn recurse_bases(&self, desc: &TypeDesc, order: BaseOrder) -> Result<Vec<TypeDesc>, SchemaError> {
        let TypeDesc::Class(class) = desc.strip_annotated() else {
            return Err(SchemaError::UnsupportedType(desc.to_string()));
        };

        // The depth first walk also validates that the graph is acyclic.
        let mut dfs = Vec::new();
        self.walk_dfs(class.clone(), &mut Vec::new(), &mut HashSet::default(), &mut dfs)?;
        if order == BaseOrder::Dfs {
            return Ok(dfs);
        }

        let mut out = Vec::with_capacity(dfs.len());
        let mut visited: HashSet<TypeName> = HashSet::default();
        let mut queue = VecDeque::from([class.clone()]);
        while let Some(class) = queue.pop_front() {
            if !visited.insert(class.name.clone()) {
                continue;
            }
            queue.extend(self.direct_bases(&class)?);
            out.push(TypeDesc::Class(class));
        }
        Ok(out)
    }

    /// Returns `true` if `sub` is `sup` or inherits from it.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        self.recurse_bases(&TypeDesc::class(sub), BaseOrder::Bfs)
            .map(|bases| bases.iter().any(|b| b.class_name().is_some_and(|n| n == sup)))
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Schemas

    /// Returns the schema of a record descriptor, deriving and caching it on first use.
    ///
    /// Returns `Ok(None)` if `desc` is not a registered record.
    pub fn schema(&self, desc: &TypeDesc) -> Result<Option<Arc<Schema>>, SchemaError> {
        let desc = desc.strip_annotated();
        let Some(name) = desc.class_name() else {
            return Ok(None);
        };
        if self.get(name.as_str()).and_then(TypeDef::as_record).is_none() {
            return Ok(None);
        }

        if let Some(schema) = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(desc)
        {
            return Ok(Some(Arc::clone(schema)));
        }

        let schema = Arc::new(derive_schema(self, desc)?);
        log::debug!("derived schema for `{desc}` with {} field(s)", schema.fields.len());

        let mut cache = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Some(Arc::clone(cache.entry(desc.clone()).or_insert(schema))))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldDef;

    fn chain() -> TypeRegistry {
        let mut registry = TypeRegistry::empty();
        registry.insert(
            TypeDef::record("m::Base")
                .with_param("T")
                .with_field(FieldDef::new("item", TypeDesc::param("T"))),
        );
        registry.insert(
            TypeDef::record("m::Mid")
                .with_param("U")
                .with_base(TypeDesc::generic("m::Base", [TypeDesc::list(TypeDesc::param("U"))])),
        );
        registry.insert(TypeDef::record("m::Leaf").with_base(TypeDesc::generic("m::Mid", [TypeDesc::int()])));
        registry
    }

    #[test]
    fn bases_are_parameterized() {
        let registry = chain();
        let bases = registry
            .recurse_bases(&TypeDesc::class("m::Leaf"), BaseOrder::Bfs)
            .unwrap();
        assert_eq!(
            bases,
            [
                TypeDesc::class("m::Leaf"),
                TypeDesc::generic("m::Mid", [TypeDesc::int()]),
                TypeDesc::generic("m::Base", [TypeDesc::list(TypeDesc::int())]),
            ]
        );
    }

    #[test]
    fn bfs_and_dfs_differ_on_diamonds() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("d::Root"));
        registry.insert(TypeDef::record("d::A").with_base(TypeDesc::class("d::Root")));
        registry.insert(TypeDef::record("d::B"));
        registry.insert(
            TypeDef::record("d::C")
                .with_base(TypeDesc::class("d::A"))
                .with_base(TypeDesc::class("d::B")),
        );

        let names = |order| -> Vec<String> {
            registry
                .recurse_bases(&TypeDesc::class("d::C"), order)
                .unwrap()
                .iter()
                .map(ToString::to_string)
                .collect()
        };
        assert_eq!(names(BaseOrder::Bfs), ["C", "A", "B", "Root"]);
        assert_eq!(names(BaseOrder::Dfs), ["C", "A", "Root", "B"]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("c::A").with_base(TypeDesc::class("c::B")));
        registry.insert(TypeDef::record("c::B").with_base(TypeDesc::class("c::A")));

        let err = registry
            .recurse_bases(&TypeDesc::class("c::A"), BaseOrder::Bfs)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Cycle(_)));
        assert!(!registry.is_subclass("c::A", "c::Unrelated"));
    }

    #[test]
    fn refs_resolve_in_declaring_scope() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("a::Node"));
        registry.insert(TypeDef::record("b::Node"));

        let scope = TypeName::new("b::Tree");
        assert_eq!(
            registry.resolve("Node", Some(&scope)).unwrap(),
            TypeDesc::class("b::Node")
        );
        assert_eq!(
            registry.resolve("a::Node", Some(&scope)).unwrap(),
            TypeDesc::class("a::Node")
        );
        assert!(matches!(
            registry.resolve("Missing", Some(&scope)),
            Err(SchemaError::UnsupportedType(_))
        ));
    }

    #[test]
    fn schema_is_cached_and_invalidated() {
        let mut registry = chain();
        let desc = TypeDesc::class("m::Leaf");
        let first = registry.schema(&desc).unwrap().unwrap();
        let second = registry.schema(&desc).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        registry.insert(TypeDef::record("m::Other"));
        let third = registry.schema(&desc).unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));

        assert!(registry.schema(&TypeDesc::int()).unwrap().is_none());
    }
}
