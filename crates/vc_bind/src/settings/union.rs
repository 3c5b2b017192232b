use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::OnceLock;

use crate::info::TypeDesc;
use crate::registry::TypeRegistry;
use crate::schema::SchemaError;
use crate::settings::Priority;

// -----------------------------------------------------------------------------
// UnionMembers

/// Maps string type ids to union member descriptors, in both directions.
pub trait UnionMembers: fmt::Debug + Send + Sync {
    /// Returns the id of the member matching the runtime type `ty`.
    ///
    /// The first matching member wins if several match.
    fn get_type_id(&self, ty: &TypeDesc, registry: &TypeRegistry) -> Option<String>;

    /// Returns the member descriptor registered under `id`.
    fn get_type_by_id(&self, id: &str, registry: &TypeRegistry) -> Option<TypeDesc>;

    /// Returns all member ids in order, or `None` if the members cannot be enumerated.
    fn get_type_ids(&self, registry: &TypeRegistry) -> Option<Vec<String>>;
}

// -----------------------------------------------------------------------------
// StaticMembers

/// A deferred member descriptor, evaluated at most once.
pub type MemberThunk = fn() -> TypeDesc;

enum MemberSlot {
    Ready(TypeDesc),
    Lazy(MemberThunk, OnceLock<TypeDesc>),
}

impl MemberSlot {
    fn get(&self) -> &TypeDesc {
        match self {
            Self::Ready(desc) => desc,
            Self::Lazy(thunk, cell) => cell.get_or_init(*thunk),
        }
    }
}

/// An explicit, ordered table of union members.
///
/// # Examples
///
/// ```
/// use vc_bind::TypeDesc;
/// use vc_bind::registry::TypeRegistry;
/// use vc_bind::settings::{StaticMembers, UnionMembers};
///
/// let members = StaticMembers::new()
///     .with("int", TypeDesc::int())
///     .with("str", TypeDesc::str());
///
/// let registry = TypeRegistry::empty();
/// assert_eq!(members.get_type_id(&TypeDesc::str(), &registry).as_deref(), Some("str"));
/// assert_eq!(members.get_type_by_id("int", &registry), Some(TypeDesc::int()));
/// ```
#[derive(Default)]
pub struct StaticMembers {
    entries: Vec<(String, MemberSlot)>,
}

impl StaticMembers {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member.
    ///
    /// A duplicate id is ignored with a warning, the first entry wins.
    pub fn with(mut self, id: impl Into<String>, ty: TypeDesc) -> Self {
        self.push(id.into(), MemberSlot::Ready(ty));
        self
    }

    /// Add a member whose descriptor is only built on first use.
    ///
    /// Useful for members that refer back to the union itself.
    pub fn with_lazy(mut self, id: impl Into<String>, thunk: MemberThunk) -> Self {
        self.push(id.into(), MemberSlot::Lazy(thunk, OnceLock::new()));
        self
    }

    fn push(&mut self, id: String, slot: MemberSlot) {
        if self.entries.iter().any(|(existing, _)| *existing == id) {
            log::warn!("duplicate union member id `{id}` ignored");
            return;
        }
        self.entries.push((id, slot));
    }
}

impl fmt::Debug for StaticMembers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}

impl UnionMembers for StaticMembers {
    fn get_type_id(&self, ty: &TypeDesc, _: &TypeRegistry) -> Option<String> {
        self.entries
            .iter()
            .find(|(_, slot)| slot.get().same_origin(ty))
            .map(|(id, _)| id.clone())
    }

    fn get_type_by_id(&self, id: &str, _: &TypeRegistry) -> Option<TypeDesc> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, slot)| slot.get().clone())
    }

    fn get_type_ids(&self, _: &TypeRegistry) -> Option<Vec<String>> {
        Some(self.entries.iter().map(|(id, _)| id.clone()).collect())
    }
}

// -----------------------------------------------------------------------------
// RegistryMembers

/// Members looked up by full type name in the [`TypeRegistry`].
///
/// Any registered type whose name starts with `prefix` is a member, the type
/// id is the full name. The member set is open, so ids cannot be enumerated.
#[derive(Debug, Clone, Default)]
pub struct RegistryMembers {
    prefix: String,
}

impl RegistryMembers {
    /// Accept every registered type.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept registered types whose full name starts with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl UnionMembers for RegistryMembers {
    fn get_type_id(&self, ty: &TypeDesc, registry: &TypeRegistry) -> Option<String> {
        let name = ty.class_name()?;
        (name.as_str().starts_with(&self.prefix) && registry.contains(name.as_str()))
            .then(|| name.to_string())
    }

    fn get_type_by_id(&self, id: &str, registry: &TypeRegistry) -> Option<TypeDesc> {
        if !id.starts_with(&self.prefix) {
            return None;
        }
        registry.get(id).map(|def| TypeDesc::class(def.name().clone()))
    }

    fn get_type_ids(&self, _: &TypeRegistry) -> Option<Vec<String>> {
        None
    }
}

// -----------------------------------------------------------------------------
// ChainMembers

/// Consults several member registries in order, the first match wins.
#[derive(Debug, Default)]
pub struct ChainMembers {
    delegates: Vec<Arc<dyn UnionMembers>>,
}

impl ChainMembers {
    pub fn new(delegates: impl IntoIterator<Item = Arc<dyn UnionMembers>>) -> Self {
        Self {
            delegates: delegates.into_iter().collect(),
        }
    }
}

impl UnionMembers for ChainMembers {
    fn get_type_id(&self, ty: &TypeDesc, registry: &TypeRegistry) -> Option<String> {
        self.delegates.iter().find_map(|d| d.get_type_id(ty, registry))
    }

    fn get_type_by_id(&self, id: &str, registry: &TypeRegistry) -> Option<TypeDesc> {
        self.delegates.iter().find_map(|d| d.get_type_by_id(id, registry))
    }

    /// Concatenates the distinct ids of all delegates that can be enumerated.
    fn get_type_ids(&self, registry: &TypeRegistry) -> Option<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        let mut any = false;
        for delegate in &self.delegates {
            if let Some(found) = delegate.get_type_ids(registry) {
                any = true;
                for id in found {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        any.then_some(ids)
    }
}

// -----------------------------------------------------------------------------
// UnionSetting

/// The encoding of a union in the serialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnionStyle {
    /// `{"type": id, id: payload}`
    #[default]
    Nested,
    /// `{"type": id, ...payload}`
    Flat,
    /// `{id: payload}`
    Keyed,
    /// The payload itself, the first member that converts wins.
    BestMatch,
}

/// Declare a type (or an annotated node) as a union of members.
#[derive(Debug, Clone)]
pub struct UnionSetting {
    pub members: Arc<dyn UnionMembers>,
    pub style: UnionStyle,
    pub discriminator_key: String,
    /// The key holding the payload in the nested style, defaults to the member id.
    pub nesting_key: Option<String>,
    pub priority: Priority,
}

impl UnionSetting {
    pub fn new(members: impl UnionMembers + 'static) -> Self {
        Self {
            members: Arc::new(members),
            style: UnionStyle::Nested,
            discriminator_key: String::from("type"),
            nesting_key: None,
            priority: Priority::Normal,
        }
    }

    /// A best-match union over member descriptors, keyed by their display names.
    ///
    /// Fails with [`SchemaError::NonConcreteMember`] for a member that still has
    /// generic parameters, and with [`SchemaError::OverlappingMembers`] for two
    /// members of the same origin, such as `list[int]` and `list[str]`. The
    /// runtime type of a value cannot tell such members apart.
    pub fn best_match(members: impl IntoIterator<Item = TypeDesc>) -> Result<Self, SchemaError> {
        let mut table = StaticMembers::new();
        let mut seen: Vec<TypeDesc> = Vec::new();
        for member in members {
            if !member.is_concrete() {
                return Err(SchemaError::NonConcreteMember(member.to_string()));
            }
            if let Some(first) = seen.iter().find(|s| s.same_origin(&member)) {
                return Err(SchemaError::OverlappingMembers {
                    first: first.to_string(),
                    second: member.to_string(),
                });
            }
            table = table.with(member.to_string(), member.clone());
            seen.push(member);
        }
        Ok(Self::new(table).with_style(UnionStyle::BestMatch))
    }

    #[inline]
    pub fn with_style(mut self, style: UnionStyle) -> Self {
        self.style = style;
        self
    }

    #[inline]
    pub fn with_discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = key.into();
        self
    }

    #[inline]
    pub fn with_nesting_key(mut self, key: impl Into<String>) -> Self {
        self.nesting_key = Some(key.into());
        self
    }
}

crate::impl_setting!(UnionSetting);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeDef;

    #[test]
    fn static_members_first_entry_wins() {
        let members = StaticMembers::new()
            .with("a", TypeDesc::int())
            .with("a", TypeDesc::str())
            .with("b", TypeDesc::int());
        let registry = TypeRegistry::empty();

        assert_eq!(members.get_type_by_id("a", &registry), Some(TypeDesc::int()));
        assert_eq!(members.get_type_id(&TypeDesc::int(), &registry).as_deref(), Some("a"));
        assert_eq!(members.get_type_ids(&registry), Some(alloc::vec!["a".into(), "b".into()]));
    }

    #[test]
    fn lazy_members_resolve() {
        fn thunk() -> TypeDesc {
            TypeDesc::list(TypeDesc::int())
        }
        let members = StaticMembers::new().with_lazy("ints", thunk);
        let registry = TypeRegistry::empty();

        let runtime = TypeDesc::list(TypeDesc::Any);
        assert_eq!(members.get_type_id(&runtime, &registry).as_deref(), Some("ints"));
    }

    #[test]
    fn registry_members_use_full_names() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("plugins::Echo"));
        registry.insert(TypeDef::record("other::Echo"));

        let members = RegistryMembers::with_prefix("plugins::");
        assert_eq!(
            members.get_type_by_id("plugins::Echo", &registry),
            Some(TypeDesc::class("plugins::Echo"))
        );
        assert_eq!(members.get_type_by_id("other::Echo", &registry), None);
        assert_eq!(
            members
                .get_type_id(&TypeDesc::class("plugins::Echo"), &registry)
                .as_deref(),
            Some("plugins::Echo")
        );
        assert_eq!(members.get_type_ids(&registry), None);
    }

    #[test]
    fn chain_members_consult_in_order() {
        let first: Arc<dyn UnionMembers> = Arc::new(StaticMembers::new().with("x", TypeDesc::int()));
        let second: Arc<dyn UnionMembers> = Arc::new(
            StaticMembers::new()
                .with("x", TypeDesc::str())
                .with("y", TypeDesc::float()),
        );
        let chain = ChainMembers::new([first, second]);
        let registry = TypeRegistry::empty();

        assert_eq!(chain.get_type_by_id("x", &registry), Some(TypeDesc::int()));
        assert_eq!(chain.get_type_by_id("y", &registry), Some(TypeDesc::float()));
        assert_eq!(
            chain.get_type_ids(&registry),
            Some(alloc::vec!["x".into(), "y".into()])
        );
    }

    #[test]
    fn best_match_rejects_generic_members() {
        let err = UnionSetting::best_match([TypeDesc::list(TypeDesc::param("T"))]).unwrap_err();
        assert!(matches!(err, SchemaError::NonConcreteMember(_)));

        let ok = UnionSetting::best_match([TypeDesc::int(), TypeDesc::str()]).unwrap();
        assert_eq!(ok.style, UnionStyle::BestMatch);
    }

    #[test]
    fn best_match_rejects_members_of_one_origin() {
        let err = UnionSetting::best_match([TypeDesc::list(TypeDesc::int()), TypeDesc::list(TypeDesc::str())])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::OverlappingMembers {
                first: "list[int]".into(),
                second: "list[str]".into(),
            }
        );

        let err = UnionSetting::best_match([
            TypeDesc::generic("app::Box", [TypeDesc::int()]),
            TypeDesc::int(),
            TypeDesc::generic("app::Box", [TypeDesc::str()]),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::OverlappingMembers { .. }));

        assert!(UnionSetting::best_match([TypeDesc::list(TypeDesc::int()), TypeDesc::int()]).is_ok());
    }
}
