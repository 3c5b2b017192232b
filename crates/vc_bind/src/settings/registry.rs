use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::Context;
use crate::info::TypeName;
use crate::settings::{Setting, SettingRef};
use crate::utils::HashMap;

/// Contributes settings for a context.
pub type SettingsProvider = Arc<dyn Fn(&Context<'_>) -> Vec<SettingRef> + Send + Sync>;

// -----------------------------------------------------------------------------
// Settings

/// A registry of settings, consulted for every node of a conversion.
///
/// [`get_setting`](Self::get_setting) scans, in order:
///
/// 1. the metadata of an `Annotated` descriptor at the current node,
/// 2. settings declared on the current type's definition, then local settings for it,
/// 3. providers and conditional settings,
/// 4. global settings,
/// 5. the parent registry,
///
/// and returns the highest priority match. Among equal priorities the first
/// match found wins.
///
/// A registry is assembled before it is used and never changes afterwards,
/// [`with_overrides`](Self::with_overrides) layers a new registry on top.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_bind::settings::{Priority, Settings, Strict};
///
/// let mut settings = Settings::new();
/// settings.add_global(Strict::new(true));
///
/// let settings = Arc::new(settings);
/// let lenient = settings.with_overrides([Strict::new(false).with_priority(Priority::High).into()]);
/// assert!(lenient.parent().is_some());
/// ```
#[derive(Default, Clone)]
pub struct Settings {
    parent: Option<Arc<Settings>>,
    global: Vec<SettingRef>,
    local: HashMap<TypeName, Vec<SettingRef>>,
    providers: Vec<SettingsProvider>,
}

impl Settings {
    /// Create an empty registry without parent.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry layered over `parent`.
    pub fn with_parent(parent: Arc<Settings>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<&Arc<Settings>> {
        self.parent.as_ref()
    }

    /// Add a setting visible to every node.
    pub fn add_global(&mut self, setting: impl Into<SettingRef>) -> &mut Self {
        self.global.push(setting.into());
        self
    }

    /// Add a setting visible to nodes of the given type.
    pub fn add_local(&mut self, ty: impl Into<TypeName>, setting: impl Into<SettingRef>) -> &mut Self {
        self.local.entry(ty.into()).or_default().push(setting.into());
        self
    }

    /// Add a setting visible to nodes for which `predicate` holds.
    pub fn add_conditional<F>(&mut self, predicate: F, setting: impl Into<SettingRef>) -> &mut Self
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        let setting = setting.into();
        self.add_provider(move |ctx| {
            if predicate(ctx) {
                alloc::vec![setting.clone()]
            } else {
                Vec::new()
            }
        })
    }

    /// Add a function contributing settings per node.
    pub fn add_provider<F>(&mut self, provider: F) -> &mut Self
    where
        F: Fn(&Context<'_>) -> Vec<SettingRef> + Send + Sync + 'static,
    {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Returns a new registry with `self` as parent and `settings` as its globals.
    ///
    /// `self` is left untouched.
    pub fn with_overrides(self: &Arc<Self>, settings: impl IntoIterator<Item = SettingRef>) -> Settings {
        Settings {
            parent: Some(Arc::clone(self)),
            global: settings.into_iter().collect(),
            ..Settings::default()
        }
    }

    /// Returns the highest priority setting of type `S` visible to `ctx`.
    pub fn get_setting<S: Setting + Clone>(&self, ctx: &Context<'_>) -> Option<S> {
        let mut best: Option<S> = None;
        self.scan(ctx, &mut |setting| {
            if let Some(found) = setting.downcast_ref::<S>()
                && best.as_ref().is_none_or(|b| found.priority() > b.priority())
            {
                best = Some(found.clone());
            }
        });
        best
    }

    fn scan(&self, ctx: &Context<'_>, visit: &mut dyn FnMut(&SettingRef)) {
        let (inner, metadata) = ctx.datatype.unwrap_annotated();
        metadata.iter().for_each(&mut *visit);

        if let Some(name) = inner.class_name() {
            if let Some(def) = ctx.registry.get(name.as_str()) {
                def.settings().iter().for_each(&mut *visit);
            }
            if let Some(local) = self.local.get(name) {
                local.iter().for_each(&mut *visit);
            }
        }

        for provider in &self.providers {
            provider(ctx).iter().for_each(&mut *visit);
        }

        self.global.iter().for_each(&mut *visit);

        if let Some(parent) = &self.parent {
            parent.scan(ctx, visit);
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("parent", &self.parent)
            .field("global", &self.global)
            .field("local", &self.local)
            .field("providers", &self.providers.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use super::*;
    use crate::context::Direction;
    use crate::converter::Module;
    use crate::info::TypeDesc;
    use crate::mapper::MapperConfig;
    use crate::registry::{TypeDef, TypeRegistry};
    use crate::settings::{Precision, Priority};
    use crate::value::Value;

    fn digits(settings: &Settings, registry: &TypeRegistry, datatype: TypeDesc) -> Option<u32> {
        let module = Module::new("test");
        let config = MapperConfig::default();
        let ctx = Context::new(
            Direction::Deserialize,
            Cow::Owned(Value::None),
            datatype,
            settings,
            registry,
            &module,
            &config,
        );
        settings.get_setting::<Precision>(&ctx).map(|p| p.digits)
    }

    fn item_registry(with_setting: bool) -> TypeRegistry {
        let mut registry = TypeRegistry::empty();
        let def = TypeDef::record("app::Item");
        registry.insert(if with_setting { def.with_setting(Precision::new(2)) } else { def });
        registry
    }

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        let registry = TypeRegistry::empty();

        let mut settings = Settings::new();
        settings
            .add_global(Precision::new(1))
            .add_global(Precision::new(2).with_priority(Priority::High));
        assert_eq!(digits(&settings, &registry, TypeDesc::float()), Some(2));

        let mut settings = Settings::new();
        settings
            .add_global(Precision::new(2).with_priority(Priority::High))
            .add_global(Precision::new(1));
        assert_eq!(digits(&settings, &registry, TypeDesc::float()), Some(2));

        // A low priority annotation loses against the globals.
        let desc = TypeDesc::annotated(TypeDesc::float(), [Precision::new(3).with_priority(Priority::Low).into()]);
        assert_eq!(digits(&settings, &registry, desc), Some(2));
    }

    #[test]
    fn sources_shadow_in_lookup_order() {
        let mut parent = Settings::new();
        parent.add_global(Precision::new(6));
        let parent = Arc::new(parent);

        let mut settings = Settings::with_parent(Arc::clone(&parent));
        settings
            .add_global(Precision::new(5))
            .add_provider(|_| alloc::vec![Precision::new(4).into()])
            .add_local("app::Item", Precision::new(3));

        let item = TypeDesc::class("app::Item");
        let annotated = TypeDesc::annotated(item.clone(), [Precision::new(1).into()]);

        assert_eq!(digits(&settings, &item_registry(true), annotated), Some(1));
        assert_eq!(digits(&settings, &item_registry(true), item.clone()), Some(2));
        assert_eq!(digits(&settings, &item_registry(false), item), Some(3));
        assert_eq!(digits(&settings, &item_registry(false), TypeDesc::float()), Some(4));

        let mut settings = Settings::with_parent(Arc::clone(&parent));
        settings.add_global(Precision::new(5));
        assert_eq!(digits(&settings, &item_registry(false), TypeDesc::float()), Some(5));

        let settings = Settings::with_parent(parent);
        assert_eq!(digits(&settings, &item_registry(false), TypeDesc::float()), Some(6));
    }

    #[test]
    fn local_settings_only_reach_their_type() {
        let mut settings = Settings::new();
        settings.add_local("app::Item", Precision::new(3));
        let registry = item_registry(false);

        assert_eq!(digits(&settings, &registry, TypeDesc::class("app::Item")), Some(3));
        assert_eq!(digits(&settings, &registry, TypeDesc::class("app::Other")), None);
        assert_eq!(digits(&settings, &registry, TypeDesc::float()), None);
    }

    #[test]
    fn conditional_settings_follow_their_predicate() {
        let mut settings = Settings::new();
        settings.add_conditional(|ctx| ctx.datatype == TypeDesc::float(), Precision::new(1));
        let registry = TypeRegistry::empty();

        assert_eq!(digits(&settings, &registry, TypeDesc::float()), Some(1));
        assert_eq!(digits(&settings, &registry, TypeDesc::int()), None);
    }

    #[test]
    fn overrides_leave_the_base_untouched() {
        let mut base = Settings::new();
        base.add_global(Precision::new(1));
        let base = Arc::new(base);
        let registry = TypeRegistry::empty();

        let layered = base.with_overrides([Precision::new(2).with_priority(Priority::High).into()]);
        assert_eq!(digits(&layered, &registry, TypeDesc::float()), Some(2));
        assert_eq!(digits(&base, &registry, TypeDesc::float()), Some(1));

        // Equal priority: the layer is scanned before its parent.
        let layered = base.with_overrides([Precision::new(3).into()]);
        assert_eq!(digits(&layered, &registry, TypeDesc::float()), Some(3));
    }
}
