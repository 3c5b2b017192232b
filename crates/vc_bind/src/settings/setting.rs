use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// Priority

/// The priority of a setting, higher priorities win during lookup.
///
/// Settings of equal priority are resolved by lookup order, the first one
/// found wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Ultimate = 3,
}

// -----------------------------------------------------------------------------
// Setting

/// A typed, immutable policy affecting how a node is converted.
///
/// Implementations are usually generated with the [`impl_setting`] macro.
///
/// [`impl_setting`]: crate::impl_setting
pub trait Setting: fmt::Debug + Send + Sync + 'static {
    /// Returns the priority of this setting instance.
    fn priority(&self) -> Priority;

    /// Returns `self` as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Implement [`Setting`] for a struct with a `priority: Priority` field,
/// together with `with_priority` and `From<_> for SettingRef`.
///
/// # Examples
///
/// ```
/// use vc_bind::settings::{Priority, SettingRef};
///
/// #[derive(Debug, Clone)]
/// struct Compact {
///     priority: Priority,
/// }
///
/// vc_bind::impl_setting!(Compact);
///
/// let setting = Compact { priority: Priority::Normal }.with_priority(Priority::High);
/// let setting = SettingRef::from(setting);
/// assert_eq!(setting.priority(), Priority::High);
/// assert!(setting.downcast_ref::<Compact>().is_some());
/// ```
#[macro_export]
macro_rules! impl_setting {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $crate::settings::Setting for $ty {
                #[inline]
                fn priority(&self) -> $crate::settings::Priority {
                    self.priority
                }

                #[inline]
                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }
            }

            impl $ty {
                /// Returns a copy with a different priority.
                #[inline]
                pub fn with_priority(mut self, priority: $crate::settings::Priority) -> Self {
                    self.priority = priority;
                    self
                }
            }

            impl ::core::convert::From<$ty> for $crate::settings::SettingRef {
                #[inline]
                fn from(value: $ty) -> Self {
                    $crate::settings::SettingRef::new(value)
                }
            }
        )*
    };
}

// -----------------------------------------------------------------------------
// SettingRef

/// A shared, type erased [`Setting`].
///
/// Compares and hashes by identity: two references are equal only if they
/// point to the same setting instance.
#[derive(Clone)]
pub struct SettingRef(Arc<dyn Setting>);

impl SettingRef {
    #[inline]
    pub fn new<S: Setting>(setting: S) -> Self {
        Self(Arc::new(setting))
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.0.priority()
    }

    /// Returns the setting if it is of type `S`.
    #[inline]
    pub fn downcast_ref<S: Setting>(&self) -> Option<&S> {
        self.0.as_any().downcast_ref::<S>()
    }

    #[inline]
    pub fn is<S: Setting>(&self) -> bool {
        self.0.as_any().is::<S>()
    }

    #[inline]
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for SettingRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for SettingRef {}

impl Hash for SettingRef {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for SettingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
