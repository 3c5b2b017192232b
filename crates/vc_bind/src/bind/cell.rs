//! Static storage of type descriptors.

use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use crate::info::TypeDesc;
use crate::utils::{FixedHashState, TypeIdMap};

/// A map from [`TypeId`] to [`TypeDesc`] behind a [`RwLock`].
///
/// A `static` inside a generic function is shared by every instantiation,
/// so the cell is keyed by the concrete type.
pub(crate) struct DescCell(RwLock<TypeIdMap<TypeDesc>>);

impl DescCell {
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::with_hasher(FixedHashState)))
    }

    /// Returns the descriptor stored for `type_id`, computing it with `f` on first use.
    ///
    /// The lock is not held while `f` runs, `f` may itself describe other types.
    #[inline(never)]
    pub fn get_or_insert(&self, type_id: TypeId, f: impl FnOnce() -> TypeDesc) -> TypeDesc {
        if let Some(desc) = self.0.read().unwrap_or_else(PoisonError::into_inner).get(&type_id) {
            return desc.clone();
        }
        let desc = f();
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_insert(desc)
            .clone()
    }
}
