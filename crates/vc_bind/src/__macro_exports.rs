//! Items used by the code generated by `vc_bind_derive`, not public API.

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::registry::{TypeDef, TypeRegistry};

    /// A registration function submitted by `#[bind(auto_register)]`.
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    /// An opaque type registered by a submitted function of this crate.
    ///
    /// Finding it in a registry after [`__register_types`] proves that
    /// `inventory` works on the current platform.
    pub const AVAIL_FLAG: &str = "vc_bind::__macro_exports::auto_register::AvailFlag";

    fn register_avail_flag(registry: &mut TypeRegistry) {
        registry.try_insert(TypeDef::opaque(AVAIL_FLAG));
    }

    inventory::submit! { __AutoRegisterFunc(register_avail_flag) }

    /// Run every submitted registration function.
    pub fn __register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }
}
