// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod enumeration;
mod newtype;
mod record;
mod union;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::BindDerive;

/// Generate the `Bind` implementation of a parsed input.
pub(crate) fn impl_bind(derive: &BindDerive) -> TokenStream {
    let bind_impl = match derive {
        BindDerive::Record(data) => record::impl_record(data),
        BindDerive::Newtype(meta, ty) => newtype::impl_newtype(meta, ty),
        BindDerive::Enumeration(data) => enumeration::impl_enumeration(data),
        BindDerive::Union(data) => union::impl_union(data),
    };
    let auto_register = auto_register::get_auto_register_impl(derive.meta());

    quote! {
        #bind_impl

        #auto_register
    }
}
