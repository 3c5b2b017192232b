use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use crate::derive_data::BindMeta;

/// `struct T(U);` is bound exactly as `U`.
pub(crate) fn impl_newtype(meta: &BindMeta, ty: &Type) -> TokenStream {
    let vc_bind_path = meta.vc_bind_path();
    let bind_ = crate::path::bind_(vc_bind_path);
    let info_ = crate::path::info_(vc_bind_path);
    let registry_ = crate::path::registry_(vc_bind_path);
    let value_ = crate::path::value_(vc_bind_path);
    let ident = meta.ident;

    quote! {
        impl #bind_::Bind for #ident {
            fn describe() -> #info_::TypeDesc {
                #bind_::describe::<#ty>()
            }

            fn register(registry: &mut #registry_::TypeRegistry) {
                <#ty as #bind_::Bind>::register(registry);
            }

            fn to_value(&self) -> #value_::Value {
                <#ty as #bind_::Bind>::to_value(&self.0)
            }

            fn from_value(value: #value_::Value) -> ::core::result::Result<Self, #bind_::BindError> {
                <#ty as #bind_::Bind>::from_value(value).map(Self)
            }
        }
    }
}
