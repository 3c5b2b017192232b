use quote::quote_spanned;

use crate::derive_data::BindMeta;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &BindMeta) -> proc_macro2::TokenStream {
    if let Some(span) = meta.attrs.auto_register {
        let vc_bind_path = meta.vc_bind_path();
        let auto_register_ = crate::path::auto_register_(vc_bind_path);
        let bind_ = crate::path::bind_(vc_bind_path);
        let ident = meta.ident;

        quote_spanned! { span =>
            #auto_register_::inventory::submit!{
                #auto_register_::__AutoRegisterFunc(
                    <#ident as #bind_::Bind>::register
                )
            }
        }
    } else {
        crate::utils::empty()
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &BindMeta) -> proc_macro2::TokenStream {
    crate::utils::empty()
}
