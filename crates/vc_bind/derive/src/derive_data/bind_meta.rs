use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use super::TypeAttributes;

/// Type level information shared by every kind of derive.
pub(crate) struct BindMeta<'a> {
    pub attrs: TypeAttributes,
    pub ident: &'a Ident,
    /// The access path of `vc_bind`, see [`crate::path::vc_bind`].
    vc_bind_path: syn::Path,
}

impl<'a> BindMeta<'a> {
    pub fn new(attrs: TypeAttributes, ident: &'a Ident) -> Self {
        Self {
            attrs,
            ident,
            vc_bind_path: crate::path::vc_bind(),
        }
    }

    #[inline]
    pub fn vc_bind_path(&self) -> &syn::Path {
        &self.vc_bind_path
    }

    /// An expression of the registered type name.
    ///
    /// Either the `type_name` attribute, or `module_path!()` joined with the ident.
    pub fn type_name(&self) -> TokenStream {
        match &self.attrs.type_name {
            Some(name) => quote! { #name },
            None => {
                let ident = self.ident.to_string();
                quote! { ::core::concat!(::core::module_path!(), "::", #ident) }
            }
        }
    }
}
