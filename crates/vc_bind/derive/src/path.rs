//! Paths into `vc_bind` used by the generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path to the `vc_bind` crate.
///
/// 1. For crates that depend on `vc_bind`, `::vc_bind` is returned.
/// 2. For crates that depend on `vc_databind`, `::vc_databind::bind` is returned.
/// 3. For other situations `::vc_bind` is returned, which may be incorrect.
///
/// Reading the manifest is not cheap, call this once per derive.
pub(crate) fn vc_bind() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_bind"))
}

#[inline(always)]
pub(crate) fn info_(vc_bind: &syn::Path) -> TokenStream {
    quote! { #vc_bind::info }
}

#[inline(always)]
pub(crate) fn registry_(vc_bind: &syn::Path) -> TokenStream {
    quote! { #vc_bind::registry }
}

#[inline(always)]
pub(crate) fn settings_(vc_bind: &syn::Path) -> TokenStream {
    quote! { #vc_bind::settings }
}

#[inline(always)]
pub(crate) fn bind_(vc_bind: &syn::Path) -> TokenStream {
    quote! { #vc_bind::bind }
}

#[inline(always)]
pub(crate) fn value_(vc_bind: &syn::Path) -> TokenStream {
    quote! { #vc_bind::value }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_bind: &syn::Path) -> TokenStream {
    quote! { #vc_bind::__macro_exports::auto_register }
}
