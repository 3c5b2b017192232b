use proc_macro2::{Ident, TokenStream};
use quote::quote;

use crate::derive_data::BindEnum;

/// `enum T { A(U), B(V) }` is bound as a union of `U` and `V`.
///
/// The union itself is registered as an opaque type carrying a `UnionSetting`,
/// its values are the values of the active member.
pub(crate) fn impl_union(data: &BindEnum) -> TokenStream {
    let meta = &data.meta;
    let vc_bind_path = meta.vc_bind_path();
    let bind_ = crate::path::bind_(vc_bind_path);
    let info_ = crate::path::info_(vc_bind_path);
    let registry_ = crate::path::registry_(vc_bind_path);
    let settings_ = crate::path::settings_(vc_bind_path);
    let value_ = crate::path::value_(vc_bind_path);
    let ident = meta.ident;
    let type_name = meta.type_name();

    let variant_idents: Vec<_> = data.variants.iter().map(|v| v.ident).collect();
    let variant_tys: Vec<_> = data.variants.iter().filter_map(|v| v.ty).collect();
    let ids = data.variants.iter().map(|v| v.id());

    let style = match meta.attrs.union_style {
        Some((span, style)) => {
            let variant = Ident::new(style.variant(), span);
            quote! { .with_style(#settings_::UnionStyle::#variant) }
        }
        None => crate::utils::empty(),
    };
    let tag = match &meta.attrs.tag {
        Some(tag) => quote! { .with_discriminator_key(#tag) },
        None => crate::utils::empty(),
    };
    let content = match &meta.attrs.content {
        Some(content) => quote! { .with_nesting_key(#content) },
        None => crate::utils::empty(),
    };

    quote! {
        impl #bind_::Bind for #ident {
            fn describe() -> #info_::TypeDesc {
                #info_::TypeDesc::class(#type_name)
            }

            fn register(registry: &mut #registry_::TypeRegistry) {
                const NAME: &str = #type_name;
                if registry.contains(NAME) {
                    return;
                }
                let members = #settings_::StaticMembers::new()
                    #(.with(#ids, #bind_::describe::<#variant_tys>()))*;
                registry.insert(
                    #registry_::TypeDef::opaque(NAME).with_setting(
                        #settings_::UnionSetting::new(members)
                            #style
                            #tag
                            #content
                    )
                );
                #(<#variant_tys as #bind_::Bind>::register(registry);)*
            }

            fn to_value(&self) -> #value_::Value {
                match self {
                    #(Self::#variant_idents(inner) => #bind_::Bind::to_value(inner),)*
                }
            }

            fn from_value(value: #value_::Value) -> ::core::result::Result<Self, #bind_::BindError> {
                let runtime = value.runtime_type();
                #(
                    if runtime.same_origin(&#bind_::describe::<#variant_tys>()) {
                        return <#variant_tys as #bind_::Bind>::from_value(value).map(Self::#variant_idents);
                    }
                )*
                ::core::result::Result::Err(#bind_::BindError::mismatch(#type_name, value.kind_name()))
            }
        }
    }
}
