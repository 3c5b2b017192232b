use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;

use crate::derive_data::BindEnum;

/// `enum T { A, B }` is bound as an enumeration.
pub(crate) fn impl_enumeration(data: &BindEnum) -> TokenStream {
    let meta = &data.meta;
    let vc_bind_path = meta.vc_bind_path();
    let bind_ = crate::path::bind_(vc_bind_path);
    let info_ = crate::path::info_(vc_bind_path);
    let registry_ = crate::path::registry_(vc_bind_path);
    let value_ = crate::path::value_(vc_bind_path);
    let ident = meta.ident;
    let type_name = meta.type_name();

    let variant_idents: Vec<_> = data.variants.iter().map(|v| v.ident).collect();
    let member_names: Vec<String> = data.variants.iter().map(|v| v.ident.unraw().to_string()).collect();

    let members = data.variants.iter().zip(&member_names).map(|(variant, name)| {
        let aliases = &variant.attrs.aliases;
        let variant_ident = variant.ident;
        let value = match (&variant.attrs.value, variant.discriminant) {
            (Some(value), _) => quote! { .with_value(#value) },
            (None, Some(_)) => quote! { .with_value(#ident::#variant_ident as i64) },
            (None, None) => crate::utils::empty(),
        };
        quote! {
            #registry_::EnumMember::new(#name)
                #(.with_alias(#aliases))*
                #value
        }
    });
    let int_backed = match meta.attrs.int {
        Some(_) => quote! { .with_int_backed() },
        None => crate::utils::empty(),
    };

    quote! {
        impl #bind_::Bind for #ident {
            fn describe() -> #info_::TypeDesc {
                #info_::TypeDesc::class(#type_name)
            }

            fn register(registry: &mut #registry_::TypeRegistry) {
                registry.try_insert(
                    #registry_::TypeDef::enumeration(#type_name)
                        #(.with_member(#members))*
                        #int_backed
                );
            }

            fn to_value(&self) -> #value_::Value {
                let member = match self {
                    #(Self::#variant_idents => #member_names,)*
                };
                #value_::Value::Enum(#value_::EnumValue::new(#type_name, member))
            }

            fn from_value(value: #value_::Value) -> ::core::result::Result<Self, #bind_::BindError> {
                const NAME: &str = #type_name;
                let member = #bind_::enum_member(value, NAME)?;
                match &*member {
                    #(#member_names => ::core::result::Result::Ok(Self::#variant_idents),)*
                    other => ::core::result::Result::Err(#bind_::BindError::unknown_variant(NAME, other)),
                }
            }
        }
    }
}
