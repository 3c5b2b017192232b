use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};

use crate::derive_data::{BindField, BindStruct, DefaultAttr};

/// The field definition passed to `TypeDef::with_field`.
fn field_def(field: &BindField, vc_bind_path: &syn::Path) -> TokenStream {
    let bind_ = crate::path::bind_(vc_bind_path);
    let info_ = crate::path::info_(vc_bind_path);
    let registry_ = crate::path::registry_(vc_bind_path);
    let settings_ = crate::path::settings_(vc_bind_path);
    let attrs = &field.attrs;
    let name = &field.name;
    let ty = field.ty;

    let mut settings = Vec::new();
    if !attrs.aliases.is_empty() {
        let aliases = &attrs.aliases;
        settings.push(quote! { #settings_::Alias::new([#(#aliases),*]) });
    }
    if attrs.flatten.is_some() {
        settings.push(quote! { #settings_::Flattened::new(true) });
    }
    if attrs.remainder.is_some() {
        settings.push(quote! { #settings_::Remainder::new(true) });
    }
    if attrs.required.is_some() {
        settings.push(quote! { #settings_::Required::new(true) });
    }

    let datatype = if settings.is_empty() {
        quote! { #bind_::describe::<#ty>() }
    } else {
        quote! {
            #info_::TypeDesc::annotated(
                #bind_::describe::<#ty>(),
                [#(#settings_::SettingRef::from(#settings)),*],
            )
        }
    };

    let default = match &attrs.default {
        Some(DefaultAttr::Trait(span)) => quote_spanned! { *span =>
            .with_default_factory(|| #bind_::Bind::to_value(&<#ty as ::core::default::Default>::default()))
        },
        Some(DefaultAttr::Function(path)) => quote! {
            .with_default_factory(|| #bind_::Bind::to_value(&#path()))
        },
        None => crate::utils::empty(),
    };

    quote! {
        #registry_::FieldDef::new(#name, #datatype) #default
    }
}

/// The expression rebuilding a field in `from_value`.
fn field_init(field: &BindField, bind_: &TokenStream) -> TokenStream {
    let name = &field.name;
    let ty = field.ty;

    if field.attrs.skip.is_some() {
        return quote! { ::core::default::Default::default() };
    }
    match &field.attrs.default {
        Some(DefaultAttr::Trait(_)) => quote! {
            #bind_::take_field_or::<#ty>(&mut fields, #name, ::core::default::Default::default)?
        },
        Some(DefaultAttr::Function(path)) => quote! {
            #bind_::take_field_or::<#ty>(&mut fields, #name, #path)?
        },
        None => quote! {
            #bind_::take_field::<#ty>(&mut fields, NAME, #name)?
        },
    }
}

/// `struct T { .. }` is bound as a record.
pub(crate) fn impl_record(data: &BindStruct) -> TokenStream {
    let meta = &data.meta;
    let vc_bind_path = meta.vc_bind_path();
    let bind_ = crate::path::bind_(vc_bind_path);
    let info_ = crate::path::info_(vc_bind_path);
    let registry_ = crate::path::registry_(vc_bind_path);
    let settings_ = crate::path::settings_(vc_bind_path);
    let value_ = crate::path::value_(vc_bind_path);
    let ident = meta.ident;
    let type_name = meta.type_name();

    let bound: Vec<&BindField> = data.fields.iter().filter(|f| f.attrs.skip.is_none()).collect();

    let field_defs = bound.iter().map(|field| field_def(field, vc_bind_path));
    let field_tys = bound.iter().map(|field| field.ty);
    let extra_keys = match meta.attrs.allow_extra_keys {
        Some(span) => quote_spanned! { span => .with_setting(#settings_::ExtraKeys::new(true)) },
        None => crate::utils::empty(),
    };

    let bound_idents = bound.iter().map(|field| field.ident);
    let bound_names = bound.iter().map(|field| &field.name);

    let all_idents = data.fields.iter().map(|field| field.ident);
    let all_inits = data.fields.iter().map(|field| field_init(field, &bind_));

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
                registry.insert(
                    #registry_::TypeDef::record(NAME)
                        #(.with_field(#field_defs))*
                        #extra_keys
                );
                #(<#field_tys as #bind_::Bind>::register(registry);)*
            }

            fn to_value(&self) -> #value_::Value {
                #value_::Value::Record(
                    #value_::Record::new(#type_name)
                        #(.with(#bound_names, #bind_::Bind::to_value(&self.#bound_idents)))*
                )
            }

            #[allow(unused_mut, unused_variables, reason = "records without bound fields")]
            fn from_value(value: #value_::Value) -> ::core::result::Result<Self, #bind_::BindError> {
                const NAME: &str = #type_name;
                let mut fields = #bind_::record_fields(value, NAME)?;
                ::core::result::Result::Ok(Self {
                    #(#all_idents: #all_inits,)*
                })
            }
        }
    }
}
