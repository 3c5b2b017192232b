use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Expr, Fields, GenericParam, Ident, LitStr, Type};

use super::{BindMeta, FieldAttributes, TypeAttributes};

// -----------------------------------------------------------------------------
// Define

/// A parsed `#[derive(Bind)]` input.
pub(crate) enum BindDerive<'a> {
    /// `struct T { .. }`, bound as a record.
    Record(BindStruct<'a>),
    /// `struct T(U);`, bound as its field.
    Newtype(BindMeta<'a>, &'a Type),
    /// `enum T { A, B }`, bound as an enumeration.
    Enumeration(BindEnum<'a>),
    /// `enum T { A(U), B(V) }`, bound as a union.
    Union(BindEnum<'a>),
}

pub(crate) struct BindStruct<'a> {
    pub meta: BindMeta<'a>,
    pub fields: Vec<BindField<'a>>,
}

pub(crate) struct BindField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    /// The field name in the record definition.
    pub name: String,
    pub attrs: FieldAttributes,
}

pub(crate) struct BindEnum<'a> {
    pub meta: BindMeta<'a>,
    pub variants: Vec<BindVariant<'a>>,
}

pub(crate) struct BindVariant<'a> {
    pub ident: &'a Ident,
    /// The type of the single field of a union variant.
    pub ty: Option<&'a Type>,
    pub discriminant: Option<&'a Expr>,
    pub attrs: FieldAttributes,
}

impl BindVariant<'_> {
    /// The member id of a union variant: its first alias, or its name.
    pub fn id(&self) -> LitStr {
        match self.attrs.aliases.first() {
            Some(alias) => alias.clone(),
            None => LitStr::new(&self.ident.unraw().to_string(), self.ident.span()),
        }
    }
}

// -----------------------------------------------------------------------------
// Parsing

impl<'a> BindDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        if input
            .generics
            .params
            .iter()
            .any(|param| !matches!(param, GenericParam::Lifetime(_)))
        {
            return Err(syn::Error::new(
                input.generics.span(),
                "`Bind` cannot be derived for generic types, register a `TypeDef` with parameters instead",
            ));
        }
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "`Bind` types must be `'static`",
            ));
        }

        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;
        let meta = BindMeta::new(attrs, &input.ident);

        match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => {
                    let fields = named
                        .named
                        .iter()
                        .map(|field| {
                            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
                            attrs.check_field()?;
                            let ident = field.ident.as_ref().ok_or_else(|| {
                                syn::Error::new(field.span(), "expected a named field")
                            })?;
                            Ok(BindField {
                                ident,
                                ty: &field.ty,
                                name: ident.unraw().to_string(),
                                attrs,
                            })
                        })
                        .collect::<syn::Result<_>>()?;
                    check_struct_attrs(&meta)?;
                    Ok(Self::Record(BindStruct { meta, fields }))
                }
                Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                    check_struct_attrs(&meta)?;
                    Ok(Self::Newtype(meta, &unnamed.unnamed[0].ty))
                }
                _ => Err(syn::Error::new(
                    input.span(),
                    "`Bind` can only be derived for structs with named fields or a single unnamed field",
                )),
            },
            Data::Enum(data) => {
                if data.variants.is_empty() {
                    return Err(syn::Error::new(input.span(), "`Bind` cannot be derived for an empty enum"));
                }
                let variants = data
                    .variants
                    .iter()
                    .map(|variant| {
                        let attrs = FieldAttributes::parse_attrs(&variant.attrs)?;
                        attrs.check_variant()?;
                        let ty = match &variant.fields {
                            Fields::Unit => None,
                            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => Some(&unnamed.unnamed[0].ty),
                            _ => {
                                return Err(syn::Error::new(
                                    variant.span(),
                                    "variants must be unit variants or have a single unnamed field",
                                ));
                            }
                        };
                        Ok(BindVariant {
                            ident: &variant.ident,
                            ty,
                            discriminant: variant.discriminant.as_ref().map(|(_, expr)| expr),
                            attrs,
                        })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;

                let units = variants.iter().filter(|v| v.ty.is_none()).count();
                if units == variants.len() {
                    check_enumeration(&meta, &variants)?;
                    Ok(Self::Enumeration(BindEnum { meta, variants }))
                } else if units == 0 {
                    check_union(&meta, &variants)?;
                    Ok(Self::Union(BindEnum { meta, variants }))
                } else {
                    Err(syn::Error::new(
                        input.span(),
                        "`Bind` enums must have either only unit variants or only single field variants",
                    ))
                }
            }
            Data::Union(_) => Err(syn::Error::new(input.span(), "`Bind` cannot be derived for unions")),
        }
    }

    pub fn meta(&self) -> &BindMeta<'a> {
        match self {
            Self::Record(data) => &data.meta,
            Self::Newtype(meta, _) => meta,
            Self::Enumeration(data) | Self::Union(data) => &data.meta,
        }
    }
}

fn union_only_error(meta: &BindMeta) -> Option<syn::Error> {
    let attrs = &meta.attrs;
    let span = attrs
        .union_style
        .map(|(span, _)| span)
        .or_else(|| attrs.tag.as_ref().map(LitStr::span))
        .or_else(|| attrs.content.as_ref().map(LitStr::span))?;
    Some(syn::Error::new(span, "`union`, `tag` and `content` only apply to enums with single field variants"))
}

fn check_struct_attrs(meta: &BindMeta) -> syn::Result<()> {
    if let Some(err) = union_only_error(meta) {
        return Err(err);
    }
    if let Some(span) = meta.attrs.int {
        return Err(syn::Error::new(span, "`int` only applies to enums with unit variants"));
    }
    Ok(())
}

fn check_enumeration(meta: &BindMeta, variants: &[BindVariant]) -> syn::Result<()> {
    if let Some(err) = union_only_error(meta) {
        return Err(err);
    }
    if let Some(span) = meta.attrs.allow_extra_keys {
        return Err(syn::Error::new(span, "`allow_extra_keys` only applies to structs"));
    }
    if meta.attrs.int.is_some()
        && let Some(variant) = variants
            .iter()
            .find(|v| v.attrs.value.is_none() && v.discriminant.is_none())
    {
        return Err(syn::Error::new(
            variant.ident.span(),
            "variants of an `int` enum need a discriminant or a `value`",
        ));
    }
    Ok(())
}

fn check_union(meta: &BindMeta, variants: &[BindVariant]) -> syn::Result<()> {
    if let Some(span) = meta.attrs.int {
        return Err(syn::Error::new(span, "`int` only applies to enums with unit variants"));
    }
    if let Some(span) = meta.attrs.allow_extra_keys {
        return Err(syn::Error::new(span, "`allow_extra_keys` only applies to structs"));
    }
    if let Some(variant) = variants.iter().find(|v| v.attrs.value.is_some()) {
        return Err(syn::Error::new(variant.ident.span(), "`value` only applies to unit variants"));
    }
    Ok(())
}
