use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr};

use super::{set_flag, set_value};
use crate::BIND_ATTRIBUTE_NAME;

/// The union encodings selectable with `#[bind(union = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnionStyleAttr {
    Nested,
    Flat,
    Keyed,
    BestMatch,
}

impl UnionStyleAttr {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "nested" => Ok(Self::Nested),
            "flat" => Ok(Self::Flat),
            "keyed" => Ok(Self::Keyed),
            "best_match" => Ok(Self::BestMatch),
            _ => Err(syn::Error::new(
                lit.span(),
                "expected one of `nested`, `flat`, `keyed`, `best_match`",
            )),
        }
    }

    /// The variant name of `vc_bind::settings::UnionStyle`.
    pub fn variant(self) -> &'static str {
        match self {
            Self::Nested => "Nested",
            Self::Flat => "Flat",
            Self::Keyed => "Keyed",
            Self::BestMatch => "BestMatch",
        }
    }
}

/// Attributes applied to the type itself.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `type_name = "app::User"`, defaults to `module_path!()::Ident`.
    pub type_name: Option<LitStr>,
    /// `auto_register`
    pub auto_register: Option<Span>,
    /// `allow_extra_keys`
    pub allow_extra_keys: Option<Span>,
    /// `int`, serialize enum members as their integer value.
    pub int: Option<Span>,
    /// `union = "nested"`
    pub union_style: Option<(Span, UnionStyleAttr)>,
    /// `tag = "type"`, the discriminator key of a union.
    pub tag: Option<LitStr>,
    /// `content = "value"`, the nesting key of a nested union.
    pub content: Option<LitStr>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident(BIND_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| out.parse_meta(&meta))?;
            }
        }
        Ok(out)
    }

    fn parse_meta(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        let path = &meta.path;
        if path.is_ident("type_name") {
            set_value(&mut self.type_name, meta)
        } else if path.is_ident("auto_register") {
            set_flag(&mut self.auto_register, meta)
        } else if path.is_ident("allow_extra_keys") {
            set_flag(&mut self.allow_extra_keys, meta)
        } else if path.is_ident("int") {
            set_flag(&mut self.int, meta)
        } else if path.is_ident("union") {
            if self.union_style.is_some() {
                return Err(meta.error("duplicate attribute"));
            }
            let lit: LitStr = meta.value()?.parse()?;
            self.union_style = Some((lit.span(), UnionStyleAttr::parse(&lit)?));
            Ok(())
        } else if path.is_ident("tag") {
            set_value(&mut self.tag, meta)
        } else if path.is_ident("content") {
            set_value(&mut self.content, meta)
        } else {
            Err(meta.error("unknown type attribute"))
        }
    }
}
