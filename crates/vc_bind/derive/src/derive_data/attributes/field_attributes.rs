use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprPath, LitStr, Token, parenthesized};

use super::{set_flag, set_value};
use crate::BIND_ATTRIBUTE_NAME;

/// The default of a field.
pub(crate) enum DefaultAttr {
    /// `default`, uses `Default::default()`.
    Trait(Span),
    /// `default = "path::to::function"`
    Function(ExprPath),
}

/// Attributes applied to a field or to an enum variant.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    /// `alias("a", "b")`, the first alias is the serialized name.
    pub aliases: Vec<LitStr>,
    pub alias_span: Option<Span>,
    /// `flatten`
    pub flatten: Option<Span>,
    /// `remainder`
    pub remainder: Option<Span>,
    /// `required`
    pub required: Option<Span>,
    /// `skip`, the field is not bound and built with `Default::default()`.
    pub skip: Option<Span>,
    pub default: Option<DefaultAttr>,
    /// `value = 3`, the integer of an enum member.
    pub value: Option<Expr>,
}

impl FieldAttributes {
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
        if path.is_ident("alias") {
            set_flag(&mut self.alias_span, meta)?;
            let content;
            parenthesized!(content in meta.input);
            let aliases = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
            if aliases.is_empty() {
                return Err(meta.error("expected at least one alias"));
            }
            self.aliases.extend(aliases);
            Ok(())
        } else if path.is_ident("flatten") {
            set_flag(&mut self.flatten, meta)
        } else if path.is_ident("remainder") {
            set_flag(&mut self.remainder, meta)
        } else if path.is_ident("required") {
            set_flag(&mut self.required, meta)
        } else if path.is_ident("skip") {
            set_flag(&mut self.skip, meta)
        } else if path.is_ident("default") {
            if self.default.is_some() {
                return Err(meta.error("duplicate attribute"));
            }
            self.default = Some(if meta.input.peek(Token![=]) {
                let lit: LitStr = meta.value()?.parse()?;
                DefaultAttr::Function(lit.parse()?)
            } else {
                DefaultAttr::Trait(path.span())
            });
            Ok(())
        } else if path.is_ident("value") {
            set_value(&mut self.value, meta)
        } else {
            Err(meta.error("unknown field attribute"))
        }
    }

    /// Rejects attributes that only apply to record fields.
    pub fn check_variant(&self) -> syn::Result<()> {
        let mut field_only = [self.flatten, self.remainder, self.required, self.skip]
            .into_iter()
            .flatten()
            .chain(self.default.as_ref().map(DefaultAttr::span));
        match field_only.next() {
            Some(span) => Err(syn::Error::new(span, "only `alias` and `value` apply to variants")),
            None => Ok(()),
        }
    }

    /// Rejects attributes that only apply to enum variants, and conflicting ones.
    pub fn check_field(&self) -> syn::Result<()> {
        if let Some(value) = &self.value {
            return Err(syn::Error::new_spanned(value, "`value` only applies to enum variants"));
        }
        if let (Some(_), Some(span)) = (self.flatten, self.remainder) {
            return Err(syn::Error::new(span, "a field cannot be both flattened and a remainder"));
        }
        if let (Some(_), Some(span)) = (self.remainder, self.alias_span) {
            return Err(syn::Error::new(span, "a remainder field has no key to alias"));
        }
        if let Some(span) = self.skip
            && (self.aliases.len() + self.flatten.iter().count() + self.remainder.iter().count()) > 0
        {
            return Err(syn::Error::new(span, "a skipped field takes no other attribute"));
        }
        Ok(())
    }
}

impl DefaultAttr {
    pub fn span(&self) -> Span {
        match self {
            Self::Trait(span) => *span,
            Self::Function(path) => path.span(),
        }
    }
}
