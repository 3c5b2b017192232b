//! See the [`Bind`] derive macro.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static BIND_ATTRIBUTE_NAME: &str = "bind";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Bind Derivation
///
/// `#[derive(Bind)]` implements `vc_bind::Bind`. The shape of the type picks
/// the definition that `Bind::register` inserts into a `TypeRegistry`:
///
/// | Rust type                       | Definition                   |
/// |---------------------------------|------------------------------|
/// | `struct T { a: A, b: B }`       | a record with fields `a`, `b`|
/// | `struct T(U);`                  | none, bound exactly as `U`   |
/// | `enum T { A, B }`               | an enumeration               |
/// | `enum T { A(U), B(V) }`         | a union of `U` and `V`       |
///
/// Generic types, unit structs and mixed enums are rejected, describe them
/// with a hand written `TypeDef` instead.
///
/// The registered name is `module_path!()::Ident`, unless overridden:
///
/// ```rust, ignore
/// #[derive(Bind)]
/// #[bind(type_name = "app::User")]
/// struct User { /* ... */ }
/// ```
///
/// ## Type Attributes
///
/// - `type_name = "..."`: the registered name.
/// - `auto_register`: register the type in `TypeRegistry::auto_register`.
/// - `allow_extra_keys`: records accept unknown keys while deserializing.
/// - `int`: enumerations serialize as integers, every variant needs a
///   discriminant or a `value`.
/// - `union = "nested" | "flat" | "keyed" | "best_match"`: the union style,
///   defaults to `nested`.
/// - `tag = "..."`: the discriminator key of a union, defaults to `type`.
/// - `content = "..."`: the payload key of a nested union, defaults to the member id.
///
/// ## Field Attributes
///
/// - `alias("a", "b")`: alternate keys, the first one is used to serialize.
/// - `flatten`: inline the fields of a record field into the parent.
/// - `remainder`: the mapping field receiving the keys no other field claims.
/// - `required`: the field must be present, even if its type is optional.
/// - `default`, `default = "path::to::fn"`: the value of a missing field.
/// - `skip`: the field is not bound, it is rebuilt with `Default::default()`.
///
/// ## Variant Attributes
///
/// - `alias("a")`: the serialized name of a member, or the id of a union member.
/// - `value = 3`: the integer of an enumeration member.
///
/// ```rust, ignore
/// #[derive(Bind)]
/// #[bind(union = "flat", tag = "kind")]
/// enum Shape {
///     #[bind(alias("circle"))]
///     Circle(Circle),
///     #[bind(alias("rect"))]
///     Rect(Rect),
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::BindDerive::from_input(&ast) {
        Ok(derive) => impls::impl_bind(&derive).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
