use alloc::string::{String, ToString};

use indexmap::IndexMap;

use crate::info::TypeDesc;
use crate::registry::{BaseOrder, TypeRegistry};
use crate::schema::{DefaultValue, Field, Schema, SchemaError, annotation, is_flattened, record_constructor};
use crate::settings::Required;
use crate::utils::{HashMap, HashSet};
use crate::value::Value;

/// Derive the schema of a record descriptor.
///
/// Ancestors are walked breadth first from the leaf; a field belongs to the
/// most derived record declaring it. Field types are resolved in the scope
/// of the declaring record, then generic parameters are substituted with the
/// arguments accumulated from the leaf. Fields are ordered base first, in
/// declaration order.
///
/// A field is required unless it has a default or an optional type, an
/// annotated [`Required`] overrides both. A field that is not required and
/// has no default gets the default `None`.
///
/// Prefer [`TypeRegistry::schema`], which caches the result.
pub fn derive_schema(registry: &TypeRegistry, desc: &TypeDesc) -> Result<Schema, SchemaError> {
    let desc = desc.strip_annotated();
    let leaf = desc
        .class_name()
        .and_then(|name| registry.get(name.as_str()))
        .ok_or_else(|| SchemaError::UnsupportedType(desc.to_string()))?;
    let Some(leaf_record) = leaf.as_record() else {
        return Err(SchemaError::UnsupportedType(desc.to_string()));
    };

    let ancestors = registry.recurse_bases(desc, BaseOrder::Bfs)?;

    let mut claimed: HashSet<String> = HashSet::default();
    let mut owned: HashMap<String, Field> = HashMap::default();
    for ancestor in &ancestors {
        let TypeDesc::Class(class) = ancestor else {
            continue;
        };
        let Some(def) = registry.get(class.name.as_str()) else {
            continue;
        };
        let Some(record) = def.as_record() else {
            continue;
        };

        let map = def.param_map(&class.args);
        for field in &record.fields {
            if !claimed.insert(field.name.clone()) || !field.init {
                continue;
            }
            let datatype = registry
                .resolve_refs(&field.datatype, Some(def.name()))?
                .parameterize(&map);
            owned.insert(field.name.clone(), build_field(datatype, field.default.clone()));
        }
    }

    let mut fields = IndexMap::with_capacity(owned.len());
    for ancestor in ancestors.iter().rev() {
        let Some(record) = ancestor
            .class_name()
            .and_then(|name| registry.get(name.as_str()))
            .and_then(|def| def.as_record())
        else {
            continue;
        };
        for field in &record.fields {
            if let Some(resolved) = owned.remove(&field.name) {
                fields.insert(field.name.clone(), resolved);
            }
        }
    }

    let mut remainder: Option<&String> = None;
    for (name, field) in &fields {
        if !field.is_remainder() {
            continue;
        }
        if let Some(first) = remainder {
            return Err(SchemaError::MultipleRemainders {
                schema: desc.to_string(),
                first: first.clone(),
                second: name.clone(),
            });
        }
        remainder = Some(name);
    }

    Ok(Schema {
        constructor: leaf_record
            .constructor
            .clone()
            .unwrap_or_else(|| record_constructor(desc)),
        fields,
        ty: desc.clone(),
        annotations: leaf.settings().to_vec(),
    })
}

fn build_field(datatype: TypeDesc, default: Option<DefaultValue>) -> Field {
    let required = match annotation::<Required>(&datatype) {
        Some(required) => required.enabled,
        None => !datatype.strip_annotated().is_optional() && default.is_none(),
    };
    let default = match default {
        None if !required => Some(DefaultValue::Value(Value::None)),
        other => other,
    };
    Field {
        flattened: is_flattened(&datatype),
        datatype,
        required,
        default,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldDef, TypeDef};
    use crate::settings::{Flattened, Remainder, SettingRef};

    fn names(schema: &Schema) -> Vec<&str> {
        schema.fields.keys().map(String::as_str).collect()
    }

    #[test]
    fn derived_fields_shadow_base_fields() {
        let mut registry = TypeRegistry::empty();
        registry.insert(
            TypeDef::record("s::Base")
                .with_field(FieldDef::new("a", TypeDesc::int()))
                .with_field(FieldDef::new("b", TypeDesc::int())),
        );
        registry.insert(
            TypeDef::record("s::Child")
                .with_base(TypeDesc::class("s::Base"))
                .with_field(FieldDef::new("c", TypeDesc::str()))
                .with_field(FieldDef::new("a", TypeDesc::str()).with_default("x")),
        );

        let schema = derive_schema(&registry, &TypeDesc::class("s::Child")).unwrap();
        assert_eq!(names(&schema), ["a", "b", "c"]);

        let a = schema.field("a").unwrap();
        assert_eq!(a.datatype, TypeDesc::str());
        assert!(!a.required);
        assert_eq!(a.default_value(), Some(Value::from("x")));
    }

    #[test]
    fn generic_parameters_follow_the_inheritance_chain() {
        let mut registry = TypeRegistry::empty();
        registry.insert(
            TypeDef::record("g::Page")
                .with_param("T")
                .with_field(FieldDef::new("items", TypeDesc::list(TypeDesc::param("T")))),
        );
        registry.insert(
            TypeDef::record("g::Paged")
                .with_param("K")
                .with_base(TypeDesc::generic("g::Page", [TypeDesc::map(TypeDesc::str(), TypeDesc::param("K"))]))
                .with_field(FieldDef::new("key", TypeDesc::param("K"))),
        );

        let desc = TypeDesc::generic("g::Paged", [TypeDesc::float()]);
        let schema = derive_schema(&registry, &desc).unwrap();
        assert_eq!(
            schema.field("items").unwrap().datatype,
            TypeDesc::list(TypeDesc::map(TypeDesc::str(), TypeDesc::float()))
        );
        assert_eq!(schema.field("key").unwrap().datatype, TypeDesc::float());
        assert_eq!(schema.ty, desc);
    }

    #[test]
    fn forward_references_resolve_in_the_declaring_module() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("lib::Item"));
        registry.insert(TypeDef::record("app::Item"));
        registry.insert(
            TypeDef::record("lib::Container").with_field(FieldDef::new("item", TypeDesc::reference("Item"))),
        );
        registry.insert(TypeDef::record("app::Special").with_base(TypeDesc::class("lib::Container")));

        let schema = derive_schema(&registry, &TypeDesc::class("app::Special")).unwrap();
        assert_eq!(schema.field("item").unwrap().datatype, TypeDesc::class("lib::Item"));
    }

    #[test]
    fn requiredness() {
        let required_optional = TypeDesc::annotated(
            TypeDesc::optional(TypeDesc::int()),
            [SettingRef::from(Required::default())],
        );
        let mut registry = TypeRegistry::empty();
        registry.insert(
            TypeDef::record("r::R")
                .with_field(FieldDef::new("plain", TypeDesc::int()))
                .with_field(FieldDef::new("optional", TypeDesc::optional(TypeDesc::int())))
                .with_field(FieldDef::new("defaulted", TypeDesc::int()).with_default_factory(|| Value::Int(7)))
                .with_field(FieldDef::new("forced", required_optional))
                .with_field(FieldDef::new("hidden", TypeDesc::int()).without_init()),
        );

        let schema = derive_schema(&registry, &TypeDesc::class("r::R")).unwrap();
        assert_eq!(names(&schema), ["plain", "optional", "defaulted", "forced"]);
        assert!(schema.field("plain").unwrap().required);
        assert!(!schema.field("optional").unwrap().required);
        assert_eq!(schema.field("optional").unwrap().default_value(), Some(Value::None));
        assert!(!schema.field("defaulted").unwrap().required);
        assert_eq!(schema.field("defaulted").unwrap().default_value(), Some(Value::Int(7)));
        assert!(schema.field("forced").unwrap().required);
        assert!(!schema.field("forced").unwrap().has_default());
    }

    #[test]
    fn flattened_and_remainder_flags() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("f::Inner"));
        registry.insert(
            TypeDef::record("f::Outer")
                .with_field(FieldDef::new(
                    "inner",
                    TypeDesc::annotated(TypeDesc::class("f::Inner"), [Flattened::default().into()]),
                ))
                .with_field(FieldDef::new(
                    "rest",
                    TypeDesc::annotated(TypeDesc::map(TypeDesc::str(), TypeDesc::Any), [Remainder::default().into()]),
                )),
        );

        let schema = derive_schema(&registry, &TypeDesc::class("f::Outer")).unwrap();
        assert!(schema.field("inner").unwrap().flattened);
        assert_eq!(schema.remainder_field().map(|(n, _)| n.as_str()), Some("rest"));
    }

    #[test]
    fn two_remainders_are_rejected() {
        let rest = || TypeDesc::annotated(TypeDesc::map(TypeDesc::str(), TypeDesc::int()), [Remainder::default().into()]);
        let mut registry = TypeRegistry::empty();
        registry.insert(
            TypeDef::record("x::Bad")
                .with_field(FieldDef::new("one", rest()))
                .with_field(FieldDef::new("two", rest())),
        );

        let err = derive_schema(&registry, &TypeDesc::class("x::Bad")).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MultipleRemainders {
                schema: "Bad".into(),
                first: "one".into(),
                second: "two".into(),
            }
        );
    }

    #[test]
    fn non_records_are_unsupported() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::opaque("o::Id"));
        assert!(matches!(
            derive_schema(&registry, &TypeDesc::class("o::Id")),
            Err(SchemaError::UnsupportedType(_))
        ));
        assert!(matches!(
            derive_schema(&registry, &TypeDesc::class("o::Missing")),
            Err(SchemaError::UnsupportedType(_))
        ));
    }
}
