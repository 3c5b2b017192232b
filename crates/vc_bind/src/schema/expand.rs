use alloc::string::{String, ToString};
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::info::TypeDesc;
use crate::registry::TypeRegistry;
use crate::schema::{Field, Schema, SchemaError};
use crate::utils::HashSet;

/// For every flattened field, the fields it inlines into the parent.
pub type ExpandedFields = IndexMap<String, IndexMap<String, Field>>;

/// Compute, for each flattened field of `schema`, the transitive set of
/// non-flattened fields of its sub-schema.
///
/// Given the following schemas:
///
/// ```text
/// Outer:  a: int, b: Middle (flattened)
/// Middle: c: str, d: Inner (flattened)
/// Inner:  e: int
/// ```
///
/// the result for `Outer` is `{"b": {"c": str, "e": int}}`.
///
/// Fails with [`SchemaError::DuplicateField`] if an inlined field collides with
/// a direct field or another inlined field, and with [`SchemaError::Cycle`] if
/// a schema flattens into itself.
pub fn get_fields_expanded(registry: &TypeRegistry, schema: &Schema) -> Result<ExpandedFields, SchemaError> {
    let mut path = alloc::vec![schema.ty.clone()];
    expand(registry, schema, &mut path)
}

fn expand(registry: &TypeRegistry, schema: &Schema, path: &mut Vec<TypeDesc>) -> Result<ExpandedFields, SchemaError> {
    let mut result = ExpandedFields::new();
    if schema.flattened_fields().next().is_none() {
        return Ok(result);
    }

    let mut seen: HashSet<String> = schema
        .fields
        .iter()
        .filter(|(_, f)| !f.flattened)
        .map(|(name, _)| name.clone())
        .collect();

    for (name, field) in schema.flattened_fields() {
        let sub = registry
            .schema(&field.datatype)?
            .ok_or_else(|| SchemaError::NotFlattenable {
                field: name.clone(),
                ty: field.datatype.strip_annotated().to_string(),
            })?;
        if path.contains(&sub.ty) {
            return Err(SchemaError::Cycle(sub.ty.to_string()));
        }

        path.push(sub.ty.clone());
        let nested = expand(registry, &sub, path)?;
        path.pop();

        let mut inlined = IndexMap::new();
        for (sub_name, sub_field) in &sub.fields {
            match nested.get(sub_name) {
                Some(fields) => inlined.extend(fields.iter().map(|(n, f)| (n.clone(), f.clone()))),
                None => {
                    inlined.insert(sub_name.clone(), sub_field.clone());
                }
            }
        }

        for inlined_name in inlined.keys() {
            if !seen.insert(inlined_name.clone()) {
                return Err(SchemaError::DuplicateField {
                    field: inlined_name.clone(),
                    schema: schema.ty.to_string(),
                });
            }
        }
        result.insert(name.clone(), inlined);
    }
    Ok(result)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldDef, TypeDef};
    use crate::settings::Flattened;

    fn flat(name: &str) -> TypeDesc {
        TypeDesc::annotated(TypeDesc::class(name), [Flattened::default().into()])
    }

    #[test]
    fn nested_flattening_is_transitive() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("e::Inner").with_field(FieldDef::new("e", TypeDesc::int())));
        registry.insert(
            TypeDef::record("e::Middle")
                .with_field(FieldDef::new("c", TypeDesc::str()))
                .with_field(FieldDef::new("d", flat("e::Inner"))),
        );
        registry.insert(
            TypeDef::record("e::Outer")
                .with_field(FieldDef::new("a", TypeDesc::int()))
                .with_field(FieldDef::new("b", flat("e::Middle"))),
        );

        let schema = registry.schema(&TypeDesc::class("e::Outer")).unwrap().unwrap();
        let expanded = get_fields_expanded(&registry, &schema).unwrap();

        assert_eq!(expanded.keys().collect::<Vec<_>>(), ["b"]);
        let b: Vec<_> = expanded["b"].keys().map(String::as_str).collect();
        assert_eq!(b, ["c", "e"]);
        assert_eq!(expanded["b"]["e"].datatype, TypeDesc::int());
    }

    #[test]
    fn collisions_are_duplicate_fields() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("e::Named").with_field(FieldDef::new("name", TypeDesc::str())));
        registry.insert(
            TypeDef::record("e::Clash")
                .with_field(FieldDef::new("name", TypeDesc::str()))
                .with_field(FieldDef::new("meta", flat("e::Named"))),
        );

        let schema = registry.schema(&TypeDesc::class("e::Clash")).unwrap().unwrap();
        assert_eq!(
            get_fields_expanded(&registry, &schema).unwrap_err(),
            SchemaError::DuplicateField {
                field: "name".into(),
                schema: "Clash".into(),
            }
        );
    }

    #[test]
    fn self_flattening_is_a_cycle() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("e::Loop").with_field(FieldDef::new("again", flat("e::Loop"))));

        let schema = registry.schema(&TypeDesc::class("e::Loop")).unwrap().unwrap();
        assert!(matches!(
            get_fields_expanded(&registry, &schema),
            Err(SchemaError::Cycle(_))
        ));
    }

    #[test]
    fn flattening_a_non_record_fails() {
        let mut registry = TypeRegistry::empty();
        registry.insert(TypeDef::record("e::Odd").with_field(FieldDef::new(
            "n",
            TypeDesc::annotated(TypeDesc::int(), [Flattened::default().into()]),
        )));

        let schema = registry.schema(&TypeDesc::class("e::Odd")).unwrap().unwrap();
        assert!(matches!(
            get_fields_expanded(&registry, &schema),
            Err(SchemaError::NotFlattenable { .. })
        ));
    }
}
