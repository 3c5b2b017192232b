use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::context::{Context, Key};
use crate::converter::{ConversionError, ConvertError, ConvertResult, Converter, ErrorKind};
use crate::schema::{Field, Schema, SchemaError, get_fields_expanded};
use crate::settings::{Alias, DeserializeAs, ExtraKeys, Remainder, SerializeDefaults, UnionSetting};
use crate::utils::HashSet;
use crate::value::Value;

/// Converts records through their [`Schema`].
///
/// The tree form of a record is an object keyed by field aliases (the first
/// [`Alias`], or the field name). Flattened fields inline the fields of their
/// record into the parent object, and a [`Remainder`] field collects every key
/// no other field claims.
///
/// On deserialization:
///
/// - a missing required field is an error, a missing optional field takes its default;
/// - unclaimed keys go to the remainder field, or are handled by [`ExtraKeys`]
///   (rejected when the setting is absent);
/// - [`DeserializeAs`] substitutes the record type.
///
/// On serialization the value may be a record of the schema type (or a
/// subclass), or an object keyed by field names. Fields equal to their default
/// are omitted when [`SerializeDefaults`] is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaConverter;

/// The per-node view of a schema field.
struct FieldPlan {
    aliases: Vec<String>,
    remainder: bool,
}

impl FieldPlan {
    fn of(ctx: &Context<'_>, name: &str, field: &Field) -> Self {
        let field_value = Value::None;
        let field_ctx = ctx.spawn(&field_value, field.datatype.clone(), name);
        let aliases = match field_ctx.get_setting::<Alias>() {
            Some(alias) if !alias.aliases.is_empty() => alias.aliases.iter().map(|a| a.to_string()).collect(),
            _ => alloc::vec![String::from(name)],
        };
        Self {
            aliases,
            remainder: field_ctx.get_setting::<Remainder>().is_some_and(|r| r.enabled),
        }
    }

    fn primary(&self) -> &str {
        &self.aliases[0]
    }
}

impl Converter for SchemaConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        // Classes declared as unions are converted by the union converter.
        if ctx.datatype.class_name().is_none() || ctx.get_setting::<UnionSetting>().is_some() {
            return Err(ConvertError::NotApplicable);
        }

        let mut target = ctx.datatype.strip_annotated().clone();
        if ctx.direction.is_deserialize()
            && let Some(setting) = ctx.get_setting::<DeserializeAs>()
        {
            target = setting.ty;
        }

        let schema = match ctx.registry.schema(&target) {
            Ok(Some(schema)) => schema,
            Ok(None) => return Err(ConvertError::NotApplicable),
            Err(err) => return Err(self.schema_error(ctx, &err)),
        };

        if ctx.direction.is_serialize() {
            self.serialize(ctx, &schema)
        } else {
            self.deserialize(ctx, &schema)
        }
    }
}

impl SchemaConverter {
    fn schema_error(&self, ctx: &Context<'_>, err: &SchemaError) -> ConvertError {
        ConversionError::from_schema(format!("{self:?}"), ctx, err).into()
    }

    /// Returns the remainder field, failing if more than one field claims it.
    fn remainder<'s>(
        &self,
        ctx: &Context<'_>,
        schema: &'s Schema,
        plans: &[FieldPlan],
    ) -> Result<Option<(&'s String, &'s Field)>, ConvertError> {
        let mut found: Option<(&String, &Field)> = None;
        for ((name, field), plan) in schema.fields.iter().zip(plans) {
            if !plan.remainder {
                continue;
            }
            if let Some((first, _)) = found {
                let err = SchemaError::MultipleRemainders {
                    schema: schema.ty.to_string(),
                    first: first.clone(),
                    second: name.clone(),
                };
                return Err(self.schema_error(ctx, &err));
            }
            found = Some((name, field));
        }
        Ok(found)
    }

    fn deserialize(&self, ctx: &Context<'_>, schema: &Schema) -> ConvertResult {
        let Value::Object(object) = &*ctx.value else {
            return Err(ctx.mismatch(self, &schema.ty));
        };
        let expanded = get_fields_expanded(ctx.registry, schema).map_err(|e| self.schema_error(ctx, &e))?;
        let plans: Vec<FieldPlan> = schema
            .fields
            .iter()
            .map(|(name, field)| FieldPlan::of(ctx, name, field))
            .collect();
        let remainder = self.remainder(ctx, schema, &plans)?;

        let mut values: IndexMap<String, Value> = IndexMap::with_capacity(schema.fields.len());
        let mut used: HashSet<&str> = HashSet::default();

        for ((name, field), plan) in schema.fields.iter().zip(&plans) {
            if plan.remainder {
                continue;
            }

            if field.flattened {
                let mut sub = IndexMap::new();
                for (sub_name, sub_field) in expanded.get(name).into_iter().flatten() {
                    let aliases = FieldPlan::of(ctx, sub_name, sub_field).aliases;
                    if let Some((key, value)) = aliases.iter().find_map(|a| object.get_key_value(a.as_str())) {
                        used.insert(key.as_str());
                        sub.insert(key.clone(), value.clone());
                    }
                }
                let converted = ctx
                    .spawn_owned(Value::Object(sub), field.datatype.clone(), Key::None)
                    .convert()?;
                values.insert(name.clone(), converted);
                continue;
            }

            match plan.aliases.iter().find_map(|a| object.get_key_value(a.as_str())) {
                Some((key, value)) => {
                    used.insert(key.as_str());
                    let converted = ctx.spawn(value, field.datatype.clone(), key.as_str()).convert()?;
                    values.insert(name.clone(), converted);
                }
                None if field.required => return Err(self.missing(ctx, &plan.aliases)),
                None => {
                    if let Some(default) = field.default_value() {
                        values.insert(name.clone(), default);
                    }
                }
            }
        }

        let extra: IndexMap<String, Value> = object
            .iter()
            .filter(|(key, _)| !used.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if let Some((name, field)) = remainder {
            let converted = ctx
                .spawn_owned(Value::Object(extra), field.datatype.clone(), name.as_str())
                .convert()?;
            values.insert(name.clone(), converted);
        } else if !extra.is_empty() {
            let keys: Vec<String> = extra.into_keys().collect();
            match ctx.get_setting::<ExtraKeys>() {
                Some(setting) if setting.allow => {
                    if let Some(recorder) = &setting.recorder {
                        recorder(ctx, &keys);
                    }
                }
                _ => {
                    let message = format!("encountered extra keys: {}", quoted(&keys));
                    return Err(ctx.error(self, ErrorKind::ExtraKeysRejected { keys }, message));
                }
            }
        }

        schema
            .construct(values)
            .map_err(|message| ctx.error(self, ErrorKind::Invalid, message))
    }

    fn serialize(&self, ctx: &Context<'_>, schema: &Schema) -> ConvertResult {
        let fields = match &*ctx.value {
            Value::Record(record)
                if schema
                    .ty
                    .class_name()
                    .is_some_and(|ty| ctx.registry.is_subclass(record.ty.as_str(), ty.as_str())) =>
            {
                &record.fields
            }
            Value::Object(object) => object,
            _ => return Err(ctx.mismatch(self, &schema.ty)),
        };

        let serialize_defaults = ctx
            .get_setting::<SerializeDefaults>()
            .map_or(ctx.config().serialize_defaults, |s| s.enabled);
        let plans: Vec<FieldPlan> = schema
            .fields
            .iter()
            .map(|(name, field)| FieldPlan::of(ctx, name, field))
            .collect();
        let remainder = self.remainder(ctx, schema, &plans)?;

        let mut out: IndexMap<String, Value> = IndexMap::with_capacity(schema.fields.len());
        for ((name, field), plan) in schema.fields.iter().zip(&plans) {
            if plan.remainder {
                continue;
            }
            let Some(value) = fields.get(name) else {
                if field.required {
                    return Err(self.missing(ctx, core::slice::from_ref(name)));
                }
                continue;
            };
            if !serialize_defaults && field.default_value().as_ref() == Some(value) {
                continue;
            }

            let converted = ctx.spawn(value, field.datatype.clone(), name.as_str()).convert()?;
            if field.flattened {
                let Value::Object(inlined) = converted else {
                    let message = format!("flattened field `{name}` must serialize to an object");
                    return Err(ctx.error(self, ErrorKind::Invalid, message));
                };
                self.merge(ctx, schema, &mut out, inlined)?;
            } else {
                out.insert(String::from(plan.primary()), converted);
            }
        }

        if let Some((name, field)) = remainder
            && let Some(value) = fields.get(name)
        {
            let converted = ctx.spawn(value, field.datatype.clone(), name.as_str()).convert()?;
            let Value::Object(extra) = converted else {
                let message = format!("remainder field `{name}` must serialize to an object");
                return Err(ctx.error(self, ErrorKind::Invalid, message));
            };
            self.merge(ctx, schema, &mut out, extra)?;
        }

        Ok(Value::Object(out))
    }

    fn merge(
        &self,
        ctx: &Context<'_>,
        schema: &Schema,
        out: &mut IndexMap<String, Value>,
        entries: IndexMap<String, Value>,
    ) -> Result<(), ConvertError> {
        for (key, value) in entries {
            if out.contains_key(&key) {
                let err = SchemaError::DuplicateField {
                    field: key,
                    schema: schema.ty.to_string(),
                };
                return Err(self.schema_error(ctx, &err));
            }
            out.insert(key, value);
        }
        Ok(())
    }

    fn missing(&self, ctx: &Context<'_>, aliases: &[String]) -> ConvertError {
        let mut message = format!("missing required field: '{}'", aliases[0]);
        if aliases.len() > 1 {
            message.push_str(&format!(" (or {})", quoted(&aliases[1..])));
        }
        let kind = ErrorKind::MissingRequiredField {
            aliases: aliases.to_vec(),
        };
        ctx.error(self, kind, message)
    }
}

fn quoted(keys: &[String]) -> String {
    keys.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(", ")
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::registry::{FieldDef, TypeDef, TypeRegistry};
    use crate::settings::{Alias, DeserializeAs, ExtraKeys, Flattened, Remainder, SerializeDefaults};
    use crate::value::{Record, Value};

    fn people(r: &mut TypeRegistry) {
        r.insert(
            TypeDef::record("app::Person")
                .with_field(FieldDef::new("name", TypeDesc::str()))
                .with_field(FieldDef::new(
                    "age",
                    TypeDesc::annotated(TypeDesc::int(), [Alias::new(["years", "age"]).into()]),
                ))
                .with_field(FieldDef::new("nick", TypeDesc::optional(TypeDesc::str()))),
        );
        r.insert(
            TypeDef::record("app::Employee")
                .with_base(TypeDesc::class("app::Person"))
                .with_field(FieldDef::new("team", TypeDesc::str()).with_default("core")),
        );
    }

    #[test]
    fn records_round_trip() {
        let h = Harness::with(people);
        let desc = TypeDesc::class("app::Person");
        let record = Value::Record(
            Record::new("app::Person")
                .with("name", "Ada")
                .with("age", 36)
                .with("nick", Value::None),
        );
        let tree = Value::object([
            ("name", Value::from("Ada")),
            ("years", Value::Int(36)),
            ("nick", Value::None),
        ]);

        assert_eq!(h.serialize(record.clone(), desc.clone()).unwrap(), tree);
        assert_eq!(h.deserialize(tree, desc.clone()).unwrap(), record);

        // The second alias is accepted too, the missing optional field defaults to None.
        let tree = Value::object([("name", Value::from("Ada")), ("age", Value::Int(36))]);
        assert_eq!(h.deserialize(tree, desc).unwrap(), record);
    }

    #[test]
    fn missing_required_fields_list_aliases() {
        let h = Harness::with(people);
        let err = h
            .deserialize(Value::object([("name", Value::from("Ada"))]), TypeDesc::class("app::Person"))
            .unwrap_err();
        assert_eq!(err.message, "missing required field: 'years' (or 'age')");
        assert_eq!(
            err.kind,
            ErrorKind::MissingRequiredField {
                aliases: vec!["years".into(), "age".into()],
            }
        );
    }

    #[test]
    fn inherited_fields_and_defaults() {
        let h = Harness::with(people);
        let desc = TypeDesc::class("app::Employee");
        let value = h
            .deserialize(
                Value::object([("name", Value::from("Bob")), ("years", Value::Int(40))]),
                desc,
            )
            .unwrap();
        let Value::Record(record) = value else {
            panic!("expected a record");
        };
        assert_eq!(record.ty, "app::Employee");
        assert_eq!(record.get("team"), Some(&Value::from("core")));

        // Subclass records serialize through the base schema.
        let employee = Value::Record(
            Record::new("app::Employee")
                .with("name", "Bob")
                .with("age", 40)
                .with("nick", Value::None)
                .with("team", "core"),
        );
        let tree = h.serialize(employee, TypeDesc::class("app::Person")).unwrap();
        assert_eq!(tree.get("team"), None);
        assert_eq!(tree.get("years"), Some(&Value::Int(40)));
    }

    #[test]
    fn extra_keys() {
        let mut h = Harness::with(people);
        let desc = TypeDesc::class("app::Person");
        let tree = Value::object([
            ("name", Value::from("Ada")),
            ("years", Value::Int(36)),
            ("spam", Value::Int(1)),
        ]);

        let err = h.deserialize(tree.clone(), desc.clone()).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::ExtraKeysRejected {
                keys: vec!["spam".into()],
            }
        );
        assert_eq!(err.message, "encountered extra keys: 'spam'");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        h.mapper.settings_mut().add_global(ExtraKeys::record(move |_, keys| {
            sink.lock().unwrap().extend(keys.iter().cloned());
        }));
        assert!(h.deserialize(tree, desc).is_ok());
        assert_eq!(*seen.lock().unwrap(), ["spam"]);
    }

    #[test]
    fn serialize_defaults_can_be_disabled() {
        let mut h = Harness::with(people);
        h.mapper.settings_mut().add_global(SerializeDefaults::new(false));
        let record = Value::Record(
            Record::new("app::Employee")
                .with("name", "Bob")
                .with("age", 40)
                .with("nick", Value::None)
                .with("team", "core"),
        );
        let tree = h.serialize(record, TypeDesc::class("app::Employee")).unwrap();
        assert_eq!(
            tree,
            Value::object([("name", Value::from("Bob")), ("years", Value::Int(40))])
        );
    }

    fn remainder_registry(r: &mut TypeRegistry) {
        r.insert(
            TypeDef::record("app::Open")
                .with_field(FieldDef::new("a", TypeDesc::int()))
                .with_field(FieldDef::new(
                    "b",
                    TypeDesc::annotated(
                        TypeDesc::map(TypeDesc::str(), TypeDesc::int()),
                        [Remainder::default().into()],
                    ),
                )),
        );
    }

    #[test]
    fn remainder_collects_unclaimed_keys() {
        let h = Harness::with(remainder_registry);
        let desc = TypeDesc::class("app::Open");
        let tree = Value::object([("a", Value::Int(1)), ("spam", Value::Int(2))]);

        let value = h.deserialize(tree.clone(), desc.clone()).unwrap();
        let expected = Value::Record(
            Record::new("app::Open")
                .with("a", 1)
                .with("b", Value::map([(Value::from("spam"), Value::Int(2))])),
        );
        assert_eq!(value, expected);
        assert_eq!(h.serialize(value, desc).unwrap(), tree);
    }

    #[test]
    fn remainder_collisions_are_duplicates() {
        let h = Harness::with(remainder_registry);
        let value = Value::Record(
            Record::new("app::Open")
                .with("a", 1)
                .with("b", Value::map([(Value::from("a"), Value::Int(2))])),
        );
        let err = h.serialize(value, TypeDesc::class("app::Open")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateField("a".into()));
    }

    fn flattened_registry(r: &mut TypeRegistry) {
        r.insert(
            TypeDef::record("app::Meta")
                .with_field(FieldDef::new("id", TypeDesc::int()))
                .with_field(FieldDef::new(
                    "label",
                    TypeDesc::annotated(TypeDesc::str(), [Alias::new(["title"]).into()]),
                )),
        );
        r.insert(
            TypeDef::record("app::Page")
                .with_field(FieldDef::new("body", TypeDesc::str()))
                .with_field(FieldDef::new(
                    "meta",
                    TypeDesc::annotated(TypeDesc::class("app::Meta"), [Flattened::default().into()]),
                )),
        );
    }

    #[test]
    fn flattening_inlines_fields() {
        let h = Harness::with(flattened_registry);
        let desc = TypeDesc::class("app::Page");
        let record = Value::Record(
            Record::new("app::Page").with("body", "hi").with(
                "meta",
                Record::new("app::Meta").with("id", 7).with("label", "Home"),
            ),
        );
        let tree = Value::object([
            ("body", Value::from("hi")),
            ("id", Value::Int(7)),
            ("title", Value::from("Home")),
        ]);

        assert_eq!(h.serialize(record.clone(), desc.clone()).unwrap(), tree);
        assert_eq!(h.deserialize(tree, desc.clone()).unwrap(), record);

        let err = h
            .deserialize(Value::object([("body", Value::from("hi")), ("id", Value::Int(7))]), desc)
            .unwrap_err();
        assert_eq!(err.message, "missing required field: 'title'");
    }

    #[test]
    fn deserialize_as_substitutes_the_record() {
        let h = Harness::with(people);
        let desc = TypeDesc::annotated(
            TypeDesc::class("app::Person"),
            [DeserializeAs::new(TypeDesc::class("app::Employee")).into()],
        );
        let value = h
            .deserialize(
                Value::object([("name", Value::from("Bob")), ("years", Value::Int(40))]),
                desc,
            )
            .unwrap();
        assert!(matches!(value, Value::Record(r) if r.ty == "app::Employee"));
    }

    #[test]
    fn non_objects_are_mismatches() {
        let h = Harness::with(people);
        let err = h.deserialize(Value::Int(1), TypeDesc::class("app::Person")).unwrap_err();
        assert_eq!(err.message, "expected Person, got int instead");
    }
}
