use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::context::{Context, Key};
use crate::converter::{ConversionError, ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::TypeDesc;
use crate::settings::{UnionSetting, UnionStyle};
use crate::value::Value;

/// Converts unions.
///
/// Applies to:
///
/// - a plain union without `None`, converted as a best match over its members
///   unless a [`UnionSetting`] says otherwise;
/// - a class (or annotated node) with a [`UnionSetting`], typically an
///   abstract base type listing its implementations.
///
/// The tree layout depends on the [`UnionStyle`]:
///
/// ```text
/// Nested:    {"type": "circle", "circle": {"radius": 1.0}}
/// Flat:      {"type": "circle", "radius": 1.0}
/// Keyed:     {"circle": {"radius": 1.0}}
/// BestMatch: {"radius": 1.0}
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct UnionConverter;

impl Converter for UnionConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let setting = match ctx.datatype.strip_annotated() {
            TypeDesc::Union(_) if ctx.datatype.is_optional() => return Err(ConvertError::NotApplicable),
            TypeDesc::Union(members) => match ctx.get_setting::<UnionSetting>() {
                Some(setting) => setting,
                None => UnionSetting::best_match(members.iter().cloned()).map_err(|err| {
                    ConvertError::from(ConversionError::from_schema(format!("{self:?}"), ctx, &err))
                })?,
            },
            TypeDesc::Class(_) => ctx.get_setting::<UnionSetting>().ok_or(ConvertError::NotApplicable)?,
            _ => return Err(ConvertError::NotApplicable),
        };

        match (setting.style, ctx.direction.is_serialize()) {
            (UnionStyle::BestMatch, true) => self.serialize_best_match(ctx, &setting),
            (UnionStyle::BestMatch, false) => self.try_members(ctx, &setting),
            (_, true) => self.serialize(ctx, &setting),
            (_, false) => self.deserialize(ctx, &setting),
        }
    }
}

impl UnionConverter {
    fn member(&self, ctx: &Context<'_>, setting: &UnionSetting, id: &str) -> Result<TypeDesc, ConvertError> {
        setting.members.get_type_by_id(id, ctx.registry).ok_or_else(|| {
            ctx.error(
                self,
                ErrorKind::MalformedDiscriminator,
                format!("unknown union member `{id}` for `{}`", ctx.datatype),
            )
        })
    }

    /// Converts the value as each member in turn, the first success wins.
    fn try_members(&self, ctx: &Context<'_>, setting: &UnionSetting) -> ConvertResult {
        let Some(ids) = setting.members.get_type_ids(ctx.registry) else {
            return Err(ctx.error(
                self,
                ErrorKind::Invalid,
                format!("the members of `{}` cannot be enumerated", ctx.datatype),
            ));
        };

        let mut errors: Vec<(String, ConversionError)> = Vec::new();
        for id in ids {
            let member = self.member(ctx, setting, &id)?;
            match ctx.spawn(&ctx.value, member, Key::None).convert() {
                Ok(value) => return Ok(value),
                Err(ConvertError::NotApplicable) => {}
                Err(ConvertError::Failed(err)) => errors.push((err.origin.clone(), *err)),
            }
        }

        let message = format!("unable to {} any union member", ctx.direction.name());
        let err = ConversionError::new(format!("{self:?}"), ctx, ErrorKind::AmbiguousUnionMatch, message);
        Err(err.with_errors(errors).into())
    }

    /// Serializes as the member matching the runtime type, or as the first
    /// member that converts when there is no match or the match fails.
    fn serialize_best_match(&self, ctx: &Context<'_>, setting: &UnionSetting) -> ConvertResult {
        let Some(id) = setting.members.get_type_id(&ctx.value.runtime_type(), ctx.registry) else {
            return self.try_members(ctx, setting);
        };
        let member = self.member(ctx, setting, &id)?;
        match ctx.spawn(&ctx.value, member, Key::None).convert() {
            Err(ConvertError::Failed(err)) => {
                log::debug!("{self:?}: member `{id}` rejected the value, trying every member: {}", err.message);
                self.try_members(ctx, setting)
            }
            other => other,
        }
    }

    fn serialize(&self, ctx: &Context<'_>, setting: &UnionSetting) -> ConvertResult {
        let runtime = ctx.value.runtime_type();
        let Some(id) = setting.members.get_type_id(&runtime, ctx.registry) else {
            return Err(ctx.error(
                self,
                ErrorKind::Invalid,
                format!("`{runtime}` is not a member of `{}`", ctx.datatype),
            ));
        };
        let member = self.member(ctx, setting, &id)?;
        let payload = ctx.spawn(&ctx.value, member, Key::None).convert()?;

        let disc = (setting.discriminator_key.clone(), Value::Str(id.clone()));
        Ok(match setting.style {
            UnionStyle::Nested => {
                let nesting_key = setting.nesting_key.clone().unwrap_or(id);
                Value::Object(IndexMap::from([disc, (nesting_key, payload)]))
            }
            UnionStyle::Flat => {
                let Value::Object(fields) = payload else {
                    return Err(self.flat_mismatch(ctx, payload.kind_name()));
                };
                if fields.contains_key(&setting.discriminator_key) {
                    return Err(ctx.error(
                        self,
                        ErrorKind::DuplicateField(setting.discriminator_key.clone()),
                        format!(
                            "member `{id}` serializes a field named like the discriminator key `{}`",
                            setting.discriminator_key
                        ),
                    ));
                }
                let mut out = IndexMap::with_capacity(fields.len() + 1);
                out.insert(disc.0, disc.1);
                out.extend(fields);
                Value::Object(out)
            }
            UnionStyle::Keyed | UnionStyle::BestMatch => Value::Object(IndexMap::from([(id, payload)])),
        })
    }

    fn deserialize(&self, ctx: &Context<'_>, setting: &UnionSetting) -> ConvertResult {
        let Value::Object(object) = &*ctx.value else {
            if setting.style == UnionStyle::Flat {
                return Err(self.flat_mismatch(ctx, ctx.value.kind_name()));
            }
            return Err(ctx.mismatch(self, "object"));
        };

        let id: &str = match setting.style {
            UnionStyle::Nested | UnionStyle::Flat => {
                let key = &setting.discriminator_key;
                match object.get(key) {
                    Some(Value::Str(id)) => id,
                    Some(other) => {
                        return Err(ctx.error(
                            self,
                            ErrorKind::MalformedDiscriminator,
                            format!("expected str for discriminator key '{key}', got {} instead", other.kind_name()),
                        ));
                    }
                    None => {
                        return Err(ctx.error(
                            self,
                            ErrorKind::MalformedDiscriminator,
                            format!("missing discriminator key '{key}' in mapping"),
                        ));
                    }
                }
            }
            UnionStyle::Keyed | UnionStyle::BestMatch => match object.keys().next() {
                Some(id) if object.len() == 1 => id,
                _ => {
                    return Err(ctx.error(
                        self,
                        ErrorKind::AmbiguousUnionMatch,
                        format!(
                            "expected exactly one key to act as the discriminator, got {} key(s)",
                            object.len()
                        ),
                    ));
                }
            },
        };
        let member = self.member(ctx, setting, id)?;

        match setting.style {
            UnionStyle::Nested => {
                let nesting_key = setting.nesting_key.as_deref().unwrap_or(id);
                let Some(payload) = object.get(nesting_key) else {
                    return Err(ctx.error(
                        self,
                        ErrorKind::MalformedDiscriminator,
                        format!("missing nesting key '{nesting_key}' in mapping"),
                    ));
                };
                ctx.spawn(payload, member, nesting_key).convert()
            }
            UnionStyle::Flat => {
                let mut fields = object.clone();
                fields.shift_remove(&setting.discriminator_key);
                ctx.spawn_owned(Value::Object(fields), member, Key::None).convert()
            }
            UnionStyle::Keyed | UnionStyle::BestMatch => ctx.spawn(&object[id], member, id).convert(),
        }
    }

    fn flat_mismatch(&self, ctx: &Context<'_>, got: &str) -> ConvertError {
        ctx.error(
            self,
            ErrorKind::TypeMismatch {
                expected: String::from("object"),
                got: String::from(got),
            },
            format!("the flat union style requires members that convert to objects, got {got} instead"),
        )
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::registry::{FieldDef, TypeDef, TypeRegistry};
    use crate::settings::{RegistryMembers, StaticMembers, UnionSetting, UnionStyle};
    use crate::value::{Record, Value};

    fn scalars(style: UnionStyle) -> TypeDesc {
        let members = StaticMembers::new()
            .with("int", TypeDesc::int())
            .with("str", TypeDesc::str());
        TypeDesc::annotated(
            TypeDesc::union([TypeDesc::int(), TypeDesc::str()]),
            [UnionSetting::new(members).with_style(style).into()],
        )
    }

    #[test]
    fn nested_style() {
        let h = Harness::new();
        let desc = scalars(UnionStyle::Nested);
        let tree = Value::object([("type", Value::from("int")), ("int", Value::Int(42))]);

        assert_eq!(h.deserialize(tree.clone(), desc.clone()).unwrap(), Value::Int(42));
        assert_eq!(h.serialize(Value::Int(42), desc.clone()).unwrap(), tree);

        let err = h
            .deserialize(Value::object([("int", Value::Int(42))]), desc.clone())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDiscriminator);
        assert_eq!(err.message, "missing discriminator key 'type' in mapping");

        let err = h
            .deserialize(Value::object([("type", Value::from("bool"))]), desc.clone())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDiscriminator);

        let err = h
            .deserialize(Value::object([("type", Value::from("int"))]), desc)
            .unwrap_err();
        assert_eq!(err.message, "missing nesting key 'int' in mapping");
    }

    #[test]
    fn keyed_style() {
        let h = Harness::new();
        let desc = scalars(UnionStyle::Keyed);
        let tree = Value::object([("str", Value::from("x"))]);

        assert_eq!(h.deserialize(tree.clone(), desc.clone()).unwrap(), Value::from("x"));
        assert_eq!(h.serialize(Value::from("x"), desc.clone()).unwrap(), tree);

        let err = h
            .deserialize(
                Value::object([("str", Value::from("x")), ("int", Value::Int(1))]),
                desc,
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AmbiguousUnionMatch);
    }

    #[test]
    fn plain_unions_are_best_match() {
        let h = Harness::new();
        let desc = TypeDesc::union([TypeDesc::int(), TypeDesc::list(TypeDesc::str())]);
        let list = Value::List(vec![Value::from("a")]);

        assert_eq!(h.deserialize(Value::Int(1), desc.clone()).unwrap(), Value::Int(1));
        assert_eq!(h.deserialize(list.clone(), desc.clone()).unwrap(), list);
        assert_eq!(h.serialize(list.clone(), desc.clone()).unwrap(), list);

        let err = h.deserialize(Value::from("a"), desc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AmbiguousUnionMatch);
        assert_eq!(err.message, "unable to deserialize any union member");
        assert_eq!(err.errors.len(), 2);
    }

    fn shapes(r: &mut TypeRegistry) {
        r.insert(
            TypeDef::record("shapes::Shape").with_setting(
                UnionSetting::new(RegistryMembers::with_prefix("shapes::"))
                    .with_style(UnionStyle::Flat)
                    .with_discriminator_key("kind"),
            ),
        );
        r.insert(
            TypeDef::record("shapes::Circle")
                .with_base(TypeDesc::class("shapes::Shape"))
                .with_field(FieldDef::new("radius", TypeDesc::float())),
        );
    }

    #[test]
    fn flat_style_on_a_base_class() {
        let h = Harness::with(shapes);
        let desc = TypeDesc::class("shapes::Shape");
        let circle = Value::Record(Record::new("shapes::Circle").with("radius", 1.5));
        let tree = Value::object([("kind", Value::from("shapes::Circle")), ("radius", Value::Float(1.5))]);

        assert_eq!(h.serialize(circle.clone(), desc.clone()).unwrap(), tree);
        assert_eq!(h.deserialize(tree, desc.clone()).unwrap(), circle);

        let err = h.deserialize(Value::Int(3), desc).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn plain_union_rejects_members_of_one_origin() {
        let h = Harness::new();
        let desc = TypeDesc::union([TypeDesc::list(TypeDesc::int()), TypeDesc::list(TypeDesc::str())]);
        let tree = Value::List(alloc::vec![Value::from("a")]);

        let err = h.deserialize(tree.clone(), desc.clone()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType);
        assert_eq!(
            err.message,
            "union members `list[int]` and `list[str]` cannot be told apart at runtime"
        );
        assert_eq!(h.serialize(tree, desc).unwrap_err().kind, ErrorKind::UnsupportedType);
    }

    #[test]
    fn best_match_serialization_falls_back_to_other_members() {
        let h = Harness::new();
        let members = StaticMembers::new()
            .with("ints", TypeDesc::list(TypeDesc::int()))
            .with("strs", TypeDesc::list(TypeDesc::str()));
        let desc = TypeDesc::annotated(
            TypeDesc::union([TypeDesc::list(TypeDesc::int()), TypeDesc::list(TypeDesc::str())]),
            [UnionSetting::new(members).with_style(UnionStyle::BestMatch).into()],
        );
        let words = Value::List(alloc::vec![Value::from("a")]);

        let runtime = h.deserialize(words.clone(), desc.clone()).unwrap();
        assert_eq!(h.serialize(runtime, desc.clone()).unwrap(), words);

        let err = h
            .serialize(Value::List(alloc::vec![Value::Bool(true)]), desc)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AmbiguousUnionMatch);
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn optional_unions_keep_their_setting() {
        let h = Harness::new();
        let desc = TypeDesc::annotated(
            TypeDesc::optional(TypeDesc::union([TypeDesc::int(), TypeDesc::str()])),
            [UnionSetting::new(StaticMembers::new().with("i", TypeDesc::int()))
                .with_style(UnionStyle::Keyed)
                .into()],
        );
        assert_eq!(h.deserialize(Value::None, desc.clone()).unwrap(), Value::None);
        assert_eq!(
            h.deserialize(Value::object([("i", Value::Int(3))]), desc).unwrap(),
            Value::Int(3)
        );
    }
}
