use alloc::format;
use alloc::vec::Vec;

use crate::context::Context;
use crate::converter::{ConvertError, ConvertResult, Converter, ErrorKind};
use crate::info::TypeDesc;
use crate::value::Value;

fn items_of<'v>(value: &'v Value, accept_tuple: bool) -> Option<&'v [Value]> {
    match value {
        Value::List(items) => Some(items),
        Value::Tuple(items) if accept_tuple => Some(items),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// CollectionConverter

/// Converts `list[T]` from and to tree lists.
///
/// Serialization also accepts runtime tuples.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionConverter;

impl Converter for CollectionConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let TypeDesc::List(item) = ctx.datatype.strip_annotated() else {
            return Err(ConvertError::NotApplicable);
        };
        let Some(items) = items_of(&ctx.value, ctx.direction.is_serialize()) else {
            return Err(ctx.mismatch(self, ctx.datatype.strip_annotated()));
        };

        let converted = items
            .iter()
            .enumerate()
            .map(|(idx, value)| ctx.spawn(value, (**item).clone(), idx).convert())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(converted))
    }
}

// -----------------------------------------------------------------------------
// TupleConverter

/// Converts `tuple[A, B, ...]` and the variadic `tuple[T, ...]`.
///
/// Deserializes tree lists into [`Value::Tuple`] and serializes tuples (or
/// lists) back into tree lists. A fixed-length tuple requires exactly as many
/// items as it declares.
#[derive(Debug, Default, Clone, Copy)]
pub struct TupleConverter;

impl Converter for TupleConverter {
    fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
        let TypeDesc::Tuple { items: types, repeated } = ctx.datatype.strip_annotated() else {
            return Err(ConvertError::NotApplicable);
        };
        let Some(items) = items_of(&ctx.value, true) else {
            return Err(ctx.mismatch(self, ctx.datatype.strip_annotated()));
        };

        if !*repeated && items.len() != types.len() {
            let expected = format!("tuple of length {}", types.len());
            let got = format!("{} of length {}", ctx.value.kind_name(), items.len());
            let message = format!("expected {expected}, got {got} instead");
            return Err(ctx.error(self, ErrorKind::TypeMismatch { expected, got }, message));
        }

        let converted = items
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let datatype = match (*repeated, types.first()) {
                    (true, Some(item)) => item.clone(),
                    (true, None) => TypeDesc::Any,
                    (false, _) => types[idx].clone(),
                };
                ctx.spawn(value, datatype, idx).convert()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(if ctx.direction.is_serialize() {
            Value::List(converted)
        } else {
            Value::Tuple(converted)
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::converter::ErrorKind;
    use crate::converters::testing::Harness;
    use crate::info::TypeDesc;
    use crate::value::Value;

    #[test]
    fn lists_convert_items() {
        let h = Harness::new();
        let desc = TypeDesc::list(TypeDesc::int());
        let tree = Value::List(vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(h.deserialize(tree.clone(), desc.clone()).unwrap(), tree);
        assert_eq!(
            h.serialize(Value::Tuple(vec![Value::Int(1), Value::Int(2)]), desc.clone()).unwrap(),
            tree
        );

        let err = h
            .deserialize(Value::List(vec![Value::Int(1), Value::from("x")]), desc.clone())
            .unwrap_err();
        assert!(err.to_string().contains("[1]: int"));

        let err = h.deserialize(Value::from("12"), desc).unwrap_err();
        assert_eq!(err.message, "expected list[int], got str instead");
    }

    #[test]
    fn tuples_check_their_length() {
        let h = Harness::new();
        let desc = TypeDesc::tuple([TypeDesc::int(), TypeDesc::str()]);

        let tree = Value::List(vec![Value::Int(1), Value::from("a")]);
        let runtime = Value::Tuple(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(h.deserialize(tree.clone(), desc.clone()).unwrap(), runtime);
        assert_eq!(h.serialize(runtime, desc.clone()).unwrap(), tree);

        let err = h
            .deserialize(Value::List(vec![Value::Int(1), Value::from("a"), Value::Int(3)]), desc)
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "tuple of length 2".into(),
                got: "list of length 3".into(),
            }
        );
    }

    #[test]
    fn variadic_tuples() {
        let h = Harness::new();
        let desc = TypeDesc::repeated(TypeDesc::int());
        let items = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(
            h.deserialize(Value::List(items.clone()), desc).unwrap(),
            Value::Tuple(items)
        );
    }
}
