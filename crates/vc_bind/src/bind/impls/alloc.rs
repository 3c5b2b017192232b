use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::bind::{Bind, BindError, describe};
use crate::info::TypeDesc;
use crate::registry::TypeRegistry;
use crate::value::Value;

impl<T: Bind> Bind for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::optional(describe::<T>())
    }

    fn register(registry: &mut TypeRegistry) {
        T::register(registry);
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::None,
        }
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::None => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: Bind> Bind for Box<T> {
    fn describe() -> TypeDesc {
        describe::<T>()
    }

    fn register(registry: &mut TypeRegistry) {
        T::register(registry);
    }

    fn to_value(&self) -> Value {
        T::to_value(self)
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn describe() -> TypeDesc {
        TypeDesc::list(describe::<T>())
    }

    fn register(registry: &mut TypeRegistry) {
        T::register(registry);
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        super::items(value, "list")
    }
}

impl<V: Bind> Bind for BTreeMap<String, V> {
    fn describe() -> TypeDesc {
        TypeDesc::map(TypeDesc::str(), describe::<V>())
    }

    fn register(registry: &mut TypeRegistry) {
        V::register(registry);
    }

    fn to_value(&self) -> Value {
        Value::map(self.iter().map(|(k, v)| (Value::Str(k.clone()), v.to_value())))
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        super::map_entries(value, "map")?
            .into_iter()
            .map(|(key, value)| match V::from_value(value) {
                Ok(value) => Ok((key, value)),
                Err(err) => Err(err.in_field(key)),
            })
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Tuples

fn tuple_items<const N: usize>(value: Value) -> Result<[Value; N], BindError> {
    match value {
        Value::Tuple(items) | Value::List(items) => {
            let got = items.len();
            <[Value; N]>::try_from(items).map_err(|_| BindError::Mismatch {
                expected: alloc::format!("tuple of length {N}"),
                got: if got < N { "shorter tuple" } else { "longer tuple" },
            })
        }
        other => Err(BindError::mismatch("tuple", other.kind_name())),
    }
}

macro_rules! impl_bind_tuple {
    ($len:literal: $($name:ident $var:ident $idx:tt),*) => {
        impl<$($name: Bind),*> Bind for ($($name,)*) {
            fn describe() -> TypeDesc {
                TypeDesc::tuple([$(describe::<$name>()),*])
            }

            fn register(registry: &mut TypeRegistry) {
                $($name::register(registry);)*
            }

            fn to_value(&self) -> Value {
                Value::Tuple(alloc::vec![$(self.$idx.to_value()),*])
            }

            fn from_value(value: Value) -> Result<Self, BindError> {
                let [$($var),*] = tuple_items::<$len>(value)?;
                Ok(($(
                    <$name as Bind>::from_value($var)
                        .map_err(|err| err.in_field(alloc::format!("[{}]", $idx)))?,
                )*))
            }
        }
    };
}

impl_bind_tuple!(2: A a 0, B b 1);
impl_bind_tuple!(3: A a 0, B b 1, C c 2);
impl_bind_tuple!(4: A a 0, B b 1, C c 2, D d 3);
