use alloc::string::{String, ToString};

use crate::bind::{Bind, BindError};
use crate::info::TypeDesc;
use crate::value::Value;

impl Bind for bool {
    #[inline]
    fn describe() -> TypeDesc {
        TypeDesc::bool()
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(BindError::mismatch("bool", other.kind_name())),
        }
    }
}

impl Bind for String {
    #[inline]
    fn describe() -> TypeDesc {
        TypeDesc::str()
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(BindError::mismatch("str", other.kind_name())),
        }
    }
}

fn read_int(value: Value, ty: &'static str) -> Result<i64, BindError> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(BindError::mismatch(ty, other.kind_name())),
    }
}

// Integers that always fit into `i64`.
macro_rules! impl_bind_small_int {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                #[inline]
                fn describe() -> TypeDesc {
                    TypeDesc::int()
                }

                #[inline]
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, BindError> {
                    let int = read_int(value, stringify!($ty))?;
                    <$ty>::try_from(int).map_err(|_| BindError::OutOfRange {
                        value: int.to_string(),
                        ty: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_bind_small_int!(i8, i16, i32, i64, u8, u16, u32);

// Integers that may exceed `i64`, such values are written as floats.
macro_rules! impl_bind_wide_int {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                #[inline]
                fn describe() -> TypeDesc {
                    TypeDesc::int()
                }

                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(int) => Value::Int(int),
                        Err(_) => Value::Float(*self as f64),
                    }
                }

                fn from_value(value: Value) -> Result<Self, BindError> {
                    let int = read_int(value, stringify!($ty))?;
                    <$ty>::try_from(int).map_err(|_| BindError::OutOfRange {
                        value: int.to_string(),
                        ty: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_bind_wide_int!(u64, usize, isize);

impl Bind for f64 {
    #[inline]
    fn describe() -> TypeDesc {
        TypeDesc::float()
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(BindError::mismatch("float", other.kind_name())),
        }
    }
}

impl Bind for f32 {
    #[inline]
    fn describe() -> TypeDesc {
        TypeDesc::float()
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, BindError> {
        f64::from_value(value).map(|f| f as f32)
    }
}
