use crate::{Error, Result, Value};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Entities rely on it in both directions: `as_value` produces bound arguments, `try_from_value`
/// assigns scanned columns back into fields and `as_empty_value` gives the type template stored
/// in the descriptor table.
///
/// # Error semantics
/// - Integer conversions accept any integer variant, the range is checked before converting.
/// - A NULL converts only into `Option<T>`.
///
/// ```rust
/// use quarry_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i16 = AsValue::try_from_value(Value::Int64(Some(42))).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed NULL of this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::Conversion(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let wide: i128 = match value {
                    $destination(Some(v)) => return Ok(v),
                    Value::Int8(Some(v)) => v as _,
                    Value::Int16(Some(v)) => v as _,
                    Value::Int32(Some(v)) => v as _,
                    Value::Int64(Some(v)) => v as _,
                    Value::UInt8(Some(v)) => v as _,
                    Value::UInt16(Some(v)) => v as _,
                    Value::UInt32(Some(v)) => v as _,
                    Value::UInt64(Some(v)) => v as _,
                    _ => return Err(mismatch::<Self>(&value)),
                };
                <$source>::try_from(wide).map_err(|_| {
                    Error::Conversion(format!(
                        "Value {} is out of range for {}",
                        wide,
                        any::type_name::<Self>(),
                    ))
                })
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(
    bool,
    Value::Boolean,
    Value::Int64(Some(v)) => Ok(v != 0),
    Value::Int32(Some(v)) => Ok(v != 0),
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Float64(Some(v)) => Ok(v as f32),
    Value::Int64(Some(v)) => Ok(v as f32),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Float32(Some(v)) => Ok(v as f64),
    Value::Int64(Some(v)) => Ok(v as f64),
    Value::Int32(Some(v)) => Ok(v as f64),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Int64(Some(v)) => Ok(Decimal::from(v)),
    Value::Float64(Some(v)) => Decimal::from_f64(v)
        .ok_or_else(|| Error::Conversion(format!("Value {} is not a valid decimal", v))),
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(Box<[u8]>, Value::Blob);
impl_as_value!(Vec<u8>, Value::Blob);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(
    PrimitiveDateTime,
    Value::Timestamp,
    Value::TimestampWithTimezone(Some(v)) => Ok(PrimitiveDateTime::new(v.date(), v.time())),
);
impl_as_value!(
    OffsetDateTime,
    Value::TimestampWithTimezone,
    Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
);
impl_as_value!(
    Uuid,
    Value::Uuid,
    Value::Blob(Some(v)) => Uuid::from_slice(&v).map_err(|e| Error::Conversion(e.to_string())),
);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}
