use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed scalar exchanged between entities, dialects and drivers.
///
/// Every typed variant holds an `Option` so a NULL still knows its column type: the descriptor
/// tables use the `None` form of a variant as the type template of a field.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => self.is_null() && other.is_null(),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// True for `Null` and for every typed NULL.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int8(None)
                | Value::Int16(None)
                | Value::Int32(None)
                | Value::Int64(None)
                | Value::UInt8(None)
                | Value::UInt16(None)
                | Value::UInt32(None)
                | Value::UInt64(None)
                | Value::Float32(None)
                | Value::Float64(None)
                | Value::Decimal(None)
                | Value::Varchar(None)
                | Value::Blob(None)
                | Value::Date(None)
                | Value::Time(None)
                | Value::Timestamp(None)
                | Value::TimestampWithTimezone(None)
                | Value::Uuid(None)
        )
    }

    /// The zero value of the type: NULL, numeric zero, empty text or blob, nil uuid.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Boolean(Some(v)) => !v,
            Value::Int8(Some(v)) => *v == 0,
            Value::Int16(Some(v)) => *v == 0,
            Value::Int32(Some(v)) => *v == 0,
            Value::Int64(Some(v)) => *v == 0,
            Value::UInt8(Some(v)) => *v == 0,
            Value::UInt16(Some(v)) => *v == 0,
            Value::UInt32(Some(v)) => *v == 0,
            Value::UInt64(Some(v)) => *v == 0,
            Value::Float32(Some(v)) => *v == 0.0,
            Value::Float64(Some(v)) => *v == 0.0,
            Value::Decimal(Some(v)) => v.is_zero(),
            Value::Varchar(Some(v)) => v.is_empty(),
            Value::Blob(Some(v)) => v.is_empty(),
            Value::Uuid(Some(v)) => v.is_nil(),
            Value::Date(Some(..))
            | Value::Time(Some(..))
            | Value::Timestamp(Some(..))
            | Value::TimestampWithTimezone(Some(..)) => false,
            _ => self.is_null(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::Int8(..)
                | Value::Int16(..)
                | Value::Int32(..)
                | Value::Int64(..)
                | Value::UInt8(..)
                | Value::UInt16(..)
                | Value::UInt32(..)
                | Value::UInt64(..)
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Value::Date(..) | Value::Timestamp(..) | Value::TimestampWithTimezone(..)
        )
    }

    /// Current instant expressed in the temporal type of `self`, `None` if `self` is not temporal.
    pub fn instant_like(&self, now: OffsetDateTime) -> Option<Value> {
        Some(match self {
            Value::Date(..) => Value::Date(Some(now.date())),
            Value::Timestamp(..) => Value::Timestamp(Some(PrimitiveDateTime::new(
                now.date(),
                now.time(),
            ))),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(Some(now)),
            _ => return None,
        })
    }
}
