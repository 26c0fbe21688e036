use quarry_core::{Dialect, Error, Result, Value};
use rust_decimal::Decimal;
use std::{fmt::Display, str::FromStr};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

const DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");
const TIMESTAMP: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
);
const TIMESTAMP_TZ: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]:[offset_minute]"
);

/// SQLite has no native temporal, uuid or decimal types: they are stored as text and parsed back
/// into the type of the field when read. Booleans are stored as integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn write_limit_offset(&self, out: &mut String, limit: Option<u32>, offset: Option<u32>) {
        if limit.is_none() && offset.is_none() {
            return;
        }
        out.push_str("\nLIMIT ");
        match limit {
            Some(limit) => out.push_str(&limit.to_string()),
            // OFFSET requires a LIMIT
            None => out.push_str("-1"),
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            out.push_str(&offset.to_string());
        }
    }

    fn to_driver_value(&self, value: Value) -> Value {
        if let Value::Boolean(v) = value {
            return Value::Int64(v.map(i64::from));
        }
        if value.is_null() {
            return value;
        }
        to_text(&value)
            .map(|text| Value::Varchar(Some(text)))
            .unwrap_or(value)
    }

    fn set_model_value(&self, raw: Value, template: &Value) -> Result<Value> {
        match (&raw, template) {
            (
                Value::Varchar(Some(text)),
                Value::Date(..)
                | Value::Time(..)
                | Value::Timestamp(..)
                | Value::TimestampWithTimezone(..)
                | Value::Uuid(..)
                | Value::Decimal(..),
            ) => parse_text(text, template),
            _ => Ok(raw),
        }
    }
}

/// Text representation of the values SQLite cannot store natively.
pub(crate) fn to_text(value: &Value) -> Option<String> {
    Some(match value {
        Value::Decimal(Some(v)) => v.to_string(),
        Value::Date(Some(v)) => v.format(DATE).ok()?,
        Value::Time(Some(v)) => v.format(TIME).ok()?,
        Value::Timestamp(Some(v)) => v.format(TIMESTAMP).ok()?,
        Value::TimestampWithTimezone(Some(v)) => v.format(TIMESTAMP_TZ).ok()?,
        Value::Uuid(Some(v)) => v.hyphenated().to_string(),
        _ => return None,
    })
}

fn parse_text(text: &str, template: &Value) -> Result<Value> {
    let error = |e: &dyn Display| {
        Error::Conversion(format!("Cannot parse `{}` as {:?}: {}", text, template, e))
    };
    Ok(match template {
        Value::Date(..) => Value::Date(Some(Date::parse(text, DATE).map_err(|e| error(&e))?)),
        Value::Time(..) => Value::Time(Some(Time::parse(text, TIME).map_err(|e| error(&e))?)),
        Value::Timestamp(..) => Value::Timestamp(Some(
            PrimitiveDateTime::parse(text, TIMESTAMP).map_err(|e| error(&e))?,
        )),
        Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(Some(
            OffsetDateTime::parse(text, TIMESTAMP_TZ)
                .or_else(|_| OffsetDateTime::parse(text, &Rfc3339))
                .map_err(|e| error(&e))?,
        )),
        Value::Uuid(..) => Value::Uuid(Some(Uuid::parse_str(text).map_err(|e| error(&e))?)),
        Value::Decimal(..) => {
            Value::Decimal(Some(Decimal::from_str(text).map_err(|e| error(&e))?))
        }
        _ => Value::Varchar(Some(text.to_owned())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    const DIALECT: SqliteDialect = SqliteDialect::new();

    #[test]
    fn outbound() {
        assert_eq!(
            DIALECT.to_driver_value(Value::Boolean(Some(true))),
            Value::Int64(Some(1))
        );
        assert_eq!(
            DIALECT.to_driver_value(Value::Date(Some(date!(2024 - 02 - 29)))),
            Value::Varchar(Some("2024-02-29".into()))
        );
        assert_eq!(
            DIALECT.to_driver_value(Value::Timestamp(None)),
            Value::Timestamp(None)
        );
        assert_eq!(
            DIALECT.to_driver_value(Value::Int32(Some(4))),
            Value::Int32(Some(4))
        );
    }

    #[test]
    fn inbound() {
        assert_eq!(
            DIALECT
                .set_model_value(
                    Value::Varchar(Some("2024-01-02 03:04:05".into())),
                    &Value::Timestamp(None)
                )
                .unwrap(),
            Value::Timestamp(Some(datetime!(2024-01-02 03:04:05)))
        );
        assert_eq!(
            DIALECT
                .set_model_value(
                    Value::Varchar(Some("2024-01-02T03:04:05Z".into())),
                    &Value::TimestampWithTimezone(None)
                )
                .unwrap(),
            Value::TimestampWithTimezone(Some(datetime!(2024-01-02 03:04:05 UTC)))
        );
        assert_eq!(
            DIALECT
                .set_model_value(Value::Int64(Some(1)), &Value::Boolean(None))
                .unwrap(),
            Value::Int64(Some(1))
        );
        assert!(matches!(
            DIALECT.set_model_value(Value::Varchar(Some("nope".into())), &Value::Uuid(None)),
            Err(Error::Conversion(..))
        ));
    }

    #[test]
    fn offset_without_limit() {
        let mut out = String::new();
        DIALECT.write_limit_offset(&mut out, None, Some(3));
        assert_eq!(out, "\nLIMIT -1\nOFFSET 3");
    }
}
