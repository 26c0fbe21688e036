use quarry_core::{Error, Result, Value};
use rusqlite::{
    ToSql,
    types::{ToSqlOutput, Value as SqliteValue, ValueRef},
};

pub(crate) fn extract_value(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int64(Some(v)),
        ValueRef::Real(v) => Value::Float64(Some(v)),
        ValueRef::Text(v) => Value::Varchar(Some(
            std::str::from_utf8(v)
                .map_err(|e| Error::Conversion(format!("Text column is not valid utf-8: {}", e)))?
                .to_owned(),
        )),
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    })
}

/// Binds a [`Value`] as a statement parameter.
pub(crate) struct Param<'a>(pub(crate) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let integer = |v: i64| Ok(ToSqlOutput::Owned(SqliteValue::Integer(v)));
        match self.0 {
            v if v.is_null() => Ok(ToSqlOutput::Owned(SqliteValue::Null)),
            Value::Boolean(Some(v)) => integer(*v as i64),
            Value::Int8(Some(v)) => integer(*v as i64),
            Value::Int16(Some(v)) => integer(*v as i64),
            Value::Int32(Some(v)) => integer(*v as i64),
            Value::Int64(Some(v)) => integer(*v),
            Value::UInt8(Some(v)) => integer(*v as i64),
            Value::UInt16(Some(v)) => integer(*v as i64),
            Value::UInt32(Some(v)) => integer(*v as i64),
            Value::UInt64(Some(v)) => integer(
                i64::try_from(*v)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
            ),
            Value::Float32(Some(v)) => Ok(ToSqlOutput::Owned(SqliteValue::Real(*v as f64))),
            Value::Float64(Some(v)) => Ok(ToSqlOutput::Owned(SqliteValue::Real(*v))),
            Value::Varchar(Some(v)) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Blob(Some(v)) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(v))),
            v => match crate::dialect::to_text(v) {
                Some(text) => Ok(ToSqlOutput::Owned(SqliteValue::Text(text))),
                None => Err(rusqlite::Error::ToSqlConversionFailure(
                    format!("Cannot bind {:?}", v).into(),
                )),
            },
        }
    }
}
