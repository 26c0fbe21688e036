use crate::{
    Condition, Criteria, Error, Executor, JOIN_SEPARATOR, Model, Result, Value, log_query,
    possibly_parenthesized, separated_by,
};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Backend specific SQL rendering and value conversion.
///
/// Every method has a default producing standard SQL with double quoted identifiers and `?`
/// markers, backends override what differs. Rendering methods return the statement text and the
/// arguments in marker order, already passed through [`Dialect::substitute_markers`] and
/// [`Dialect::to_driver_value`].
pub trait Dialect: Send + Sync {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Quotes every segment of a possibly qualified path like `table.column`.
    fn write_path_quoted(&self, out: &mut String, path: &str) {
        separated_by(
            out,
            path.split('.'),
            |out, v| self.write_identifier_quoted(out, v),
            ".",
        );
    }

    fn quote(&self, path: &str) -> String {
        let mut out = String::with_capacity(path.len() + 4);
        self.write_path_quoted(&mut out, path);
        out
    }

    /// Rewrites `?` markers into the syntax of the backend.
    fn substitute_markers(&self, sql: &str) -> String {
        sql.to_owned()
    }

    /// Converts a value before handing it to the driver.
    fn to_driver_value(&self, value: Value) -> Value {
        value
    }

    /// Converts a value read from the driver into the type described by `template`.
    fn set_model_value(&self, raw: Value, _template: &Value) -> Result<Value> {
        Ok(raw)
    }

    fn write_condition(&self, out: &mut String, condition: &Condition, args: &mut Vec<Value>) {
        match condition {
            Condition::Expr { sql, args: values } => {
                out.push_str(sql);
                args.extend(values.iter().cloned());
            }
            Condition::Equal { column, value } => {
                self.write_path_quoted(out, column);
                out.push_str(" = ?");
                args.push(value.clone());
            }
            Condition::And(lhs, rhs) | Condition::Or(lhs, rhs) => {
                let infix = if matches!(condition, Condition::And(..)) {
                    " AND "
                } else {
                    " OR "
                };
                possibly_parenthesized!(
                    out,
                    !matches!(**lhs, Condition::Equal { .. }),
                    self.write_condition(out, lhs, args)
                );
                out.push_str(infix);
                possibly_parenthesized!(
                    out,
                    !matches!(**rhs, Condition::Equal { .. }),
                    self.write_condition(out, rhs, args)
                );
            }
        }
    }

    fn write_where(&self, out: &mut String, criteria: &Criteria, args: &mut Vec<Value>) -> Result<()> {
        let Some(condition) = &criteria.condition else {
            return Ok(());
        };
        if !condition.is_balanced() {
            return Err(Error::usage(format!(
                "The condition has {} markers but {} arguments",
                condition.placeholders(),
                condition.args().len()
            )));
        }
        out.push_str("\nWHERE ");
        self.write_condition(out, condition, args);
        Ok(())
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u32>, offset: Option<u32>) {
        if let Some(limit) = limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
    }

    fn query_sql(&self, criteria: &Criteria) -> Result<(String, Vec<Value>)> {
        let model = criteria_model(criteria)?;
        let mut out = String::with_capacity(512);
        let mut args = Vec::new();
        let qualify = !model.joins.is_empty();
        out.push_str("SELECT ");
        separated_by(
            &mut out,
            &model.fields,
            |out, field| {
                if qualify {
                    self.write_identifier_quoted(out, model.table);
                    out.push('.');
                }
                self.write_identifier_quoted(out, field.name());
            },
            ", ",
        );
        for join in &model.joins {
            for column in join.columns {
                out.push_str(", ");
                self.write_identifier_quoted(&mut out, join.field);
                out.push('.');
                self.write_identifier_quoted(&mut out, column.name);
                out.push_str(" AS ");
                self.write_identifier_quoted(
                    &mut out,
                    &format!("{}{}{}", join.field, JOIN_SEPARATOR, column.name),
                );
            }
        }
        out.push_str("\nFROM ");
        self.write_identifier_quoted(&mut out, model.table);
        for join in &model.joins {
            let Some(primary_key) = join.primary_key else {
                return Err(Error::usage(format!(
                    "Cannot join `{}` from `{}`: table `{}` has no primary key",
                    join.field, model.table, join.table
                )));
            };
            out.push_str("\nLEFT JOIN ");
            self.write_identifier_quoted(&mut out, join.table);
            out.push_str(" AS ");
            self.write_identifier_quoted(&mut out, join.field);
            out.push_str(" ON ");
            self.write_identifier_quoted(&mut out, model.table);
            out.push('.');
            self.write_identifier_quoted(&mut out, join.foreign_key);
            out.push_str(" = ");
            self.write_identifier_quoted(&mut out, join.field);
            out.push('.');
            self.write_identifier_quoted(&mut out, primary_key);
        }
        self.write_where(&mut out, criteria, &mut args)?;
        if !criteria.order_by.is_empty() {
            out.push_str("\nORDER BY ");
            separated_by(
                &mut out,
                &criteria.order_by,
                |out, order| {
                    self.write_path_quoted(out, &order.path);
                    if order.descending {
                        out.push_str(" DESC");
                    }
                },
                ", ",
            );
        }
        self.write_limit_offset(&mut out, criteria.limit, criteria.offset);
        out.push(';');
        Ok(self.finish(out, args))
    }

    /// `INSERT` of every model column, a zero primary key is left to the database.
    fn insert_sql(&self, criteria: &Criteria) -> Result<(String, Vec<Value>)> {
        let model = criteria_model(criteria)?;
        let skip_pk = model.pk_zero();
        let fields: Vec<_> = model
            .fields
            .iter()
            .filter(|f| !(skip_pk && f.def.primary_key))
            .collect();
        let mut out = String::with_capacity(256);
        out.push_str("INSERT INTO ");
        self.write_identifier_quoted(&mut out, model.table);
        if fields.is_empty() {
            out.push_str(" DEFAULT VALUES;");
            return Ok(self.finish(out, Vec::new()));
        }
        out.push_str(" (");
        separated_by(
            &mut out,
            &fields,
            |out, f| self.write_identifier_quoted(out, f.name()),
            ", ",
        );
        out.push_str(") VALUES (");
        separated_by(&mut out, &fields, |out, _| out.push('?'), ", ");
        out.push_str(");");
        let args = fields.into_iter().map(|f| f.value.clone()).collect();
        Ok(self.finish(out, args))
    }

    /// `UPDATE` of every model column except the primary key, restricted by the condition.
    fn update_sql(&self, criteria: &Criteria) -> Result<(String, Vec<Value>)> {
        let model = criteria_model(criteria)?;
        if criteria.condition.is_none() {
            return Err(Error::usage(format!(
                "Refusing to update `{}` without a condition",
                model.table
            )));
        }
        let fields: Vec<_> = model.fields.iter().filter(|f| !f.def.primary_key).collect();
        if fields.is_empty() {
            return Err(Error::usage(format!(
                "Nothing to update in `{}`, every column is omitted",
                model.table
            )));
        }
        let mut out = String::with_capacity(256);
        out.push_str("UPDATE ");
        self.write_identifier_quoted(&mut out, model.table);
        out.push_str(" SET ");
        separated_by(
            &mut out,
            &fields,
            |out, f| {
                self.write_identifier_quoted(out, f.name());
                out.push_str(" = ?");
            },
            ", ",
        );
        let mut args: Vec<_> = fields.into_iter().map(|f| f.value.clone()).collect();
        self.write_where(&mut out, criteria, &mut args)?;
        out.push(';');
        Ok(self.finish(out, args))
    }

    fn delete_sql(&self, criteria: &Criteria) -> Result<(String, Vec<Value>)> {
        let model = criteria_model(criteria)?;
        if criteria.condition.is_none() {
            return Err(Error::usage(format!(
                "Refusing to delete from `{}` without a condition",
                model.table
            )));
        }
        let mut out = String::with_capacity(128);
        let mut args = Vec::new();
        out.push_str("DELETE FROM ");
        self.write_identifier_quoted(&mut out, model.table);
        self.write_where(&mut out, criteria, &mut args)?;
        out.push(';');
        Ok(self.finish(out, args))
    }

    /// Inserts the model of `criteria` and returns the identifier generated by the database, 0
    /// when none was produced.
    fn insert(&self, executor: &mut dyn Executor, criteria: &Criteria) -> Result<i64> {
        let (sql, args) = self.insert_sql(criteria)?;
        log_query(&sql, &args);
        let affected = executor.execute(&sql, &args)?;
        Ok(affected.last_affected_id.unwrap_or_default())
    }

    fn update(&self, executor: &mut dyn Executor, criteria: &Criteria) -> Result<u64> {
        let (sql, args) = self.update_sql(criteria)?;
        log_query(&sql, &args);
        Ok(executor.execute(&sql, &args)?.rows_affected)
    }

    fn delete(&self, executor: &mut dyn Executor, criteria: &Criteria) -> Result<u64> {
        let (sql, args) = self.delete_sql(criteria)?;
        log_query(&sql, &args);
        Ok(executor.execute(&sql, &args)?.rows_affected)
    }

    fn finish(&self, sql: String, args: Vec<Value>) -> (String, Vec<Value>) {
        (
            self.substitute_markers(&sql),
            args.into_iter().map(|v| self.to_driver_value(v)).collect(),
        )
    }
}

fn criteria_model(criteria: &Criteria) -> Result<&Model> {
    criteria
        .model
        .as_ref()
        .ok_or_else(|| Error::usage("The criteria does not have a model"))
}

/// Standard SQL, double quoted identifiers and `?` markers.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {}
