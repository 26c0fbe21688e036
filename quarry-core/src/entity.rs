use crate::{ColumnDef, Connection, Error, JoinDef, Result, Session, Value};
use std::sync::Arc;

/// A struct mapped to a table.
///
/// Implemented by `#[derive(Entity)]`: the descriptor tables are static and built once per type,
/// the instance methods read and write the fields by column name.
pub trait Entity: Default {
    fn table_name() -> &'static str;
    /// Own (non joined) columns in declaration order.
    fn columns() -> &'static [ColumnDef];
    fn joins() -> &'static [JoinDef];
    fn primary_key_def() -> Option<&'static ColumnDef> {
        Self::columns().iter().find(|c| c.primary_key)
    }
    /// Current values aligned with [`Entity::columns`].
    fn values(&self) -> Vec<Value>;
    /// Assigns `value` to the field mapped to `column`. Returns `false` for unknown columns.
    fn set_value(&mut self, column: &str, value: Value) -> Result<bool>;
    /// Assigns a column of the entity held by the join field `join`, creating it when absent.
    fn set_joined_value(&mut self, join: &str, column: &str, value: Value) -> Result<bool>;
    /// Runs before `save` and `update`, no statement is issued when it fails.
    fn validate<C: Connection>(&self, _session: &mut Session<C>) -> Result<()> {
        Ok(())
    }
}

/// Validation hook, enabled with `#[quarry(validate)]` on the entity.
pub trait Validator {
    fn validate<C: Connection>(&self, session: &mut Session<C>) -> anyhow::Result<()>;
}

/// Runs a [`Validator`], used by the derived [`Entity::validate`].
pub fn run_validator<V: Validator, C: Connection>(
    value: &V,
    session: &mut Session<C>,
) -> Result<()> {
    value.validate(session).map_err(|e| {
        let error = Error::Validation(Arc::new(e));
        log::warn!("{}", error);
        error
    })
}
