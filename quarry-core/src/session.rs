use crate::{
    Condition, Connection, Criteria, Dialect, Entity, Error, Executor, FieldKind, Model,
    ModelField, Order, Pool, Result, RowLabeled, Rows, RowsAffected, Statement, Transaction,
    Value, log_query, scan_row, truncate_long,
};
use std::{mem, sync::Arc};
use time::OffsetDateTime;

/// Entry point for every database operation.
///
/// A session owns one connection and, between [`Session::begin`] and [`Session::commit`] or
/// [`Session::rollback`], the transaction opened on it. Statements always go through the
/// transaction when there is one.
///
/// The configuration methods (`filter`, `limit`, `order_by`, ...) accumulate into a [`Criteria`]
/// that is consumed by the next executing call and then reset, whether the call succeeded or not.
///
/// Inside a transaction the first failure is remembered: it is returned right away by the failing
/// call and once more by `commit`, regardless of what happened afterwards.
pub struct Session<C: Connection> {
    connection: Option<C>,
    transaction: Option<C::Transaction>,
    dialect: Arc<dyn Dialect>,
    criteria: Criteria,
    first_tx_error: Option<Error>,
    pool: Option<Arc<Pool<C>>>,
}

struct Upsert {
    affected: u64,
    id: i64,
    inserted: bool,
    created: Option<Value>,
}

impl<C: Connection> Session<C> {
    pub fn new(connection: C, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            connection: Some(connection),
            transaction: None,
            dialect,
            criteria: Default::default(),
            first_tx_error: None,
            pool: None,
        }
    }

    /// Closing the session will hand the connection back to `pool` instead of closing it.
    pub fn with_pool(mut self, pool: Arc<Pool<C>>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        &*self.dialect
    }

    /// The configuration accumulated for the next executing call.
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    /// Discards the accumulated configuration.
    pub fn reset(&mut self) -> &mut Self {
        self.criteria = Default::default();
        self
    }

    /// Filters the next statement with a raw expression using `?` markers, replacing any previous
    /// condition.
    pub fn filter(
        &mut self,
        expr: impl Into<String>,
        args: impl IntoIterator<Item = Value>,
    ) -> &mut Self {
        self.condition(Condition::new(expr, args))
    }

    /// Filters the next statement with `<column> = ?`, replacing any previous condition.
    pub fn filter_equal(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.condition(Condition::equal(column, value))
    }

    pub fn condition(&mut self, condition: Condition) -> &mut Self {
        self.criteria.condition = Some(condition);
        self
    }

    pub fn limit(&mut self, limit: u32) -> &mut Self {
        self.criteria.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u32) -> &mut Self {
        self.criteria.offset = Some(offset);
        self
    }

    pub fn order_by(&mut self, path: impl Into<String>) -> &mut Self {
        self.criteria.order_by.push(Order {
            path: path.into(),
            descending: false,
        });
        self
    }

    pub fn order_by_desc(&mut self, path: impl Into<String>) -> &mut Self {
        self.criteria.order_by.push(Order {
            path: path.into(),
            descending: true,
        });
        self
    }

    /// Leaves fields out of the next statement, by Rust field or column name. Naming a join
    /// field also skips the join. Replaces the fields given by a previous call.
    pub fn omit_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.omit_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Loads the next entities without their related entities.
    pub fn omit_join(&mut self) -> &mut Self {
        self.criteria.omit_join = true;
        self
    }

    /// Loads one row into `entity`.
    ///
    /// A non zero primary key restricts the lookup to that row, on top of any filter. Returns
    /// [`Error::NoRows`] when nothing matches.
    pub fn find<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        let mut criteria = self.take_criteria();
        criteria.model = Some(Model::new(
            &*entity,
            !criteria.omit_join,
            &criteria.omit_fields,
        ));
        criteria.limit = Some(1);
        let dialect = self.dialect.clone();
        criteria.merge_pk_condition(&*dialect);
        let (sql, args) = dialect.query_sql(&criteria)?;
        let result = self.fetch(&sql, &args).and_then(|mut rows| match rows.next() {
            Some(row) => scan_row(&*dialect, entity, row),
            None => Err(Error::NoRows),
        });
        self.record(result)
    }

    /// Appends one entity per matching row to `entities`, in result order. Nothing is appended
    /// when any row fails to load.
    pub fn find_all<E: Entity>(&mut self, entities: &mut Vec<E>) -> Result<()> {
        let mut criteria = self.take_criteria();
        criteria.model = Some(Model::new(
            &E::default(),
            !criteria.omit_join,
            &criteria.omit_fields,
        ));
        let dialect = self.dialect.clone();
        let (sql, args) = dialect.query_sql(&criteria)?;
        let result = self.fetch(&sql, &args).and_then(|rows| {
            rows.map(|row| {
                let mut entity = E::default();
                scan_row(&*dialect, &mut entity, row).map(|_| entity)
            })
            .collect::<Result<Vec<_>>>()
        });
        entities.extend(self.record(result)?);
        Ok(())
    }

    /// Inserts or updates `entity`, returning the number of rows affected.
    ///
    /// With a zero primary key the row is inserted and the generated key is written back. With a
    /// non zero key the row is updated, and inserted when the update matched nothing. The
    /// `created` timestamp is set on insert and the `updated` one on every save.
    pub fn save<E: Entity>(&mut self, entity: &mut E) -> Result<u64> {
        let mut criteria = self.take_criteria();
        entity.validate(self)?;
        let mut model = Model::new(&*entity, false, &criteria.omit_fields);
        let Some(pk) = model.pk().map(|f| f.def) else {
            return Err(Error::usage(format!(
                "Cannot save `{}`: it has no primary key",
                model.table
            )));
        };
        let now = OffsetDateTime::now_utc();
        let updated = model
            .stamp(FieldKind::Updated, now)?
            .zip(model.field(FieldKind::Updated).map(ModelField::name));
        let created_column = model.field(FieldKind::Created).map(ModelField::name);
        criteria.model = Some(model);
        let result = self.upsert(criteria, now);
        let upsert = self.record(result)?;
        if upsert.inserted && upsert.id != 0 && pk.value.is_integer() {
            entity.set_value(pk.name, Value::Int64(Some(upsert.id)))?;
        }
        if let Some((value, column)) = updated {
            entity.set_value(column, value)?;
        }
        if let Some((value, column)) = upsert.created.zip(created_column) {
            entity.set_value(column, value)?;
        }
        Ok(upsert.affected)
    }

    fn upsert(&mut self, mut criteria: Criteria, now: OffsetDateTime) -> Result<Upsert> {
        let dialect = self.dialect.clone();
        let pk_zero = criteria.model.as_ref().is_none_or(Model::pk_zero);
        let has_values = criteria
            .model
            .as_ref()
            .is_some_and(|m| m.fields.iter().any(|f| !f.def.primary_key));
        if !pk_zero && !has_values {
            log::debug!("Nothing to update besides the primary key, inserting instead");
        } else if !pk_zero {
            let pristine = criteria.clone();
            criteria.merge_pk_condition(&*dialect);
            let affected = dialect.update(self.executor()?, &criteria)?;
            if affected > 0 {
                return Ok(Upsert {
                    affected,
                    id: 0,
                    inserted: false,
                    created: None,
                });
            }
            log::debug!("Update matched nothing, inserting instead");
            criteria = pristine;
        }
        let created = match criteria.model.as_mut() {
            Some(model) => model.stamp(FieldKind::Created, now)?,
            None => None,
        };
        let id = dialect.insert(self.executor()?, &criteria)?;
        Ok(Upsert {
            affected: 1,
            id,
            inserted: true,
            created,
        })
    }

    /// Updates the rows selected by the primary key of `entity` and the current filter with the
    /// values of `entity`. Fails without touching the database when `E` has no primary key, or
    /// when the key is zero and no filter is set.
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<u64> {
        let mut criteria = self.take_criteria();
        entity.validate(self)?;
        let model = Model::new(entity, false, &criteria.omit_fields);
        if model.pk().is_none() {
            return Err(Error::usage(format!(
                "Cannot update `{}`: it has no primary key",
                model.table
            )));
        }
        criteria.model = Some(model);
        let dialect = self.dialect.clone();
        criteria.merge_pk_condition(&*dialect);
        if criteria.condition.is_none() {
            return Err(Error::usage(format!(
                "Cannot update `{}` without a primary key or a condition",
                E::table_name()
            )));
        }
        let result = self
            .executor()
            .and_then(|executor| dialect.update(executor, &criteria));
        self.record(result)
    }

    /// Deletes the rows selected by the primary key of `entity` and the current filter. Fails
    /// without touching the database when `E` has no primary key, or when the key is zero and no
    /// filter is set.
    pub fn delete<E: Entity>(&mut self, entity: &E) -> Result<u64> {
        let mut criteria = self.take_criteria();
        let model = Model::new(entity, false, &criteria.omit_fields);
        if model.pk().is_none() {
            return Err(Error::usage(format!(
                "Cannot delete from `{}`: it has no primary key",
                model.table
            )));
        }
        criteria.model = Some(model);
        let dialect = self.dialect.clone();
        criteria.merge_pk_condition(&*dialect);
        if criteria.condition.is_none() {
            return Err(Error::usage(format!(
                "Cannot delete from `{}` without a primary key or a condition",
                E::table_name()
            )));
        }
        let result = self
            .executor()
            .and_then(|executor| dialect.delete(executor, &criteria));
        self.record(result)
    }

    /// Whether the table of `E` has a row whose `column` equals `value`.
    pub fn contains_value<E: Entity>(
        &mut self,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<bool> {
        self.contains_value_in(E::table_name(), column, value)
    }

    pub fn contains_value_in(
        &mut self,
        table: &str,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<bool> {
        let column = self.dialect.quote(column);
        let mut sql = format!(
            "SELECT {column}\nFROM {}\nWHERE {column} = ?",
            self.dialect.quote(table)
        );
        self.dialect.write_limit_offset(&mut sql, Some(1), None);
        sql.push(';');
        match self.query_row(&sql, &[value.into()]) {
            Ok(..) => Ok(true),
            Err(Error::NoRows) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Runs a raw statement written with `?` markers.
    pub fn exec(&mut self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.reset();
        let (sql, args) = self.dialect.finish(sql.to_owned(), args.to_vec());
        log_query(&sql, &args);
        let result = self
            .executor()
            .and_then(|executor| executor.execute(&sql, &args));
        self.record(result)
    }

    /// Runs a raw query written with `?` markers.
    pub fn query(&mut self, sql: &str, args: &[Value]) -> Result<Rows> {
        let result = self.raw_query(sql, args);
        self.record(result)
    }

    /// First row of a raw query, [`Error::NoRows`] if there is none.
    pub fn query_row(&mut self, sql: &str, args: &[Value]) -> Result<RowLabeled> {
        let result = self
            .raw_query(sql, args)
            .and_then(|mut rows| rows.next().ok_or(Error::NoRows));
        self.record(result)
    }

    fn raw_query(&mut self, sql: &str, args: &[Value]) -> Result<Rows> {
        self.reset();
        let (sql, args) = self.dialect.finish(sql.to_owned(), args.to_vec());
        self.fetch(&sql, &args)
    }

    /// Prepares a raw statement on the current connection or transaction. Arguments given to the
    /// statement reach the driver unconverted.
    pub fn prepare(&mut self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        self.reset();
        let sql = self.dialect.substitute_markers(sql);
        log::debug!("Preparing {}", truncate_long!(sql));
        let in_transaction = self.transaction.is_some();
        let Session {
            connection,
            transaction,
            first_tx_error,
            ..
        } = self;
        let executor: &mut dyn Executor = match (transaction, connection) {
            (Some(transaction), _) => transaction,
            (None, Some(connection)) => connection,
            (None, None) => return Err(Error::usage("The session is closed")),
        };
        executor
            .prepare(&sql)
            .inspect_err(|e| remember(first_tx_error, in_transaction, e))
    }

    /// Opens a transaction, every following statement runs inside it.
    pub fn begin(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(Error::usage("Cannot start a nested transaction"));
        }
        let Some(connection) = self.connection.as_mut() else {
            return Err(Error::usage("The session is closed"));
        };
        self.first_tx_error = None;
        self.transaction = Some(connection.begin()?);
        log::debug!("Transaction started");
        Ok(())
    }

    /// Commits the transaction. Returns the first error that happened inside it, if any, even
    /// when the commit itself succeeds.
    pub fn commit(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.take() else {
            return Err(Error::usage("No transaction to commit"));
        };
        let result = transaction.commit();
        if let Err(e) = &result {
            remember(&mut self.first_tx_error, true, e);
        }
        match self.first_tx_error.take() {
            Some(error) => Err(error),
            None => result,
        }
    }

    /// Rolls the transaction back, returning only the outcome of the rollback itself.
    pub fn rollback(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.take() else {
            return Err(Error::usage("No transaction to roll back"));
        };
        self.first_tx_error = None;
        transaction.rollback().inspect_err(|e| log::error!("{}", e))
    }

    /// Releases the connection: back to the pool when the session has one with room left, closed
    /// otherwise. An open transaction is rolled back first. Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        self.reset();
        if let Some(transaction) = self.transaction.take() {
            log::warn!("Closing a session with an open transaction, rolling it back");
            if let Err(e) = transaction.rollback() {
                log::error!("{}", e);
            }
        }
        self.first_tx_error = None;
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        match &self.pool {
            Some(pool) => pool.put(connection),
            None => connection.close(),
        }
    }

    fn take_criteria(&mut self) -> Criteria {
        mem::take(&mut self.criteria)
    }

    fn executor(&mut self) -> Result<&mut dyn Executor> {
        if let Some(transaction) = self.transaction.as_mut() {
            return Ok(transaction as &mut dyn Executor);
        }
        match self.connection.as_mut() {
            Some(connection) => Ok(connection as &mut dyn Executor),
            None => Err(Error::usage("The session is closed")),
        }
    }

    fn fetch(&mut self, sql: &str, args: &[Value]) -> Result<Rows> {
        log_query(sql, args);
        self.executor()?.fetch(sql, args)
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            remember(&mut self.first_tx_error, self.transaction.is_some(), e);
        }
        result
    }
}

fn remember(slot: &mut Option<Error>, in_transaction: bool, error: &Error) {
    if !in_transaction || error.is_no_rows() {
        return;
    }
    log::error!("Inside a transaction: {}", error);
    if slot.is_none() {
        *slot = Some(error.clone());
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("While closing the session: {}", e);
        }
    }
}
