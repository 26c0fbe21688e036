#![allow(dead_code)]

use quarry::{
    Connection, Error, Executor, Result, Row, Rows, RowsAffected, Statement, Transaction, Value,
};
use std::{
    collections::VecDeque,
    env,
    sync::{Arc, Mutex, MutexGuard},
};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(log::LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub enum Response {
    Rows(Vec<String>, Vec<Vec<Value>>),
    Affected(RowsAffected),
    Fail(String),
}

#[derive(Default)]
pub struct Script {
    /// Every statement received, with its arguments.
    pub log: Vec<(String, Vec<Value>)>,
    pub responses: VecDeque<Response>,
}

/// Connection answering with scripted responses, in order. Without a scripted response queries
/// return no rows and statements affect nothing.
#[derive(Clone, Default)]
pub struct MockConnection {
    pub script: Arc<Mutex<Script>>,
}

impl MockConnection {
    pub fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn push_rows(&self, labels: &[&str], rows: Vec<Vec<Value>>) -> &Self {
        self.script().responses.push_back(Response::Rows(
            labels.iter().map(|v| v.to_string()).collect(),
            rows,
        ));
        self
    }

    pub fn push_affected(&self, rows_affected: u64, last_affected_id: Option<i64>) -> &Self {
        self.script()
            .responses
            .push_back(Response::Affected(RowsAffected {
                rows_affected,
                last_affected_id,
            }));
        self
    }

    pub fn push_failure(&self, message: &str) -> &Self {
        self.script()
            .responses
            .push_back(Response::Fail(message.into()));
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.script().log.iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn args(&self, index: usize) -> Vec<Value> {
        self.script().log[index].1.clone()
    }

    fn record(&self, sql: &str, args: &[Value]) -> Option<Response> {
        let mut script = self.script();
        script.log.push((sql.to_owned(), args.to_vec()));
        script.responses.pop_front()
    }

    fn note(&self, sql: &str) {
        self.script().log.push((sql.to_owned(), Vec::new()));
    }
}

pub struct MockStatement {
    connection: MockConnection,
    sql: String,
}

impl Statement for MockStatement {
    fn query(&mut self, args: &[Value]) -> Result<Rows> {
        match self.connection.record(&self.sql, args) {
            None => Ok(Rows::empty()),
            Some(Response::Rows(labels, rows)) => Ok(Rows::new(
                labels.into(),
                rows.into_iter().map(Row::from).collect(),
            )),
            Some(Response::Affected(..)) => Err(Error::msg("Expected a statement, got a query")),
            Some(Response::Fail(message)) => Err(Error::msg(message)),
        }
    }

    fn execute(&mut self, args: &[Value]) -> Result<RowsAffected> {
        match self.connection.record(&self.sql, args) {
            None => Ok(RowsAffected::default()),
            Some(Response::Affected(affected)) => Ok(affected),
            Some(Response::Rows(..)) => Err(Error::msg("Expected a query, got a statement")),
            Some(Response::Fail(message)) => Err(Error::msg(message)),
        }
    }
}

impl Executor for MockConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        Ok(Box::new(MockStatement {
            connection: self.clone(),
            sql: sql.to_owned(),
        }))
    }
}

pub struct MockTransaction(MockConnection);

impl Executor for MockTransaction {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        self.0.prepare(sql)
    }
}

impl Transaction for MockTransaction {
    fn commit(self) -> Result<()> {
        self.0.note("COMMIT");
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.0.note("ROLLBACK");
        Ok(())
    }
}

impl Connection for MockConnection {
    type Transaction = MockTransaction;

    fn connect(_url: &str) -> Result<Self> {
        Ok(Self::default())
    }

    fn begin(&mut self) -> Result<Self::Transaction> {
        self.note("BEGIN");
        Ok(MockTransaction(self.clone()))
    }

    fn close(self) -> Result<()> {
        self.note("CLOSE");
        Ok(())
    }
}
