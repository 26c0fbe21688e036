#![allow(dead_code)]

use log::LevelFilter;
use quarry::{Entity, Result, Session};
use quarry_sqlite::{SqliteConnection, SqliteDialect};
use rust_decimal::Decimal;
use std::{env, sync::Arc};
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub born: Option<Date>,
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    #[quarry(join = "author_id")]
    pub author: Option<Author>,
    pub price: Option<Decimal>,
    pub isbn: Option<Uuid>,
    pub available: bool,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<PrimitiveDateTime>,
}

pub const SCHEMA: &str = r#"
CREATE TABLE author (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    born TEXT
);
CREATE TABLE book (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES author(id),
    price TEXT,
    isbn TEXT,
    available INTEGER NOT NULL DEFAULT 0,
    created_at TEXT,
    updated_at TEXT
);
"#;

pub fn connect(url: &str) -> Result<SqliteConnection> {
    let mut connection = <SqliteConnection as quarry::Connection>::connect(url)?;
    connection.execute_batch(SCHEMA)?;
    Ok(connection)
}

pub fn memory_session() -> Session<SqliteConnection> {
    init_logs();
    let connection = connect("sqlite://:memory:").expect("Could not open the database");
    Session::new(connection, Arc::new(SqliteDialect::new()))
}
