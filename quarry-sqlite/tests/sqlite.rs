mod common;

#[cfg(test)]
mod tests {
    use crate::common::{Author, Book, init_logs, memory_session};
    use quarry::{Error, Pool, values};
    use quarry_sqlite::{SqliteConnection, SqliteDialect};
    use rust_decimal::Decimal;
    use std::{fs, str::FromStr, sync::Arc};
    use time::macros::date;
    use uuid::Uuid;

    #[test]
    fn save_find_update_delete() {
        let mut session = memory_session();
        let mut author = Author {
            name: "Ursula".into(),
            born: Some(date!(1929 - 10 - 21)),
            ..Default::default()
        };
        assert_eq!(session.save(&mut author).unwrap(), 1);
        assert_eq!(author.id, 1);

        let isbn = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let mut book = Book {
            title: "The Dispossessed".into(),
            author_id: author.id,
            price: Some(Decimal::from_str("12.50").unwrap()),
            isbn: Some(isbn),
            available: true,
            ..Default::default()
        };
        session.save(&mut book).unwrap();
        assert_eq!(book.id, 1);
        assert!(book.created_at.is_some());
        assert!(book.updated_at.is_some());

        let mut found = Book {
            id: book.id,
            ..Default::default()
        };
        session.find(&mut found).unwrap();
        assert_eq!(found.title, "The Dispossessed");
        assert_eq!(found.price, book.price);
        assert_eq!(found.isbn, Some(isbn));
        assert!(found.available);
        assert_eq!(found.created_at, book.created_at);
        assert_eq!(found.author.as_ref(), Some(&author));

        let mut plain = Book {
            id: book.id,
            ..Default::default()
        };
        session.omit_join().find(&mut plain).unwrap();
        assert!(plain.author.is_none());

        book.title = "The Left Hand of Darkness".into();
        book.available = false;
        assert_eq!(session.update(&book).unwrap(), 1);
        let mut found = Book {
            id: book.id,
            ..Default::default()
        };
        session.find(&mut found).unwrap();
        assert_eq!(found.title, "The Left Hand of Darkness");
        assert!(!found.available);

        assert_eq!(session.delete(&book).unwrap(), 1);
        assert!(matches!(session.find(&mut found), Err(Error::NoRows)));
    }

    #[test]
    fn find_all_filters_and_orders() {
        let mut session = memory_session();
        let mut author = Author {
            name: "Italo".into(),
            ..Default::default()
        };
        session.save(&mut author).unwrap();
        for title in ["Invisible Cities", "Cosmicomics", "Mr. Palomar"] {
            session
                .save(&mut Book {
                    title: title.into(),
                    author_id: author.id,
                    ..Default::default()
                })
                .unwrap();
        }
        let mut books = Vec::<Book>::new();
        session
            .filter("\"book\".\"title\" <> ?", values!["Cosmicomics"])
            .order_by("book.title")
            .find_all(&mut books)
            .unwrap();
        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Invisible Cities", "Mr. Palomar"]);
        assert!(books.iter().all(|b| b.author.as_ref() == Some(&author)));

        let mut books = Vec::<Book>::new();
        session
            .order_by_desc("book.id")
            .offset(1)
            .find_all(&mut books)
            .unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Cosmicomics");

        assert!(session.contains_value::<Book>("title", "Cosmicomics").unwrap());
        assert!(!session.contains_value::<Book>("title", "Baron").unwrap());
    }

    #[test]
    fn save_with_preset_key_inserts() {
        let mut session = memory_session();
        let mut author = Author {
            id: 100,
            name: "Stanislaw".into(),
            ..Default::default()
        };
        assert_eq!(session.save(&mut author).unwrap(), 1);
        assert_eq!(author.id, 100);
        author.name = "Stanisław".into();
        assert_eq!(session.save(&mut author).unwrap(), 1);
        let mut authors = Vec::<Author>::new();
        session.find_all(&mut authors).unwrap();
        assert_eq!(authors, [author]);
    }

    #[test]
    fn transactions() {
        let mut session = memory_session();
        session.begin().unwrap();
        session
            .save(&mut Author {
                name: "Rolled back".into(),
                ..Default::default()
            })
            .unwrap();
        session.rollback().unwrap();
        let mut authors = Vec::<Author>::new();
        session.find_all(&mut authors).unwrap();
        assert!(authors.is_empty());

        session.begin().unwrap();
        assert!(session.exec("INSERT INTO missing VALUES (1)", &[]).is_err());
        session
            .save(&mut Author {
                name: "Kept".into(),
                ..Default::default()
            })
            .unwrap();
        let error = session.commit().unwrap_err();
        assert!(error.to_string().contains("missing"));
        session.find_all(&mut authors).unwrap();
        assert_eq!(authors.len(), 1);

        session.begin().unwrap();
        session
            .save(&mut Author {
                name: "Dropped".into(),
                ..Default::default()
            })
            .unwrap();
        session.close().unwrap();
    }

    #[test]
    fn raw_queries() {
        let mut session = memory_session();
        let inserted = session
            .exec(
                "INSERT INTO author (name, born) VALUES (?, ?), (?, NULL)",
                &values!["A", date!(2000 - 01 - 01), "B"],
            )
            .unwrap();
        assert_eq!(inserted.rows_affected, 2);
        assert_eq!(inserted.last_affected_id, Some(2));
        let row = session
            .query_row("SELECT count(*) AS n FROM author WHERE born IS NULL", &[])
            .unwrap();
        assert_eq!(row.values()[0], quarry::Value::Int64(Some(1)));
        let rows = session
            .query("SELECT name FROM author ORDER BY name", &[])
            .unwrap();
        assert_eq!(rows.len(), 2);
        let mut statement = session
            .prepare("UPDATE author SET name = ? WHERE name = ?")
            .unwrap();
        let affected = statement
            .execute(&values!["C", "B"])
            .unwrap();
        assert_eq!(affected.rows_affected, 1);
        drop(statement);
        let renamed = session
            .exec("UPDATE author SET name = ? WHERE name = ?", &values!["D", "C"])
            .unwrap();
        assert_eq!(renamed.rows_affected, 1);
        assert_eq!(renamed.last_affected_id, None);
    }

    #[test]
    fn pooled_sessions_share_the_file() {
        init_logs();
        let path = std::env::temp_dir().join("quarry_pooled_sessions.sqlite");
        let _ = fs::remove_file(&path);
        let url = format!("sqlite://{}?mode=rwc", path.display());
        crate::common::connect(&url).unwrap();

        let pool = Arc::new(Pool::<SqliteConnection>::new(2));
        let dialect = Arc::new(SqliteDialect::new());
        {
            let mut session = pool.session(&url, dialect.clone()).unwrap();
            session
                .save(&mut Author {
                    name: "Pooled".into(),
                    ..Default::default()
                })
                .unwrap();
        }
        assert_eq!(pool.len(), 1);
        let mut session = pool.session(&url, dialect).unwrap();
        assert!(pool.is_empty());
        let mut author = Author {
            id: 1,
            ..Default::default()
        };
        session.find(&mut author).unwrap();
        assert_eq!(author.name, "Pooled");
        session.close().unwrap();
        pool.drain().unwrap();
        let _ = fs::remove_file(&path);
    }
}
