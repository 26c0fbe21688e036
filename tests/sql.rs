mod resource {
    pub mod blog;
}

#[cfg(test)]
mod tests {
    use crate::resource::blog::{Post, User, Visit};
    use indoc::indoc;
    use quarry::{Condition, Criteria, Dialect, GenericDialect, Model, Order, Value, values};

    const DIALECT: GenericDialect = GenericDialect::new();

    fn criteria(model: Model) -> Criteria {
        Criteria {
            model: Some(model),
            ..Default::default()
        }
    }

    #[test]
    fn select_with_join() {
        let post = Post {
            id: 3,
            ..Default::default()
        };
        let mut criteria = criteria(Model::new(&post, true, &[]));
        criteria.condition = Some(Condition::new("title = ?", values!["x"]));
        criteria.limit = Some(1);
        criteria.merge_pk_condition(&DIALECT);
        let (sql, args) = DIALECT.query_sql(&criteria).unwrap();
        assert_eq!(
            sql,
            indoc! {r#"
                SELECT "post"."id", "post"."title", "post"."author_id", "post"."created", "post"."updated", "author"."id" AS "author___id", "author"."name" AS "author___name", "author"."email" AS "author___email"
                FROM "post"
                LEFT JOIN "user" AS "author" ON "post"."author_id" = "author"."id"
                WHERE ("post"."id" = ?) AND (title = ?)
                LIMIT 1;
            "#}
            .trim()
        );
        assert_eq!(args, values![3i64, "x"]);
    }

    #[test]
    fn select_without_join() {
        let mut criteria = criteria(Model::new(&User::default(), true, &["email".into()]));
        criteria.condition = Some(Condition::equal("name", "Ann").or_equal("name", "Bob"));
        criteria.order_by = vec![
            Order {
                path: "name".into(),
                descending: true,
            },
            Order {
                path: "user.id".into(),
                descending: false,
            },
        ];
        criteria.limit = Some(10);
        criteria.offset = Some(20);
        let (sql, args) = DIALECT.query_sql(&criteria).unwrap();
        assert_eq!(
            sql,
            indoc! {r#"
                SELECT "id", "name"
                FROM "user"
                WHERE "name" = ? OR "name" = ?
                ORDER BY "name" DESC, "user"."id"
                LIMIT 10
                OFFSET 20;
            "#}
            .trim()
        );
        assert_eq!(args, values!["Ann", "Bob"]);
    }

    #[test]
    fn insert_skips_zero_primary_key() {
        let user = User {
            id: 0,
            name: "Ann".into(),
            email: None,
        };
        let (sql, args) = DIALECT
            .insert_sql(&criteria(Model::new(&user, false, &[])))
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "user" ("name", "email") VALUES (?, ?);"#);
        assert_eq!(args, vec![Value::Varchar(Some("Ann".into())), Value::Varchar(None)]);

        let user = User { id: 9, ..user };
        let (sql, args) = DIALECT
            .insert_sql(&criteria(Model::new(&user, false, &[])))
            .unwrap();
        assert_eq!(
            sql,
            r#"INSERT INTO "user" ("id", "name", "email") VALUES (?, ?, ?);"#
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn update_and_delete() {
        let user = User {
            id: 5,
            name: "Ann".into(),
            email: Some("ann@example.com".into()),
        };
        let mut criteria = criteria(Model::new(&user, false, &[]));
        criteria.merge_pk_condition(&DIALECT);
        let (sql, args) = DIALECT.update_sql(&criteria).unwrap();
        assert_eq!(
            sql,
            indoc! {r#"
                UPDATE "user" SET "name" = ?, "email" = ?
                WHERE "user"."id" = ?;
            "#}
            .trim()
        );
        assert_eq!(args, values!["Ann", "ann@example.com", 5i64]);

        let (sql, args) = DIALECT.delete_sql(&criteria).unwrap();
        assert_eq!(
            sql,
            indoc! {r#"
                DELETE FROM "user"
                WHERE "user"."id" = ?;
            "#}
            .trim()
        );
        assert_eq!(args, values![5i64]);
    }

    #[test]
    fn refuses_unconstrained_writes() {
        let criteria = criteria(Model::new(&Visit::default(), false, &[]));
        assert!(DIALECT.update_sql(&criteria).unwrap_err().is_usage());
        assert!(DIALECT.delete_sql(&criteria).unwrap_err().is_usage());
        assert!(DIALECT.query_sql(&Criteria::default()).unwrap_err().is_usage());
    }

    #[test]
    fn unbalanced_condition() {
        let mut criteria = criteria(Model::new(&Visit::default(), false, &[]));
        criteria.condition = Some(Condition::Expr {
            sql: "hits > ? AND path = ?".into(),
            args: values![1u32],
        });
        assert!(DIALECT.query_sql(&criteria).unwrap_err().is_usage());
    }

    #[test]
    fn insert_default_values() {
        let criteria = criteria(Model::new(&Visit::default(), false, &["path".into(), "hits".into()]));
        let (sql, args) = DIALECT.insert_sql(&criteria).unwrap();
        assert_eq!(sql, r#"INSERT INTO "visit" DEFAULT VALUES;"#);
        assert!(args.is_empty());
    }
}
