#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quarry::{Assignment, GenericSqlWriter, Op, Query, SqlWriter, Value};
    use quarry_mysql::MySQLSqlWriter;
    use std::collections::BTreeMap;

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();
    const MYSQL: MySQLSqlWriter = MySQLSqlWriter::new();

    fn row(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn insert_lists_the_first_rows_columns_alphabetically() {
        let rows = [row(&[
            ("name", Value::from("Ada")),
            ("email", Value::from("ada@example.com")),
        ])];
        let statement = WRITER
            .compile_insert(&Query::table("users"), &rows)
            .expect("Failed to compile the insert");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "users" ("email", "name") VALUES
                (?, ?)
            "#}
            .trim()
        );
        assert_eq!(
            statement.bindings,
            [
                Value::Varchar(Some("ada@example.com".into())),
                Value::Varchar(Some("Ada".into())),
            ]
        );
    }

    #[test]
    fn rows_missing_a_column_bind_null_in_its_place() {
        let rows = [
            row(&[
                ("email", Value::from("ada@example.com")),
                ("name", Value::from("Ada")),
            ]),
            row(&[("name", Value::from("Grace"))]),
        ];
        let statement = WRITER
            .compile_insert(&Query::table("users"), &rows)
            .expect("Failed to compile the insert");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "users" ("email", "name") VALUES
                (?, ?),
                (?, ?)
            "#}
            .trim()
        );
        assert_eq!(statement.bindings[2], Value::Null);
        assert_eq!(statement.bindings[3], Value::Varchar(Some("Grace".into())));
    }

    #[test]
    fn inserts_without_material_are_rejected() {
        let error = WRITER
            .compile_insert(&Query::table("users"), &[])
            .expect_err("Zero rows must not compile");
        assert!(error.to_string().contains("zero rows"));
        let error = WRITER
            .compile_insert(&Query::table("users"), &[BTreeMap::new()])
            .expect_err("A row with no columns must not compile");
        assert!(error.to_string().contains("no columns"));
        let error = WRITER
            .compile_insert(&Query::default(), &[row(&[("a", Value::from(1))])])
            .expect_err("An insert without a table must not compile");
        assert!(error.to_string().contains("table"));
    }

    #[test]
    fn update_writes_assignments_in_declaration_order() {
        let values = [
            Assignment::Step {
                column: "balance".into(),
                amount: Value::from(25),
                negative: true,
            },
            Assignment::Set {
                column: "status".into(),
                value: Value::from("debited"),
            },
        ];
        let query = Query::table("accounts").and_where("id", Op::Eq, 9);
        let statement = WRITER
            .compile_update(&query, &values)
            .expect("Failed to compile the update");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                UPDATE "accounts"
                SET "balance" = "balance" - ?, "status" = ?
                WHERE "id" = ?
            "#}
            .trim()
        );
        assert_eq!(
            statement.bindings,
            [
                Value::Int32(Some(25)),
                Value::Varchar(Some("debited".into())),
                Value::Int32(Some(9)),
            ]
        );
    }

    #[test]
    fn update_guards_its_preconditions() {
        let set = [Assignment::Set {
            column: "a".into(),
            value: Value::from(1),
        }];
        let error = WRITER
            .compile_update(&Query::table("users"), &[])
            .expect_err("An update without assignments must not compile");
        assert!(error.to_string().contains("assignment"));
        let joined = Query::table("users").join("posts", "posts.user_id", Op::Eq, "users.id");
        let error = WRITER
            .compile_update(&joined, &set)
            .expect_err("An update over a join must not compile");
        assert!(error.to_string().contains("join"));
        let error = WRITER
            .compile_update(&Query::default(), &set)
            .expect_err("An update without a table must not compile");
        assert!(error.to_string().contains("table"));
    }

    #[test]
    fn delete_keeps_its_wheres_and_nothing_else() {
        let query = Query::table("sessions").and_where("expired", Op::Eq, true);
        let statement = WRITER
            .compile_delete(&query)
            .expect("Failed to compile the delete");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                DELETE FROM "sessions"
                WHERE "expired" = ?
            "#}
            .trim()
        );
        assert_eq!(statement.bindings, [Value::Boolean(Some(true))]);

        let statement = WRITER
            .compile_delete(&Query::table("sessions"))
            .expect("Failed to compile the delete");
        assert_eq!(statement.sql, "DELETE FROM \"sessions\"");
    }

    #[test]
    fn delete_refuses_joins() {
        let query = Query::table("users").join("posts", "posts.user_id", Op::Eq, "users.id");
        let error = WRITER
            .compile_delete(&query)
            .expect_err("A delete over a join must not compile");
        assert!(error.to_string().contains("join"));
    }

    #[test]
    fn savepoints_compile_to_bare_statements() {
        let statement = WRITER.compile_savepoint("sp_1");
        assert_eq!(statement.sql, "SAVEPOINT sp_1");
        assert!(statement.bindings.is_empty());
        assert_eq!(
            WRITER.compile_savepoint_rollback("sp_2").sql,
            "ROLLBACK TO SAVEPOINT sp_2"
        );
        assert_eq!(
            WRITER.compile_savepoint_release("sp_2").sql,
            "RELEASE SAVEPOINT sp_2"
        );
    }

    #[test]
    fn mysql_writes_the_same_statements_with_backticks() {
        let rows = [row(&[("name", Value::from("Ada"))])];
        let statement = MYSQL
            .compile_insert(&Query::table("users"), &rows)
            .expect("Failed to compile the insert");
        assert_eq!(
            statement.sql,
            indoc! {"
                INSERT INTO `users` (`name`) VALUES
                (?)
            "}
            .trim()
        );
    }
}
