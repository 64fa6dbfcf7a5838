#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quarry::{Aggregate, AggregateFunction, GenericSqlWriter, Op, Query, SqlWriter, Value};
    use quarry_mysql::MySQLSqlWriter;
    use quarry_sqlite::SQLiteSqlWriter;

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();
    const SQLITE: SQLiteSqlWriter = SQLiteSqlWriter::new();
    const MYSQL: MySQLSqlWriter = MySQLSqlWriter::new();

    #[test]
    fn select_star() {
        let statement = WRITER
            .compile_select(&Query::table("users"))
            .expect("Failed to compile the select");
        assert_eq!(statement.sql, "SELECT *\nFROM \"users\"");
        assert!(statement.bindings.is_empty());
    }

    #[test]
    fn select_columns_aliases_and_qualified_paths() {
        let query = Query::table("users").select(["id", "name as label", "users.email", "posts.*"]);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "id", "name" AS "label", "users"."email", "posts".*
                FROM "users"
            "#}
            .trim()
        );
    }

    #[test]
    fn where_clauses_bind_in_writing_order() {
        let query = Query::table("users")
            .and_where("active", Op::Eq, true)
            .or_where("age", Op::Gt, 30)
            .where_null("deleted_at")
            .where_in("role", ["admin", "editor"])
            .where_between("score", 1, 10);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT *
                FROM "users"
                WHERE "active" = ? OR "age" > ? AND "deleted_at" IS NULL AND "role" IN (?, ?) AND "score" BETWEEN ? AND ?
            "#}
            .trim()
        );
        assert_eq!(
            statement.bindings,
            [
                Value::Boolean(Some(true)),
                Value::Int32(Some(30)),
                Value::Varchar(Some("admin".into())),
                Value::Varchar(Some("editor".into())),
                Value::Int32(Some(1)),
                Value::Int32(Some(10)),
            ]
        );
    }

    #[test]
    fn comparing_against_null_becomes_a_null_check() {
        let query = Query::table("users")
            .and_where("deleted_at", Op::Eq, Value::Null)
            .and_where("email", Op::Ne, Value::Null);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT *
                FROM "users"
                WHERE "deleted_at" IS NULL AND "email" IS NOT NULL
            "#}
            .trim()
        );
        assert!(statement.bindings.is_empty());
    }

    #[test]
    fn empty_in_lists_compile_to_constant_predicates() {
        let query = Query::table("users")
            .where_in("id", Vec::<i64>::new())
            .where_not_in("role", Vec::<String>::new());
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT *
                FROM "users"
                WHERE 0 = 1 AND 1 = 1
            "#}
            .trim()
        );
        assert!(statement.bindings.is_empty());
    }

    #[test]
    fn nested_groups_parenthesize_and_empty_ones_vanish() {
        let query = Query::table("users")
            .and_where("tenant", Op::Eq, 7)
            .where_nested(|q| q.and_where("a", Op::Eq, 1).or_where("b", Op::Eq, 2))
            .where_nested(|q| q);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT *
                FROM "users"
                WHERE "tenant" = ? AND ("a" = ? OR "b" = ?)
            "#}
            .trim()
        );
        assert_eq!(
            statement.bindings,
            [
                Value::Int32(Some(7)),
                Value::Int32(Some(1)),
                Value::Int32(Some(2)),
            ]
        );
    }

    #[test]
    fn raw_fragments_pass_through_untouched() {
        let query = Query::table("users")
            .select(["id"])
            .select_raw("count(*) over () as total", vec![])
            .where_raw("length(name) > ?", vec![Value::from(3)]);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "id", count(*) over () as total
                FROM "users"
                WHERE length(name) > ?
            "#}
            .trim()
        );
        assert_eq!(statement.bindings, [Value::Int32(Some(3))]);
    }

    #[test]
    fn joins_carry_their_on_conditions() {
        let query = Query::table("users")
            .join("posts", "posts.user_id", Op::Eq, "users.id")
            .join_where("posts.published", Op::Eq, true)
            .left_join("avatars", "avatars.user_id", Op::Eq, "users.id");
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT *
                FROM "users"
                INNER JOIN "posts" ON "posts"."user_id" = "users"."id" AND "posts"."published" = ?
                LEFT JOIN "avatars" ON "avatars"."user_id" = "users"."id"
            "#}
            .trim()
        );
        assert_eq!(statement.bindings, [Value::Boolean(Some(true))]);
    }

    #[test]
    fn grouping_ordering_and_paging_follow_the_wheres() {
        let query = Query::table("orders")
            .select(["customer_id"])
            .and_where("paid", Op::Eq, true)
            .group_by(["customer_id"])
            .having("customer_id", Op::Gt, 10)
            .order_by("customer_id")
            .order_by_desc("customer_id")
            .limit(5)
            .offset(10);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "customer_id"
                FROM "orders"
                WHERE "paid" = ?
                GROUP BY "customer_id"
                HAVING "customer_id" > ?
                ORDER BY "customer_id" ASC, "customer_id" DESC
                LIMIT 5
                OFFSET 10
            "#}
            .trim()
        );
    }

    #[test]
    fn bare_offsets_get_the_dialect_filler() {
        let query = Query::table("logs").offset(30);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(statement.sql, "SELECT *\nFROM \"logs\"\nOFFSET 30");
        let statement = SQLITE
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(statement.sql, "SELECT *\nFROM \"logs\"\nLIMIT -1\nOFFSET 30");
        let statement = MYSQL
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            "SELECT *\nFROM `logs`\nLIMIT 18446744073709551615\nOFFSET 30"
        );
    }

    #[test]
    fn sqlite_refuses_having_without_group_by() {
        let query = Query::table("orders").having("total", Op::Gt, 10);
        let error = SQLITE
            .compile_select(&query)
            .expect_err("HAVING without GROUP BY must not compile here");
        assert!(error.to_string().contains("GROUP BY"));
        WRITER
            .compile_select(&query)
            .expect("The portable grammar accepts a bare HAVING");
    }

    #[test]
    fn aggregates_replace_the_column_list() {
        let mut query = Query::table("orders").and_where("paid", Op::Eq, true);
        query.aggregate = Some(Aggregate {
            function: AggregateFunction::Count,
            column: "*".into(),
        });
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the count");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT COUNT(*) AS "aggregate"
                FROM "orders"
                WHERE "paid" = ?
            "#}
            .trim()
        );

        let mut query = Query::table("orders").distinct();
        query.aggregate = Some(Aggregate {
            function: AggregateFunction::Sum,
            column: "amount".into(),
        });
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the sum");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT SUM(DISTINCT "amount") AS "aggregate"
                FROM "orders"
            "#}
            .trim()
        );
    }

    #[test]
    fn unions_chain_and_the_base_ordering_closes_them() {
        let query = Query::table("archived")
            .select(["id"])
            .union_all(Query::table("live").select(["id"]))
            .order_by("id")
            .limit(10);
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the union");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                (SELECT "id"
                FROM "archived")
                UNION ALL
                (SELECT "id"
                FROM "live")
                ORDER BY "id" ASC
                LIMIT 10
            "#}
            .trim()
        );

        let statement = SQLITE
            .compile_select(&query)
            .expect("Failed to compile the union");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT * FROM (SELECT "id"
                FROM "archived")
                UNION ALL
                SELECT * FROM (SELECT "id"
                FROM "live")
                ORDER BY "id" ASC
                LIMIT 10
            "#}
            .trim()
        );
    }

    #[test]
    fn union_members_keep_their_own_ordering_inside() {
        let query = Query::table("a")
            .select(["id"])
            .union(Query::table("b").select(["id"]).order_by_desc("id").limit(1));
        let statement = WRITER
            .compile_select(&query)
            .expect("Failed to compile the union");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                (SELECT "id"
                FROM "a")
                UNION
                (SELECT "id"
                FROM "b"
                ORDER BY "id" DESC
                LIMIT 1)
            "#}
            .trim()
        );
    }

    #[test]
    fn nested_unions_are_rejected() {
        let inner = Query::table("a").union(Query::table("b"));
        let error = WRITER
            .compile_select(&Query::table("outer_table").union(inner))
            .expect_err("A union inside a union member must not compile");
        assert!(error.to_string().contains("chaining"));
    }

    #[test]
    fn the_prefix_lands_on_tables_and_qualifiers_only() {
        let writer = GenericSqlWriter::with_prefix("app_");
        let query = Query::table("users")
            .select(["users.id as key", "name"])
            .and_where("active", Op::Eq, true);
        let statement = writer
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "app_users"."id" AS "key", "name"
                FROM "app_users"
                WHERE "active" = ?
            "#}
            .trim()
        );
    }

    #[test]
    fn mysql_quotes_with_backticks() {
        let query = Query::table("users").select(["id", "users.name as label"]);
        let statement = MYSQL
            .compile_select(&query)
            .expect("Failed to compile the select");
        assert_eq!(
            statement.sql,
            indoc! {"
                SELECT `id`, `users`.`name` AS `label`
                FROM `users`
            "}
            .trim()
        );
    }

    #[test]
    fn embedded_quote_characters_are_doubled() {
        let statement = WRITER
            .compile_select(&Query::table("we\"ird"))
            .expect("Failed to compile the select");
        assert_eq!(statement.sql, "SELECT *\nFROM \"we\"\"ird\"");
        let statement = MYSQL
            .compile_select(&Query::table("we`ird"))
            .expect("Failed to compile the select");
        assert_eq!(statement.sql, "SELECT *\nFROM `we``ird`");
    }

    #[test]
    fn exists_wraps_the_whole_select() {
        let statement = WRITER
            .compile_exists(&Query::table("users").and_where("id", Op::Eq, 1))
            .expect("Failed to compile the exists probe");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT EXISTS(SELECT *
                FROM "users"
                WHERE "id" = ?) AS "exists"
            "#}
            .trim()
        );
        assert_eq!(statement.bindings, [Value::Int32(Some(1))]);
    }

    #[test]
    fn a_query_without_a_table_does_not_compile() {
        let error = WRITER
            .compile_select(&Query::default())
            .expect_err("An empty query must not compile");
        assert!(error.to_string().contains("table"));
    }
}
