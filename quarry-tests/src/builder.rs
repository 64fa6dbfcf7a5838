use crate::{Call, FakeHandle};
use quarry::{Connection, Op, Query, Value, attrs};
use rust_decimal::Decimal;
use time::macros::date;

pub fn builder(connection: &mut Connection, executor: &FakeHandle) {
    executor.clear();

    // Filtered select
    executor.push_rows(
        &["id", "name"],
        &[
            &[Value::Int64(Some(1)), Value::Varchar(Some("Ada".into()))],
            &[Value::Int64(Some(2)), Value::Varchar(Some("Grace".into()))],
        ],
    );
    let rows = Query::table("users")
        .select(["id", "name"])
        .and_where("active", Op::Eq, true)
        .and_where("joined_on", Op::Ge, date!(2020 - 01 - 01))
        .order_by("name")
        .get(connection)
        .expect("Failed to select users");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].get_as::<String>("name").expect("Failed to read the name"),
        "Ada"
    );
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let Call::Query { sql, bindings } = &calls[0] else {
        panic!("Expected a query call");
    };
    assert!(sql.contains("FROM"));
    assert!(sql.contains("ORDER BY"));
    assert_eq!(
        *bindings,
        [
            Value::Boolean(Some(true)),
            Value::Date(Some(date!(2020 - 01 - 01))),
        ]
    );

    // An IN with no values matches nothing and binds nothing
    executor.clear();
    let rows = Query::table("users")
        .where_in("id", Vec::<i64>::new())
        .get(connection)
        .expect("Failed to run the empty IN select");
    assert!(rows.is_empty());
    let calls = executor.calls();
    let Call::Query { sql, bindings } = &calls[0] else {
        panic!("Expected a query call");
    };
    assert!(sql.contains("0 = 1"));
    assert!(bindings.is_empty());

    // Aggregates land in the `aggregate` output column
    executor.clear();
    executor.push_rows(&["aggregate"], &[&[Value::Int64(Some(3))]]);
    let count = Query::table("users")
        .count(connection)
        .expect("Failed to count users");
    assert_eq!(count, 3);
    assert!(executor.sql()[0].contains("COUNT(*)"));

    executor.clear();
    executor.push_rows(&["exists"], &[&[Value::Boolean(Some(true))]]);
    let found = Query::table("users")
        .and_where("id", Op::Eq, 1_i64)
        .exists(connection)
        .expect("Failed to check for the user");
    assert!(found);

    // Multi row insert binds row major; the column list comes from the first
    // row, keys the second row lacks bind NULL
    executor.clear();
    executor.push_affected(2, None);
    let first = attrs! { "email" => "ada@example.com", "name" => "Ada" };
    let second = attrs! { "name" => "Grace" };
    let inserted = Query::table("users")
        .insert(connection, [first, second])
        .expect("Failed to insert users");
    assert_eq!(inserted, 2);
    let calls = executor.calls();
    let Call::Execute { sql, bindings } = &calls[0] else {
        panic!("Expected an execute call");
    };
    assert!(sql.contains("INSERT INTO"));
    assert_eq!(bindings.len(), 4);
    assert_eq!(bindings[2], Value::Null);
    assert_eq!(bindings[3], Value::Varchar(Some("Grace".into())));

    // Inserting nothing never reaches the transport
    executor.clear();
    let inserted = Query::table("users")
        .insert(connection, Vec::new())
        .expect("Failed to insert zero rows");
    assert_eq!(inserted, 0);
    assert!(executor.calls().is_empty());

    // A step folds extra assignments into the same statement, bindings run
    // amount, assignments, then filters
    executor.clear();
    executor.push_affected(1, None);
    let extra = attrs! { "status" => "charged" };
    let updated = Query::table("accounts")
        .and_where("id", Op::Eq, 9_i64)
        .increment_with(connection, "balance", Decimal::new(1050, 2), extra)
        .expect("Failed to increment the balance");
    assert_eq!(updated, 1);
    let calls = executor.calls();
    let Call::Execute { sql, bindings } = &calls[0] else {
        panic!("Expected an execute call");
    };
    assert!(sql.contains("UPDATE"));
    assert_eq!(bindings.len(), 3);
    assert_eq!(bindings[0], Value::Decimal(Some(Decimal::new(1050, 2)), 0, 0));
    assert_eq!(bindings[2], Value::Int64(Some(9)));

    // pluck and value read single columns
    executor.clear();
    executor.push_rows(
        &["name"],
        &[
            &[Value::Varchar(Some("Ada".into()))],
            &[Value::Varchar(Some("Grace".into()))],
        ],
    );
    let names = Query::table("users")
        .pluck(connection, "name")
        .expect("Failed to pluck names");
    assert_eq!(
        names,
        [
            Value::Varchar(Some("Ada".into())),
            Value::Varchar(Some("Grace".into())),
        ]
    );
    executor.push_rows(&["email"], &[&[Value::Varchar(Some("ada@example.com".into()))]]);
    let email = Query::table("users")
        .and_where("id", Op::Eq, 1_i64)
        .value(connection, "email")
        .expect("Failed to read the email");
    assert_eq!(email, Some(Value::Varchar(Some("ada@example.com".into()))));

    // A union compiles to one statement, the base query's ordering closes it
    executor.clear();
    let rows = Query::table("archived_orders")
        .select(["id"])
        .union_all(Query::table("orders").select(["id"]))
        .order_by("id")
        .get(connection)
        .expect("Failed to run the union");
    assert!(rows.is_empty());
    let sql = executor.sql();
    assert_eq!(sql.len(), 1);
    assert!(sql[0].contains("UNION ALL"));
    assert!(sql[0].rfind("ORDER BY") > sql[0].rfind("UNION ALL"));

    // Deletes refuse to compile with a join attached
    let error = Query::table("users")
        .join("posts", "posts.user_id", Op::Eq, "users.id")
        .delete(connection)
        .expect_err("A join inside a delete must not compile");
    assert!(error.to_string().contains("join"));
}
