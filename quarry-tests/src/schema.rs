use crate::FakeHandle;
use quarry::{Connection, Value};

pub fn schema(connection: &mut Connection, executor: &FakeHandle) {
    executor.clear();

    // Create with a generated key, data columns and a unique index
    connection
        .schema()
        .create("users", |table| {
            table.increments("id");
            table.string("email", 255);
            table.string("name", 100).nullable();
            table.timestamps();
            table.unique(["email"]);
        })
        .expect("Failed to create the users table");
    let sql = executor.sql();
    assert!(sql[0].starts_with("CREATE TABLE"));
    assert!(sql.iter().any(|s| s.contains("CREATE UNIQUE INDEX")));

    // Adding a plain column introspects first, then alters in place
    executor.clear();
    connection
        .schema()
        .table("users", |table| {
            table.string("nickname", 100).nullable();
        })
        .expect("Failed to add the nickname column");
    let sql = executor.sql();
    assert_eq!(sql.len(), 2);
    assert!(sql[1].contains("ADD COLUMN"));

    // has_table reads its answer from the probing select
    executor.clear();
    executor.push_rows(&["exists"], &[&[Value::Boolean(Some(true))]]);
    let found = connection
        .schema()
        .has_table("users")
        .expect("Failed to probe for the table");
    assert!(found);
    executor.push_rows(&["exists"], &[&[Value::Boolean(Some(false))]]);
    let found = connection
        .schema()
        .has_table("ghosts")
        .expect("Failed to probe for the missing table");
    assert!(!found);

    // Drop and rename compile to single statements
    executor.clear();
    connection
        .schema()
        .drop_if_exists("audits")
        .expect("Failed to drop the audits table");
    connection
        .schema()
        .rename("users", "people")
        .expect("Failed to rename the table");
    let sql = executor.sql();
    assert!(sql[0].contains("DROP TABLE IF EXISTS"));
    assert!(sql[1].contains("RENAME"));
}
