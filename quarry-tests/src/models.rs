use crate::{
    Call, FakeHandle,
    fixtures::{Profile, User},
};
use quarry::{Connection, Model, Op, Value, attrs};

pub fn models(connection: &mut Connection, executor: &FakeHandle) {
    executor.clear();

    // Create fills, inserts and carries the generated key back in
    executor.push_affected(1, Some(7));
    let attributes = attrs! {
        "name" => "Ada",
        "email" => "ada@example.com",
        "admin" => true,
    };
    let mut user = User::create(connection, attributes).expect("Failed to create the user");
    assert!(user.exists());
    assert_eq!(user.key(), Value::Int64(Some(7)));
    // `admin` is not fillable and must have been dropped
    assert_eq!(user.get("admin"), Value::Null);
    assert!(matches!(user.get("created_at"), Value::Timestamp(Some(_))));
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let Call::Execute { sql, .. } = &calls[0] else {
        panic!("Expected an execute call");
    };
    assert!(sql.contains("INSERT INTO"));

    // A dirty save updates just the changed attributes, scoped to the key
    executor.clear();
    executor.push_affected(1, None);
    user.set("name", "Ada Lovelace");
    user.save(connection).expect("Failed to update the user");
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let Call::Execute { sql, bindings } = &calls[0] else {
        panic!("Expected an execute call");
    };
    assert!(sql.contains("UPDATE"));
    assert_eq!(bindings.len(), 3);
    assert_eq!(bindings[0], Value::Varchar(Some("Ada Lovelace".into())));
    assert!(matches!(bindings[1], Value::Timestamp(Some(_))));
    assert_eq!(bindings[2], Value::Int64(Some(7)));

    // A clean save never reaches the transport
    executor.clear();
    user.save(connection).expect("Failed to save the clean user");
    assert!(executor.calls().is_empty());

    // find hydrates the first row of a keyed select
    executor.clear();
    executor.push_rows(
        &["id", "name", "email"],
        &[&[
            Value::Int64(Some(7)),
            Value::Varchar(Some("Ada Lovelace".into())),
            Value::Varchar(Some("ada@example.com".into())),
        ]],
    );
    let found = User::find(connection, 7_i64)
        .expect("Failed to find the user")
        .expect("The user row must hydrate");
    assert_eq!(
        found.get_as::<String>("name").expect("Failed to read the name"),
        "Ada Lovelace"
    );
    let calls = executor.calls();
    let Call::Query { sql, bindings } = &calls[0] else {
        panic!("Expected a query call");
    };
    assert!(sql.contains("LIMIT"));
    assert_eq!(*bindings, [Value::Int64(Some(7))]);

    // Strict mass assignment rejects what the plain one drops
    let mut someone = User::default();
    let attributes = attrs! { "admin" => true };
    assert!(someone.fill_strict(attributes.clone()).is_err());
    someone.fill(attributes);
    assert_eq!(someone.get("admin"), Value::Null);

    // Deleting flips the persistence flag
    executor.clear();
    executor.push_affected(1, None);
    user.delete(connection).expect("Failed to delete the user");
    assert!(!user.exists());
    let calls = executor.calls();
    let Call::Execute { sql, bindings } = &calls[0] else {
        panic!("Expected an execute call");
    };
    assert!(sql.contains("DELETE FROM"));
    assert_eq!(*bindings, [Value::Int64(Some(7))]);

    // An instance that never made it to the database deletes quietly
    executor.clear();
    let mut ghost = User::default();
    ghost.delete(connection).expect("Failed to delete the unsaved user");
    assert!(executor.calls().is_empty());

    // Timestamps stay out of models that opted out
    executor.clear();
    executor.push_affected(1, Some(3));
    let mut profile = Profile::default();
    profile.set("user_id", 7_i64);
    profile.set("bio", "first profile");
    profile.save(connection).expect("Failed to save the profile");
    assert_eq!(profile.key(), Value::Int64(Some(3)));
    assert_eq!(profile.get("created_at"), Value::Null);

    // Typed query pass-through
    executor.clear();
    executor.push_rows(&["aggregate"], &[&[Value::Int64(Some(2))]]);
    let count = User::query()
        .and_where("active", Op::Eq, true)
        .count(connection)
        .expect("Failed to count users");
    assert_eq!(count, 2);
}
