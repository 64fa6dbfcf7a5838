use crate::{
    Call, FakeHandle,
    fixtures::{Mechanic, Post, User},
};
use quarry::{Connection, Model, Record, Relation, Row, THROUGH_KEY, Value};
use std::sync::Arc;
use uuid::Uuid;

fn hydrate<M: Model>(labels: &[&str], values: &[Value]) -> M {
    let labels: Arc<[String]> = labels.iter().map(|label| label.to_string()).collect();
    M::from_record(Record::from_row(Row::new(
        labels,
        values.to_vec().into_boxed_slice(),
    )))
}

pub fn relations(connection: &mut Connection, executor: &FakeHandle) {
    executor.clear();

    // HasMany eager loads every owner in one query and aligns the buckets
    let users = vec![
        hydrate::<User>(&["id"], &[Value::Int64(Some(1))]),
        hydrate::<User>(&["id"], &[Value::Int64(Some(2))]),
        hydrate::<User>(&["id"], &[Value::Int64(Some(3))]),
    ];
    executor.push_rows(
        &["id", "user_id", "title"],
        &[
            &[
                Value::Int64(Some(10)),
                Value::Int64(Some(1)),
                Value::Varchar(Some("first".into())),
            ],
            &[
                Value::Int64(Some(11)),
                Value::Int64(Some(2)),
                Value::Varchar(Some("second".into())),
            ],
            &[
                Value::Int64(Some(12)),
                Value::Int64(Some(1)),
                Value::Varchar(Some("third".into())),
            ],
        ],
    );
    let posts = User::posts()
        .eager(connection, &users)
        .expect("Failed to eager load posts");
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].len(), 2);
    assert_eq!(posts[1].len(), 1);
    assert!(posts[2].is_empty());
    assert_eq!(
        posts[0][0]
            .get_as::<String>("title")
            .expect("Failed to read the title"),
        "first"
    );
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let Call::Query { sql, bindings } = &calls[0] else {
        panic!("Expected a query call");
    };
    assert!(sql.contains("IN"));
    assert_eq!(
        *bindings,
        [
            Value::Int64(Some(1)),
            Value::Int64(Some(2)),
            Value::Int64(Some(3)),
        ]
    );

    // BelongsTo reads through the owner's foreign key
    executor.clear();
    executor.push_rows(
        &["id", "name"],
        &[&[Value::Int64(Some(1)), Value::Varchar(Some("Ada".into()))]],
    );
    let mut post = hydrate::<Post>(
        &["id", "user_id"],
        &[Value::Int64(Some(10)), Value::Int64(Some(1))],
    );
    let author = Post::author()
        .fetch(connection, &post)
        .expect("Failed to fetch the author")
        .expect("The author must be there");
    assert_eq!(author.key(), Value::Int64(Some(1)));

    // A NULL foreign key answers without a query
    executor.clear();
    let orphan = hydrate::<Post>(&["id", "user_id"], &[Value::Int64(Some(11)), Value::Null]);
    let author = Post::author()
        .fetch(connection, &orphan)
        .expect("Failed to fetch the missing author");
    assert!(author.is_none());
    assert!(executor.calls().is_empty());

    // associate and dissociate only touch the record in memory
    let relation = Post::author();
    let other = hydrate::<User>(&["id"], &[Value::Int64(Some(2))]);
    relation.associate(&mut post, &other);
    assert_eq!(post.get("user_id"), Value::Int64(Some(2)));
    relation.dissociate(&mut post);
    assert_eq!(post.get("user_id"), Value::Null);
    assert!(executor.calls().is_empty());

    // HasOne keeps the first related row per owner
    executor.clear();
    executor.push_rows(
        &["id", "user_id", "bio"],
        &[
            &[
                Value::Int64(Some(5)),
                Value::Int64(Some(1)),
                Value::Varchar(Some("kept".into())),
            ],
            &[
                Value::Int64(Some(6)),
                Value::Int64(Some(1)),
                Value::Varchar(Some("ignored".into())),
            ],
        ],
    );
    let one_user = vec![hydrate::<User>(&["id"], &[Value::Int64(Some(1))])];
    let profiles = User::profile()
        .eager(connection, &one_user)
        .expect("Failed to eager load profiles");
    assert_eq!(profiles.len(), 1);
    let profile = profiles[0].as_ref().expect("The profile must be there");
    assert_eq!(profile.get("bio"), Value::Varchar(Some("kept".into())));

    // Owners with only NULL keys answer without a query
    executor.clear();
    let blank = vec![hydrate::<User>(&["id"], &[Value::Null])];
    let profiles = User::profile()
        .eager(connection, &blank)
        .expect("Failed to eager load with null keys");
    assert!(profiles[0].is_none());
    assert!(executor.calls().is_empty());

    // HasOneThrough joins across the intermediate table and strips its
    // bookkeeping column from the hydrated record
    executor.clear();
    executor.push_rows(
        &["id", "car_id", "policy", THROUGH_KEY],
        &[&[
            Value::Int64(Some(100)),
            Value::Int64(Some(50)),
            Value::Varchar(Some("full coverage".into())),
            Value::Int64(Some(1)),
        ]],
    );
    let mechanics = vec![
        hydrate::<Mechanic>(&["id"], &[Value::Int64(Some(1))]),
        hydrate::<Mechanic>(&["id"], &[Value::Int64(Some(2))]),
    ];
    let insurances = Mechanic::insurance()
        .eager(connection, &mechanics)
        .expect("Failed to eager load insurances");
    assert_eq!(insurances.len(), 2);
    let insurance = insurances[0]
        .as_ref()
        .expect("The first mechanic must be covered");
    assert_eq!(
        insurance.get("policy"),
        Value::Varchar(Some("full coverage".into()))
    );
    assert_eq!(insurance.get(THROUGH_KEY), Value::Null);
    assert!(insurances[1].is_none());
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let Call::Query { sql, bindings } = &calls[0] else {
        panic!("Expected a query call");
    };
    assert!(sql.contains("JOIN"));
    assert!(sql.contains(THROUGH_KEY));
    assert_eq!(*bindings, [Value::Int64(Some(1)), Value::Int64(Some(2))]);

    // Uuid keys bucket like integers do
    executor.clear();
    let key = Uuid::new_v4();
    let owner = hydrate::<User>(&["id"], &[Value::Uuid(Some(key))]);
    executor.push_rows(
        &["id", "user_id"],
        &[&[Value::Int64(Some(70)), Value::Uuid(Some(key))]],
    );
    let posts = User::posts()
        .eager(connection, &[owner])
        .expect("Failed to eager load by uuid");
    assert_eq!(posts[0].len(), 1);
}
