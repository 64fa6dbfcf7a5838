use crate::{Call, FakeHandle};
use quarry::{Connection, Error, Op, Query};

pub fn transactions(connection: &mut Connection, executor: &FakeHandle) {
    executor.clear();

    // The outermost level is the transport's native transaction, every level
    // below it is a savepoint statement
    connection
        .begin_transaction()
        .expect("Failed to open the transaction");
    assert_eq!(connection.transaction_depth(), 1);
    connection
        .begin_transaction()
        .expect("Failed to open the nested level");
    assert_eq!(connection.transaction_depth(), 2);
    connection
        .rollback()
        .expect("Failed to roll back the nested level");
    connection
        .commit()
        .expect("Failed to commit the transaction");
    assert_eq!(connection.transaction_depth(), 0);
    let calls = executor.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], Call::Begin);
    let Call::Execute { sql, .. } = &calls[1] else {
        panic!("Expected the savepoint");
    };
    assert_eq!(sql, "SAVEPOINT sp_1");
    let Call::Execute { sql, .. } = &calls[2] else {
        panic!("Expected the savepoint rollback");
    };
    assert_eq!(sql, "ROLLBACK TO SAVEPOINT sp_1");
    assert_eq!(calls[3], Call::Commit);

    // Releasing a committed nested level
    executor.clear();
    connection
        .begin_transaction()
        .expect("Failed to open the transaction");
    connection
        .begin_transaction()
        .expect("Failed to open the nested level");
    connection
        .commit()
        .expect("Failed to commit the nested level");
    connection
        .commit()
        .expect("Failed to commit the transaction");
    let calls = executor.calls();
    let Call::Execute { sql, .. } = &calls[2] else {
        panic!("Expected the savepoint release");
    };
    assert_eq!(sql, "RELEASE SAVEPOINT sp_1");

    // Closing at depth zero is refused
    let error = connection
        .commit()
        .expect_err("Committing outside a transaction must fail");
    assert!(matches!(error, Error::Transaction(_)));
    let error = connection
        .rollback()
        .expect_err("Rolling back outside a transaction must fail");
    assert!(matches!(error, Error::Transaction(_)));

    // The closure helper commits on success
    executor.clear();
    let deleted = connection
        .transaction(|connection| {
            Query::table("audits")
                .and_where("id", Op::Eq, 1_i64)
                .delete(connection)
        })
        .expect("Failed to run the closure transaction");
    assert_eq!(deleted, 0);
    let calls = executor.calls();
    assert_eq!(calls.first(), Some(&Call::Begin));
    assert_eq!(calls.last(), Some(&Call::Commit));
    assert_eq!(connection.transaction_depth(), 0);

    // An error unwinds every level the closure opened and surfaces unchanged
    executor.clear();
    let error = connection
        .transaction::<(), _>(|connection| {
            connection.transaction(|_| Err(Error::constraint("duplicate email")))
        })
        .expect_err("The inner error must surface");
    assert!(error.to_string().contains("duplicate email"));
    assert_eq!(connection.transaction_depth(), 0);
    let calls = executor.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], Call::Begin);
    let Call::Execute { sql, .. } = &calls[1] else {
        panic!("Expected the savepoint");
    };
    assert_eq!(sql, "SAVEPOINT sp_1");
    let Call::Execute { sql, .. } = &calls[2] else {
        panic!("Expected the savepoint rollback");
    };
    assert_eq!(sql, "ROLLBACK TO SAVEPOINT sp_1");
    assert_eq!(calls[3], Call::Rollback);
}
