use quarry::{Executor, Result, Row, RowsAffected, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// One primitive the connection asked the transport to run.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Query { sql: String, bindings: Vec<Value> },
    Execute { sql: String, bindings: Vec<Value> },
    Begin,
    Commit,
    Rollback,
}

#[derive(Default)]
struct FakeState {
    rows: VecDeque<Vec<Row>>,
    affected: VecDeque<RowsAffected>,
    calls: Vec<Call>,
}

/// Scripted transport. Answers `query` from a queue of row sets and `execute`
/// from a queue of affected counts, recording every call on the way. An empty
/// queue answers with no rows or a zero count, which lets savepoints and DDL
/// run without scripting each one.
#[derive(Default)]
pub struct FakeExecutor {
    state: Arc<Mutex<FakeState>>,
}

/// Shared view on a [`FakeExecutor`] that outlives handing the executor to a
/// connection. Scripts answers and inspects the recorded calls.
#[derive(Clone)]
pub struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> FakeHandle {
        FakeHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl FakeHandle {
    pub fn push_rows(&self, labels: &[&str], rows: &[&[Value]]) {
        let labels: Arc<[String]> = labels.iter().map(|label| label.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| Row::new(labels.clone(), values.to_vec().into_boxed_slice()))
            .collect();
        self.lock().rows.push_back(rows);
    }

    pub fn push_affected(&self, rows_affected: u64, last_affected_id: Option<i64>) {
        self.lock().affected.push_back(RowsAffected {
            rows_affected,
            last_affected_id,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// The SQL of every query and execute call, in order.
    pub fn sql(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Query { sql, .. } | Call::Execute { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drops the recorded calls and any unconsumed scripts.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.calls.clear();
        state.rows.clear();
        state.affected.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("Failed to lock the fake executor")
    }
}

impl Executor for FakeExecutor {
    fn query(&mut self, sql: &str, bindings: &[Value]) -> Result<Vec<Row>> {
        let mut state = self.state.lock().expect("Failed to lock the fake executor");
        state.calls.push(Call::Query {
            sql: sql.into(),
            bindings: bindings.to_vec(),
        });
        Ok(state.rows.pop_front().unwrap_or_default())
    }

    fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<RowsAffected> {
        let mut state = self.state.lock().expect("Failed to lock the fake executor");
        state.calls.push(Call::Execute {
            sql: sql.into(),
            bindings: bindings.to_vec(),
        });
        Ok(state.affected.pop_front().unwrap_or_default())
    }

    fn begin(&mut self) -> Result<()> {
        self.state
            .lock()
            .expect("Failed to lock the fake executor")
            .calls
            .push(Call::Begin);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.state
            .lock()
            .expect("Failed to lock the fake executor")
            .calls
            .push(Call::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.state
            .lock()
            .expect("Failed to lock the fake executor")
            .calls
            .push(Call::Rollback);
        Ok(())
    }
}
