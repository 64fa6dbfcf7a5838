use crate::{Result, Row, RowsAffected, Value};

/// The transport capability a [`Connection`](crate::Connection) drives.
///
/// Implementations wrap whatever actually talks to the database, a socket, an
/// embedded library, a test double. The connection hands over SQL it compiled
/// itself together with the values for the `?` placeholders, in order.
///
/// `begin`/`commit`/`rollback` manage the single outermost transaction the
/// backend supports natively. Savepoints never reach these methods, the
/// connection compiles them to SQL and sends them through [`Executor::execute`].
///
/// Implementations are expected to classify backend failures into
/// [`Error::Connection`](crate::Error) or [`Error::Constraint`](crate::Error)
/// so that callers can tell a broken socket from a duplicate key.
pub trait Executor: Send {
    /// Run a statement that produces rows.
    fn query(&mut self, sql: &str, bindings: &[Value]) -> Result<Vec<Row>>;

    /// Run a statement executed for effect, reporting affected rows and the
    /// last inserted id when the backend exposes one.
    fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<RowsAffected>;

    /// Open the outermost transaction.
    fn begin(&mut self) -> Result<()>;

    /// Commit the outermost transaction.
    fn commit(&mut self) -> Result<()>;

    /// Roll back the outermost transaction.
    fn rollback(&mut self) -> Result<()>;
}
