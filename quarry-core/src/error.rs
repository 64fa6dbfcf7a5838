use crate::Statement;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classified failure raised anywhere between building a query and decoding
/// its result.
///
/// Executors are expected to map backend failures onto [`Error::Connection`]
/// or [`Error::Constraint`] so callers can react to a duplicate key without
/// parsing driver messages. The connection re-wraps whatever an executor
/// returns into [`Error::Statement`] to keep the offending SQL attached.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The builder or writer refused to produce SQL.
    #[error("cannot compile query: {0}")]
    Compile(String),
    /// The backend was unreachable or the session broke down.
    #[error("connection failure: {0}")]
    Connection(String),
    /// The backend rejected the data, unique or foreign key violations mostly.
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// Transaction bookkeeping went out of step with the backend.
    #[error("transaction failure: {0}")]
    Transaction(String),
    /// A value could not be converted into the requested Rust type.
    #[error("cannot decode value: {0}")]
    Decode(String),
    /// Any of the above, annotated with the statement that triggered it.
    #[error("{source} while running {statement}")]
    Statement {
        #[source]
        source: Box<Error>,
        statement: Statement,
    },
}

impl Error {
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Attach the statement that was running when the failure surfaced.
    /// Errors already carrying a statement are left untouched.
    pub fn with_statement(self, statement: &Statement) -> Self {
        match self {
            Self::Statement { .. } => self,
            source => Self::Statement {
                source: Box::new(source),
                statement: statement.clone(),
            },
        }
    }

    /// The classification, unwrapped from any statement annotation.
    pub fn root(&self) -> &Error {
        match self {
            Self::Statement { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_annotation_is_applied_once() {
        let statement = Statement::new("SELECT * FROM \"users\"", vec![]);
        let error = Error::connection("socket closed")
            .with_statement(&statement)
            .with_statement(&Statement::raw("SELECT 1"));
        let Error::Statement { statement: kept, .. } = &error else {
            panic!("expected a statement annotated error");
        };
        assert_eq!(kept.sql, "SELECT * FROM \"users\"");
        assert!(matches!(error.root(), Error::Connection(..)));
    }

    #[test]
    fn display_includes_classification_and_sql() {
        let error = Error::constraint("UNIQUE constraint failed: users.email")
            .with_statement(&Statement::raw("INSERT INTO \"users\" (\"email\") VALUES (?)"));
        let rendered = error.to_string();
        assert!(rendered.contains("constraint violation"));
        assert!(rendered.contains("INSERT INTO"));
    }
}
