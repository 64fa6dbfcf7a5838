use crate::{Value, truncate_long};
use std::fmt::{self, Display};

/// A compiled SQL statement together with the values bound to its `?`
/// placeholders, in the exact order the placeholders appear in the text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }

    /// A statement carrying no bound parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::raw(value)
    }
}

impl From<String> for Statement {
    fn from(value: String) -> Self {
        Statement::raw(value)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` with {} parameter(s)",
            truncate_long!(self.sql),
            self.bindings.len()
        )
    }
}
