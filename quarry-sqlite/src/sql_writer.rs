use quarry_core::{Query, SqlWriter, Value};

/// Writer for SQLite's grammar. The same instance also serves as the
/// [`SchemaWriter`](quarry_core::SchemaWriter), see `schema_writer.rs`.
pub struct SQLiteSqlWriter {
    prefix: String,
}

impl SQLiteSqlWriter {
    pub const fn new() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for SQLiteSqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlWriter for SQLiteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    // SQLite rejects HAVING without GROUP BY.
    fn having_requires_group_by(&self) -> bool {
        true
    }

    // OFFSET is only parsed after a LIMIT; -1 means unbounded.
    fn offset_requires_limit(&self) -> Option<&'static str> {
        Some("-1")
    }

    // Parenthesized members are a syntax error here, a subselect wrapper
    // keeps the members isolated instead.
    fn write_union_member(
        &self,
        out: &mut String,
        bindings: &mut Vec<Value>,
        query: &Query,
        trailing: bool,
    ) {
        out.push_str("SELECT * FROM (");
        self.write_select_core(out, bindings, query, trailing);
        out.push(')');
    }
}
