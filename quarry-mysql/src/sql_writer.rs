use quarry_core::{ConnectionConfig, SqlWriter, Statement};

/// Writer for MySQL's grammar. The same instance also serves as the
/// [`SchemaWriter`](quarry_core::SchemaWriter), see `schema_writer.rs`.
pub struct MySQLSqlWriter {
    prefix: String,
}

impl MySQLSqlWriter {
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

impl Default for MySQLSqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlWriter for MySQLSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    // OFFSET needs a LIMIT in front; the largest unsigned 64 bit number is
    // the documented idiom for an unbounded one.
    fn offset_requires_limit(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }

    fn compile_session(&self, config: &ConnectionConfig) -> Vec<Statement> {
        let Some(charset) = &config.charset else {
            return Vec::new();
        };
        let mut sql = String::from("SET NAMES ");
        self.write_value_string(&mut sql, charset);
        if let Some(collation) = &config.collation {
            sql.push_str(" COLLATE ");
            self.write_value_string(&mut sql, collation);
        }
        vec![Statement::raw(sql)]
    }
}
