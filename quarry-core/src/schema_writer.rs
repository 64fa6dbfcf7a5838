use crate::{
    Blueprint, ColumnDef, ColumnInfo, ColumnType, Command, Error, ForeignKey, GenericSqlWriter,
    Result, SqlWriter, Statement, Value, separated_by,
};
use std::fmt::Write;

/// Compiles blueprints into dialect-specific DDL.
///
/// DDL carries no bindings, so the compile methods hand back plain SQL
/// strings. The defaults cover the portable grammar: dialects override where
/// they diverge, most notably SQLite's table rebuild in `compile_alter`.
pub trait SchemaWriter: SqlWriter {
    fn compile_create(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        blueprint.validate()?;
        if !blueprint.creating {
            return Err(Error::compile(format!(
                "blueprint for `{}` alters an existing table",
                blueprint.table,
            )));
        }
        if blueprint.columns.is_empty() {
            return Err(Error::compile(format!(
                "cannot create table `{}` without columns",
                blueprint.table,
            )));
        }
        let mut statements = Vec::new();
        let mut sql = String::new();
        sql.push_str("CREATE TABLE ");
        self.write_table_name(&mut sql, &blueprint.table);
        sql.push_str(" (\n");
        separated_by(
            &mut sql,
            &blueprint.columns,
            |out, column| self.write_column_def(out, column),
            ",\n",
        );
        for command in &blueprint.commands {
            match command {
                Command::Primary(columns) => {
                    sql.push_str(",\nPRIMARY KEY (");
                    separated_by(
                        &mut sql,
                        columns,
                        |out, column| self.write_identifier_quoted(out, column),
                        ", ",
                    );
                    sql.push(')');
                }
                Command::Foreign(foreign) if self.inline_foreign_keys() => {
                    sql.push_str(",\n");
                    self.write_foreign_key(&mut sql, foreign);
                }
                Command::Foreign(_) | Command::Unique { .. } | Command::Index { .. } => {}
                other => {
                    return Err(Error::compile(format!(
                        "cannot apply {:?} while creating `{}`",
                        other, blueprint.table,
                    )));
                }
            }
        }
        sql.push_str("\n)");
        statements.push(sql);
        for command in &blueprint.commands {
            match command {
                Command::Foreign(foreign) if !self.inline_foreign_keys() => {
                    statements.push(self.compile_foreign(&blueprint.table, foreign));
                }
                Command::Unique { name, columns } => {
                    statements.push(self.compile_index(&blueprint.table, name, columns, true));
                }
                Command::Index { name, columns } => {
                    statements.push(self.compile_index(&blueprint.table, name, columns, false));
                }
                _ => {}
            }
        }
        Ok(statements)
    }

    /// Compiles a change to an existing table, one statement per command.
    /// `existing` carries the introspected columns for dialects that must
    /// rebuild the table to apply some of the commands.
    fn compile_alter(&self, blueprint: &Blueprint, existing: &[ColumnInfo]) -> Result<Vec<String>> {
        let _ = existing;
        blueprint.validate()?;
        let mut statements = Vec::new();
        for column in &blueprint.columns {
            let mut sql = String::new();
            sql.push_str("ALTER TABLE ");
            self.write_table_name(&mut sql, &blueprint.table);
            sql.push_str(" ADD COLUMN ");
            self.write_column_def(&mut sql, column);
            statements.push(sql);
        }
        for command in &blueprint.commands {
            match command {
                Command::Primary(columns) => {
                    let mut sql = String::new();
                    sql.push_str("ALTER TABLE ");
                    self.write_table_name(&mut sql, &blueprint.table);
                    sql.push_str(" ADD PRIMARY KEY (");
                    separated_by(
                        &mut sql,
                        columns,
                        |out, column| self.write_identifier_quoted(out, column),
                        ", ",
                    );
                    sql.push(')');
                    statements.push(sql);
                }
                Command::Unique { name, columns } => {
                    statements.push(self.compile_index(&blueprint.table, name, columns, true));
                }
                Command::Index { name, columns } => {
                    statements.push(self.compile_index(&blueprint.table, name, columns, false));
                }
                Command::Foreign(foreign) => {
                    statements.push(self.compile_foreign(&blueprint.table, foreign));
                }
                Command::DropColumn(column) => {
                    let mut sql = String::new();
                    sql.push_str("ALTER TABLE ");
                    self.write_table_name(&mut sql, &blueprint.table);
                    sql.push_str(" DROP COLUMN ");
                    self.write_identifier_quoted(&mut sql, column);
                    statements.push(sql);
                }
                Command::RenameColumn { from, to } => {
                    let mut sql = String::new();
                    sql.push_str("ALTER TABLE ");
                    self.write_table_name(&mut sql, &blueprint.table);
                    sql.push_str(" RENAME COLUMN ");
                    self.write_identifier_quoted(&mut sql, from);
                    sql.push_str(" TO ");
                    self.write_identifier_quoted(&mut sql, to);
                    statements.push(sql);
                }
                Command::RenameTable(to) => {
                    statements.push(self.compile_rename(&blueprint.table, to));
                }
                Command::Drop => statements.push(self.compile_drop(&blueprint.table)),
                Command::DropIfExists => {
                    statements.push(self.compile_drop_if_exists(&blueprint.table));
                }
            }
        }
        Ok(statements)
    }

    fn compile_drop(&self, table: &str) -> String {
        let mut sql = String::new();
        sql.push_str("DROP TABLE ");
        self.write_table_name(&mut sql, table);
        sql
    }

    fn compile_drop_if_exists(&self, table: &str) -> String {
        let mut sql = String::new();
        sql.push_str("DROP TABLE IF EXISTS ");
        self.write_table_name(&mut sql, table);
        sql
    }

    fn compile_rename(&self, from: &str, to: &str) -> String {
        let mut sql = String::new();
        sql.push_str("ALTER TABLE ");
        self.write_table_name(&mut sql, from);
        sql.push_str(" RENAME TO ");
        self.write_table_name(&mut sql, to);
        sql
    }

    /// One row with an `exists` column. The bound name is already prefixed.
    fn compile_table_exists(&self, table: &str) -> Statement {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = ?) AS {}",
            quoted(self, "exists"),
        );
        Statement::new(
            sql,
            vec![Value::from(format!("{}{}", self.table_prefix(), table))],
        )
    }

    /// The dialect's column listing query, shaped afterwards by the
    /// [`Processor`](crate::Processor).
    fn compile_column_listing(&self, table: &str) -> Statement {
        let sql = format!(
            "SELECT column_name AS {}, data_type AS {}, is_nullable AS {}, column_default AS {} \
             FROM information_schema.columns WHERE table_name = ? ORDER BY ordinal_position",
            quoted(self, "name"),
            quoted(self, "type"),
            quoted(self, "nullable"),
            quoted(self, "default"),
        );
        Statement::new(
            sql,
            vec![Value::from(format!("{}{}", self.table_prefix(), table))],
        )
    }

    /// Whether DDL takes part in transactions. The schema builder wraps
    /// multi-statement batches only when it does.
    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    /// Whether foreign keys belong inside CREATE TABLE or come as follow-up
    /// ALTER statements.
    fn inline_foreign_keys(&self) -> bool {
        true
    }

    fn write_column_def(&self, out: &mut String, column: &ColumnDef) {
        self.write_identifier_quoted(out, &column.name);
        out.push(' ');
        self.write_column_type(out, column);
        if !column.nullable && !column.primary_key {
            out.push_str(" NOT NULL");
        }
        if let Some(raw) = &column.default_raw {
            out.push_str(" DEFAULT ");
            out.push_str(raw);
        } else if let Some(default) = &column.default {
            out.push_str(" DEFAULT ");
            self.write_value(out, default);
        }
        if column.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if column.auto_increment {
            self.write_auto_increment(out);
        }
        if column.unique && !column.primary_key {
            out.push_str(" UNIQUE");
        }
        if let Some(comment) = &column.comment {
            self.write_column_comment(out, comment);
        }
    }

    fn write_column_type(&self, out: &mut String, column: &ColumnDef) {
        match &column.column_type {
            ColumnType::Boolean => out.push_str("BOOLEAN"),
            ColumnType::TinyInteger => out.push_str("TINYINT"),
            ColumnType::SmallInteger => out.push_str("SMALLINT"),
            ColumnType::Integer => out.push_str("INTEGER"),
            ColumnType::BigInteger => out.push_str("BIGINT"),
            ColumnType::Float => out.push_str("FLOAT"),
            ColumnType::Double => out.push_str("DOUBLE"),
            ColumnType::Decimal { precision, scale } => {
                let _ = write!(out, "DECIMAL({},{})", precision, scale);
            }
            ColumnType::Varchar(length) => {
                let _ = write!(out, "VARCHAR({})", length);
            }
            ColumnType::Text => out.push_str("TEXT"),
            ColumnType::Blob => out.push_str("BLOB"),
            ColumnType::Date => out.push_str("DATE"),
            ColumnType::Time => out.push_str("TIME"),
            ColumnType::Timestamp => out.push_str("TIMESTAMP"),
            ColumnType::Uuid => out.push_str("UUID"),
            ColumnType::Raw(name) => out.push_str(name),
        }
    }

    /// The auto increment keyword, written right after PRIMARY KEY. The
    /// portable grammar has none.
    fn write_auto_increment(&self, out: &mut String) {
        let _ = out;
    }

    /// Inline column comment. Dropped by default, backends without the
    /// syntax have nowhere to keep it.
    fn write_column_comment(&self, out: &mut String, comment: &str) {
        let _ = (out, comment);
    }

    /// Table-level constraint form, without the leading ADD CONSTRAINT.
    fn write_foreign_key(&self, out: &mut String, foreign: &ForeignKey) {
        out.push_str("FOREIGN KEY (");
        self.write_identifier_quoted(out, &foreign.column);
        out.push_str(") REFERENCES ");
        self.write_table_name(out, &foreign.on);
        out.push_str(" (");
        self.write_identifier_quoted(out, &foreign.references);
        out.push(')');
        if let Some(action) = &foreign.on_delete {
            out.push_str(" ON DELETE ");
            out.push_str(action.as_sql());
        }
        if let Some(action) = &foreign.on_update {
            out.push_str(" ON UPDATE ");
            out.push_str(action.as_sql());
        }
    }

    fn compile_foreign(&self, table: &str, foreign: &ForeignKey) -> String {
        let mut sql = String::new();
        sql.push_str("ALTER TABLE ");
        self.write_table_name(&mut sql, table);
        sql.push_str(" ADD CONSTRAINT ");
        self.write_identifier_quoted(&mut sql, &format!("{}_{}_foreign", table, foreign.column));
        sql.push(' ');
        self.write_foreign_key(&mut sql, foreign);
        sql
    }

    fn compile_index(&self, table: &str, name: &str, columns: &[String], unique: bool) -> String {
        let mut sql = String::new();
        sql.push_str(if unique {
            "CREATE UNIQUE INDEX "
        } else {
            "CREATE INDEX "
        });
        self.write_identifier_quoted(&mut sql, name);
        sql.push_str(" ON ");
        self.write_table_name(&mut sql, table);
        sql.push_str(" (");
        separated_by(
            &mut sql,
            columns,
            |out, column| self.write_identifier_quoted(out, column),
            ", ",
        );
        sql.push(')');
        sql
    }
}

impl SchemaWriter for GenericSqlWriter {}

fn quoted(writer: &(impl SchemaWriter + ?Sized), identifier: &str) -> String {
    let mut out = String::new();
    writer.write_identifier_quoted(&mut out, identifier);
    out
}
