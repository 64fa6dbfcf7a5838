use crate::MySQLSqlWriter;
use quarry_core::{ColumnDef, ColumnType, SchemaWriter, SqlWriter, Statement, Value};
use std::fmt::Write;

impl SchemaWriter for MySQLSqlWriter {
    fn write_column_type(&self, out: &mut String, column: &ColumnDef) {
        match &column.column_type {
            ColumnType::Boolean => out.push_str("TINYINT(1)"),
            ColumnType::TinyInteger => out.push_str("TINYINT"),
            ColumnType::SmallInteger => out.push_str("SMALLINT"),
            ColumnType::Integer => out.push_str("INT"),
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
            ColumnType::Uuid => out.push_str("CHAR(36)"),
            ColumnType::Raw(name) => out.push_str(name),
        }
        if column.unsigned && is_numeric(&column.column_type) {
            out.push_str(" UNSIGNED");
        }
    }

    fn write_auto_increment(&self, out: &mut String) {
        out.push_str(" AUTO_INCREMENT");
    }

    fn write_column_comment(&self, out: &mut String, comment: &str) {
        out.push_str(" COMMENT ");
        self.write_value_string(out, comment);
    }

    // Foreign keys come as ALTER TABLE ... ADD CONSTRAINT after the create,
    // which keeps circular references between new tables workable.
    fn inline_foreign_keys(&self) -> bool {
        false
    }

    // Every DDL statement commits implicitly.
    fn supports_transactional_ddl(&self) -> bool {
        false
    }

    fn compile_table_exists(&self, table: &str) -> Statement {
        Statement::new(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
             WHERE table_schema = database() AND table_name = ?) AS `exists`",
            vec![Value::from(format!("{}{}", self.table_prefix(), table))],
        )
    }

    fn compile_column_listing(&self, table: &str) -> Statement {
        Statement::new(
            "SELECT column_name AS `name`, column_type AS `type`, is_nullable AS `nullable`, \
             column_default AS `default`, column_key AS `column_key` \
             FROM information_schema.columns \
             WHERE table_schema = database() AND table_name = ? ORDER BY ordinal_position",
            vec![Value::from(format!("{}{}", self.table_prefix(), table))],
        )
    }
}

fn is_numeric(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::Float
            | ColumnType::Double
            | ColumnType::Decimal { .. }
    )
}
