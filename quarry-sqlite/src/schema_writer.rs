use crate::SQLiteSqlWriter;
use quarry_core::{
    Blueprint, ColumnDef, ColumnInfo, ColumnType, Command, Error, ForeignKey, Result, SchemaWriter,
    SqlWriter, Statement, Value, separated_by,
};
use std::collections::{HashMap, HashSet};

impl SchemaWriter for SQLiteSqlWriter {
    fn write_column_type(&self, out: &mut String, column: &ColumnDef) {
        // AUTOINCREMENT demands the bare INTEGER spelling.
        if column.auto_increment {
            out.push_str("INTEGER");
            return;
        }
        match &column.column_type {
            ColumnType::Boolean
            | ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger => out.push_str("INTEGER"),
            ColumnType::Float | ColumnType::Double => out.push_str("REAL"),
            ColumnType::Decimal { .. } => out.push_str("NUMERIC"),
            ColumnType::Varchar(..)
            | ColumnType::Text
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::Timestamp
            | ColumnType::Uuid => out.push_str("TEXT"),
            ColumnType::Blob => out.push_str("BLOB"),
            ColumnType::Raw(name) => out.push_str(name),
        }
    }

    fn write_auto_increment(&self, out: &mut String) {
        out.push_str(" AUTOINCREMENT");
    }

    fn compile_table_exists(&self, table: &str) -> Statement {
        Statement::new(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?) \
             AS \"exists\"",
            vec![Value::from(format!("{}{}", self.table_prefix(), table))],
        )
    }

    fn compile_column_listing(&self, table: &str) -> Statement {
        let mut sql = String::from("PRAGMA table_info(");
        self.write_table_name(&mut sql, table);
        sql.push(')');
        Statement::raw(sql)
    }

    /// ALTER TABLE here only covers plain column additions and renames.
    /// Everything structural, dropped columns, foreign keys, primary key
    /// changes, goes through a full table rebuild.
    fn compile_alter(&self, blueprint: &Blueprint, existing: &[ColumnInfo]) -> Result<Vec<String>> {
        blueprint.validate()?;
        if needs_rebuild(blueprint) {
            return self.compile_rebuild(blueprint, existing);
        }
        let mut statements = Vec::new();
        for column in &blueprint.columns {
            let mut sql = String::from("ALTER TABLE ");
            self.write_table_name(&mut sql, &blueprint.table);
            sql.push_str(" ADD COLUMN ");
            self.write_column_def(&mut sql, column);
            statements.push(sql);
        }
        for command in &blueprint.commands {
            match command {
                Command::Unique { name, columns } => {
                    statements.push(self.compile_index(&blueprint.table, name, columns, true));
                }
                Command::Index { name, columns } => {
                    statements.push(self.compile_index(&blueprint.table, name, columns, false));
                }
                Command::RenameColumn { from, to } => {
                    let mut sql = String::from("ALTER TABLE ");
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
                Command::Primary(..) | Command::Foreign(..) | Command::DropColumn(..) => {
                    unreachable!("structural commands take the rebuild path")
                }
            }
        }
        Ok(statements)
    }
}

fn needs_rebuild(blueprint: &Blueprint) -> bool {
    blueprint.commands.iter().any(|command| {
        matches!(
            command,
            Command::Primary(..) | Command::Foreign(..) | Command::DropColumn(..),
        )
    }) || blueprint.columns.iter().any(|column| {
        column.primary_key
            || column.unique
            || column.auto_increment
            || !(column.nullable || column.default.is_some() || column.default_raw.is_some())
    })
}

impl SQLiteSqlWriter {
    /// Recreates the table under a scratch name with the new column set,
    /// copies the surviving rows over, swaps the tables and declares the
    /// blueprint's indexes again. The schema builder runs the batch inside
    /// one transaction.
    fn compile_rebuild(&self, blueprint: &Blueprint, existing: &[ColumnInfo]) -> Result<Vec<String>> {
        if existing.is_empty() {
            return Err(Error::compile(format!(
                "cannot rebuild `{}` without its current columns",
                blueprint.table,
            )));
        }
        let mut dropped = HashSet::new();
        let mut renames = HashMap::new();
        let mut primary: Option<&[String]> = None;
        let mut foreigns: Vec<&ForeignKey> = Vec::new();
        for command in &blueprint.commands {
            match command {
                Command::DropColumn(column) => {
                    dropped.insert(column.as_str());
                }
                Command::RenameColumn { from, to } => {
                    renames.insert(from.as_str(), to.as_str());
                }
                Command::Primary(columns) => primary = Some(columns),
                Command::Foreign(foreign) => foreigns.push(foreign),
                Command::Unique { .. } | Command::Index { .. } => {}
                other => {
                    return Err(Error::compile(format!(
                        "cannot apply {:?} to `{}` in the same change that rebuilds it",
                        other, blueprint.table,
                    )));
                }
            }
        }
        for from in renames.keys() {
            if !existing.iter().any(|info| info.name == *from) {
                return Err(Error::compile(format!(
                    "cannot rename the unknown column `{}.{}`",
                    blueprint.table, from,
                )));
            }
        }

        let scratch = format!("__quarry_tmp_{}", blueprint.table);
        let mut rebuilt = Blueprint::create(&scratch);
        let mut sources: Vec<&str> = Vec::new();
        let mut dests: Vec<&str> = Vec::new();
        for info in existing {
            if dropped.contains(info.name.as_str()) {
                continue;
            }
            if blueprint.find_column(&info.name).is_some() {
                return Err(Error::compile(format!(
                    "column `{}.{}` already exists",
                    blueprint.table, info.name,
                )));
            }
            let dest = renames
                .get(info.name.as_str())
                .copied()
                .unwrap_or(info.name.as_str());
            let column = rebuilt.add_column(dest, ColumnType::Raw(info.column_type.clone()));
            column.nullable = info.nullable;
            column.default_raw = info.default.clone();
            column.primary_key = info.primary;
            sources.push(info.name.as_str());
            dests.push(dest);
        }
        rebuilt.columns.extend(blueprint.columns.iter().cloned());
        if let Some(columns) = primary {
            for column in &mut rebuilt.columns {
                column.primary_key = false;
            }
            rebuilt.commands.push(Command::Primary(columns.to_vec()));
        } else {
            let composite: Vec<String> = rebuilt
                .columns
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| c.name.clone())
                .collect();
            if composite.len() > 1 {
                for column in &mut rebuilt.columns {
                    column.primary_key = false;
                }
                rebuilt.commands.push(Command::Primary(composite));
            }
        }
        for foreign in foreigns {
            rebuilt.commands.push(Command::Foreign((*foreign).clone()));
        }
        rebuilt.validate()?;

        let mut statements = self.compile_create(&rebuilt)?;
        let mut copy = String::from("INSERT INTO ");
        self.write_table_name(&mut copy, &scratch);
        copy.push_str(" (");
        separated_by(
            &mut copy,
            &dests,
            |out, column| self.write_identifier_quoted(out, column),
            ", ",
        );
        copy.push_str(")\nSELECT ");
        separated_by(
            &mut copy,
            &sources,
            |out, column| self.write_identifier_quoted(out, column),
            ", ",
        );
        copy.push_str("\nFROM ");
        self.write_table_name(&mut copy, &blueprint.table);
        statements.push(copy);
        statements.push(self.compile_drop(&blueprint.table));
        statements.push(self.compile_rename(&scratch, &blueprint.table));
        for command in &blueprint.commands {
            match command {
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
}
