use crate::{Blueprint, ColumnInfo, Connection, Result, Statement};

/// Schema builder bound to one connection.
///
/// Batches that compile to more than one statement run inside a transaction
/// when the dialect supports transactional DDL; elsewhere they apply eagerly
/// and a failure leaves the earlier statements in place.
pub struct Schema<'c> {
    connection: &'c mut Connection,
}

impl<'c> Schema<'c> {
    pub fn new(connection: &'c mut Connection) -> Self {
        Self { connection }
    }

    pub fn create(&mut self, table: &str, build: impl FnOnce(&mut Blueprint)) -> Result<()> {
        let mut blueprint = Blueprint::create(table);
        build(&mut blueprint);
        let statements = self.connection.schema_writer().compile_create(&blueprint)?;
        self.run(statements)
    }

    /// Applies changes to an existing table. The current columns are
    /// introspected first so the writer can plan around missing ALTER
    /// support.
    pub fn table(&mut self, table: &str, build: impl FnOnce(&mut Blueprint)) -> Result<()> {
        let mut blueprint = Blueprint::alter(table);
        build(&mut blueprint);
        let existing = self.get_columns(table)?;
        let statements = self
            .connection
            .schema_writer()
            .compile_alter(&blueprint, &existing)?;
        self.run(statements)
    }

    pub fn drop(&mut self, table: &str) -> Result<()> {
        let sql = self.connection.schema_writer().compile_drop(table);
        self.connection.statement(&Statement::raw(sql))?;
        Ok(())
    }

    pub fn drop_if_exists(&mut self, table: &str) -> Result<()> {
        let sql = self.connection.schema_writer().compile_drop_if_exists(table);
        self.connection.statement(&Statement::raw(sql))?;
        Ok(())
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let sql = self.connection.schema_writer().compile_rename(from, to);
        self.connection.statement(&Statement::raw(sql))?;
        Ok(())
    }

    pub fn has_table(&mut self, table: &str) -> Result<bool> {
        let statement = self.connection.schema_writer().compile_table_exists(table);
        match self.connection.select_one(&statement)? {
            Some(row) => row.get_as("exists"),
            None => Ok(false),
        }
    }

    pub fn has_column(&mut self, table: &str, column: &str) -> Result<bool> {
        Ok(self
            .get_columns(table)?
            .iter()
            .any(|c| c.name == column))
    }

    pub fn get_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let statement = self.connection.schema_writer().compile_column_listing(table);
        let rows = self.connection.select(&statement)?;
        self.connection.processor().process_columns(rows)
    }

    fn run(&mut self, statements: Vec<String>) -> Result<()> {
        let transactional =
            statements.len() > 1 && self.connection.schema_writer().supports_transactional_ddl();
        if transactional {
            self.connection.transaction(|connection| {
                for sql in statements {
                    connection.statement(&Statement::raw(sql))?;
                }
                Ok(())
            })
        } else {
            for sql in statements {
                self.connection.statement(&Statement::raw(sql))?;
            }
            Ok(())
        }
    }
}
