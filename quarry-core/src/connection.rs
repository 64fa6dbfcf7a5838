use crate::{
    ConnectionConfig, Error, Executor, Processor, Result, Row, RowsAffected, Schema, SchemaWriter,
    SqlWriter, Statement,
};
use std::sync::Arc;

/// A live database session: one executor plus the dialect components that
/// compile for it.
///
/// Every statement goes through `&mut self`, so a connection runs one
/// statement at a time. Transactions are a depth counter: depth 0 to 1 uses
/// the executor's native BEGIN/COMMIT/ROLLBACK, deeper levels run
/// writer-compiled savepoints named `sp_{depth}` through [`Executor::execute`].
pub struct Connection {
    executor: Box<dyn Executor>,
    writer: Arc<dyn SqlWriter>,
    schema_writer: Arc<dyn SchemaWriter>,
    processor: Arc<dyn Processor>,
    transactions: usize,
    config: ConnectionConfig,
}

impl Connection {
    pub fn new(
        executor: Box<dyn Executor>,
        writer: Arc<dyn SqlWriter>,
        schema_writer: Arc<dyn SchemaWriter>,
        processor: Arc<dyn Processor>,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            executor,
            writer,
            schema_writer,
            processor,
            transactions: 0,
            config,
        }
    }

    pub fn writer(&self) -> &dyn SqlWriter {
        self.writer.as_ref()
    }

    pub fn schema_writer(&self) -> Arc<dyn SchemaWriter> {
        Arc::clone(&self.schema_writer)
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn transaction_depth(&self) -> usize {
        self.transactions
    }

    pub fn schema(&mut self) -> Schema<'_> {
        Schema::new(self)
    }

    pub fn select(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        log::debug!("select {}", statement);
        log::trace!("bindings {:?}", statement.bindings);
        self.executor
            .query(&statement.sql, &statement.bindings)
            .and_then(|rows| self.processor.process_select(rows))
            .map_err(|e| {
                let error = e.with_statement(statement);
                log::error!("{}", error);
                error
            })
    }

    pub fn select_one(&mut self, statement: &Statement) -> Result<Option<Row>> {
        Ok(self.select(statement)?.into_iter().next())
    }

    pub fn insert(&mut self, statement: &Statement) -> Result<u64> {
        Ok(self.statement(statement)?.rows_affected)
    }

    pub fn insert_get_id(&mut self, statement: &Statement) -> Result<i64> {
        log::debug!("insert {}", statement);
        self.processor
            .process_insert_get_id(&mut *self.executor, statement)
            .map_err(|e| {
                let error = e.with_statement(statement);
                log::error!("{}", error);
                error
            })
    }

    pub fn update(&mut self, statement: &Statement) -> Result<u64> {
        Ok(self.statement(statement)?.rows_affected)
    }

    pub fn delete(&mut self, statement: &Statement) -> Result<u64> {
        Ok(self.statement(statement)?.rows_affected)
    }

    /// Runs any non-SELECT statement and reports what it touched.
    pub fn statement(&mut self, statement: &Statement) -> Result<RowsAffected> {
        log::debug!("execute {}", statement);
        log::trace!("bindings {:?}", statement.bindings);
        self.executor
            .execute(&statement.sql, &statement.bindings)
            .map_err(|e| {
                let error = e.with_statement(statement);
                log::error!("{}", error);
                error
            })
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.transactions == 0 {
            self.executor.begin()?;
        } else {
            let statement = self.writer.compile_savepoint(&savepoint(self.transactions));
            self.statement(&statement)?;
        }
        self.transactions += 1;
        log::debug!("transaction open, depth {}", self.transactions);
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        match self.transactions {
            0 => return Err(Error::transaction("no active transaction to commit")),
            1 => self.executor.commit()?,
            depth => {
                let statement = self.writer.compile_savepoint_release(&savepoint(depth - 1));
                self.statement(&statement)?;
            }
        }
        self.transactions -= 1;
        log::debug!("transaction committed, depth {}", self.transactions);
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        match self.transactions {
            0 => return Err(Error::transaction("no active transaction to roll back")),
            1 => self.executor.rollback()?,
            depth => {
                let statement = self
                    .writer
                    .compile_savepoint_rollback(&savepoint(depth - 1));
                self.statement(&statement)?;
            }
        }
        self.transactions -= 1;
        log::debug!("transaction rolled back, depth {}", self.transactions);
        Ok(())
    }

    /// Runs `work` inside its own transaction level. A success commits that
    /// level, an error rolls back to the depth held at entry and the error is
    /// raised unchanged.
    pub fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let entry = self.transactions;
        self.begin_transaction()?;
        match work(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(error) => {
                while self.transactions > entry {
                    if let Err(rollback_error) = self.rollback() {
                        log::error!("rollback failed: {}", rollback_error);
                        break;
                    }
                }
                Err(error)
            }
        }
    }
}

fn savepoint(depth: usize) -> String {
    format!("sp_{depth}")
}
