use crate::{SQLiteProcessor, SQLiteSqlWriter};
use quarry_core::{ConnectionConfig, Driver, Processor, SchemaWriter, SqlWriter};
use std::sync::Arc;

#[derive(Debug)]
pub struct SQLiteDriver;

impl SQLiteDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SQLiteDriver {
    const NAME: &'static str = "sqlite";

    fn sql_writer(&self, config: &ConnectionConfig) -> Arc<dyn SqlWriter> {
        Arc::new(SQLiteSqlWriter::with_prefix(config.prefix.clone()))
    }

    fn schema_writer(&self, config: &ConnectionConfig) -> Arc<dyn SchemaWriter> {
        Arc::new(SQLiteSqlWriter::with_prefix(config.prefix.clone()))
    }

    fn processor(&self) -> Arc<dyn Processor> {
        Arc::new(SQLiteProcessor)
    }
}
