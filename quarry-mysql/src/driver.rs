use crate::{MySQLProcessor, MySQLSqlWriter};
use quarry_core::{ConnectionConfig, Driver, Processor, SchemaWriter, SqlWriter};
use std::sync::Arc;

#[derive(Debug)]
pub struct MySQLDriver;

impl MySQLDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for MySQLDriver {
    const NAME: &'static str = "mysql";

    fn sql_writer(&self, config: &ConnectionConfig) -> Arc<dyn SqlWriter> {
        Arc::new(MySQLSqlWriter::with_prefix(config.prefix.clone()))
    }

    fn schema_writer(&self, config: &ConnectionConfig) -> Arc<dyn SchemaWriter> {
        Arc::new(MySQLSqlWriter::with_prefix(config.prefix.clone()))
    }

    fn processor(&self) -> Arc<dyn Processor> {
        Arc::new(MySQLProcessor)
    }
}
