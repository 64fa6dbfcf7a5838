use crate::{
    Connection, ConnectionConfig, Executor, Processor, Result, SchemaWriter, SqlWriter,
};
use std::sync::Arc;

/// Supplies the dialect components and assembles them into a [`Connection`].
pub trait Driver {
    /// Driver name as it appears in connection urls.
    const NAME: &'static str;

    fn sql_writer(&self, config: &ConnectionConfig) -> Arc<dyn SqlWriter>;
    fn schema_writer(&self, config: &ConnectionConfig) -> Arc<dyn SchemaWriter>;
    fn processor(&self) -> Arc<dyn Processor>;

    /// Builds the connection and runs the writer's session statements
    /// against it, charset setup and the like.
    fn connect(&self, executor: Box<dyn Executor>, config: ConnectionConfig) -> Result<Connection> {
        let writer = self.sql_writer(&config);
        let schema_writer = self.schema_writer(&config);
        let processor = self.processor();
        let mut connection = Connection::new(executor, writer, schema_writer, processor, config);
        let session = connection.writer().compile_session(connection.config());
        for statement in &session {
            connection.statement(statement)?;
        }
        Ok(connection)
    }
}
