use quarry_core::{AsValue, ColumnInfo, Error, Executor, Processor, Result, Row, Statement};

pub struct SQLiteProcessor;

impl Processor for SQLiteProcessor {
    /// The bundled driver reports the rowid with the affected count; going
    /// through `last_insert_rowid()` covers executors that do not.
    fn process_insert_get_id(
        &self,
        executor: &mut dyn Executor,
        statement: &Statement,
    ) -> Result<i64> {
        let affected = executor.execute(&statement.sql, &statement.bindings)?;
        if let Some(id) = affected.last_affected_id {
            return Ok(id);
        }
        let rows = executor.query("SELECT last_insert_rowid()", &[])?;
        match rows.first().and_then(|row| row.values.first()) {
            Some(value) => i64::try_from_value(value.clone()),
            None => Err(Error::decode("last_insert_rowid() returned no row")),
        }
    }

    /// Shapes `PRAGMA table_info` rows: `name`, `type`, `notnull`,
    /// `dflt_value` and `pk`.
    fn process_columns(&self, rows: Vec<Row>) -> Result<Vec<ColumnInfo>> {
        rows.into_iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.get_as("name")?,
                    column_type: row.get_as("type")?,
                    nullable: !row.get_as::<bool>("notnull")?,
                    default: row.get_as("dflt_value")?,
                    primary: row.get_as::<i64>("pk")? > 0,
                })
            })
            .collect()
    }
}
