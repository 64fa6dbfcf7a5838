use quarry_core::{ColumnInfo, Processor, Result, Row};

pub struct MySQLProcessor;

impl Processor for MySQLProcessor {
    /// Shapes the information_schema listing compiled by the writer. The
    /// generated id needs no override here, the driver reports it with the
    /// affected count.
    fn process_columns(&self, rows: Vec<Row>) -> Result<Vec<ColumnInfo>> {
        rows.into_iter()
            .map(|row| {
                let nullable: String = row.get_as("nullable")?;
                let key: String = row.get_as("column_key")?;
                Ok(ColumnInfo {
                    name: row.get_as("name")?,
                    column_type: row.get_as("type")?,
                    nullable: nullable.eq_ignore_ascii_case("yes"),
                    default: row.get_as("default")?,
                    primary: key == "PRI",
                })
            })
            .collect()
    }
}
