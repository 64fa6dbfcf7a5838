use crate::{Error, Executor, Result, Row, Statement, Value};

/// A column as reported by the backend's introspection query, normalized
/// across dialects by the [`Processor`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// Type name as the backend spells it, passed through untouched.
    pub column_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary: bool,
}

/// Massages raw backend results into the shapes the rest of the crate
/// consumes. One implementation per dialect.
pub trait Processor: Send + Sync {
    /// Hook over every SELECT result set. The default is a pass-through.
    fn process_select(&self, rows: Vec<Row>) -> Result<Vec<Row>> {
        Ok(rows)
    }

    /// Runs an INSERT and reports the generated key. The default trusts the
    /// executor to return it alongside the affected count; dialects whose
    /// drivers do not populate it query for the id instead.
    fn process_insert_get_id(
        &self,
        executor: &mut dyn Executor,
        statement: &Statement,
    ) -> Result<i64> {
        let affected = executor.execute(&statement.sql, &statement.bindings)?;
        affected
            .last_affected_id
            .ok_or_else(|| Error::decode("the insert reported no generated id"))
    }

    /// Turns the rows of the dialect's column listing query into
    /// [`ColumnInfo`]s.
    fn process_columns(&self, rows: Vec<Row>) -> Result<Vec<ColumnInfo>>;
}

/// Nullability flag as the backends spell it, either a real boolean or
/// information_schema's `YES`/`NO` text.
pub(crate) fn read_nullable(row: &Row, label: &str) -> Result<bool> {
    match row.get(label) {
        Some(Value::Varchar(Some(text))) => Ok(text.eq_ignore_ascii_case("yes") || text == "1"),
        _ => row.get_as(label),
    }
}

/// Processor for backends whose column listing uses the normalized labels
/// `name`, `type`, `nullable` and `default`. A `primary` label is honoured
/// when present.
pub struct GenericProcessor;

impl Processor for GenericProcessor {
    fn process_columns(&self, rows: Vec<Row>) -> Result<Vec<ColumnInfo>> {
        rows.into_iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.get_as("name")?,
                    column_type: row.get_as("type")?,
                    nullable: read_nullable(&row, "nullable")?,
                    default: row.get_as("default")?,
                    primary: match row.get("primary") {
                        Some(value) => !value.is_null() && row.get_as("primary")?,
                        None => false,
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn row(labels: &[&str], values: Vec<Value>) -> Row {
        let labels: Arc<[String]> = labels.iter().map(|label| label.to_string()).collect();
        Row::new(labels, values.into_boxed_slice())
    }

    #[test]
    fn normalized_listings_become_column_infos() {
        let rows = vec![
            row(
                &["name", "type", "nullable", "default", "primary"],
                vec![
                    Value::Varchar(Some("id".into())),
                    Value::Varchar(Some("INTEGER".into())),
                    Value::Varchar(Some("NO".into())),
                    Value::Varchar(None),
                    Value::Int64(Some(1)),
                ],
            ),
            row(
                &["name", "type", "nullable", "default", "primary"],
                vec![
                    Value::Varchar(Some("name".into())),
                    Value::Varchar(Some("VARCHAR(120)".into())),
                    Value::Varchar(Some("YES".into())),
                    Value::Varchar(Some("'anonymous'".into())),
                    Value::Int64(Some(0)),
                ],
            ),
        ];
        let columns = GenericProcessor
            .process_columns(rows)
            .expect("Failed to process the listing");
        assert_eq!(
            columns[0],
            ColumnInfo {
                name: "id".into(),
                column_type: "INTEGER".into(),
                nullable: false,
                default: None,
                primary: true,
            }
        );
        assert!(columns[1].nullable);
        assert_eq!(columns[1].default.as_deref(), Some("'anonymous'"));
        assert!(!columns[1].primary);
    }

    #[test]
    fn the_primary_label_is_optional() {
        let columns = GenericProcessor
            .process_columns(vec![row(
                &["name", "type", "nullable", "default"],
                vec![
                    Value::Varchar(Some("id".into())),
                    Value::Varchar(Some("INTEGER".into())),
                    Value::Boolean(Some(false)),
                    Value::Varchar(None),
                ],
            )])
            .expect("Failed to process the listing");
        assert!(!columns[0].primary);
    }
}
