use crate::{AsValue, Error, Result, Value};
use std::sync::Arc;

/// Shared reference-counted column name list. Rows of a single result set all
/// point at the same allocation.
pub type RowLabels = Arc<[String]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column names.
    pub labels: RowLabels,
    /// Data values (aligned by index with `labels`).
    pub values: Box<[Value]>,
}

impl Row {
    pub fn new(labels: RowLabels, values: Box<[Value]>) -> Self {
        Self { labels, values }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }

    /// Decode the named column into a native type, erroring both on a missing
    /// label and on a value of the wrong shape.
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::decode(format!("row has no column `{name}`")))?;
        T::try_from_value(value.clone())
    }

    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        self.labels
            .iter()
            .cloned()
            .zip(self.values.into_vec())
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(
            Arc::from(["id".to_string(), "name".to_string()]),
            Box::new([Value::Int64(Some(7)), Value::Varchar(Some("Ada".into()))]),
        )
    }

    #[test]
    fn lookup_by_label() {
        let row = sample();
        assert_eq!(row.get("id"), Some(&Value::Int64(Some(7))));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn decode_checks_both_label_and_type() {
        let row = sample();
        let id: i64 = row.get_as("id").expect("Failed to decode the id");
        assert_eq!(id, 7);
        assert!(row.get_as::<i64>("name").is_err());
        assert!(row.get_as::<i64>("missing").is_err());
    }
}
