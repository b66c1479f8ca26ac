use super::record::{ID_FIELD, Record};
use crate::storage::text_format::{join_fields, split_fields};

/// The declared column list of a table.
///
/// Fixed when the table is created. Records are not validated against it:
/// a record may lack a declared column or carry extra fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// The ordered column names.
    pub columns: Vec<String>,
}

impl Schema {
    /// Creates a new schema from an ordered list of column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Finds the position of a column by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    /// Pairs each declared column with the value at the same position.
    ///
    /// Returns `None` when the number of values differs from the number of
    /// columns.
    pub fn record_from_values(&self, values: Vec<String>) -> Option<Record> {
        if values.len() != self.columns.len() {
            return None;
        }

        Some(self.columns.iter().cloned().zip(values).collect())
    }

    /// Encodes a record as one line: declared column values, then the id.
    ///
    /// Fields outside the declared columns are not written.
    pub(crate) fn encode_record(&self, record: &Record) -> String {
        join_fields(
            self.columns
                .iter()
                .map(|col| record.get(col))
                .chain(std::iter::once(record.get(ID_FIELD))),
        )
    }

    /// Decodes a line written by [`Schema::encode_record`].
    pub(crate) fn decode_record(&self, line: &str) -> Result<Record, String> {
        let mut values = split_fields(line);
        let expected = self.columns.len() + 1;
        if values.len() != expected {
            return Err(format!(
                "expected {expected} field(s) in record, found {}",
                values.len()
            ));
        }

        // Last token is always the id
        let id = values.pop().unwrap_or_default();
        if id.parse::<u64>().is_err() {
            return Err(format!("invalid record id '{id}'"));
        }

        let mut record: Record = self.columns.iter().cloned().zip(values).collect();
        record.set(ID_FIELD, id);
        Ok(record)
    }
}
