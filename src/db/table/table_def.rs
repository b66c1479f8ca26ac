use std::fmt::{self, Display};

use tracing::{debug, warn};

use super::{
    record::{ID_FIELD, Record},
    schema::Schema,
};
use crate::DatabaseError;

/// Width of one cell in the terminal listing.
const CELL_WIDTH: usize = 10;

/// A named table: a fixed column list, its records in insertion order,
/// and the counter that hands out record ids.
///
/// Ids start at 1 and only ever grow, so an id is never handed out twice
/// even after the record that had it is deleted.
#[derive(Debug, Clone)]
pub struct Table {
    /// The table name.
    pub(crate) name: String,

    /// The declared columns.
    pub(crate) schema: Schema,

    /// Records in insertion order.
    pub(crate) records: Vec<Record>,

    /// Id assigned to the next inserted record.
    pub(crate) next_id: u64,
}

impl Table {
    /// Creates an empty table whose first record will get id 1.
    pub fn new(name: String, columns: Vec<String>) -> Self {
        Self {
            name,
            schema: Schema::new(columns),
            records: Vec::new(),
            next_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The declared column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.schema.columns
    }

    /// The id the next inserted record will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record under a fresh id and returns that id.
    ///
    /// Any `id` the caller set on the record is overwritten.
    pub fn insert(&mut self, mut record: Record) -> u64 {
        let id = self.next_id;
        record.set(ID_FIELD, id.to_string());
        self.records.push(record);
        self.next_id += 1;

        debug!(table = %self.name, id, "Inserted record");
        id
    }

    /// Appends a record keeping the id it already carries.
    ///
    /// Used when loading a store file; the counter is restored separately.
    pub(crate) fn restore(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Builds a record from values given in declared column order.
    pub fn record_from_values(&self, values: Vec<String>) -> Result<Record, DatabaseError> {
        let actual = values.len();
        self.schema
            .record_from_values(values)
            .ok_or_else(|| DatabaseError::ArityMismatch {
                table: self.name.clone(),
                expected: self.schema.columns.len(),
                actual,
            })
    }

    /// All records in insertion order.
    pub fn scan_all(&self) -> &[Record] {
        &self.records
    }

    /// Records whose `field` equals `value` exactly, in insertion order.
    ///
    /// A record without the field matches only the empty string.
    pub fn select_where(&self, field: &str, value: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.get(field) == value)
            .collect()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.iter().find(|record| record.has_id(id))
    }

    /// Upserts each field on the record with the given id.
    ///
    /// The `id` field itself is never rewritten; such entries are skipped.
    pub fn update<I, K, V>(&mut self, id: u64, updates: I) -> Result<(), DatabaseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let Some(record) = self.records.iter_mut().find(|record| record.has_id(id)) else {
            return Err(DatabaseError::RecordNotFound {
                table: self.name.clone(),
                id,
            });
        };

        for (field, value) in updates {
            let field = field.into();
            if field == ID_FIELD {
                warn!(table = %self.name, id, "Ignoring update to the id field");
                continue;
            }
            record.set(field, value);
        }

        debug!(table = %self.name, id, "Updated record");
        Ok(())
    }

    /// Removes the record with the given id. Returns whether one was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|record| !record.has_id(id));
        let removed = self.records.len() != before;

        if removed {
            debug!(table = %self.name, id, "Deleted record");
        }
        removed
    }
}

/// Renders the table as a fixed-width listing: `id` first, then the
/// declared columns.
impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_row(f, std::iter::once(ID_FIELD).chain(self.columns().iter().map(String::as_str)))?;
        writeln!(f, "{}", "-".repeat((CELL_WIDTH + 3) * (self.columns().len() + 1)))?;

        for record in &self.records {
            write_row(
                f,
                std::iter::once(record.get(ID_FIELD))
                    .chain(self.columns().iter().map(|col| record.get(col))),
            )?;
        }

        Ok(())
    }
}

fn write_row<'a>(f: &mut fmt::Formatter<'_>, cells: impl Iterator<Item = &'a str>) -> fmt::Result {
    for (i, cell) in cells.enumerate() {
        let sep = if i == 0 { "| " } else { " | " };
        write!(f, "{sep}{cell:<width$}", width = CELL_WIDTH)?;
    }
    writeln!(f, " |")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::new("people".to_string(), vec!["name".to_string(), "age".to_string()])
    }

    fn add(table: &mut Table, name: &str, age: &str) -> u64 {
        let record = table
            .record_from_values(vec![name.to_string(), age.to_string()])
            .unwrap();
        table.insert(record)
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut table = people();
        assert_eq!(add(&mut table, "Ann", "30"), 1);
        assert_eq!(add(&mut table, "Bo", "25"), 2);
        assert_eq!(table.next_id(), 3);
        assert_eq!(table.get(2).unwrap().get("name"), "Bo");
    }

    #[test]
    fn test_insert_overwrites_caller_id() {
        let mut table = people();
        let record: Record = [("id", "99"), ("name", "Ann")].into_iter().collect();
        assert_eq!(table.insert(record), 1);
        assert!(table.get(99).is_none());
        assert_eq!(table.scan_all()[0].id(), Some(1));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut table = people();
        add(&mut table, "Ann", "30");
        add(&mut table, "Bo", "25");
        assert!(table.delete(2));
        assert_eq!(add(&mut table, "Cy", "40"), 3);

        let ids: Vec<_> = table.scan_all().iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_delete_twice() {
        let mut table = people();
        add(&mut table, "Ann", "30");
        add(&mut table, "Bo", "25");

        assert!(table.delete(1));
        assert_eq!(table.len(), 1);
        assert!(!table.delete(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_select_where() {
        let mut table = people();
        add(&mut table, "Ann", "30");
        add(&mut table, "Bo", "30");
        add(&mut table, "Cy", "41");
        table.insert([("name", "Dee")].into_iter().collect());

        let thirty: Vec<_> = table
            .select_where("age", "30")
            .into_iter()
            .map(|r| r.get("name"))
            .collect();
        assert_eq!(thirty, vec!["Ann", "Bo"]);

        // Missing fields compare equal to ""
        let no_age = table.select_where("age", "");
        assert_eq!(no_age.len(), 1);
        assert_eq!(no_age[0].get("name"), "Dee");

        assert!(table.select_where("name", "ann").is_empty());
        assert!(table.select_where("name", "An").is_empty());
    }

    #[test]
    fn test_update_upserts() {
        let mut table = people();
        add(&mut table, "Ann", "30");

        table.update(1, [("age", "31"), ("city", "Oslo")]).unwrap();
        let record = table.get(1).unwrap();
        assert_eq!(record.get("age"), "31");
        assert_eq!(record.get("city"), "Oslo");
        assert_eq!(record.get("name"), "Ann");
    }

    #[test]
    fn test_update_missing_record() {
        let mut table = people();
        add(&mut table, "Ann", "30");
        let before = table.scan_all().to_vec();

        let err = table.update(5, [("age", "31")]).unwrap_err();
        assert!(matches!(err, DatabaseError::RecordNotFound { id: 5, .. }));
        assert_eq!(table.scan_all(), before.as_slice());
    }

    #[test]
    fn test_update_keeps_id() {
        let mut table = people();
        add(&mut table, "Ann", "30");
        table.update(1, [("id", "7"), ("age", "31")]).unwrap();

        let record = table.get(1).unwrap();
        assert_eq!(record.id(), Some(1));
        assert_eq!(record.get("age"), "31");
    }

    #[test]
    fn test_arity_mismatch() {
        let table = people();
        let err = table.record_from_values(vec!["Ann".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::ArityMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_display_listing() {
        let mut table = people();
        add(&mut table, "Ann", "30");

        let expected = format!(
            "| {:<10} | {:<10} | {:<10} |\n{}\n| {:<10} | {:<10} | {:<10} |\n",
            "id",
            "name",
            "age",
            "-".repeat(39),
            "1",
            "Ann",
            "30"
        );
        assert_eq!(table.to_string(), expected);
    }
}
