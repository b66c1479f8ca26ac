use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use tracing::info;

use crate::{
    DatabaseError,
    db::table::{Record, Table},
    storage::text_format,
};

/// The main database handle.
///
/// `Database` owns every table, routes record operations to them, and
/// saves or loads the whole collection as one flat text file.
///
/// It also keeps a "current table": the default target for records added
/// without naming a table.
#[derive(Debug, Default)]
pub struct Database {
    /// All tables, keyed by their case-sensitive name.
    pub tables: BTreeMap<String, Table>,

    /// Name of the table selected with [`Database::set_current_table`].
    current_table: Option<String>,
}

impl Database {
    /// Creates an empty database with no tables and no current table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty table with the given columns.
    ///
    /// Fails if a table with the same name already exists; the existing
    /// table is left as it was.
    pub fn create_table(&mut self, name: &str, columns: Vec<String>) -> Result<(), DatabaseError> {
        if self.tables.contains_key(name) {
            return Err(DatabaseError::DuplicateTable(name.to_string()));
        }

        info!(table = name, columns = columns.len(), "Creating table");
        self.tables
            .insert(name.to_string(), Table::new(name.to_string(), columns));
        Ok(())
    }

    /// Gets an immutable reference to a table.
    pub fn get_table(&self, name: &str) -> Result<&Table, DatabaseError> {
        self.tables
            .get(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Gets a mutable reference to a table.
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, DatabaseError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Names of all tables, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Selects the table that [`Database::add_to_current`] writes to.
    pub fn set_current_table(&mut self, name: &str) -> Result<(), DatabaseError> {
        self.get_table(name)?;
        self.current_table = Some(name.to_string());
        Ok(())
    }

    /// The currently selected table, if any.
    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    /// Inserts a record into a table and returns its new id.
    pub fn insert(&mut self, table_name: &str, record: Record) -> Result<u64, DatabaseError> {
        Ok(self.get_table_mut(table_name)?.insert(record))
    }

    /// Inserts a record built from values in the table's column order.
    ///
    /// Nothing is inserted if the number of values differs from the number
    /// of columns.
    pub fn add_data(
        &mut self,
        table_name: &str,
        values: Vec<String>,
    ) -> Result<u64, DatabaseError> {
        let table = self.get_table_mut(table_name)?;
        let record = table.record_from_values(values)?;
        Ok(table.insert(record))
    }

    /// Like [`Database::add_data`], targeting the current table.
    pub fn add_to_current(&mut self, values: Vec<String>) -> Result<u64, DatabaseError> {
        let name = self
            .current_table
            .clone()
            .ok_or(DatabaseError::NoCurrentTable)?;
        self.add_data(&name, values)
    }

    /// All records of a table in insertion order.
    pub fn select(&self, table_name: &str) -> Result<&[Record], DatabaseError> {
        Ok(self.get_table(table_name)?.scan_all())
    }

    /// Records of a table whose `field` equals `value`, in insertion order.
    pub fn select_where(
        &self,
        table_name: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<&Record>, DatabaseError> {
        Ok(self.get_table(table_name)?.select_where(field, value))
    }

    /// Upserts fields on the record with the given id.
    pub fn update<I, K, V>(
        &mut self,
        table_name: &str,
        id: u64,
        updates: I,
    ) -> Result<(), DatabaseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.get_table_mut(table_name)?.update(id, updates)
    }

    /// Deletes a record. A missing table or id simply returns `false`.
    pub fn delete_record(&mut self, table_name: &str, id: u64) -> bool {
        self.tables
            .get_mut(table_name)
            .is_some_and(|table| table.delete(id))
    }

    /// Writes every table to `path`, replacing whatever file was there.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatabaseError> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        text_format::write_tables(&mut out, self.tables.values())?;

        info!(path = %path.display(), tables = self.tables.len(), "Saved database");
        Ok(())
    }

    /// Replaces all tables with the contents of the file at `path`.
    ///
    /// The current table is cleared. On any error the database is left
    /// exactly as it was before the call.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DatabaseError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut tables = BTreeMap::new();
        for table in text_format::read_tables(BufReader::new(file))? {
            if tables.contains_key(table.name()) {
                return Err(DatabaseError::DuplicateTable(table.name().to_string()));
            }
            tables.insert(table.name().to_string(), table);
        }

        self.tables = tables;
        self.current_table = None;

        info!(path = %path.display(), tables = self.tables.len(), "Loaded database");
        Ok(())
    }
}
