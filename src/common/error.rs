use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by the store.
///
/// Deleting a record that does not exist is not an error; every other
/// failed operation reports one of these.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("Table '{0}' already exists")]
    #[diagnostic(code(ufobase::duplicate_table))]
    DuplicateTable(String),

    #[error("Table '{0}' not found")]
    #[diagnostic(
        code(ufobase::table_not_found),
        help("use `tables` to list the existing tables")
    )]
    TableNotFound(String),

    #[error("Record with id {id} not found in table '{table}'")]
    #[diagnostic(code(ufobase::record_not_found))]
    RecordNotFound { table: String, id: u64 },

    #[error("Table '{table}' expects {expected} value(s), got {actual}")]
    #[diagnostic(code(ufobase::arity_mismatch))]
    ArityMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("No current table selected")]
    #[diagnostic(
        code(ufobase::no_current_table),
        help("select a table with `use <table>` first")
    )]
    NoCurrentTable,

    #[error("IO Error: {0}")]
    #[diagnostic(code(ufobase::io))]
    IoError(#[from] std::io::Error),

    /// The store file was readable but does not follow the expected layout.
    #[error("Malformed store file at line {line}: {reason}")]
    #[diagnostic(code(ufobase::corrupt))]
    Corrupt { line: usize, reason: String },
}
