//! Line-oriented front end over [`Database`].
//!
//! The binary reads lines, hands them to [`Shell::run_line`] and prints
//! whatever comes back. Errors never end the session.

use std::path::{Path, PathBuf};

use miette::{Result, miette};

use crate::{Database, db::table::Record};

pub use parser::{Command, CommandParser};

pub(crate) mod keyword;
pub(crate) mod parser;

pub const HELP: &str = "\
Commands:
  create <table> <column>...            create a table
  use <table>                           select the current table
  add <value>,<value>,...               add a record to the current table
  list <table>                          print every record of a table
  find <table> <field> <value>          print records where field = value
  update <table> <id> <field>=<value>...  change fields of a record
  delete <table> <id>                   delete a record
  save [path]                           write all tables to a file
  load [path]                           replace all tables with a file's contents
  tables                                list table names
  help                                  show this text
  exit                                  leave
";

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show the user. May be empty.
    Print(String),
    Exit,
}

/// A session: the database plus the store file used when `save` or `load`
/// is given no path.
#[derive(Debug, Default)]
pub struct Shell {
    pub database: Database,
    default_file: Option<PathBuf>,
}

impl Shell {
    pub fn new(database: Database, default_file: Option<PathBuf>) -> Self {
        Self {
            database,
            default_file,
        }
    }

    pub fn default_file(&self) -> Option<&Path> {
        self.default_file.as_deref()
    }

    /// Parses and runs one line. A blank line prints nothing.
    pub fn run_line(&mut self, line: &str) -> Result<Outcome> {
        match CommandParser::new(line).parse()? {
            Some(command) => self.execute(command),
            None => Ok(Outcome::Print(String::new())),
        }
    }

    /// Runs a parsed command against the database.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        let db = &mut self.database;

        let output = match command {
            Command::Create { table, columns } => {
                db.create_table(&table, columns)?;
                format!("Table \"{table}\" created.")
            }
            Command::Use { table } => {
                db.set_current_table(&table)?;
                format!("Table \"{table}\" selected.")
            }
            Command::Add { values } => {
                let id = db.add_to_current(values)?;
                format!("Record {id} added.")
            }
            Command::List { table } => db.get_table(&table)?.to_string(),
            Command::Find {
                table,
                field,
                value,
            } => {
                let matches = db.select_where(&table, &field, &value)?;
                render_matches(db.get_table(&table)?.columns(), &matches)
            }
            Command::Update { table, id, updates } => {
                db.update(&table, id, updates)?;
                format!("Record {id} updated.")
            }
            Command::Delete { table, id } => {
                if db.delete_record(&table, id) {
                    format!("Record {id} deleted.")
                } else {
                    format!("No record {id} in \"{table}\".")
                }
            }
            Command::Save { path } => {
                let path = resolve_path(path, self.default_file.as_deref())?;
                db.save(&path)?;
                format!("Saved to {}.", path.display())
            }
            Command::Load { path } => {
                let path = resolve_path(path, self.default_file.as_deref())?;
                db.load(&path)?;
                format!("Loaded from {}.", path.display())
            }
            Command::Tables => {
                let names: Vec<_> = db.table_names().collect();
                if names.is_empty() {
                    "No tables.".to_string()
                } else {
                    let lines: Vec<_> = names.iter().map(|name| format!("- {name}")).collect();
                    format!("Tables:\n{}", lines.join("\n"))
                }
            }
            Command::Help => HELP.trim_end().to_string(),
            Command::Exit => return Ok(Outcome::Exit),
        };

        Ok(Outcome::Print(output))
    }
}

fn resolve_path(path: Option<PathBuf>, default_file: Option<&Path>) -> Result<PathBuf> {
    path.or_else(|| default_file.map(Path::to_path_buf))
        .ok_or_else(|| miette!("No file given and no default store file configured"))
}

/// Renders matching records with the same layout as a full table listing.
fn render_matches(columns: &[String], matches: &[&Record]) -> String {
    let mut view = crate::Table::new(String::new(), columns.to_vec());
    for record in matches {
        view.restore((*record).clone());
    }
    view.to_string()
}
