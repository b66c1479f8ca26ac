use std::{path::PathBuf, str::FromStr};

use miette::{Result, miette};

use super::keyword::Keyword;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { table: String, columns: Vec<String> },
    Use { table: String },
    /// Values for the current table, in column order.
    Add { values: Vec<String> },
    List { table: String },
    Find {
        table: String,
        field: String,
        value: String,
    },
    Update {
        table: String,
        id: u64,
        updates: Vec<(String, String)>,
    },
    Delete { table: String, id: u64 },
    Save { path: Option<PathBuf> },
    Load { path: Option<PathBuf> },
    Tables,
    Help,
    Exit,
}

/// Splits one input line into a [`Command`].
///
/// Words are separated by whitespace. `add` takes the rest of the line as
/// comma-separated values and `find` takes the rest of the line as the
/// value to match, so both may contain spaces.
pub struct CommandParser<'src> {
    /// Input not consumed yet
    remaining: &'src str,
}

impl<'src> CommandParser<'src> {
    pub fn new(line: &'src str) -> Self {
        Self { remaining: line }
    }

    /// Parses the line. A blank line yields `None`.
    pub fn parse(&mut self) -> Result<Option<Command>> {
        let Some(verb) = self.next_word() else {
            return Ok(None);
        };
        let keyword =
            Keyword::from_str(verb).map_err(|_| miette!("Unknown command: {verb} (try `help`)"))?;

        let command = match keyword {
            Keyword::Create => {
                let table = self.expect_word("table name")?.to_string();
                let mut columns = Vec::new();
                while let Some(column) = self.next_word() {
                    columns.push(column.to_string());
                }
                Command::Create { table, columns }
            }
            Keyword::Use => Command::Use {
                table: self.expect_word("table name")?.to_string(),
            },
            Keyword::Add => {
                let rest = self.rest();
                let values = if rest.is_empty() {
                    Vec::new()
                } else {
                    rest.split(',').map(|v| v.trim().to_string()).collect()
                };
                return Ok(Some(Command::Add { values }));
            }
            Keyword::List => Command::List {
                table: self.expect_word("table name")?.to_string(),
            },
            Keyword::Find => {
                let table = self.expect_word("table name")?.to_string();
                let field = self.expect_word("field name")?.to_string();
                let value = self.rest().to_string();
                return Ok(Some(Command::Find {
                    table,
                    field,
                    value,
                }));
            }
            Keyword::Update => {
                let table = self.expect_word("table name")?.to_string();
                let id = self.expect_id()?;
                let mut updates = Vec::new();
                while let Some(pair) = self.next_word() {
                    let (field, value) = pair
                        .split_once('=')
                        .ok_or_else(|| miette!("Expected field=value, found '{pair}'"))?;
                    updates.push((field.to_string(), value.to_string()));
                }
                if updates.is_empty() {
                    return Err(miette!("Expected at least one field=value pair"));
                }
                Command::Update { table, id, updates }
            }
            Keyword::Delete => Command::Delete {
                table: self.expect_word("table name")?.to_string(),
                id: self.expect_id()?,
            },
            Keyword::Save => Command::Save {
                path: self.next_word().map(PathBuf::from),
            },
            Keyword::Load => Command::Load {
                path: self.next_word().map(PathBuf::from),
            },
            Keyword::Tables => Command::Tables,
            Keyword::Help => Command::Help,
            Keyword::Exit => Command::Exit,
        };

        self.expect_end()?;
        Ok(Some(command))
    }

    fn next_word(&mut self) -> Option<&'src str> {
        let trimmed = self.remaining.trim_start();
        if trimmed.is_empty() {
            self.remaining = trimmed;
            return None;
        }

        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (word, rest) = trimmed.split_at(end);
        self.remaining = rest;
        Some(word)
    }

    fn rest(&mut self) -> &'src str {
        let rest = self.remaining.trim();
        self.remaining = "";
        rest
    }

    fn expect_word(&mut self, what: &str) -> Result<&'src str> {
        self.next_word().ok_or_else(|| miette!("Expected {what}"))
    }

    fn expect_id(&mut self) -> Result<u64> {
        let word = self.expect_word("record id")?;
        word.parse()
            .map_err(|_| miette!("Expected a record id, found '{word}'"))
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.next_word() {
            Some(word) => Err(miette!("Unexpected argument '{word}'")),
            None => Ok(()),
        }
    }
}
