//! Line-oriented store file format.
//!
//! ```text
//! <table count>
//! <table name>
//! <column count>
//! <column name>            (one line per column)
//! <next id>
//! <record count>
//! <v1>|<v2>|...|<vN>|<id>  (one line per record)
//! ```
//!
//! The block from `<table name>` to the last record line repeats once per
//! table. Inside names and values `\`, `|`, newline and carriage return are
//! written as `\\`, `\|`, `\n` and `\r`.

use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use tracing::warn;

use crate::{DatabaseError, db::table::Table};

pub(crate) const FIELD_SEPARATOR: char = '|';
const ESCAPE: char = '\\';

/// Largest id counter accepted from a file. Keeps later inserts far away
/// from `u64` overflow.
const MAX_NEXT_ID: u64 = i64::MAX as u64;

/// Escapes a name or value so it fits on one line without stray separators.
pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            FIELD_SEPARATOR => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverses [`escape`]. Unknown escapes keep the escaped character and a
/// trailing lone backslash is kept as is.
pub(crate) fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push(ESCAPE),
        }
    }
    out
}

/// Joins values with the field separator, escaping each one.
pub(crate) fn join_fields<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            line.push(FIELD_SEPARATOR);
        }
        line.push_str(&escape(value));
    }
    line
}

/// Splits a line on unescaped separators and unescapes each token.
pub(crate) fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            FIELD_SEPARATOR => fields.push(unescape(&std::mem::take(&mut current))),
            other => current.push(other),
        }
    }
    fields.push(unescape(&current));
    fields
}

/// Writes every table in iteration order.
pub(crate) fn write_tables<'a, W, I>(out: &mut W, tables: I) -> Result<(), DatabaseError>
where
    W: Write,
    I: ExactSizeIterator<Item = &'a Table>,
{
    writeln!(out, "{}", tables.len())?;

    for table in tables {
        writeln!(out, "{}", escape(table.name()))?;
        writeln!(out, "{}", table.columns().len())?;
        for column in table.columns() {
            writeln!(out, "{}", escape(column))?;
        }
        writeln!(out, "{}", table.next_id())?;
        writeln!(out, "{}", table.len())?;
        for record in table.scan_all() {
            writeln!(out, "{}", table.schema().encode_record(record))?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Reads a whole store file into tables, in file order.
///
/// Nothing is returned unless the entire input parses.
pub(crate) fn read_tables<R: BufRead>(input: R) -> Result<Vec<Table>, DatabaseError> {
    let mut reader = LineReader::new(input);

    let table_count: usize = reader.next_number("table count")?;
    let mut tables = Vec::new();

    for _ in 0..table_count {
        let name = unescape(&reader.next_line("table name")?);

        let column_count: usize = reader.next_number("column count")?;
        let mut columns = Vec::new();
        for _ in 0..column_count {
            columns.push(unescape(&reader.next_line("column name")?));
        }

        let mut table = Table::new(name, columns);
        let next_id: u64 = reader.next_number("next id")?;
        if next_id == 0 || next_id > MAX_NEXT_ID {
            return Err(reader.corrupt(format!("id counter {next_id} out of range")));
        }

        let record_count: usize = reader.next_number("record count")?;
        for _ in 0..record_count {
            let line = reader.next_line("record")?;
            let record = table
                .schema()
                .decode_record(&line)
                .map_err(|reason| reader.corrupt(reason))?;
            table.restore(record);
        }

        let max_id = table.scan_all().iter().filter_map(|r| r.id()).max();
        if let Some(max_id) = max_id.filter(|&max_id| next_id <= max_id) {
            warn!(
                table = table.name(),
                next_id, max_id, "Restored id counter does not exceed the largest stored id"
            );
        }
        table.next_id = next_id;

        tables.push(table);
    }

    Ok(tables)
}

/// Pulls lines one at a time and remembers where it is for error reports.
struct LineReader<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> Result<String, DatabaseError> {
        self.line += 1;
        match self.lines.next() {
            Some(line) => {
                let mut line = line?;
                if line.ends_with('\r') {
                    line.pop();
                }
                Ok(line)
            }
            None => Err(self.corrupt(format!("unexpected end of file, expected {what}"))),
        }
    }

    fn next_number<T: FromStr>(&mut self, what: &str) -> Result<T, DatabaseError> {
        let line = self.next_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| self.corrupt(format!("expected {what}, found '{line}'")))
    }

    fn corrupt(&self, reason: impl Into<String>) -> DatabaseError {
        DatabaseError::Corrupt {
            line: self.line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::Record;

    #[test]
    fn test_escape_and_split() {
        let line = join_fields(["a|b", "c\\d", "line\nbreak", ""]);
        assert_eq!(line, "a\\|b|c\\\\d|line\\nbreak|");
        assert_eq!(split_fields(&line), vec!["a|b", "c\\d", "line\nbreak", ""]);
    }

    #[test]
    fn test_split_plain_line() {
        assert_eq!(split_fields("Ann|30|1"), vec!["Ann", "30", "1"]);
        assert_eq!(split_fields("4"), vec!["4"]);
    }

    #[test]
    fn test_write_layout() {
        let mut table = Table::new("people".to_string(), vec!["name".into(), "age".into()]);
        table.insert([("name", "Ann"), ("age", "30")].into_iter().collect());
        table.insert([("name", "Bo")].into_iter().collect::<Record>());

        let mut out = Vec::new();
        write_tables(&mut out, [&table].into_iter()).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "1\npeople\n2\nname\nage\n3\n2\nAnn|30|1\nBo||2\n");
    }

    #[test]
    fn test_read_restores_ids_and_counter() {
        let input = "1\npeople\n2\nname\nage\n9\n2\nAnn|30|1\nCy|40|3\n";
        let tables = read_tables(input.as_bytes()).unwrap();

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name(), "people");
        assert_eq!(table.columns(), ["name", "age"]);
        assert_eq!(table.next_id(), 9);

        let ids: Vec<_> = table.scan_all().iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(table.scan_all()[1].get("name"), "Cy");
    }

    #[test]
    fn test_read_accepts_crlf() {
        let input = "1\r\nt\r\n1\r\nc\r\n2\r\n1\r\nv|1\r\n";
        let tables = read_tables(input.as_bytes()).unwrap();
        assert_eq!(tables[0].name(), "t");
        assert_eq!(tables[0].scan_all()[0].get("c"), "v");
    }

    #[test]
    fn test_read_truncated_file() {
        let err = read_tables("1\npeople\n2\nname\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 5, .. }));
    }

    #[test]
    fn test_read_bad_count() {
        let err = read_tables("two\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 1, .. }));
    }

    #[test]
    fn test_read_wrong_token_count() {
        let input = "1\npeople\n2\nname\nage\n2\n1\nAnn|1\n";
        let err = read_tables(input.as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 8, .. }));
    }

    #[test]
    fn test_read_huge_count() {
        let err = read_tables("18446744073709551615\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 2, .. }));

        let err = read_tables("1\nt\n1000000000000\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 4, .. }));
    }

    #[test]
    fn test_read_counter_out_of_range() {
        let err = read_tables("1\nt\n1\nc\n18446744073709551615\n0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 5, .. }));

        let err = read_tables("1\nt\n1\nc\n0\n0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { line: 5, .. }));
    }

    #[test]
    fn test_read_empty_store() {
        assert!(read_tables("0\n".as_bytes()).unwrap().is_empty());
    }
}
