//! Numeric delimited table reading
//!
//! SLAM tools dump their maps and trajectories as delimited text with a
//! single header line followed by purely numeric rows. This module reads such
//! a file into memory, keeping the source line number of every row so later
//! stages can point at the offending line.

use serde::{Deserialize, Serialize};
use slamply_core::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Supported delimiters for CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    Comma,
    Space,
    Tab,
    Semicolon,
}

impl Delimiter {
    /// Get the character representation of the delimiter
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Space => ' ',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            // Runs of spaces count as one separator
            Delimiter::Space => line.split_whitespace().collect(),
            _ => line.split(self.as_char()).map(str::trim).collect(),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Comma => "comma",
            Delimiter::Space => "space",
            Delimiter::Tab => "tab",
            Delimiter::Semicolon => "semicolon",
        };
        f.write_str(name)
    }
}

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," => Ok(Delimiter::Comma),
            "space" | " " => Ok(Delimiter::Space),
            "tab" | "\t" => Ok(Delimiter::Tab),
            "semicolon" | ";" => Ok(Delimiter::Semicolon),
            other => Err(Error::InvalidData(format!("Unknown delimiter: {}", other))),
        }
    }
}

/// How a numeric table is laid out on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub delimiter: Delimiter,
    /// Number of leading lines discarded before data rows start
    pub header_lines: usize,
}

impl TableOptions {
    /// Comma separated with one header line, as written by ORB-SLAM tooling
    pub fn csv() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            header_lines: 1,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::csv()
    }
}

/// One parsed data row
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub values: Vec<f64>,
}

impl NumericRow {
    /// Fetch a column, failing with the row's line number when it is missing
    pub fn get(&self, column: usize) -> Result<f64> {
        self.values.get(column).copied().ok_or_else(|| {
            Error::input_format(
                self.line,
                format!(
                    "row has {} fields, column {} requested",
                    self.values.len(),
                    column
                ),
            )
        })
    }
}

/// All data rows of a numeric table, header discarded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericTable {
    pub rows: Vec<NumericRow>,
}

impl NumericTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NumericRow> {
        self.rows.iter()
    }
}

/// Reader for purely numeric delimited tables
pub struct NumericTableReader;

impl NumericTableReader {
    /// Read a table from a file
    pub fn read<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<NumericTable> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), options)
    }

    /// Read a table from any buffered source
    ///
    /// Header lines are discarded as raw bytes, so they need not be UTF-8.
    /// A data row that is not UTF-8 cannot be numeric and is rejected as an
    /// input format error.
    pub fn from_reader<R: BufRead>(mut reader: R, options: &TableOptions) -> Result<NumericTable> {
        let mut buf = Vec::new();

        for header_idx in 0..options.header_lines {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Err(Error::input_format(
                    header_idx + 1,
                    format!(
                        "expected {} header line(s), file ended early",
                        options.header_lines
                    ),
                ));
            }
        }

        let mut table = NumericTable::default();
        let mut line_number = options.header_lines;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let line = std::str::from_utf8(&buf).map_err(|e| {
                Error::input_format(line_number, format!("row is not valid UTF-8: {}", e))
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            table.rows.push(Self::parse_line(trimmed, line_number, options.delimiter)?);
        }

        Ok(table)
    }

    /// Parse a single line into a row of numbers
    fn parse_line(line: &str, line_number: usize, delimiter: Delimiter) -> Result<NumericRow> {
        let values = delimiter
            .split(line)
            .into_iter()
            .enumerate()
            .map(|(column, field)| {
                field.parse::<f64>().map_err(|_| {
                    Error::input_format(
                        line_number,
                        format!("field {} ('{}') is not a number", column, field),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NumericRow {
            line: line_number,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_str(content: &str, options: &TableOptions) -> Result<NumericTable> {
        NumericTableReader::from_reader(Cursor::new(content), options)
    }

    #[test]
    fn test_delimiter_parsing() {
        assert_eq!("comma".parse::<Delimiter>().unwrap(), Delimiter::Comma);
        assert_eq!("TAB".parse::<Delimiter>().unwrap(), Delimiter::Tab);
        assert_eq!(";".parse::<Delimiter>().unwrap(), Delimiter::Semicolon);
        assert_eq!("space".parse::<Delimiter>().unwrap(), Delimiter::Space);
        assert!("pipe".parse::<Delimiter>().is_err());
        assert_eq!(Delimiter::Semicolon.to_string(), "semicolon");
    }

    #[test]
    fn test_csv_with_header() {
        let table = read_str("x,y,z\n1.0,2.0,3.0\n4.0,5.0,6.0\n", &TableOptions::csv()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].values, vec![4.0, 5.0, 6.0]);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = read_str("x,y,z\n", &TableOptions::csv()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_header_is_error() {
        let err = read_str("", &TableOptions::csv()).unwrap_err();
        assert!(err.is_input_format());
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let content = "x,y,z\n\n# comment\n1,2,3\n   \n4,5,6\n";
        let table = read_str(content, &TableOptions::csv()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].line, 6);
    }

    #[test]
    fn test_non_numeric_field_reports_line() {
        let content = "x,y,z\n1,2,3\n/img/0.png,2,3\n";
        match read_str(content, &TableOptions::csv()) {
            Err(Error::InputFormat { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("/img/0.png"));
            }
            other => panic!("Expected input format error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_field_is_error() {
        let err = read_str("x,y,z\n1,,3\n", &TableOptions::csv()).unwrap_err();
        assert!(err.is_input_format());
    }

    #[test]
    fn test_space_delimited_without_header() {
        let options = TableOptions::csv()
            .with_delimiter(Delimiter::Space)
            .with_header_lines(0);
        let table = read_str("1.0  2.0 3.0\n4 5 6\n", &options).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(table.rows[0].line, 1);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let table = read_str("h\n1,2,3\n1,2,3,4,5\n", &TableOptions::csv()).unwrap();
        assert_eq!(table.rows[0].values.len(), 3);
        assert_eq!(table.rows[1].values.len(), 5);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let table = read_str("x,y,z\n1, 2 ,3\n", &TableOptions::csv()).unwrap();
        assert_eq!(table.rows[0].values, vec![1.0, 2.0, 3.0]);

        let options = TableOptions::csv().with_delimiter(Delimiter::Tab);
        let table = read_str("x\ty\tz\n 1\t2 \t 3 \r\n", &options).unwrap();
        assert_eq!(table.rows[0].values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_latin1_header_is_discarded() {
        let content: &[u8] = b"pos_x [\xb0],pos_y,pos_z\n1,2,3\n";
        let table = NumericTableReader::from_reader(content, &TableOptions::csv()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].line, 2);
    }

    #[test]
    fn test_invalid_utf8_row_reports_line() {
        let content: &[u8] = b"x,y,z\n1,2,3\n4,\xff,6\n";
        match NumericTableReader::from_reader(content, &TableOptions::csv()) {
            Err(Error::InputFormat { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected input format error, got {:?}", other),
        }
    }

    #[test]
    fn test_row_get_out_of_range() {
        let row = NumericRow { line: 7, values: vec![1.0, 2.0] };
        assert_eq!(row.get(1).unwrap(), 2.0);
        match row.get(5) {
            Err(Error::InputFormat { line, .. }) => assert_eq!(line, 7),
            other => panic!("Expected input format error, got {:?}", other),
        }
    }
}
