//! # Raw Tables
//!
//! Delimited-file input and output for bulk prediction and training data.
//!
//! Column types are inferred per column: a column is numeric when every
//! non-empty cell parses as a number, otherwise every non-empty cell is kept as
//! categorical text. Empty numeric cells read as `NaN`, empty categorical cells
//! as [`RawValue::Missing`].

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, WagecastError};
use crate::types::{RawRecord, RawValue};

/// An ordered set of named columns with one [`RawRecord`] per row.
///
/// Every row carries every column, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<RawRecord>,
}

impl RawTable {
    /// Reads a comma-delimited file with a header row.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(File::open(path)?)?;
        tracing::info!(
            rows = table.len(),
            columns = table.columns.len(),
            path = %path.display(),
            "read table"
        );
        Ok(table)
    }

    /// Parses comma-delimited text with a header row.
    ///
    /// Rows with a different number of cells than the header are a parse
    /// error; there is no partial recovery. Repeated header names are
    /// renamed `name.1`, `name.2`, ... so every cell keeps its own column.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns = dedup_headers(reader.headers()?.iter());
        let mut cells: Vec<csv::StringRecord> = Vec::new();
        for record in reader.records() {
            cells.push(record?);
        }

        let numeric: Vec<bool> = (0..columns.len())
            .map(|col| {
                cells
                    .iter()
                    .filter_map(|r| r.get(col))
                    .filter(|c| !c.trim().is_empty())
                    .all(|c| c.trim().parse::<f64>().is_ok())
            })
            .collect();

        let rows: Vec<RawRecord> = cells
            .iter()
            .map(|cell_row| {
                columns
                    .iter()
                    .zip(cell_row.iter())
                    .zip(&numeric)
                    .map(|((name, cell), &is_numeric)| {
                        let value = match (cell.trim().is_empty(), is_numeric) {
                            (true, true) => RawValue::Number(f64::NAN),
                            (true, false) => RawValue::Missing,
                            // Checked parseable when the column type was inferred.
                            (false, true) => {
                                RawValue::Number(cell.trim().parse().unwrap_or(f64::NAN))
                            }
                            (false, false) => RawValue::Text(cell.to_string()),
                        };
                        (name.clone(), value)
                    })
                    .collect::<RawRecord>()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Builds a table from records that may carry different fields.
    ///
    /// Columns appear in first-seen order; absent fields become missing.
    #[must_use]
    pub fn from_records(records: &[RawRecord]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for name in record.names() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        let rows: Vec<RawRecord> = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| {
                        let value = record.get(c).cloned().unwrap_or(RawValue::Missing);
                        (c.clone(), value)
                    })
                    .collect::<RawRecord>()
            })
            .collect();
        Self { columns, rows }
    }

    /// Writes the table as comma-delimited text with a header row.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.to_writer(File::create(path)?)?;
        tracing::info!(rows = self.len(), path = %path.display(), "wrote table");
        Ok(())
    }

    /// Serializes the table to any writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(ToString::to_string).unwrap_or_default()),
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Renders the table to an in-memory CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        String::from_utf8(buf).map_err(|e| WagecastError::InvalidTable(e.to_string()))
    }

    /// Sets a column, one value per row. An existing column keeps its
    /// position and has its values replaced; a new column is appended.
    ///
    /// # Errors
    ///
    /// Returns `WagecastError::InvalidTable` if the number of values differs
    /// from the number of rows.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<RawValue>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(WagecastError::InvalidTable(format!(
                "column {name:?} has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name.clone(), value);
        }
        if !self.columns.contains(&name) {
            self.columns.push(name);
        }
        Ok(())
    }

    /// Removes a column, returning `true` if it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(pos) = self.columns.iter().position(|c| c == name) else {
            return false;
        };
        self.columns.remove(pos);
        for row in &mut self.rows {
            row.remove(name);
        }
        true
    }

    /// Keeps only the rows matching `keep`.
    pub fn retain_rows<F: FnMut(&RawRecord) -> bool>(&mut self, keep: F) {
        self.rows.retain(keep);
    }

    /// Values of one column, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&RawValue>> {
        if !self.has_column(name) {
            return None;
        }
        Some(self.rows.iter().filter_map(|r| r.get(name)).collect())
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renames repeated headers to `name.1`, `name.2`, ... skipping any suffix
/// that is already taken.
fn dedup_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let headers: Vec<&str> = headers.collect();
    let mut taken: HashSet<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());
    for header in headers {
        if seen.insert(header) {
            columns.push(header.to_string());
            continue;
        }
        let renamed = (1..)
            .map(|n| format!("{header}.{n}"))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| header.to_string());
        tracing::warn!(column = header, renamed = %renamed, "renamed duplicate header");
        taken.insert(renamed.clone());
        columns.push(renamed);
    }
    columns
}
