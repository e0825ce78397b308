//! Header-only CSV reading.

use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder};

use crate::error::{IngestError, Result};

/// Column names of a single CSV file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    pub columns: Vec<String>,
}

impl CsvHeaders {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Index of the first column with this exact name.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Strips a leading UTF-8 byte order mark. Names are otherwise kept verbatim.
fn normalize_header(value: &str) -> String {
    value.strip_prefix('\u{feff}').unwrap_or(value).to_string()
}

/// Opens a CSV reader over `path`.
///
/// Records may be shorter than the header; callers decide how to treat longer ones.
pub(crate) fn open_reader(path: &Path) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// Reads the header record from an open reader.
pub(crate) fn read_headers(reader: &mut Reader<File>, path: &Path) -> Result<CsvHeaders> {
    let record = reader.headers().map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if record.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let columns: Vec<String> = record.iter().map(normalize_header).collect();
    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }

    Ok(CsvHeaders::new(columns))
}

/// Reads only the header row of a CSV file; no data rows are parsed.
pub fn read_csv_schema(path: &Path) -> Result<CsvHeaders> {
    let mut reader = open_reader(path)?;
    read_headers(&mut reader, path)
}
