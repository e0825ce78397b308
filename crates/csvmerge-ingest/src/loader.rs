//! Loading a CSV file restricted to the common columns.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::filter::{FilterPlan, StateFilter};
use crate::header::{open_reader, read_headers};
use crate::schema::CommonColumns;
use crate::table::CsvTable;

/// What the state filter did to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Applied { dropped: usize },
    MissingColumn,
    Disabled,
}

/// Rows loaded from one file, projected onto the common columns.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub table: CsvTable,
    /// Data records read before filtering.
    pub rows_read: usize,
    pub filter: FilterOutcome,
}

/// Loads `path` keeping only the common columns, then applies `filter`.
///
/// Columns outside `common` are never copied. Records shorter than the header
/// are padded with empty values; longer records fail the whole file.
pub fn load_filtered(
    path: &Path,
    common: &CommonColumns,
    filter: &StateFilter,
) -> Result<LoadedFile> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;

    let projection: Vec<usize> = common
        .names()
        .iter()
        .map(|name| {
            headers
                .position(name)
                .ok_or_else(|| IngestError::MissingColumn {
                    column: name.clone(),
                    path: path.to_path_buf(),
                })
        })
        .collect::<Result<_>>()?;

    let plan = filter.plan(common);
    let mut table = CsvTable::new(common.names().to_vec());
    let mut rows_read = 0usize;
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        if record.len() > headers.len() {
            return Err(IngestError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map_or(0, csv::Position::line),
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows_read += 1;

        let row: Vec<String> = projection
            .iter()
            .map(|&idx| record.get(idx).unwrap_or("").to_string())
            .collect();

        if let FilterPlan::Apply { index } = plan {
            if !filter.accepts(&row[index]) {
                dropped += 1;
                continue;
            }
        }
        table.push_row(row);
    }

    let outcome = match plan {
        FilterPlan::Apply { .. } => FilterOutcome::Applied { dropped },
        FilterPlan::MissingColumn => {
            warn!(
                path = %path.display(),
                column = filter.column(),
                "state column not present, no filter applied"
            );
            FilterOutcome::MissingColumn
        }
        FilterPlan::Disabled => FilterOutcome::Disabled,
    };

    debug!(
        path = %path.display(),
        rows_read,
        rows_kept = table.height(),
        "loaded file"
    );

    Ok(LoadedFile {
        table,
        rows_read,
        filter: outcome,
    })
}
