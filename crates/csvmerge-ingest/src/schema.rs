//! Common-column reconciliation across many CSV files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};
use crate::header::{CsvHeaders, read_csv_schema};

/// Column names shared by every successfully-read file.
///
/// Names keep the order of the first readable header; duplicate names within
/// that header collapse to their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonColumns {
    names: Vec<String>,
}

impl CommonColumns {
    pub fn new(names: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    /// Intersects the column sets of `headers`. An empty input gives an empty set.
    pub fn intersect(headers: &[CsvHeaders]) -> Self {
        let Some((first, rest)) = headers.split_first() else {
            return Self::default();
        };
        let rest_sets: Vec<HashSet<&str>> = rest
            .iter()
            .map(|h| h.columns.iter().map(String::as_str).collect())
            .collect();

        let mut common = Self::new(first.columns.clone());
        common
            .names
            .retain(|name| rest_sets.iter().all(|set| set.contains(name.as_str())));
        common
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.names.iter().any(|n| n == column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }
}

/// A file excluded from reconciliation, with the reason it was skipped.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a header scan across all discovered files.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub common: CommonColumns,
    /// Number of files whose header was read.
    pub readable: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Reads every header and intersects the column sets.
pub fn reconcile_columns(paths: &[PathBuf]) -> Result<Reconciliation> {
    reconcile_columns_with_progress(paths, |_| {})
}

/// Like [`reconcile_columns`], calling `on_file` after each header attempt.
///
/// Unreadable files are logged and skipped. Fails with
/// [`IngestError::NoReadableHeaders`] only when no header could be read.
pub fn reconcile_columns_with_progress<F>(
    paths: &[PathBuf],
    mut on_file: F,
) -> Result<Reconciliation>
where
    F: FnMut(&Path),
{
    let mut headers = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        match read_csv_schema(path) {
            Ok(columns) => {
                debug!(path = %path.display(), columns = columns.len(), "read header");
                headers.push(columns);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping header read");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: error.to_string(),
                });
            }
        }
        on_file(path);
    }

    if headers.is_empty() {
        return Err(IngestError::NoReadableHeaders {
            attempted: paths.len(),
        });
    }

    let common = CommonColumns::intersect(&headers);
    info!(
        readable = headers.len(),
        skipped = skipped.len(),
        common_columns = ?common.names(),
        "schema reconciled"
    );

    Ok(Reconciliation {
        common,
        readable: headers.len(),
        skipped,
    })
}
