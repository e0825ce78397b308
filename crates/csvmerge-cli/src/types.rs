use std::fmt;
use std::path::PathBuf;

use csvmerge_ingest::SkippedFile;

use crate::pipeline::MergeMode;

/// Outcome of a whole merge run.
#[derive(Debug)]
pub struct MergeResult {
    pub root: PathBuf,
    pub mode: MergeMode,
    pub output_root: PathBuf,
    pub files_discovered: usize,
    pub common_columns: Vec<String>,
    /// Files whose header could not be read.
    pub header_skipped: Vec<SkippedFile>,
    pub batches: Vec<BatchSummary>,
}

impl MergeResult {
    pub fn rows_written(&self) -> usize {
        self.batches.iter().map(|b| b.rows_written).sum()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.batches.iter().filter_map(|b| b.output.as_ref())
    }
}

/// Counts for one batch of input files.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 1-based batch number.
    pub index: usize,
    pub files: usize,
    pub loaded: usize,
    /// Files that failed to load, with reasons.
    pub skipped: Vec<SkippedFile>,
    /// Data rows read from loaded files, before filtering.
    pub rows_read: usize,
    /// Rows discarded by the state filter.
    pub rows_filtered: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
    /// Written file; `None` when the batch had no data.
    pub output: Option<PathBuf>,
    /// Why no file was written, when `output` is `None`.
    pub write_skipped: Option<WriteSkip>,
}

/// Reason a batch produced no output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSkip {
    /// The input files share no column.
    NoCommonColumns,
    /// Nothing loaded, or every row was filtered out.
    NoData,
}

impl fmt::Display for WriteSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCommonColumns => f.write_str("no common columns"),
            Self::NoData => f.write_str("no data"),
        }
    }
}
