//! The merge pipeline.
//!
//! A run discovers every CSV under the root, reconciles the common columns
//! once, then processes the file list batch by batch. Each batch owns a
//! [`BatchAccumulator`] that is filled, merged, deduplicated, written and
//! dropped before the next batch starts. Single-file mode is one batch that
//! spans every file.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use csvmerge_ingest::{
    CommonColumns, CsvTable, FilterOutcome, IngestError, LoadedFile, SkippedFile, StateFilter,
    list_csv_files, load_filtered, reconcile_columns_with_progress,
};

use crate::dedupe::dedupe_rows;
use crate::output::write_csv;
use crate::progress::ProgressReporter;
use crate::types::{BatchSummary, MergeResult, WriteSkip};

/// Files per batch in batched mode unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 500;

pub const ALL_OUTPUT_DIR: &str = "processed_all";
pub const ALL_OUTPUT_FILE: &str = "combined_all.csv";
pub const BATCH_OUTPUT_DIR: &str = "processed_batches";
pub const BATCH_OUTPUT_FILE: &str = "combined.csv";

/// Fatal merge failures. Per-file problems are logged and skipped instead.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("no tables to merge: none of the {attempted} discovered files could be loaded")]
    NoTablesToMerge { attempted: usize },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, MergeError>;

/// How discovered files are grouped into outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Every file merged into a single output.
    All,
    /// Consecutive groups of at most `batch_size` files, one output each.
    Batches { batch_size: NonZeroUsize },
}

impl MergeMode {
    fn default_output_dir(self) -> &'static str {
        match self {
            Self::All => ALL_OUTPUT_DIR,
            Self::Batches { .. } => BATCH_OUTPUT_DIR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub root: PathBuf,
    /// Overrides the mode's default directory under `root`.
    pub output_dir: Option<PathBuf>,
    pub mode: MergeMode,
    pub filter: StateFilter,
}

impl MergeConfig {
    pub fn new(root: impl Into<PathBuf>, mode: MergeMode) -> Self {
        Self {
            root: root.into(),
            output_dir: None,
            mode,
            filter: StateFilter::default(),
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: StateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn output_root(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.root.join(self.mode.default_output_dir()))
    }

    /// Destination file for the batch with this 1-based index.
    pub fn output_path(&self, batch_index: usize) -> PathBuf {
        let root = self.output_root();
        match self.mode {
            MergeMode::All => root.join(ALL_OUTPUT_FILE),
            MergeMode::Batches { .. } => root
                .join(batch_dir_name(batch_index))
                .join(BATCH_OUTPUT_FILE),
        }
    }
}

/// `batch_001`, `batch_002`, ...
pub fn batch_dir_name(index: usize) -> String {
    format!("batch_{index:03}")
}

/// A contiguous slice of the discovered file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// 1-based position of this batch.
    pub index: usize,
    pub files: &'a [PathBuf],
}

/// Splits `files` into consecutive batches of at most `batch_size` files.
pub fn partition(files: &[PathBuf], batch_size: NonZeroUsize) -> Vec<Batch<'_>> {
    files
        .chunks(batch_size.get())
        .enumerate()
        .map(|(idx, files)| Batch {
            index: idx + 1,
            files,
        })
        .collect()
}

fn plan_batches(files: &[PathBuf], mode: MergeMode) -> Vec<Batch<'_>> {
    match mode {
        MergeMode::All => vec![Batch { index: 1, files }],
        MergeMode::Batches { batch_size } => partition(files, batch_size),
    }
}

/// Loaded tables and counters for one batch.
pub struct BatchAccumulator {
    headers: Vec<String>,
    tables: Vec<CsvTable>,
    summary: BatchSummary,
}

impl BatchAccumulator {
    pub fn new(batch: &Batch<'_>, common: &CommonColumns) -> Self {
        Self {
            headers: common.names().to_vec(),
            tables: Vec::new(),
            summary: BatchSummary {
                index: batch.index,
                files: batch.files.len(),
                ..BatchSummary::default()
            },
        }
    }

    /// Records the result of loading `path`; failures are logged and skipped.
    pub fn add(&mut self, path: &Path, loaded: csvmerge_ingest::Result<LoadedFile>) {
        match loaded {
            Ok(file) => {
                self.summary.loaded += 1;
                self.summary.rows_read += file.rows_read;
                if let FilterOutcome::Applied { dropped } = file.filter {
                    self.summary.rows_filtered += dropped;
                }
                self.tables.push(file.table);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping file");
                self.summary.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Number of files loaded so far.
    pub fn loaded(&self) -> usize {
        self.summary.loaded
    }

    /// Drops the loaded tables, keeping only the counters.
    pub fn into_summary(self) -> BatchSummary {
        self.summary
    }

    /// Concatenates the loaded tables in load order and drops duplicate rows.
    pub fn finish(self) -> (CsvTable, BatchSummary) {
        let Self {
            headers,
            tables,
            mut summary,
        } = self;
        let mut merged = CsvTable::concat(headers, tables);
        let before = merged.height();
        summary.duplicates_removed = dedupe_rows(&mut merged);
        info!(
            rows = before,
            duplicates_removed = summary.duplicates_removed,
            final_rows = merged.height(),
            columns = merged.width(),
            "deduplicated"
        );
        (merged, summary)
    }
}

/// Runs discovery, reconciliation and every batch.
pub fn run_merge(config: &MergeConfig, progress: &dyn ProgressReporter) -> Result<MergeResult> {
    let span = info_span!("merge", root = %config.root.display());
    let _guard = span.enter();
    let start = Instant::now();
    let output_root = config.output_root();

    let files = discover_inputs(config);
    info!(file_count = files.len(), "found CSV files");

    progress.start("Reading headers", files.len());
    let reconciliation =
        reconcile_columns_with_progress(&files, |path| progress.advance(&display_name(path)));
    progress.finish();
    let reconciliation = reconciliation?;
    if reconciliation.common.is_empty() {
        warn!(
            readable = reconciliation.readable,
            "no column is shared by every file, nothing will be written"
        );
    }

    let batches = plan_batches(&files, config.mode);
    let batch_count = batches.len();
    let mut summaries = Vec::with_capacity(batch_count);
    for batch in &batches {
        summaries.push(run_batch(
            config,
            batch,
            batch_count,
            &reconciliation.common,
            progress,
        )?);
    }

    let written = summaries.iter().filter(|s| s.output.is_some()).count();
    info!(
        batch_count,
        written,
        duration_ms = start.elapsed().as_millis(),
        "merge complete"
    );

    Ok(MergeResult {
        root: config.root.clone(),
        mode: config.mode,
        output_root,
        files_discovered: files.len(),
        common_columns: reconciliation.common.names().to_vec(),
        header_skipped: reconciliation.skipped,
        batches: summaries,
    })
}

fn run_batch(
    config: &MergeConfig,
    batch: &Batch<'_>,
    batch_count: usize,
    common: &CommonColumns,
    progress: &dyn ProgressReporter,
) -> Result<BatchSummary> {
    let span = info_span!(
        "batch",
        index = batch.index,
        of = batch_count,
        file_count = batch.files.len()
    );
    let _guard = span.enter();

    let label = match config.mode {
        MergeMode::All => "Loading & filtering".to_string(),
        MergeMode::Batches { .. } => format!("Batch {}/{}", batch.index, batch_count),
    };
    let mut accumulator = BatchAccumulator::new(batch, common);
    progress.start(&label, batch.files.len());
    for path in batch.files {
        accumulator.add(path, load_filtered(path, common, &config.filter));
        progress.advance(&display_name(path));
    }
    progress.finish();

    if config.mode == MergeMode::All && accumulator.loaded() == 0 {
        return Err(MergeError::NoTablesToMerge {
            attempted: batch.files.len(),
        });
    }

    if common.is_empty() {
        info!("no common columns, nothing written");
        let mut summary = accumulator.into_summary();
        summary.write_skipped = Some(WriteSkip::NoCommonColumns);
        return Ok(summary);
    }

    let (merged, mut summary) = accumulator.finish();
    if merged.is_empty() && matches!(config.mode, MergeMode::Batches { .. }) {
        info!("no data in batch, nothing written");
        summary.write_skipped = Some(WriteSkip::NoData);
        return Ok(summary);
    }

    let path = config.output_path(batch.index);
    write_csv(&merged, &path).map_err(|source| MergeError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), rows = merged.height(), "saved");

    summary.rows_written = merged.height();
    summary.output = Some(path);
    Ok(summary)
}

/// Discovers inputs, leaving out anything under a merge output directory.
///
/// Both default output roots under `root` are always excluded, along with the
/// active one.
fn discover_inputs(config: &MergeConfig) -> Vec<PathBuf> {
    let excluded: Vec<PathBuf> = [
        config.root.join(ALL_OUTPUT_DIR),
        config.root.join(BATCH_OUTPUT_DIR),
        config.output_root(),
    ]
    .into_iter()
    .map(|dir| std::path::absolute(&dir).unwrap_or(dir))
    .collect();
    let (files, previous): (Vec<PathBuf>, Vec<PathBuf>) = list_csv_files(&config.root)
        .into_iter()
        .partition(|path| !excluded.iter().any(|dir| path.starts_with(dir)));
    if !previous.is_empty() {
        debug!(
            count = previous.len(),
            "ignoring CSV files under merge output directories"
        );
    }
    files
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
