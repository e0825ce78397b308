//! CSV ingestion for the merge pipeline.
//!
//! This crate covers everything that happens before rows are merged:
//!
//! - **Discovery**: recursive enumeration of `.csv` files under a root directory
//! - **Schema reconciliation**: header-only reads and the common-column intersection
//! - **Loading**: reading a file restricted to the common columns
//! - **State filtering**: keeping only rows whose `state` is an accepted value
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use csvmerge_ingest::{StateFilter, list_csv_files, load_filtered, reconcile_columns};
//!
//! let files = list_csv_files(Path::new("/data/raw"));
//! let reconciliation = reconcile_columns(&files)?;
//! let loaded = load_filtered(&files[0], &reconciliation.common, &StateFilter::default())?;
//! ```

mod discovery;
mod error;
mod filter;
mod header;
mod loader;
mod schema;
mod table;

pub use discovery::{is_csv_file_name, list_csv_files};
pub use error::{IngestError, Result};
pub use filter::{DEFAULT_ACCEPTED_STATES, DEFAULT_STATE_COLUMN, FilterPlan, StateFilter};
pub use header::{CsvHeaders, read_csv_schema};
pub use loader::{FilterOutcome, LoadedFile, load_filtered};
pub use schema::{
    CommonColumns, Reconciliation, SkippedFile, reconcile_columns,
    reconcile_columns_with_progress,
};
pub use table::CsvTable;
