use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use tracing::info;

use csvmerge_cli::pipeline::{MergeConfig, MergeMode, run_merge};
use csvmerge_cli::progress::{BarProgress, NoProgress, ProgressReporter};
use csvmerge_cli::types::MergeResult;
use csvmerge_ingest::{DEFAULT_ACCEPTED_STATES, StateFilter, list_csv_files, reconcile_columns};

use crate::cli::{BatchArgs, ColumnsArgs, MergeArgs};
use crate::summary::print_columns;

pub fn run_all(args: &MergeArgs) -> Result<MergeResult> {
    run(args, MergeMode::All)
}

pub fn run_batches(args: &BatchArgs) -> Result<MergeResult> {
    run(
        &args.merge,
        MergeMode::Batches {
            batch_size: args.batch_size,
        },
    )
}

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let files = list_csv_files(&args.root);
    info!(file_count = files.len(), "found CSV files");
    let reconciliation = reconcile_columns(&files)
        .with_context(|| format!("read CSV headers under {}", args.root.display()))?;
    print_columns(files.len(), &reconciliation);
    Ok(())
}

fn run(args: &MergeArgs, mode: MergeMode) -> Result<MergeResult> {
    let config = MergeConfig::new(&args.root, mode)
        .with_output_dir(args.output_dir.clone())
        .with_filter(state_filter(args));
    let progress = progress_reporter(args.no_progress);
    run_merge(&config, progress.as_ref())
        .with_context(|| format!("merge CSV files under {}", args.root.display()))
}

fn state_filter(args: &MergeArgs) -> StateFilter {
    if args.no_state_filter {
        return StateFilter::disabled();
    }
    if args.keep_state.is_empty() {
        StateFilter::new(args.state_column.clone(), DEFAULT_ACCEPTED_STATES)
    } else {
        StateFilter::new(args.state_column.clone(), args.keep_state.iter().cloned())
    }
}

/// Bars only make sense on an interactive stderr.
fn progress_reporter(disabled: bool) -> Box<dyn ProgressReporter> {
    if disabled || !io::stderr().is_terminal() {
        Box::new(NoProgress)
    } else {
        Box::new(BarProgress::new())
    }
}
