//! Integration tests for the merge pipeline.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use csvmerge_cli::pipeline::{MergeConfig, MergeError, MergeMode, run_merge};
use csvmerge_cli::progress::NoProgress;
use csvmerge_cli::types::WriteSkip;
use csvmerge_ingest::{IngestError, StateFilter};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, contents).expect("write file");
    path
}

fn batches(size: usize) -> MergeMode {
    MergeMode::Batches {
        batch_size: NonZeroUsize::new(size).expect("non-zero batch size"),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output")
}

#[test]
fn merges_common_columns_into_single_file() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "a,b,c\n1,2,3\n");
    write(dir.path(), "nested/b.csv", "b,a\n5,4\n");
    write(dir.path(), "nested/deeper/c.csv", "a,b,d\n7,8,9\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.files_discovered, 3);
    assert_eq!(result.common_columns, vec!["a", "b"]);
    let output = dir.path().join("processed_all/combined_all.csv");
    assert_eq!(result.outputs().collect::<Vec<_>>(), vec![&output]);
    assert_eq!(read(&output), "a,b\n1,2\n4,5\n7,8\n");
    assert_eq!(result.rows_written(), 3);
}

#[test]
fn filters_rows_on_state() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "runs.csv",
        "id,state\n1,successful\n2,pending\n3,failed\n4,canceled\n",
    );

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(
        read(&dir.path().join("processed_all/combined_all.csv")),
        "id,state\n1,successful\n3,failed\n"
    );
    assert_eq!(result.batches[0].rows_read, 4);
    assert_eq!(result.batches[0].rows_filtered, 2);
}

#[test]
fn missing_state_column_keeps_all_rows() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "with_state.csv", "id,state\n1,pending\n");
    write(dir.path(), "without_state.csv", "id\n2\n3\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.common_columns, vec!["id"]);
    assert_eq!(
        read(&dir.path().join("processed_all/combined_all.csv")),
        "id\n1\n2\n3\n"
    );
    assert_eq!(result.batches[0].rows_filtered, 0);
}

#[test]
fn disabled_filter_keeps_every_state() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "runs.csv", "id,state\n1,successful\n2,pending\n");

    let config =
        MergeConfig::new(dir.path(), MergeMode::All).with_filter(StateFilter::disabled());
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.rows_written(), 2);
}

#[test]
fn duplicate_rows_across_files_are_written_once() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "one.csv", "id,state\n1,failed\n2,successful\n");
    write(dir.path(), "two.csv", "state,id\nfailed,1\nfailed,3\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(
        read(&dir.path().join("processed_all/combined_all.csv")),
        "id,state\n1,failed\n2,successful\n3,failed\n"
    );
    assert_eq!(result.batches[0].duplicates_removed, 1);
}

#[test]
fn unreadable_files_are_skipped() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "good.csv", "a,b\n1,2\n");
    write(dir.path(), "empty.csv", "");
    write(dir.path(), "ragged.csv", "a,b\n1,2,3\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.header_skipped.len(), 1);
    assert_eq!(result.batches[0].loaded, 1);
    // empty.csv fails its load too; ragged.csv only fails on load.
    assert_eq!(result.batches[0].skipped.len(), 2);
    assert_eq!(
        read(&dir.path().join("processed_all/combined_all.csv")),
        "a,b\n1,2\n"
    );
}

#[test]
fn no_readable_headers_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "empty.csv", "");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress);

    assert!(matches!(
        result,
        Err(MergeError::Ingest(IngestError::NoReadableHeaders { .. }))
    ));
    assert!(!dir.path().join("processed_all").exists());
}

#[test]
fn missing_root_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let config = MergeConfig::new(dir.path().join("absent"), MergeMode::All);

    let result = run_merge(&config, &NoProgress);

    assert!(matches!(
        result,
        Err(MergeError::Ingest(IngestError::NoReadableHeaders { attempted: 0 }))
    ));
}

#[test]
fn nothing_loadable_is_fatal_in_single_file_mode() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "ragged.csv", "a,b\n1,2,3\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress);

    assert!(matches!(
        result,
        Err(MergeError::NoTablesToMerge { attempted: 1 })
    ));
}

#[test]
fn filtered_to_nothing_still_writes_header_in_single_file_mode() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "runs.csv", "id,state\n1,pending\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.rows_written(), 0);
    assert_eq!(
        read(&dir.path().join("processed_all/combined_all.csv")),
        "id,state\n"
    );
}

#[test]
fn batches_write_one_file_per_batch() {
    let dir = TempDir::new().expect("temp dir");
    for idx in 1..=5 {
        write(
            dir.path(),
            &format!("part{idx}.csv"),
            &format!("id,state\n{idx},successful\n"),
        );
    }

    let config = MergeConfig::new(dir.path(), batches(2));
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.batches.len(), 3);
    let root = dir.path().join("processed_batches");
    assert_eq!(
        read(&root.join("batch_001/combined.csv")),
        "id,state\n1,successful\n2,successful\n"
    );
    assert_eq!(
        read(&root.join("batch_002/combined.csv")),
        "id,state\n3,successful\n4,successful\n"
    );
    assert_eq!(
        read(&root.join("batch_003/combined.csv")),
        "id,state\n5,successful\n"
    );
}

#[test]
fn duplicates_are_only_removed_within_a_batch() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "id\n1\n");
    write(dir.path(), "b.csv", "id\n1\n");

    let config = MergeConfig::new(dir.path(), batches(1));
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.rows_written(), 2);
    assert!(result.batches.iter().all(|b| b.duplicates_removed == 0));
}

#[test]
fn batch_with_no_loadable_files_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "id,state\n1,failed\n");
    write(dir.path(), "b.csv", "id,state\n2,failed\n");
    write(dir.path(), "c.csv", "id,state\n3,failed,extra\n");
    write(dir.path(), "d.csv", "id,state\n4,failed,extra\n");

    let config = MergeConfig::new(dir.path(), batches(2));
    let result = run_merge(&config, &NoProgress).expect("merge");

    let root = dir.path().join("processed_batches");
    assert!(root.join("batch_001/combined.csv").exists());
    assert!(!root.join("batch_002").exists());

    let second = &result.batches[1];
    assert_eq!(second.loaded, 0);
    assert_eq!(second.skipped.len(), 2);
    assert!(second.output.is_none());
    assert_eq!(second.write_skipped, Some(WriteSkip::NoData));
    assert_eq!(result.batches[0].write_skipped, None);
}

#[test]
fn batch_filtered_to_nothing_is_skipped() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "id,state\n1,pending\n");

    let config = MergeConfig::new(dir.path(), batches(500));
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert!(result.batches[0].output.is_none());
    assert_eq!(result.batches[0].write_skipped, Some(WriteSkip::NoData));
    assert!(!dir.path().join("processed_batches/batch_001").exists());
}

#[test]
fn rerun_ignores_previous_output_and_overwrites_it() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "id,note\n1,x\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    run_merge(&config, &NoProgress).expect("first merge");
    let output = dir.path().join("processed_all/combined_all.csv");
    fs::write(&output, "id,note\nstale,row\n").expect("tamper output");

    let result = run_merge(&config, &NoProgress).expect("second merge");

    assert_eq!(result.files_discovered, 1);
    assert_eq!(read(&output), "id,note\n1,x\n");
}

#[test]
fn custom_output_dir() {
    let dir = TempDir::new().expect("temp dir");
    let out = TempDir::new().expect("out dir");
    write(dir.path(), "a.csv", "id\n1\n");

    let config = MergeConfig::new(dir.path(), batches(10))
        .with_output_dir(Some(out.path().join("merged")));
    run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(read(&out.path().join("merged/batch_001/combined.csv")), "id\n1\n");
}

#[test]
fn no_common_columns_writes_nothing_in_single_file_mode() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "a\n1\n2\n");
    write(dir.path(), "b.csv", "b\n3\n");

    let config = MergeConfig::new(dir.path(), MergeMode::All);
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert!(result.common_columns.is_empty());
    let batch = &result.batches[0];
    assert_eq!(batch.loaded, 2);
    assert_eq!(batch.rows_read, 3);
    assert_eq!(batch.duplicates_removed, 0);
    assert_eq!(batch.rows_written, 0);
    assert_eq!(batch.write_skipped, Some(WriteSkip::NoCommonColumns));
    assert!(batch.output.is_none());
    assert!(!dir.path().join("processed_all").exists());
}

#[test]
fn no_common_columns_writes_nothing_in_batches() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "a\n1\n");
    write(dir.path(), "b.csv", "b\n2\n");
    write(dir.path(), "c.csv", "c\n3\n");

    let config = MergeConfig::new(dir.path(), batches(2));
    let result = run_merge(&config, &NoProgress).expect("merge");

    assert_eq!(result.batches.len(), 2);
    assert!(
        result
            .batches
            .iter()
            .all(|b| b.write_skipped == Some(WriteSkip::NoCommonColumns))
    );
    assert_eq!(result.outputs().count(), 0);
    assert!(!dir.path().join("processed_batches").exists());
}

#[test]
fn batches_ignore_previous_single_file_output() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "id\n1\n");

    run_merge(&MergeConfig::new(dir.path(), MergeMode::All), &NoProgress).expect("all");
    let result =
        run_merge(&MergeConfig::new(dir.path(), batches(1)), &NoProgress).expect("batches");

    assert_eq!(result.files_discovered, 1);
    assert_eq!(result.batches.len(), 1);
    assert_eq!(
        read(&dir.path().join("processed_batches/batch_001/combined.csv")),
        "id\n1\n"
    );
}

#[test]
fn single_file_ignores_previous_batch_output() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.csv", "id\n1\n");
    write(dir.path(), "b.csv", "id\n2\n");

    run_merge(&MergeConfig::new(dir.path(), batches(1)), &NoProgress).expect("batches");
    let result = run_merge(&MergeConfig::new(dir.path(), MergeMode::All), &NoProgress)
        .expect("all");

    assert_eq!(result.files_discovered, 2);
    assert_eq!(
        read(&dir.path().join("processed_all/combined_all.csv")),
        "id\n1\n2\n"
    );
}
