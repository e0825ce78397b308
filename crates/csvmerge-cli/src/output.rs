//! CSV output.

use std::fs;
use std::path::Path;

use csvmerge_ingest::CsvTable;

/// Writes `table` to `path` as CSV: one header row, then the data rows.
///
/// Parent directories are created as needed and an existing file is replaced.
pub fn write_csv(table: &CsvTable, path: &Path) -> csv::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
