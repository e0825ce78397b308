use std::collections::HashSet;

use csvmerge_ingest::CsvTable;

/// Removes rows identical to an earlier row across every column.
///
/// The first occurrence of each distinct row is kept and relative order is
/// preserved. Returns the number of rows removed.
pub fn dedupe_rows(table: &mut CsvTable) -> usize {
    let before = table.height();
    if before == 0 {
        return 0;
    }
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(before);
        table
            .rows
            .iter()
            .map(|row| seen.insert(row.as_slice()))
            .collect()
    };
    let mut flags = keep.into_iter();
    table.rows.retain(|_| flags.next().unwrap_or(true));
    before - table.height()
}
