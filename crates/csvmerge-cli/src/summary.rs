use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use csvmerge_cli::pipeline::{MergeMode, batch_dir_name};
use csvmerge_cli::types::{BatchSummary, MergeResult};
use csvmerge_ingest::{Reconciliation, SkippedFile};

pub fn print_summary(result: &MergeResult) {
    println!("Root: {}", result.root.display());
    println!("Output: {}", result.output_root.display());
    println!("Files discovered: {}", result.files_discovered);
    println!("Common columns: {}", format_columns(&result.common_columns));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Batch"),
        header_cell("Files"),
        header_cell("Loaded"),
        header_cell("Skipped"),
        header_cell("Rows read"),
        header_cell("Filtered"),
        header_cell("Duplicates"),
        header_cell("Written"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=7 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = BatchSummary::default();
    for batch in &result.batches {
        totals.files += batch.files;
        totals.loaded += batch.loaded;
        totals.rows_read += batch.rows_read;
        totals.rows_filtered += batch.rows_filtered;
        totals.duplicates_removed += batch.duplicates_removed;
        totals.rows_written += batch.rows_written;
        table.add_row(vec![
            Cell::new(batch_label(result.mode, batch.index))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(batch.files),
            Cell::new(batch.loaded),
            count_cell(batch.skipped.len(), Color::Yellow),
            Cell::new(batch.rows_read),
            count_cell(batch.rows_filtered, Color::Yellow),
            count_cell(batch.duplicates_removed, Color::Yellow),
            Cell::new(batch.rows_written),
            output_cell(batch, &result.output_root),
        ]);
    }
    let skipped_total: usize = result.batches.iter().map(|b| b.skipped.len()).sum();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(totals.files).add_attribute(Attribute::Bold),
        Cell::new(totals.loaded).add_attribute(Attribute::Bold),
        count_cell(skipped_total, Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(totals.rows_read).add_attribute(Attribute::Bold),
        count_cell(totals.rows_filtered, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(totals.duplicates_removed, Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(totals.rows_written).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_skipped("Skipped header reads", &result.header_skipped);
    let load_skipped: Vec<SkippedFile> = result
        .batches
        .iter()
        .flat_map(|b| b.skipped.iter().cloned())
        .collect();
    print_skipped("Skipped files", &load_skipped);
}

pub fn print_columns(files_discovered: usize, reconciliation: &Reconciliation) {
    println!("Files discovered: {files_discovered}");
    println!("Headers read: {}", reconciliation.readable);
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Common column")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (idx, name) in reconciliation.common.names().iter().enumerate() {
        table.add_row(vec![dim_cell(idx + 1), Cell::new(name)]);
    }
    println!("{table}");
    print_skipped("Skipped header reads", &reconciliation.skipped);
}

fn print_skipped(title: &str, skipped: &[SkippedFile]) {
    if skipped.is_empty() {
        return;
    }
    eprintln!("{title}:");
    for file in skipped {
        eprintln!("- {}: {}", file.path.display(), file.reason);
    }
}

fn batch_label(mode: MergeMode, index: usize) -> String {
    match mode {
        MergeMode::All => "all".to_string(),
        MergeMode::Batches { .. } => batch_dir_name(index),
    }
}

fn format_columns(columns: &[String]) -> String {
    if columns.is_empty() {
        "(none)".to_string()
    } else {
        columns.join(", ")
    }
}

fn output_cell(batch: &BatchSummary, output_root: &Path) -> Cell {
    match (&batch.output, batch.write_skipped) {
        (Some(path), _) => {
            let shown = path.strip_prefix(output_root).unwrap_or(path);
            Cell::new(shown.display()).fg(Color::Green)
        }
        (None, Some(reason)) => dim_cell(reason),
        (None, None) => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 9 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
