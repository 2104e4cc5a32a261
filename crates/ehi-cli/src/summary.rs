//! Human-readable run summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use ehi_manifest::{CoverageReport, ManifestValidation, TableStatus};
use ehi_model::HydrationReport;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_label(status: TableStatus) -> &'static str {
    match status {
        TableStatus::ConfiguredPresent => "present",
        TableStatus::ConfiguredAbsent => "absent",
        TableStatus::PresentUnconfigured => "unconfigured",
    }
}

pub fn print_coverage(report: &CoverageReport) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Table"),
        Cell::new("Status"),
        Cell::new("Reachable"),
        Cell::new("Unreachable"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for coverage in &report.tables {
        table.add_row(vec![
            Cell::new(&coverage.table),
            Cell::new(status_label(coverage.status)),
            Cell::new(coverage.reachable_columns.len()),
            Cell::new(coverage.unreachable_columns.len()),
        ]);
    }
    println!("{table}");

    let absent = report.configured_absent().count();
    let unconfigured = report.unconfigured().count();
    if absent > 0 {
        println!("{absent} configured table(s) absent from this export");
    }
    if unconfigured > 0 {
        println!("{unconfigured} loaded table(s) reachable from no configuration");
    }
}

pub fn print_validations(validations: &[ManifestValidation]) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Entity"),
        Cell::new("Table"),
        Cell::new("Unclassified"),
        Cell::new("Stale"),
    ]);
    apply_table_style(&mut table);
    for validation in validations {
        table.add_row(vec![
            Cell::new(&validation.entity),
            Cell::new(&validation.table),
            Cell::new(validation.unclassified.join(", ")),
            Cell::new(validation.stale.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_hydration_report(subject: &str, entities: usize, report: &HydrationReport) {
    println!("Subject: {subject}");
    println!("Entities hydrated: {entities}");
    if report.is_clean() {
        println!("No degradations.");
        return;
    }
    if !report.missing_tables.is_empty() {
        let names: Vec<&str> = report.missing_tables.iter().map(String::as_str).collect();
        println!("Missing tables: {}", names.join(", "));
    }
    if !report.degraded_joins.is_empty() {
        let names: Vec<&str> = report.degraded_joins.iter().map(String::as_str).collect();
        println!("Degraded joins: {}", names.join(", "));
    }
    for (table, count) in &report.split_conflicts {
        println!("Split conflicts in {table}: {count}");
    }
    for (table, count) in &report.join_orphans {
        println!("Orphaned child rows in {table}: {count}");
    }
}
