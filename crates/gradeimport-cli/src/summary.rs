use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use gradeimport_model::{
    ImportResult, ImportStatus, ResolutionResult, Severity, ValidationReport,
};
use gradeimport_standards::SchemaRegistry;

use crate::types::{Imported, Validated};

/// Issues printed before the list is cut short.
const MAX_ISSUE_ROWS: usize = 50;

pub fn print_resolution(resolution: &ResolutionResult, registry: &SchemaRegistry) {
    println!(
        "Strategy: {} (confidence {:.0}%)",
        resolution.strategy,
        resolution.confidence * 100.0
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Field"),
        header_cell("Name"),
        header_cell("Importance"),
    ]);
    apply_table_style(&mut table);
    for (header, target) in resolution.mapping.iter() {
        let custom = resolution.custom_fields.contains_key(target);
        table.add_row(vec![
            Cell::new(header),
            if custom {
                Cell::new(target).fg(Color::Magenta)
            } else {
                Cell::new(target).fg(Color::Blue)
            },
            Cell::new(registry.display_name(target)),
            Cell::new(registry.importance_of(target)),
        ]);
    }
    println!("{table}");

    if !resolution.missing_fields.is_empty() {
        let mut missing = Table::new();
        missing.set_header(vec![
            header_cell("Missing field"),
            header_cell("Importance"),
            header_cell("Candidates"),
            header_cell("Default"),
        ]);
        apply_table_style(&mut missing);
        for info in &resolution.missing_fields {
            missing.add_row(vec![
                Cell::new(&info.field),
                Cell::new(info.importance),
                if info.suggested_source_headers.is_empty() {
                    dim_cell("-")
                } else {
                    Cell::new(info.suggested_source_headers.join(", "))
                },
                info.default_value
                    .as_deref()
                    .map_or_else(|| dim_cell("-"), Cell::new),
            ]);
        }
        println!("{missing}");
    }

    for action in &resolution.follow_ups {
        println!("Next: {}", action.description);
    }
    print_messages("Warnings", &resolution.warnings);
}

pub fn print_validation(validated: &Validated, registry: &SchemaRegistry) {
    print_resolution(&validated.resolution, registry);
    print_report(&validated.report);
}

fn print_report(report: &ValidationReport) {
    let summary = &report.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Valid"),
        header_cell("Warnings"),
        header_cell("Errors"),
        header_cell("Not validated"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(summary.total_rows),
        count_cell(summary.valid_rows, Color::Green),
        count_cell(summary.warning_rows, Color::Yellow),
        count_cell(summary.error_rows, Color::Red),
        count_cell(summary.unvalidated_rows, Color::Yellow),
    ]);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    println!("{table}");

    if report.issues.is_empty() {
        return;
    }
    let mut issues = Table::new();
    issues.set_header(vec![
        header_cell("Row"),
        header_cell("Severity"),
        header_cell("Field"),
        header_cell("Value"),
        header_cell("Message"),
        header_cell("Suggestion"),
    ]);
    apply_table_style(&mut issues);
    align_column(&mut issues, 0, CellAlignment::Right);
    for issue in report.issues.iter().take(MAX_ISSUE_ROWS) {
        issues.add_row(vec![
            Cell::new(issue.row_index),
            severity_cell(issue.severity),
            Cell::new(&issue.field),
            Cell::new(&issue.value),
            Cell::new(&issue.message),
            issue
                .suggestion
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{issues}");
    if report.issues.len() > MAX_ISSUE_ROWS {
        println!("... {} more issues", report.issues.len() - MAX_ISSUE_ROWS);
    }
}

pub fn print_import(imported: &Imported, registry: &SchemaRegistry) {
    print_resolution(&imported.resolution, registry);
    print_report(&imported.report);
    println!();
    for line in import_summary_lines(&imported.result) {
        println!("{line}");
    }
    print_messages("Import warnings", &imported.result.warnings);
    if !imported.result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &imported.result.errors {
            eprintln!("- {error}");
        }
    }
}

/// Plain-text summary of an import run.
pub fn import_summary_lines(result: &ImportResult) -> Vec<String> {
    let mut lines = vec![format!("Import {}", status_word(result.status))];
    if let Some(exam_id) = &result.exam_id {
        lines.push(format!("  exam:       {exam_id}"));
    }
    lines.push(format!(
        "  rows:       {}/{} processed",
        result.processed, result.total
    ));
    lines.push(format!("  successful: {}", result.successful));
    lines.push(format!("  skipped:    {}", result.skipped));
    lines.push(format!("  failed:     {}", result.failed));
    lines.push(format!(
        "  batches:    {}/{}",
        result.completed_batches, result.total_batches
    ));
    lines
}

fn status_word(status: ImportStatus) -> &'static str {
    match status {
        ImportStatus::Completed => "completed",
        ImportStatus::Failed => "FAILED",
        ImportStatus::Cancelled => "cancelled",
        ImportStatus::Pending | ImportStatus::Importing | ImportStatus::Paused => "interrupted",
    }
}

fn print_messages(title: &str, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    println!("{title}:");
    for message in messages {
        println!("- {message}");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
