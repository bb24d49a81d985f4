use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use schematron_model::Severity;
use schematron_validate::ValidationReport;

use crate::commands::ValidateOutcome;

pub fn print_summary(outcome: &ValidateOutcome) {
    if let Some(path) = &outcome.report_file {
        println!("Report: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for report in &outcome.reports {
        table.add_row(vec![
            Cell::new(&report.document)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(report.error_count(), Color::Red),
            count_cell(report.warning_count(), Color::Yellow),
            status_cell(report),
        ]);
    }
    println!("{table}");
    print_finding_table(&outcome.reports);
}

fn print_finding_table(reports: &[ValidationReport]) {
    let mut findings = Vec::new();
    for report in reports {
        for finding in &report.findings {
            findings.push((report.document.clone(), finding.clone()));
        }
    }
    if findings.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Severity"),
        header_cell("Location"),
        header_cell("Message"),
    ]);
    apply_finding_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for (document, finding) in findings {
        table.add_row(vec![
            Cell::new(document),
            severity_cell(finding.severity),
            Cell::new(finding.location),
            Cell::new(finding.message),
        ]);
    }
    println!();
    println!("Findings:");
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_finding_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(report: &ValidationReport) -> Cell {
    if report.is_valid() {
        Cell::new("VALID")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("INVALID")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::DarkGrey),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
