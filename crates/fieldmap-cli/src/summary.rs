use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fieldmap_map::Suggestion;
use fieldmap_model::{DataStructure, FieldSignature, TreeDiff};
use fieldmap_validate::{Severity, ValidationResult};

pub fn print_structure_tree(structure: &DataStructure) {
    println!("Structure: {} ({})", structure.name, structure.id);
    println!("Format: {}", structure.format);
    if let Some(ns) = structure
        .namespace
        .as_ref()
        .and_then(|ns| ns.target_namespace.as_deref())
    {
        println!("Target namespace: {ns}");
    }
    let tree = &structure.tree;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Path"),
        header_cell("Kind"),
        header_cell("Occurs"),
        header_cell("Required"),
        header_cell("Notes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for node in tree.nodes().filter(|n| n.parent().is_some()) {
        let Some(path) = tree.path(node.id()) else {
            continue;
        };
        let mut notes = Vec::new();
        if node.unparsed {
            notes.push("opaque");
        }
        if node.divergent {
            notes.push("divergent");
        }
        let path_cell = if node.is_leaf() {
            Cell::new(path)
        } else {
            Cell::new(path).fg(Color::Blue).add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            path_cell,
            Cell::new(node.kind),
            Cell::new(format!("{}..{}", node.min_occurs, node.max_occurs)),
            flag_cell(tree.is_effectively_required(node.id())),
            if notes.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(notes.join(", ")).fg(Color::Yellow)
            },
        ]);
    }
    println!("{table}");
    println!("{} leaves", tree.leaves().count());
}

pub fn print_validation(result: &ValidationResult) {
    if result.is_empty() {
        println!("No issues found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Category"),
        header_cell("Code"),
        header_cell("Path"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for finding in result.sorted_by_severity() {
        table.add_row(vec![
            severity_cell(finding.severity),
            Cell::new(finding.category),
            Cell::new(finding.issue.code()),
            finding
                .issue
                .path()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&finding.message),
        ]);
    }
    println!("{table}");
    println!(
        "{} errors, {} warnings: {}",
        result.error_count(),
        result.warning_count(),
        if result.ok { "ok" } else { "blocked" }
    );
}

pub fn print_suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("No suggestions above the confidence threshold.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Score"),
        header_cell("Explanation"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for suggestion in suggestions {
        table.add_row(vec![
            Cell::new(&suggestion.source_path),
            Cell::new(&suggestion.target_path),
            score_cell(suggestion.score.score),
            dim_cell(suggestion.score.explain()),
        ]);
    }
    println!("{table}");
}

pub fn print_diff(diff: &TreeDiff) {
    if diff.is_empty() {
        println!("Structures have the same shape.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Change"), header_cell("Path"), header_cell("Detail")]);
    apply_table_style(&mut table);
    for path in &diff.added {
        table.add_row(vec![Cell::new("added").fg(Color::Green), Cell::new(path), dim_cell("-")]);
    }
    for path in &diff.removed {
        table.add_row(vec![Cell::new("removed").fg(Color::Red), Cell::new(path), dim_cell("-")]);
    }
    for change in &diff.changed {
        table.add_row(vec![
            Cell::new("changed").fg(Color::Yellow),
            Cell::new(&change.path),
            Cell::new(format!(
                "{} -> {}",
                signature(&change.before),
                signature(&change.after)
            )),
        ]);
    }
    println!("{table}");
}

fn signature(sig: &FieldSignature) -> String {
    format!(
        "{} {}..{}{}",
        sig.kind,
        sig.min_occurs,
        sig.max_occurs,
        if sig.required { "" } else { " optional" }
    )
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn score_cell(score: f32) -> Cell {
    let color = if score >= 0.9 { Color::Green } else { Color::Yellow };
    Cell::new(format!("{:.0}%", score * 100.0)).fg(color)
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
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
