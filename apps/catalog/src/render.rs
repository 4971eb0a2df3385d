//! Plain-text tables and the error popup.

use std::io::{self, Write};

use client_core::{CommandError, EntityKind, ErrorCategory};

pub fn title<K: EntityKind>() -> String {
    capitalize(K::COLLECTION)
}

pub fn table<K: EntityKind>(out: &mut impl Write, items: &[K::Entity]) -> io::Result<()> {
    writeln!(out, "{}", title::<K>())?;
    if items.is_empty() {
        return writeln!(out, "  (no {})", K::COLLECTION);
    }

    let columns = K::columns();
    let rows: Vec<Vec<String>> = items.iter().map(K::row).collect();
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    write_row(out, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(out, "  {}", line.trim_end())
}

pub fn found<K: EntityKind>(out: &mut impl Write, entity: &K::Entity) -> io::Result<()> {
    writeln!(out, "{} found: {}", capitalize(K::NAME), K::summary(entity))
}

pub fn error_popup(out: &mut impl Write, err: &CommandError) -> io::Result<()> {
    let label = match err.category() {
        ErrorCategory::Validation => "invalid input",
        ErrorCategory::Conflict => "conflict",
        ErrorCategory::NotFound => "not found",
        ErrorCategory::Remote => "request failed",
    };
    writeln!(out, "[{label}] {}", err.message())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
