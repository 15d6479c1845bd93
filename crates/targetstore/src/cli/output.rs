//! Rendering of command results for the terminal.

use std::fmt::Write as _;

use crate::error::Result;
use crate::storage::format::COLUMNS;
use crate::target::{Field, Target};
use crate::validation::ValidationErrors;

use super::OutputFormat;

fn cell(target: &Target, column: usize) -> String {
    match column {
        0 => target.id.clone(),
        n => {
            let field = Field::ALL[n - 1];
            target
                .numeric(field)
                .map_or_else(|| target.ip_address.clone(), |v| v.to_string())
        }
    }
}

fn row(target: &Target) -> Vec<String> {
    (0..COLUMNS.len()).map(|i| cell(target, i)).collect()
}

/// Render a single record.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_target(target: &Target, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(target)?),
        OutputFormat::Table => render_targets(std::slice::from_ref(target), format),
        OutputFormat::Plain => {
            let width = COLUMNS.iter().map(|c| c.len()).max().unwrap_or(0);
            let mut out = String::new();
            for (name, value) in COLUMNS.iter().zip(row(target)) {
                let _ = writeln!(out, "{name:<width$}  {value}");
            }
            Ok(out)
        }
    }
}

/// Render a collection of records.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_targets(targets: &[Target], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(targets)?),
        OutputFormat::Plain => {
            let mut out = String::new();
            for target in targets {
                let _ = writeln!(out, "{}", row(target).join(" "));
            }
            Ok(out)
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = targets.iter().map(row).collect();
            let widths: Vec<usize> = COLUMNS
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    rows.iter()
                        .map(|r| r[i].len())
                        .chain(std::iter::once(name.len()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let mut out = String::new();
            let header: Vec<String> = COLUMNS.iter().map(|c| c.to_uppercase()).collect();
            write_table_row(&mut out, &header, &widths);
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            write_table_row(&mut out, &rule, &widths);
            for r in &rows {
                write_table_row(&mut out, r, &widths);
            }
            Ok(out)
        }
    }
}

fn write_table_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Render a field → reason listing, one field per line.
#[must_use]
pub fn render_validation_errors(errors: &ValidationErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}
