// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aligned text tables for list commands.

use std::io::Write;

use crate::color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Muted,
    Status,
}

/// A table column: header text, styling and optional max width.
#[derive(Debug, Clone)]
pub struct Column {
    header: &'static str,
    style: Style,
    max: Option<usize>,
}

impl Column {
    pub fn left(header: &'static str) -> Self {
        Self { header, style: Style::Plain, max: None }
    }

    /// Secondary data such as ids
    pub fn muted(header: &'static str) -> Self {
        Self { header, style: Style::Muted, max: None }
    }

    /// Status words, colored by meaning
    pub fn status(header: &'static str) -> Self {
        Self { header, style: Style::Status, max: None }
    }

    /// Truncate cells longer than `max` characters with an ellipsis.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        let cells = cells
            .into_iter()
            .zip(&self.columns)
            .map(|(cell, col)| match col.max {
                Some(max) => truncate(&cell, max),
                None => cell,
            })
            .collect();
        self.rows.push(cells);
    }

    /// Widths are measured before coloring so escape codes never skew alignment.
    pub fn render(&self, out: &mut dyn Write) {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(col.header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let last = self.columns.len().saturating_sub(1);
        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| pad(col.header, widths[i], i == last))
            .collect();
        let _ = writeln!(out, "{}", color::header(header.join("  ").trim_end()));

        for row in &self.rows {
            let line: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let padding = " ".repeat(if i == last {
                        0
                    } else {
                        widths[i].saturating_sub(cell.chars().count())
                    });
                    let styled = match col.style {
                        Style::Plain => cell.to_string(),
                        Style::Muted => color::muted(cell),
                        Style::Status => color::status(cell),
                    };
                    format!("{styled}{padding}")
                })
                .collect();
            let _ = writeln!(out, "{}", line.join("  ").trim_end());
        }
    }
}

fn pad(text: &str, width: usize, last: bool) -> String {
    if last {
        text.to_string()
    } else {
        format!("{text:<width$}")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
