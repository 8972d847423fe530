use std::fmt::Write as _;
use std::iter;

use anyhow::{Result, anyhow};
use itertools::Itertools;

use crate::data::Cell;

/// Rectangular in-memory table: ordered headers plus rows holding exactly one
/// cell per header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row, padding short rows with `Cell::Empty`.
    pub fn push_row(&mut self, mut row: Vec<Cell>) -> Result<()> {
        if row.len() > self.headers.len() {
            return Err(anyhow!(
                "Row has {} value(s) but the table only has {} column(s)",
                row.len(),
                self.headers.len()
            ));
        }
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| anyhow!("Column '{name}' not found (available: {:?})", self.headers))
    }

    pub fn column<'a>(&'a self, name: &str) -> Result<impl Iterator<Item = &'a Cell> + use<'a>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Adds a derived column; `values` must hold one cell per existing row.
    pub fn push_column(&mut self, name: &str, values: Vec<Cell>) -> Result<()> {
        if self.column_index(name).is_some() {
            return Err(anyhow!("Column '{name}' already exists"));
        }
        if values.len() != self.rows.len() {
            return Err(anyhow!(
                "Derived column '{name}' has {} value(s) for {} row(s)",
                values.len(),
                self.rows.len()
            ));
        }
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Renders the selected columns (all when `columns` is empty) as an
    /// aligned text table for debug output. Unknown names are skipped.
    pub fn render(&self, columns: &[&str]) -> String {
        let indices: Vec<usize> = if columns.is_empty() {
            (0..self.headers.len()).collect()
        } else {
            columns
                .iter()
                .filter_map(|name| self.column_index(name))
                .collect()
        };
        let header = indices
            .iter()
            .map(|idx| single_line(&self.headers[*idx]))
            .collect::<Vec<_>>();
        let body = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| single_line(&row[*idx].as_display()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut widths = header.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for line in &body {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }
        let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();

        let mut output = String::new();
        for line in iter::once(&header).chain(iter::once(&rule)).chain(&body) {
            let text = line
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .join("  ");
            let _ = writeln!(output, "{}", text.trim_end());
        }
        output
    }
}

// Keeps multi-line cells on one row of the dump.
fn single_line(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}
