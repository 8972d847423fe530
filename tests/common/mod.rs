#![allow(dead_code)]

use std::path::{Path, PathBuf};

use addr_reconcile::{data::Cell, table::Table};
use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a single-sheet workbook; `None` cells are left blank.
    pub fn write_xlsx(&self, name: &str, headers: &[&str], rows: &[Vec<Option<Value>>]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_string(0, col as u16, *header)
                .expect("write header");
        }
        for (row_idx, row) in rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                match value {
                    Some(Value::Text(text)) => {
                        sheet
                            .write_string(row_num, col as u16, *text)
                            .expect("write text cell");
                    }
                    Some(Value::Number(number)) => {
                        sheet
                            .write_number(row_num, col as u16, *number)
                            .expect("write number cell");
                    }
                    None => {}
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Value {
    Text(&'static str),
    Number(f64),
}

pub fn text(value: &'static str) -> Option<Value> {
    Some(Value::Text(value))
}

pub fn number(value: f64) -> Option<Value> {
    Some(Value::Number(value))
}

pub const SOURCE_HEADERS: &[&str] = &["Address", "Unit"];
pub const DETAIL_HEADERS: &[&str] = &["Address", "Complex Name", "Postal Code", "URL"];

/// Source rows: an exact substring hit, a fuzzy hit, an unmatched address
/// and a blank address.
pub fn source_rows() -> Vec<Vec<Option<Value>>> {
    vec![
        vec![text("Apartment at 100 Harbor View Dr, Bayside"), text("A")],
        vec![text("27 Lakeside Court"), text("B")],
        vec![text("999 Nowhere Ln"), text("C")],
        vec![None, text("D")],
    ]
}

pub fn detail_rows() -> Vec<Vec<Option<Value>>> {
    vec![
        vec![
            text("100 Harbor View Dr"),
            text("Harbor View"),
            number(30301.0),
            text("https://example.com/harbor-view"),
        ],
        vec![
            text("27 Lakeside Ct"),
            text("Lakeside"),
            number(30302.0),
            text("https://example.com/lakeside"),
        ],
    ]
}

/// Builds an in-memory table of string cells; empty strings become missing.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        let cells = row
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Cell::Empty
                } else {
                    Cell::from(*value)
                }
            })
            .collect();
        table.push_row(cells).expect("row fits headers");
    }
    table
}
