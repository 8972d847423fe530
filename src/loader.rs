//! Spreadsheet loading.
//!
//! Reads the first worksheet of a workbook into a [`Table`], using the first
//! row as the header. The workbook format is picked from the file extension
//! (xlsx, xlsm, xlsb, xls, ods).

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;
use thiserror::Error;

use crate::{data::Cell, table::Table};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open workbook {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("Workbook {path:?} does not contain any worksheets")]
    NoWorksheet { path: PathBuf },
    #[error("Failed to read the first worksheet of {path:?}")]
    Worksheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("Worksheet in {path:?} is malformed: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Open { path, .. }
            | LoadError::NoWorksheet { path }
            | LoadError::Worksheet { path, .. }
            | LoadError::Malformed { path, .. } => path,
        }
    }

    /// Message printed before the process aborts on an unreadable input.
    pub fn abort_message(&self) -> String {
        format!(
            "ERROR!!! Failed to read Excel file: \n\t{}\nABORTING PROGRAM Execution.\
             \nConfirm a valid file and correct path have been provided.",
            self.path().display()
        )
    }
}

pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|source| LoadError::Worksheet {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_names(header_row),
        None => Vec::new(),
    };
    let mut table = Table::new(headers);
    for row in rows {
        let cells = row.iter().map(Cell::from).collect::<Vec<_>>();
        table.push_row(cells).map_err(|err| LoadError::Malformed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    }
    debug!(
        "Loaded {} row(s) x {} column(s) from {:?}",
        table.row_count(),
        table.headers().len(),
        path
    );
    Ok(table)
}

fn header_names(row: &[Data]) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = Cell::from(cell).as_display();
            if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect()
}
