//! Output sinks for the merged table.
//!
//! The spreadsheet carries a bold header row and a leading 0-based row-index
//! column. The JSON file is a single array of row objects keyed by column
//! name, with missing cells written as `null`.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use log::debug;
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{data::Cell, table::Table};

pub const OUTPUT_STEM: &str = "DSN_Complex_Lists_COMBINED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub directory: PathBuf,
    pub xlsx: PathBuf,
    pub json: PathBuf,
}

impl OutputPaths {
    pub fn new(directory: &Path, stem: &str) -> Self {
        Self {
            directory: directory.to_path_buf(),
            xlsx: directory.join(format!("{stem}.xlsx")),
            json: directory.join(format!("{stem}.json")),
        }
    }

    /// Summary shown to the user once both files are written.
    pub fn report(&self) -> String {
        format!(
            "\nJSON file {}\n\nExcel file {}\n\nSAVED in: {}\n",
            file_name(&self.json),
            file_name(&self.xlsx),
            self.directory.display()
        )
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn write_outputs(table: &Table, paths: &OutputPaths) -> Result<()> {
    write_xlsx(table, &paths.xlsx)?;
    write_json(table, &paths.json)?;
    Ok(())
}

pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet1")?;

    for (idx, name) in table.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(idx + 1)?, name, &header_format)?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let xl_row = row_number(idx + 1)?;
        worksheet.write_number_with_format(xl_row, 0, idx as f64, &header_format)?;
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, xl_row, column_number(col_idx + 1)?, cell)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Writing spreadsheet {path:?}"))?;
    debug!("Wrote {} row(s) to {:?}", table.row_count(), path);
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: RowNum, col: ColNum, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::String(value) => {
            worksheet.write_string(row, col, value)?;
        }
        Cell::Integer(value) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        Cell::Float(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Boolean(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        Cell::DateTime(_) => {
            worksheet.write_string(row, col, cell.as_display())?;
        }
    }
    Ok(())
}

fn row_number(idx: usize) -> Result<RowNum> {
    RowNum::try_from(idx).map_err(|_| anyhow!("Row {idx} exceeds the spreadsheet row limit"))
}

fn column_number(idx: usize) -> Result<ColNum> {
    ColNum::try_from(idx)
        .map_err(|_| anyhow!("Column {idx} exceeds the spreadsheet column limit"))
}

struct RecordRef<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for RecordRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}

pub fn write_json(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut writer = BufWriter::new(file);
    let records = table
        .rows()
        .iter()
        .map(|cells| RecordRef {
            headers: table.headers(),
            cells,
        })
        .collect::<Vec<_>>();
    serde_json::to_writer(&mut writer, &records)
        .with_context(|| format!("Writing JSON records to {path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Flushing JSON output {path:?}"))?;
    debug!("Wrote {} record(s) to {:?}", records.len(), path);
    Ok(())
}

/// Reads a file produced by [`write_json`]. Column order follows the keys of
/// the first record.
pub fn read_json(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("Opening JSON file {path:?}"))?;
    let records: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing JSON records from {path:?}"))?;

    let headers = records
        .first()
        .map(|record| record.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    let mut table = Table::new(headers.clone());
    for (idx, mut record) in records.into_iter().enumerate() {
        let cells = headers
            .iter()
            .map(|header| match record.remove(header) {
                Some(value) => serde_json::from_value::<Cell>(value)
                    .with_context(|| format!("Record {idx} column '{header}'")),
                None => Ok(Cell::Empty),
            })
            .collect::<Result<Vec<_>>>()?;
        table.push_row(cells)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_share_the_stem() {
        let paths = OutputPaths::new(Path::new("/data/out"), OUTPUT_STEM);
        assert_eq!(
            paths.xlsx,
            PathBuf::from("/data/out/DSN_Complex_Lists_COMBINED.xlsx")
        );
        assert_eq!(
            paths.json,
            PathBuf::from("/data/out/DSN_Complex_Lists_COMBINED.json")
        );
    }

    #[test]
    fn report_names_both_files_and_directory() {
        let paths = OutputPaths::new(Path::new("/data/out"), OUTPUT_STEM);
        assert_eq!(
            paths.report(),
            "\nJSON file DSN_Complex_Lists_COMBINED.json\n\n\
             Excel file DSN_Complex_Lists_COMBINED.xlsx\n\n\
             SAVED in: /data/out\n"
        );
    }

    #[test]
    fn records_serialize_in_column_order() {
        let headers = vec!["b".to_string(), "a".to_string()];
        let cells = vec![Cell::from("x"), Cell::Empty];
        let json = serde_json::to_string(&RecordRef {
            headers: &headers,
            cells: &cells,
        })
        .unwrap();
        assert_eq!(json, r#"{"b":"x","a":null}"#);
    }
}
