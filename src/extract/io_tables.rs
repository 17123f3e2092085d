// Lattice tables of the PDF pages.
//
// Detecting ruled tables on a rendered page is left to a lattice table
// extractor. Its output is read back here: one grid per table, exported
// as CSV or as an Excel workbook.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::{OptionExt, ResultExt};

use crate::extract::*;

/// A table as a grid of cells. The first row holds the column headers.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Table {
        Table { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// True if any cell contains the text.
    pub fn contains(&self, s: &str) -> bool {
        self.rows.iter().flatten().any(|c| c.contains(s))
    }
}

/// Where the tables of the pages of a section come from.
pub trait TableSource: Sync {
    /// The tables of a page, in the order of the page. Pages start at 1.
    fn page_tables(&self, section: &str, page: u32) -> ExtractResult<Vec<Table>>;
}

/// Tables exported by the extractor to `<root>/<section>/page_<n>_table_<k>.csv`
/// (or `.xlsx`), with `k` starting at 1.
pub struct ExportedTables {
    pub root: PathBuf,
}

impl ExportedTables {
    fn table_path(&self, section: &str, page: u32, table: usize) -> Option<PathBuf> {
        let dir = self.root.join(section);
        ["csv", "xlsx"]
            .iter()
            .map(|ext| dir.join(format!("page_{}_table_{}.{}", page, table, ext)))
            .find(|p| p.is_file())
    }
}

impl TableSource for ExportedTables {
    fn page_tables(&self, section: &str, page: u32) -> ExtractResult<Vec<Table>> {
        let mut res: Vec<Table> = Vec::new();
        let mut idx = 1;
        while let Some(p) = self.table_path(section, page, idx) {
            let table = if p.extension().map(|e| e == "xlsx").unwrap_or(false) {
                read_excel_table(&p)?
            } else {
                read_csv_table(&p)?
            };
            res.push(table);
            idx += 1;
        }
        debug!(
            "page_tables: section {} page {}: {} tables",
            section,
            page,
            res.len()
        );
        Ok(res)
    }
}

pub fn read_csv_table(path: &Path) -> ExtractResult<Table> {
    let path_s = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvReadSnafu { path: &path_s })?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record.context(CsvReadSnafu { path: &path_s })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(Table { rows })
}

pub fn read_excel_table(path: &Path) -> ExtractResult<Table> {
    let path_s = path.display().to_string();
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path: &path_s })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path: &path_s })?
        .context(OpeningExcelSnafu { path: &path_s })?;
    let rows: Vec<Vec<String>> = wrange
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Ok(Table { rows })
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        DataType::Int(i) => i.to_string(),
        // Counts come back as floats from most spreadsheets.
        DataType::Float(f) if f.fract() == 0.0 && *f >= 0.0 => format!("{}", *f as u64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        other => format!("{:?}", other),
    }
}

pub fn write_table(table: &Table, path: &Path) -> ExtractResult<()> {
    let path_s = path.display().to_string();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .context(CsvWriteSnafu { path: &path_s })?;
    for row in table.rows.iter() {
        wtr.write_record(row).context(CsvWriteSnafu { path: &path_s })?;
    }
    wtr.flush().context(WritingOutputSnafu { path: &path_s })?;
    Ok(())
}
