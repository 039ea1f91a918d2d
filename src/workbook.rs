//! Excel workbook adapter.
//!
//! Reads `.xlsx`, `.xls` and `.ods` files through calamine and exposes them
//! as a `SheetSource`. The first row of each sheet is the header row; every
//! cell is rendered to text so the pipeline stages decide how to coerce it.

use crate::error::{PipelineError, Result};
use crate::loader::SheetSource;
use crate::models::RawSheet;
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp layout used for date cells
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A spreadsheet opened from disk
pub struct ExcelWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl std::fmt::Debug for ExcelWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcelWorkbook")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ExcelWorkbook {
    /// Open a workbook; the format is detected from the file extension
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::Workbook {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let sheets = open_workbook_auto(path).map_err(|e| PipelineError::Workbook {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(
            "Opened workbook {} ({} sheets)",
            path.display(),
            sheets.sheet_names().len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSource for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Option<RawSheet>> {
        if !self.sheets.sheet_names().iter().any(|sheet| sheet == name) {
            return Ok(None);
        }

        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| PipelineError::Workbook {
                path: self.path.clone(),
                reason: format!("sheet '{}': {}", name, e),
            })?;

        Ok(Some(range_to_sheet(&range)))
    }
}

/// Split a cell range into a header row and text data rows
///
/// calamine ranges start at the first used cell; leading empty columns are
/// restored so column positions match the sheet.
pub fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut rows = range.rows();

    let mut headers: Vec<String> = vec![String::new(); offset];
    if let Some(header) = rows.next() {
        headers.extend(header.iter().map(|cell| cell_text(cell).unwrap_or_default()));
    }

    let data = rows
        .map(|row| {
            let mut cells: Vec<Option<String>> = vec![None; offset];
            cells.extend(row.iter().map(cell_text));
            cells
        })
        .collect();

    RawSheet::new(headers, data)
}

/// Text rendering of a cell; empty and error cells are missing
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|naive| naive.format(DATETIME_FORMAT).to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}
