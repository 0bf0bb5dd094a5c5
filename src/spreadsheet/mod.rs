//! # Spreadsheet Snapshot Module
//!
//! Reads an Office Open XML workbook (`.xlsx`, `.xlsm`) and decodes one worksheet
//! into an immutable [`Sheet`]: every cell carries its value, its resolved fill
//! color and its visible border edges. Theme and indexed colors are resolved
//! against the workbook's own palette while the sheet is read, so nothing
//! downstream needs access to the workbook again.
pub mod cell;
mod excel;
pub mod reference;
pub mod sheet;
pub mod style;
mod xlsx;

use crate::error::ResultMessage;
use crate::error::TimetableError;
use crate::helpers::reader::UnifiedReader;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use log::info;
use std::path::Path;
use thiserror::Error;

/// Errors raised while opening a workbook or selecting a worksheet.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// The file cannot be opened or parsed as a spreadsheet
    #[error("Cannot read workbook '{name}': {reason}")]
    WorkbookUnreadable { name: String, reason: String },

    /// The requested worksheet is not part of the workbook
    #[error("Worksheet '{sheet}' not found in '{name}'")]
    WorksheetNotFound { name: String, sheet: String },

    /// A required package part is missing
    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Workbook '{0}' contains no worksheets")]
    SpreadsheetEmptyError(String),
}

impl SpreadsheetError {
    /// Everything except a missing worksheet means the container itself is unusable.
    pub fn is_workbook_unreadable(&self) -> bool {
        !matches!(self, SpreadsheetError::WorksheetNotFound { .. })
    }
}

/// An opened workbook, ready to snapshot its worksheets.
pub struct Workbook {
    inner: XlsxWorkbook,
}

impl Workbook {
    /// Opens a workbook from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Workbook, TimetableError> {
        let name = path.as_ref().display().to_string();
        let inner = UnifiedReader::open(&path)
            .and_then(|reader| XlsxWorkbook::open(&name, reader))
            .map_err(|error| unreadable(&name, error))?;
        info!("Opened workbook '{}'", name);
        Ok(Workbook { inner })
    }

    /// Opens a workbook already loaded into memory, e.g. an uploaded file.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Workbook, TimetableError> {
        let name = "<memory>";
        let inner = XlsxWorkbook::open(name, UnifiedReader::from_bytes(bytes))
            .map_err(|error| unreadable(name, error))?;
        Ok(Workbook { inner })
    }

    /// Name given to the workbook when it was opened
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Worksheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    /// Decodes the named worksheet into an immutable snapshot.
    pub fn worksheet(&mut self, name: &str) -> Result<Sheet, TimetableError> {
        match self.inner.read_sheet(name).with_prefix(&format!("Worksheet '{name}'")) {
            Ok(Some(sheet)) => Ok(sheet),
            Ok(None) => Err(SpreadsheetError::WorksheetNotFound {
                name: self.inner.name.to_owned(),
                sheet: name.to_owned(),
            })?,
            Err(error) => Err(unreadable(&self.inner.name, error)),
        }
    }
}

fn unreadable(name: &str, error: TimetableError) -> TimetableError {
    match error {
        TimetableError::SpreadsheetError(SpreadsheetError::WorkbookUnreadable { .. }) => error,
        error => TimetableError::SpreadsheetError(SpreadsheetError::WorkbookUnreadable {
            name: name.to_owned(),
            reason: error.to_string(),
        }),
    }
}
