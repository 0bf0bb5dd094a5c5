//! # Schedule Extraction Module
//!
//! Geometric reconstruction of class sessions from a timetable worksheet.
//! A month scan locates each day's region ([`day`]), seeds blocks at valued
//! cells, grows them along borders and fill colors ([`extent`]) and decodes
//! them into [`decoder::SessionBlock`] records. Problems confined to one day
//! or one block are recorded as [`ScheduleError`] values and never abort the
//! month.
pub mod day;
pub mod decoder;
pub mod extent;
pub mod grid;
pub mod month;
pub mod summary;
pub mod template;

use crate::spreadsheet::reference::CellPosition;
use serde::Serialize;
use thiserror::Error;

/// Recoverable problems, kept in the result instead of being propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The date of a day is not present anywhere in the sheet
    #[error("Brak daty w arkuszu")]
    DayNotFound,

    /// A block grows past its day's region without meeting a boundary
    #[error("Nie można ustalić zakresu zajęć w komórce {0}")]
    ExtentNotFound(CellPosition),

    /// The anchor cell of a block holds only whitespace
    #[error("Brak nazwy zajęć w komórce {0}")]
    MissingName(CellPosition),
}

impl Serialize for ScheduleError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A block that could not be extracted, with the anchor it started from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockError {
    pub cell: CellPosition,
    pub error: ScheduleError,
}
