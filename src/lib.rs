//! # Timetable Sheet
//!
//! Extracts class sessions from timetable grids drawn in XLSX workbooks.
//! The layout is read from cell values, fill colors and border lines alone,
//! so the same engine works for any month of a sheet built from one template.
//!
//! ## Features
//!
//! - **Self-contained XLSX reader**: workbook, styles, theme and shared strings are
//!   parsed directly from the package; theme and indexed colors are resolved to
//!   plain ARGB values
//! - **Geometric extraction**: day regions, group bands and class blocks are
//!   discovered from borders and fill continuity
//! - **Fault tolerant**: a missing day or a malformed block is recorded in the
//!   result and the scan carries on
//! - **Configurable template**: slot times, offsets and marker suffixes can be
//!   loaded from JSON
//!
//! ## Example
//!
//! ```no_run
//! use timetable_sheet::{parse_schedule, Template};
//!
//! let result = parse_schedule("plan.xlsx", "Październik", 2023, 10, &Template::default())?;
//! for session in result.sessions() {
//!     println!("{} {} - {} {:?}", session.name, session.start, session.end, session.groups);
//! }
//! # Ok::<(), timetable_sheet::TimetableError>(())
//! ```
pub mod error;
mod helpers;
pub mod schedule;
pub mod spreadsheet;

pub use crate::error::TimetableError;
pub use crate::schedule::decoder::Lecturer;
pub use crate::schedule::decoder::SessionBlock;
pub use crate::schedule::month::scan_month;
pub use crate::schedule::month::MonthParseResult;
pub use crate::schedule::month::MonthScan;
pub use crate::schedule::month::ScheduleDay;
pub use crate::schedule::summary::ScheduleSummary;
pub use crate::schedule::template::Template;
pub use crate::schedule::ScheduleError;
pub use crate::spreadsheet::Workbook;

use std::path::Path;

/// Opens a workbook and scans one month of one of its worksheets.
///
/// # Errors
///
/// Fails when the workbook cannot be read, the worksheet does not exist or no
/// day of the month can be located in it. Everything else is reported inside
/// the returned [`MonthParseResult`].
pub fn parse_schedule<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    year: i32,
    month: u32,
    template: &Template,
) -> Result<MonthParseResult, TimetableError> {
    let mut workbook = Workbook::open(path)?;
    scan_workbook(&mut workbook, sheet_name, year, month, template)
}

/// Same as [`parse_schedule`] for a workbook already held in memory.
pub fn parse_schedule_bytes(
    bytes: Vec<u8>,
    sheet_name: &str,
    year: i32,
    month: u32,
    template: &Template,
) -> Result<MonthParseResult, TimetableError> {
    let mut workbook = Workbook::from_bytes(bytes)?;
    scan_workbook(&mut workbook, sheet_name, year, month, template)
}

/// Scans one month of an opened workbook.
pub fn scan_workbook(
    workbook: &mut Workbook,
    sheet_name: &str,
    year: i32,
    month: u32,
    template: &Template,
) -> Result<MonthParseResult, TimetableError> {
    template.validate()?;
    let sheet = workbook.worksheet(sheet_name)?;
    scan_month(&sheet, year, month, template)
}
