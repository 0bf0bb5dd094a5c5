//! Cell lookup and boundary scans over a sheet snapshot.

use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::CellPosition;
use crate::spreadsheet::reference::CellRange;
use crate::spreadsheet::sheet::Sheet;
use std::borrow::Cow;

/// Cell at a 1-based position; `None` past the edge of the sheet.
pub fn cell(sheet: &Sheet, row: usize, col: usize) -> Option<Cow<'_, Cell>> {
    sheet.get(row, col)
}

/// Scans `col` from the last row upwards and returns the first cell with a
/// visible top or bottom edge, i.e. where the table drawn in that column ends.
pub fn column_lower_boundary(sheet: &Sheet, col: usize) -> Option<Cow<'_, Cell>> {
    (1..=sheet.max_row())
        .rev()
        .filter_map(|row| sheet.get(row, col))
        .find(|cell| cell.border.top || cell.border.bottom)
}

/// Row-major search for the first listed cell matching `target`.
///
/// With `exact` the values must be equal; otherwise the stringified target must
/// be a substring of the stringified cell value. `range` limits the search to a
/// rectangle of the sheet.
pub fn find_cell_by_value<'a>(
    sheet: &'a Sheet,
    target: &CellValue,
    exact: bool,
    range: Option<CellRange>,
) -> Option<&'a Cell> {
    let range = range.unwrap_or_else(|| CellRange::new(
        CellPosition::new(1, 1),
        CellPosition::new(sheet.max_row(), sheet.max_col()),
    ));
    let needle = target.as_text();
    sheet
        .cells()
        .filter(|cell| range.contains(cell.row, cell.col))
        .find(|cell| {
            if exact {
                cell.value == *target
            } else {
                match (&needle, cell.value.as_text()) {
                    (Some(needle), Some(text)) => text.contains(&**needle),
                    _ => false,
                }
            }
        })
}
