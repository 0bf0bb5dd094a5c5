use crate::schedule::day::DaySubgrid;
use crate::schedule::grid::cell;
use crate::schedule::template::Template;
use crate::schedule::ScheduleError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::CellPosition;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::style::Borders;
use crate::spreadsheet::style::NO_FILL;
use serde::Serialize;

/// Inclusive rectangle occupied by one block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub starting_cell: CellPosition,
    pub ending_cell: CellPosition,
}

impl Extent {
    pub fn height(&self) -> usize {
        self.ending_cell.row - self.starting_cell.row + 1
    }

    pub fn width(&self) -> usize {
        self.ending_cell.col - self.starting_cell.col + 1
    }
}

/// Grows a block from its anchor along borders and fill color.
///
/// Horizontally the block ends at the first column whose right edge, or the
/// next column's left edge, is drawn; a filled anchor also ends at the first
/// differently filled neighbour. Vertically the search starts at the minimum
/// block height and applies the same rule along the anchor column, except that
/// the break color never interrupts the block.
pub fn find_extent(
    sheet: &Sheet,
    day: &DaySubgrid,
    anchor: &Cell,
    template: &Template,
) -> Result<Extent, ScheduleError> {
    let not_found = || ScheduleError::ExtentNotFound(anchor.position());
    let filled = anchor.fill != NO_FILL;

    let mut last_col = None;
    for col in anchor.col..=day.ending_cell.col {
        let current = border_at(sheet, anchor.row, col);
        let next = cell(sheet, anchor.row, col + 1);
        let next = next.as_deref();
        let next_left = next.map(|cell| cell.border.left).unwrap_or(false);
        let colour_changes = filled && fill_at(next) != anchor.fill;
        if current.right || next_left || colour_changes {
            last_col = Some(col);
            break;
        }
    }

    let mut last_row = None;
    let first_row = anchor.row + template.min_block_height - 1;
    for row in first_row..=day.ending_cell.row {
        let current = border_at(sheet, row, anchor.col);
        let next = cell(sheet, row + 1, anchor.col);
        let next = next.as_deref();
        let next_top = next.map(|cell| cell.border.top).unwrap_or(false);
        let next_fill = fill_at(next);
        let colour_changes = filled && next_fill != anchor.fill && next_fill != template.break_colour;
        if current.bottom || next_top || colour_changes {
            last_row = Some(row);
            break;
        }
    }

    match (last_row, last_col) {
        (Some(row), Some(col)) => Ok(Extent {
            starting_cell: anchor.position(),
            ending_cell: CellPosition::new(row, col),
        }),
        _ => Err(not_found()),
    }
}

fn border_at(sheet: &Sheet, row: usize, col: usize) -> Borders {
    cell(sheet, row, col).map(|cell| cell.border).unwrap_or_default()
}

fn fill_at(cell: Option<&Cell>) -> &str {
    cell.map(|cell| cell.fill.as_str()).unwrap_or(NO_FILL)
}
