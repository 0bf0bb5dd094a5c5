use crate::schedule::decoder::SessionBlock;
use crate::schedule::grid::cell;
use crate::schedule::grid::column_lower_boundary;
use crate::schedule::grid::find_cell_by_value;
use crate::schedule::template::Template;
use crate::schedule::BlockError;
use crate::schedule::ScheduleError;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::CellPosition;
use crate::spreadsheet::sheet::Sheet;
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

/// Rows of a day claimed by one student group label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupBand {
    pub name: String,
    pub start_row: usize,
    pub end_row: usize,
}

impl GroupBand {
    /// Inclusive overlap with the row range `[start_row, end_row]`
    pub fn overlaps(&self, start_row: usize, end_row: usize) -> bool {
        self.start_row <= end_row && start_row <= self.end_row
    }
}

/// The region of one calendar day, plus what has been decoded inside it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaySubgrid {
    pub date: NaiveDate,
    /// Top-left corner, in the group label column
    pub starting_cell: CellPosition,
    /// Bottom-right corner, in the last slot column
    pub ending_cell: CellPosition,
    pub groups: Vec<GroupBand>,
    /// Cells consumed by header rows, degenerate bands and extracted blocks
    #[serde(skip)]
    pub excluded_cells: HashSet<CellPosition>,
    pub sessions: Vec<SessionBlock>,
    pub errors: Vec<BlockError>,
}

impl DaySubgrid {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.starting_cell.row <= row
            && row <= self.ending_cell.row
            && self.starting_cell.col <= col
            && col <= self.ending_cell.col
    }

    pub fn is_excluded(&self, row: usize, col: usize) -> bool {
        self.excluded_cells.contains(&CellPosition::new(row, col))
    }

    /// Marks a rectangle as consumed.
    pub fn exclude(&mut self, start: CellPosition, end: CellPosition) {
        for row in start.row..=end.row {
            for col in start.col..=end.col {
                self.excluded_cells.insert(CellPosition::new(row, col));
            }
        }
    }

    /// Names of the bands overlapping `[start_row, end_row]`, top to bottom.
    pub fn groups_between(&self, start_row: usize, end_row: usize) -> Vec<String> {
        self.groups
            .iter()
            .filter(|band| band.overlaps(start_row, end_row))
            .map(|band| band.name.to_owned())
            .collect()
    }
}

/// Finds the region of `date` and its group bands.
///
/// The date cell sits `date_row_offset` rows below and `date_col_offset`
/// columns right of the region's top-left corner. The bottom is the lowest
/// horizontal border in the column `boundary_col_offset` right of the date
/// cell, which is also the region's last column.
pub fn locate_day(sheet: &Sheet, date: NaiveDate, template: &Template) -> Result<DaySubgrid, ScheduleError> {
    let date_cell = find_cell_by_value(sheet, &CellValue::date(date), true, None)
        .ok_or(ScheduleError::DayNotFound)?;
    let top = date_cell.row.checked_sub(template.date_row_offset).filter(|row| *row > 0);
    let left = date_cell.col.checked_sub(template.date_col_offset).filter(|col| *col > 0);
    let (Some(top), Some(left)) = (top, left) else {
        return Err(ScheduleError::DayNotFound);
    };
    let right = date_cell.col + template.boundary_col_offset;
    let bottom = column_lower_boundary(sheet, right)
        .map(|cell| cell.row)
        .filter(|row| *row >= top)
        .ok_or(ScheduleError::DayNotFound)?;

    let mut day = DaySubgrid {
        date,
        starting_cell: CellPosition::new(top, left),
        ending_cell: CellPosition::new(bottom, right),
        groups: Vec::new(),
        excluded_cells: HashSet::new(),
        sessions: Vec::new(),
        errors: Vec::new(),
    };
    find_group_bands(sheet, &mut day);
    debug!(
        "Located {} at {}:{} with {} group(s)",
        date,
        day.starting_cell,
        day.ending_cell,
        day.groups.len()
    );
    Ok(day)
}

/// Walks the group label column and splits it into bands along horizontal borders.
///
/// Bands whose name is at most one visible character are separator or header
/// rows: they are dropped and their rows are excluded over the whole width.
fn find_group_bands(sheet: &Sheet, day: &mut DaySubgrid) {
    let col = day.starting_cell.col;
    let last_row = day.ending_cell.row;
    let mut name = String::new();
    let mut start_row = day.starting_cell.row;
    for row in day.starting_cell.row..=last_row {
        let current = cell(sheet, row, col);
        if let Some(text) = current.as_ref().and_then(|cell| cell.value.as_text()) {
            name.push_str(&text);
        }
        let closes = current.map(|cell| cell.border.bottom).unwrap_or(false)
            || cell(sheet, row + 1, col).map(|cell| cell.border.top).unwrap_or(false)
            || row == last_row;
        if !closes {
            continue;
        }
        if name.chars().filter(|c| !c.is_whitespace()).count() <= 1 {
            day.exclude(
                CellPosition::new(start_row, col),
                CellPosition::new(row, day.ending_cell.col),
            );
        } else {
            day.groups.push(GroupBand {
                name: name.trim().to_owned(),
                start_row,
                end_row: row,
            });
        }
        name.clear();
        start_row = row + 1;
    }
}
