use crate::schedule::day::DaySubgrid;
use crate::schedule::extent::Extent;
use crate::schedule::grid::cell;
use crate::schedule::template::Template;
use crate::schedule::ScheduleError;
use crate::spreadsheet::sheet::Sheet;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use serde::Serialize;

/// A lecturer named in a block and the room given next to the name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Lecturer {
    pub name: String,
    pub room: String,
}

/// One decoded class session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionBlock {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub lecturers: Vec<Lecturer>,
    pub rooms: Vec<String>,
    pub groups: Vec<String>,
    pub colour: String,
    pub extent: Extent,
}

impl SessionBlock {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Whether importing `self` replaces `other`: same calendar day and at
    /// least one group in common.
    pub fn supersedes(&self, other: &SessionBlock) -> bool {
        self.date() == other.date()
            && self.groups.iter().any(|group| other.groups.contains(group))
    }
}

/// Decodes the block at `extent` inside `day`.
pub fn decode_block(
    sheet: &Sheet,
    day: &DaySubgrid,
    extent: Extent,
    template: &Template,
) -> Result<SessionBlock, ScheduleError> {
    let anchor = extent.starting_cell;
    let name = text_at(sheet, anchor.row, anchor.col)
        .ok_or(ScheduleError::MissingName(anchor))?;

    let first = extent.starting_cell.col - day.starting_cell.col;
    let last = extent.ending_cell.col - day.starting_cell.col;
    let (Some(first_slot), Some(last_slot)) = (template.time_slots.slot(first), template.time_slots.slot(last)) else {
        return Err(ScheduleError::ExtentNotFound(anchor));
    };

    Ok(SessionBlock {
        kind: template.session_type(&name).to_owned(),
        name,
        start: day.date.and_time(first_slot.start),
        end: day.date.and_time(last_slot.end),
        lecturers: lecturers(sheet, extent, template),
        rooms: rooms(sheet, extent),
        groups: day.groups_between(extent.starting_cell.row, extent.ending_cell.row),
        colour: cell(sheet, anchor.row, anchor.col)
            .map(|cell| cell.fill.to_owned())
            .unwrap_or_default(),
        extent,
    })
}

/// Names listed under the anchor in the left column, up to the first blank
/// cell or the first cell containing a digit. A cell may hold several names
/// separated by `,` or `/`.
fn lecturers(sheet: &Sheet, extent: Extent, template: &Template) -> Vec<Lecturer> {
    let left = extent.starting_cell.col;
    let right = extent.ending_cell.col;
    let corner = text_at(sheet, extent.ending_cell.row, right);
    let mut lecturers = Vec::new();
    for row in extent.starting_cell.row + 1..=extent.ending_cell.row {
        let Some(text) = text_at(sheet, row, left) else {
            break;
        };
        if text.chars().any(|c| c.is_ascii_digit()) {
            break;
        }
        let room = text_at(sheet, row, right)
            .or_else(|| corner.clone())
            .unwrap_or_else(|| template.missing_room.to_owned());
        lecturers.extend(
            text.replace('/', ",")
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| Lecturer { name: name.to_owned(), room: room.to_owned() }),
        );
    }
    lecturers
}

/// Distinct values under the anchor in the right column, in sheet order.
fn rooms(sheet: &Sheet, extent: Extent) -> Vec<String> {
    let mut rooms = Vec::<String>::new();
    for row in extent.starting_cell.row + 1..=extent.ending_cell.row {
        if let Some(room) = text_at(sheet, row, extent.ending_cell.col) {
            if !rooms.contains(&room) {
                rooms.push(room);
            }
        }
    }
    rooms
}

/// Trimmed text of a cell, `None` when blank.
fn text_at(sheet: &Sheet, row: usize, col: usize) -> Option<String> {
    cell(sheet, row, col)
        .and_then(|cell| cell.value.as_text().map(|text| text.trim().to_owned()))
        .filter(|text| !text.is_empty())
}
