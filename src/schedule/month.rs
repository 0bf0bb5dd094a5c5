use crate::error::TimetableError;
use crate::schedule::day::locate_day;
use crate::schedule::day::DaySubgrid;
use crate::schedule::decoder::decode_block;
use crate::schedule::decoder::SessionBlock;
use crate::schedule::extent::find_extent;
use crate::schedule::grid::cell;
use crate::schedule::template::Template;
use crate::schedule::BlockError;
use crate::schedule::ScheduleError;
use crate::spreadsheet::sheet::Sheet;
use chrono::NaiveDate;
use log::debug;
use log::info;
use log::warn;
use serde::Serialize;

/// Outcome for one calendar day: either its decoded region or why it was skipped.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScheduleDay {
    Parsed(DaySubgrid),
    Missing { date: NaiveDate, error: ScheduleError },
}

impl ScheduleDay {
    pub fn date(&self) -> NaiveDate {
        match self {
            ScheduleDay::Parsed(day) => day.date,
            ScheduleDay::Missing { date, .. } => *date,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ScheduleDay::Parsed(_))
    }

    pub fn sessions(&self) -> &[SessionBlock] {
        match self {
            ScheduleDay::Parsed(day) => &day.sessions,
            ScheduleDay::Missing { .. } => &[],
        }
    }
}

/// Everything a month scan found, one entry per scanned day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthParseResult {
    pub sheet: String,
    pub year: i32,
    pub month: u32,
    pub schedule_days: Vec<ScheduleDay>,
}

impl MonthParseResult {
    pub fn sessions(&self) -> impl Iterator<Item = &SessionBlock> {
        self.schedule_days.iter().flat_map(ScheduleDay::sessions)
    }

    pub fn located_days(&self) -> usize {
        self.schedule_days.iter().filter(|day| day.is_parsed()).count()
    }

    /// Flat report of every recovered problem, one line each.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for day in &self.schedule_days {
            match day {
                ScheduleDay::Missing { date, error } => errors.push(format!("{date}: {error}")),
                ScheduleDay::Parsed(day) => errors.extend(
                    day.errors
                        .iter()
                        .map(|block| format!("{} {}: {}", day.date, block.cell, block.error)),
                ),
            }
        }
        errors
    }
}

/// Number of days of a month, `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Day-by-day scan of one month.
///
/// Days run from the 1st up to, but excluding, the last day of the month
/// unless [`Template::include_last_day`] is set.
pub struct MonthScan<'a> {
    sheet: &'a Sheet,
    template: &'a Template,
    year: i32,
    month: u32,
    next_day: u32,
    last_day: u32,
    located: usize,
}

impl<'a> MonthScan<'a> {
    pub fn new(sheet: &'a Sheet, year: i32, month: u32, template: &'a Template) -> Result<MonthScan<'a>, TimetableError> {
        template.validate()?;
        let days = days_in_month(year, month).ok_or(TimetableError::InvalidMonth { year, month })?;
        let last_day = if template.include_last_day { days } else { days - 1 };
        Ok(MonthScan {
            sheet,
            template,
            year,
            month,
            next_day: 1,
            last_day,
            located: 0,
        })
    }

    /// Number of days this scan yields
    pub fn total_days(&self) -> u32 {
        self.last_day
    }

    /// Days yielded so far whose region was found
    pub fn located_days(&self) -> usize {
        self.located
    }

    /// Share of days already scanned, in percent
    pub fn progress(&self) -> u8 {
        if self.last_day == 0 {
            return 100;
        }
        ((self.next_day - 1) * 100 / self.last_day) as u8
    }
}

impl Iterator for MonthScan<'_> {
    type Item = ScheduleDay;

    fn next(&mut self) -> Option<ScheduleDay> {
        if self.next_day > self.last_day {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.next_day)?;
        self.next_day += 1;
        match locate_day(self.sheet, date, self.template) {
            Ok(mut day) => {
                scan_day(self.sheet, &mut day, self.template);
                self.located += 1;
                debug!("{}: {} session(s), {} error(s)", date, day.sessions.len(), day.errors.len());
                Some(ScheduleDay::Parsed(day))
            }
            Err(error) => {
                warn!("{}: {}", date, error);
                Some(ScheduleDay::Missing { date, error })
            }
        }
    }
}

/// Scans the slot columns of a located day top to bottom, decoding a block at
/// every valued cell that no earlier block or excluded band has claimed.
pub fn scan_day(sheet: &Sheet, day: &mut DaySubgrid, template: &Template) {
    let first_col = day.starting_cell.col + 1;
    let last_col = (day.starting_cell.col + template.time_slots.len()).min(day.ending_cell.col);
    for col in first_col..=last_col {
        let mut row = day.starting_cell.row;
        while row <= day.ending_cell.row {
            if day.is_excluded(row, col) {
                row += 1;
                continue;
            }
            let Some(anchor) = cell(sheet, row, col) else {
                break;
            };
            if anchor.is_empty() {
                row += template.min_block_height;
                continue;
            }
            let block = find_extent(sheet, day, &anchor, template)
                .and_then(|extent| decode_block(sheet, day, extent, template));
            match block {
                Ok(session) => {
                    debug!(
                        "{}: '{}' at {}:{}",
                        day.date,
                        session.name,
                        session.extent.starting_cell,
                        session.extent.ending_cell
                    );
                    day.exclude(session.extent.starting_cell, session.extent.ending_cell);
                    row = session.extent.ending_cell.row + 1;
                    day.sessions.push(session);
                }
                Err(error) => {
                    warn!("{}: {}", day.date, error);
                    day.errors.push(BlockError { cell: anchor.position(), error });
                    row += 1;
                }
            }
        }
    }
}

/// Scans a whole month of `sheet`.
///
/// Fails with [`TimetableError::EmptyMonth`] when not a single day could be
/// located, which means the sheet or the month is the wrong one.
pub fn scan_month(sheet: &Sheet, year: i32, month: u32, template: &Template) -> Result<MonthParseResult, TimetableError> {
    let mut scan = MonthScan::new(sheet, year, month, template)?;
    let schedule_days: Vec<ScheduleDay> = scan.by_ref().collect();
    if scan.located_days() == 0 {
        Err(TimetableError::EmptyMonth {
            sheet: sheet.name.to_owned(),
            year,
            month,
        })?
    }
    let result = MonthParseResult {
        sheet: sheet.name.to_owned(),
        year,
        month,
        schedule_days,
    };
    info!(
        "Scanned {:02}.{} in '{}': {} of {} day(s) located, {} session(s)",
        month,
        year,
        sheet.name,
        result.located_days(),
        result.schedule_days.len(),
        result.sessions().count()
    );
    Ok(result)
}
