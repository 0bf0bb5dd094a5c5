use crate::error::TimetableError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::CellPosition;
use crate::spreadsheet::style::Borders;
use crate::spreadsheet::style::NO_FILL;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;

/// How a numeric cell value is meant to be read, derived from its number format.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum NumberFormat {
    #[default]
    Number,
    /// Date and time of day
    DateTime,
    /// Date only
    Date,
    /// Time of day only
    Time,
}

impl NumberFormat {
    /// Parses built-in Excel number format IDs to determine the value kind.
    pub(crate) fn parse_builtin_number_format_id(id: &str) -> Option<Self> {
        match id {
            "22" => Some(Self::DateTime),
            "14" | "15" | "16" | "17" => Some(Self::Date),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::Time),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine the value kind.
    /// Analyzes format codes for date/time patterns outside literals and brackets.
    pub(crate) fn parse_custom_number_format(format: &str) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_bracket && !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time) {
            (true, true) => Self::DateTime,
            (true, false) => Self::Date,
            (false, true) => Self::Time,
            (false, false) => Self::Number,
        }
    }
}

/// Decoded value of a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl CellValue {
    /// A date at midnight, the way day headers are stored in timetable sheets.
    pub fn date(date: NaiveDate) -> Self {
        CellValue::DateTime(date.and_time(NaiveTime::MIN))
    }

    /// True for cells without a value; an empty string counts as no value.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Stringified value, `None` for empty cells.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) if text.is_empty() => None,
            CellValue::Text(text) => Some(Cow::Borrowed(text)),
            _ => Some(Cow::Owned(self.to_string())),
        }
    }

    /// Converts a serial number of the 1900 or 1904 date system.
    pub(crate) fn from_serial(serial: f64, format: NumberFormat, is_1904: bool) -> Self {
        let Some(datetime) = serial_to_datetime(serial, is_1904) else {
            return CellValue::Number(serial);
        };
        match format {
            NumberFormat::Number => CellValue::Number(serial),
            NumberFormat::Time if serial < 1.0 => CellValue::Time(datetime.time()),
            NumberFormat::DateTime | NumberFormat::Date | NumberFormat::Time => CellValue::DateTime(datetime),
        }
    }

    /// Parses an ISO 8601 value of a `t="d"` cell.
    pub(crate) fn from_iso(value: &str) -> Result<Self, TimetableError> {
        let datetime = if value.contains('T') {
            NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        } else {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        };
        datetime
            .map(CellValue::DateTime)
            .map_err(|error| TimetableError::XmlHelperError(
                crate::helpers::xml::XmlError::ParseAttributeValueError(format!("{value}: {error}"))
            ))
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => write!(f, "{text}"),
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => write!(f, "{}", *number as i64),
            CellValue::Number(number) => write!(f, "{number}"),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Time(time) => write!(f, "{}", time.format("%H:%M:%S")),
        }
    }
}

/// Immutable snapshot of one cell: position, value and the parts of its style
/// the timetable geometry depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (1-based)
    pub row: usize,
    /// Column index (1-based)
    pub col: usize,
    pub value: CellValue,
    /// Resolved fill, 8 hex digits ARGB, [`NO_FILL`] without fill, empty when unsupported
    pub fill: String,
    pub border: Borders,
}

impl Cell {
    /// A cell without value, fill or borders.
    pub fn blank(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            value: CellValue::Empty,
            fill: NO_FILL.to_owned(),
            border: Borders::none(),
        }
    }

    /// A text cell without fill or borders.
    pub fn text(row: usize, col: usize, text: &str) -> Self {
        Self {
            value: CellValue::Text(text.to_owned()),
            ..Self::blank(row, col)
        }
    }

    pub fn with_fill(mut self, fill: &str) -> Self {
        self.fill = fill.to_owned();
        self
    }

    pub fn with_border(mut self, border: Borders) -> Self {
        self.border = border;
        self
    }

    pub fn with_value(mut self, value: CellValue) -> Self {
        self.value = value;
        self
    }

    pub fn position(&self) -> CellPosition {
        CellPosition::new(self.row, self.col)
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn has_fill(&self) -> bool {
        self.fill != NO_FILL
    }
}

/// Converts an Excel serial number to a date-time.
/// Handles the Lotus 1-2-3 leap year bug of the 1900 date system.
fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let epoch = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    let date = epoch.checked_add_signed(Duration::days(days))?;
    date.and_time(NaiveTime::MIN).checked_add_signed(Duration::milliseconds(milliseconds))
}
