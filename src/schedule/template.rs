//! Layout constants of the timetable template.
//!
//! All of these are coupled to one particular sheet template: the slot table,
//! where a day's box sits relative to its date cell, the minimum block height
//! and the highlight color used for breaks and holidays.

use chrono::NaiveTime;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Cannot read template: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Invalid template: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time slot {slot} is invalid: {reason}")]
    InvalidSlot { slot: usize, reason: String },

    #[error("Template spans {expected} slot columns but defines {found} time slots")]
    SlotCountMismatch { expected: usize, found: usize },

    #[error("Minimum block height must be at least 1")]
    InvalidBlockHeight,

    #[error("Day box offsets must be at least 1")]
    InvalidOffset,
}

/// `HH:MM` representation of wall-clock times in template files and output.
mod hour_minute {
    use chrono::NaiveTime;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(value.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One class period.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hour_minute")]
    pub start: NaiveTime,
    #[serde(with = "hour_minute")]
    pub end: NaiveTime,
}

impl TimeSlot {
    fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Ordered class periods of a day, addressed 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlotTable(Vec<TimeSlot>);

impl TimeSlotTable {
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        Self(slots)
    }

    /// Slot by 1-based index
    pub fn slot(&self, index: usize) -> Option<&TimeSlot> {
        index.checked_sub(1).and_then(|index| self.0.get(index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every slot must end after it starts and after the previous slot ends.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut previous_end = None::<NaiveTime>;
        for (index, slot) in self.0.iter().enumerate() {
            if slot.start >= slot.end {
                Err(TemplateError::InvalidSlot {
                    slot: index + 1,
                    reason: format!("{} is not before {}", slot.start.format("%H:%M"), slot.end.format("%H:%M")),
                })?
            }
            if previous_end.map(|end| slot.start < end).unwrap_or(false) {
                Err(TemplateError::InvalidSlot {
                    slot: index + 1,
                    reason: "overlaps the previous slot".to_owned(),
                })?
            }
            previous_end = Some(slot.end);
        }
        Ok(())
    }
}

impl Default for TimeSlotTable {
    fn default() -> Self {
        Self(vec![
            TimeSlot::new((8, 0), (8, 45)),
            TimeSlot::new((8, 45), (9, 30)),
            TimeSlot::new((9, 40), (10, 25)),
            TimeSlot::new((10, 25), (11, 10)),
            TimeSlot::new((11, 30), (12, 15)),
            TimeSlot::new((12, 15), (13, 0)),
            TimeSlot::new((13, 10), (13, 55)),
            TimeSlot::new((13, 55), (14, 40)),
            TimeSlot::new((14, 45), (15, 30)),
            TimeSlot::new((15, 30), (16, 15)),
            TimeSlot::new((16, 20), (17, 5)),
            TimeSlot::new((17, 5), (17, 50)),
            TimeSlot::new((17, 55), (18, 40)),
            TimeSlot::new((18, 40), (19, 25)),
            TimeSlot::new((19, 30), (20, 15)),
            TimeSlot::new((20, 15), (21, 0)),
        ])
    }
}

/// Session type signalled by a suffix of the course name (`MIKROEKONOMIA -Ć`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMarker {
    pub suffix: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypeMarker {
    pub fn new(suffix: &str, kind: &str) -> Self {
        Self { suffix: suffix.to_owned(), kind: kind.to_owned() }
    }
}

/// Template-coupled layout settings used by every stage of a scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub time_slots: TimeSlotTable,
    /// Rows between a day's top-left corner and its date cell
    pub date_row_offset: usize,
    /// Columns between a day's top-left corner (the group column) and its date cell
    pub date_col_offset: usize,
    /// Columns from the date cell to the day's last slot column
    pub boundary_col_offset: usize,
    /// Blocks are at least this many rows high
    pub min_block_height: usize,
    /// Highlight color that does not interrupt a block vertically
    pub break_colour: String,
    pub type_markers: Vec<TypeMarker>,
    pub default_type: String,
    /// Room given to lecturers when the block names none
    pub missing_room: String,
    /// Also scan the last day of the month
    pub include_last_day: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            time_slots: TimeSlotTable::default(),
            date_row_offset: 1,
            date_col_offset: 4,
            boundary_col_offset: 12,
            min_block_height: 3,
            break_colour: "FFFFFF00".to_owned(),
            type_markers: vec![
                TypeMarker::new("-Ć", "ćwiczenia"),
                TypeMarker::new("-L", "laboratorium"),
                TypeMarker::new("-F", "fakultet"),
            ],
            default_type: "wykład".to_owned(),
            missing_room: "none".to_owned(),
            include_last_day: false,
        }
    }
}

impl Template {
    /// Loads a template from a JSON file; missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Template, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        Template::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Template, TemplateError> {
        let template: Template = serde_json::from_str(content)?;
        template.validate()?;
        Ok(template)
    }

    /// Number of slot columns in a day's box
    pub fn slot_columns(&self) -> usize {
        self.date_col_offset + self.boundary_col_offset
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.min_block_height == 0 {
            Err(TemplateError::InvalidBlockHeight)?
        }
        if self.date_row_offset == 0 || self.date_col_offset == 0 {
            Err(TemplateError::InvalidOffset)?
        }
        if self.time_slots.len() != self.slot_columns() {
            Err(TemplateError::SlotCountMismatch {
                expected: self.slot_columns(),
                found: self.time_slots.len(),
            })?
        }
        self.time_slots.validate()
    }

    /// Type of a course name, matched on its upper-cased, whitespace-free suffix.
    pub fn session_type(&self, name: &str) -> &str {
        let normalized = normalize(name);
        self.type_markers
            .iter()
            .find(|marker| normalized.ends_with(&normalize(&marker.suffix)))
            .map(|marker| marker.kind.as_str())
            .unwrap_or(self.default_type.as_str())
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
