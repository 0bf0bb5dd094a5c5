//! Excel-style cell references (`B7`, `A1:Q40`) and 1-based grid positions.

use regex::Regex;
use serde::Serialize;
use std::fmt::Display;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),
}

/// Position of a cell in a sheet, 1-based on both axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }
}

impl Display for CellPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reference())
    }
}

impl Serialize for CellPosition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rectangular, inclusive range of cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl CellRange {
    pub fn new(start: CellPosition, end: CellPosition) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.start.row <= row && row <= self.end.row && self.start.col <= col && col <= self.end.col
    }
}

impl TryFrom<&str> for CellRange {
    type Error = RangeError;

    /// Parses a range such as `A1:Q40`; a single reference (`C3`) is a one-cell range.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^\$?([A-Z]+)\$?(\d+)(?::\$?([A-Z]+)\$?(\d+))?$").expect("Hardcode regex pattern")
        });
        let value = value.trim().to_ascii_uppercase();
        let error = || RangeError::FormatError(value.to_owned());
        let captures = pattern.captures(&value).ok_or_else(error)?;
        let position = |col: usize, row: usize| -> Option<CellPosition> {
            let col = col_to_index(captures.get(col)?.as_str())?;
            let row = row_to_index(captures.get(row)?.as_str())?;
            Some(CellPosition::new(row, col))
        };
        let start = position(1, 2).ok_or_else(error)?;
        let end = position(3, 4).unwrap_or(start);
        if end.row < start.row || end.col < start.col {
            return Err(error());
        }
        Ok(CellRange { start, end })
    }
}

impl Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Converts column letters (`A`, `AB`) to a 1-based index.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |index, letter| {
        letter
            .is_ascii_alphabetic()
            .then(|| index * 26 + (letter.to_ascii_uppercase() as usize - 'A' as usize + 1))
    })
}

/// Converts a 1-based row number string to an index, rejecting row 0.
pub fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0)
}

/// Splits a reference such as `B7` into its 1-based `(row, col)`.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters.trim_start_matches('$'))?;
    let row = row_to_index(digits)?;
    Some((row, col))
}

/// Builds a reference such as `B7` from a 1-based `(row, col)`.
pub fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut col = col;
    while col > 0 {
        let remainder = (col - 1) % 26;
        letters.push((b'A' + remainder as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &row.to_string()
}
