use thiserror::Error;

/// Main error type for the timetable extraction engine.
/// Aggregates errors from the standard library, dependencies and internal modules.
/// Everything in here is fatal for a scan; per-day and per-block problems are
/// recorded as data (see [`crate::schedule::ScheduleError`]).
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("{0}: {1}")]
    WithContextError(String, Box<TimetableError>),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Schedule module errors
    #[error("{0}")]
    TemplateError(#[from] crate::schedule::template::TemplateError),

    #[error("Niepoprawny miesiąc {month:02}.{year}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Nie znaleziono żadnego dnia miesiąca {month:02}.{year} w arkuszu '{sheet}'")]
    EmptyMonth { sheet: String, year: i32, month: u32 },
}

impl TimetableError {
    /// True for failures that come from reading the workbook container itself
    /// rather than from the requested sheet or month.
    pub fn is_workbook_unreadable(&self) -> bool {
        match self {
            TimetableError::SpreadsheetError(error) => error.is_workbook_unreadable(),
            TimetableError::WithContextError(_, error) => error.is_workbook_unreadable(),
            TimetableError::TemplateError(_)
            | TimetableError::InvalidMonth { .. }
            | TimetableError::EmptyMonth { .. } => false,
            _ => true,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TimetableError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| TimetableError::WithContextError(message.to_owned(), Box::new(e)))
    }
}
