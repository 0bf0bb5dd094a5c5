mod common;

use chrono::NaiveDate;
use common::Style;
use common::Value;
use common::WorkbookBuilder;
use pretty_assertions::assert_eq;
use timetable_sheet::spreadsheet::cell::CellValue;
use timetable_sheet::spreadsheet::style::Borders;
use timetable_sheet::spreadsheet::style::NO_FILL;
use timetable_sheet::spreadsheet::SpreadsheetError;
use timetable_sheet::TimetableError;
use timetable_sheet::Workbook;

fn workbook() -> Workbook {
    let mut builder = WorkbookBuilder::new("Plan");
    builder
        .text(1, 1, "GRUPA1")
        .value(1, 2, Value::Inline("MATEMATYKA".into()))
        .value(1, 3, Value::Number(2.003))
        .value(1, 4, Value::Bool(true))
        .date(2, 1, NaiveDate::from_ymd_opt(2023, 10, 2).unwrap())
        .fill(3, 1, 3, 1, r#"rgb="92d050""#)
        .fill(3, 2, 3, 2, r#"theme="4""#)
        .fill(3, 3, 3, 3, r#"indexed="64""#)
        .fill(3, 4, 3, 4, r#"indexed="13""#)
        .outline(4, 1, 5, 2)
        .column_style(6, 6, Style { bottom: true, ..Style::default() })
        .row_style(8, Style { fill: Some(r#"rgb="FFFFFF00""#.into()), ..Style::default() })
        .text(10, 7, "koniec");
    builder.add_sheet("Listopad").text(2, 2, "pusty");
    Workbook::from_bytes(builder.build()).unwrap()
}

#[test]
fn sheet_names_in_order() {
    let workbook = workbook();
    assert_eq!(workbook.sheet_names(), vec!["Plan".to_owned(), "Listopad".to_owned()]);
    assert_eq!(workbook.name(), "<memory>");
}

#[test]
fn cell_values() {
    let sheet = workbook().worksheet("Plan").unwrap();

    assert_eq!(sheet.name, "Plan");
    assert_eq!((sheet.max_row(), sheet.max_col()), (10, 7));
    assert_eq!(sheet.get(1, 1).unwrap().value, CellValue::Text("GRUPA1".into()));
    assert_eq!(sheet.get(1, 2).unwrap().value, CellValue::Text("MATEMATYKA".into()));
    assert_eq!(sheet.get(1, 3).unwrap().value, CellValue::Number(2.003));
    assert_eq!(sheet.get(1, 3).unwrap().value.to_string(), "2.003");
    assert_eq!(sheet.get(1, 4).unwrap().value, CellValue::Boolean(true));
    assert_eq!(
        sheet.get(2, 1).unwrap().value,
        CellValue::date(NaiveDate::from_ymd_opt(2023, 10, 2).unwrap())
    );
    assert!(sheet.get(9, 1).unwrap().is_empty());
    assert!(sheet.get(11, 1).is_none());
}

#[test]
fn fill_colours() {
    let sheet = workbook().worksheet("Plan").unwrap();
    let fill = |row, col| sheet.get(row, col).unwrap().fill.clone();

    assert_eq!(fill(3, 1), "FF92D050");
    assert_eq!(fill(3, 2), "FF4472C4");
    assert_eq!(fill(3, 3), NO_FILL);
    assert_eq!(fill(3, 4), "FFFFFF00");
    assert_eq!(fill(1, 1), NO_FILL);
}

#[test]
fn border_edges() {
    let sheet = workbook().worksheet("Plan").unwrap();
    let border = |row, col| sheet.get(row, col).unwrap().border;

    assert_eq!(border(4, 1), Borders { top: true, left: true, ..Borders::none() });
    assert_eq!(border(5, 2), Borders { bottom: true, right: true, ..Borders::none() });
    assert_eq!(border(1, 1), Borders::none());
}

#[test]
fn row_and_column_defaults() {
    let sheet = workbook().worksheet("Plan").unwrap();

    // column 6 only exists through its default style
    assert!(sheet.get(7, 6).unwrap().border.bottom);
    assert_eq!(sheet.get(7, 6).unwrap().fill, NO_FILL);
    // a custom row format wins over the column format
    assert_eq!(sheet.get(8, 6).unwrap().fill, "FFFFFF00");
    assert!(!sheet.get(8, 6).unwrap().border.bottom);
    assert_eq!(sheet.get(8, 1).unwrap().fill, "FFFFFF00");
    assert_eq!(sheet.get(9, 1).unwrap().fill, NO_FILL);
}

#[test]
fn second_sheet() {
    let sheet = workbook().worksheet("Listopad").unwrap();
    assert_eq!((sheet.max_row(), sheet.max_col()), (2, 2));
    assert_eq!(sheet.get(2, 2).unwrap().value, CellValue::Text("pusty".into()));
}

#[test]
fn missing_sheet() {
    let error = workbook().worksheet("Grudzień").err().unwrap();

    assert!(matches!(
        error,
        TimetableError::SpreadsheetError(SpreadsheetError::WorksheetNotFound { .. })
    ));
    assert_eq!(error.to_string(), "Worksheet 'Grudzień' not found in '<memory>'");
}

#[test]
fn far_away_cell() {
    let mut builder = WorkbookBuilder::new("Plan");
    builder.text(1, 1, "plan").text(1_048_576, 16_384, "x");
    let sheet = Workbook::from_bytes(builder.build()).unwrap().worksheet("Plan").unwrap();

    assert_eq!((sheet.max_row(), sheet.max_col()), (1_048_576, 16_384));
    assert_eq!(sheet.cells().count(), 2);
    assert_eq!(sheet.get(1_048_576, 16_384).unwrap().value.to_string(), "x");
    assert!(sheet.get(2, 2).unwrap().is_empty());
}
