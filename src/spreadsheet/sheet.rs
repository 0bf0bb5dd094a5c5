use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::style::Borders;
use crate::spreadsheet::style::NO_FILL;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Formatting given to positions the worksheet does not list.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BlankStyle {
    pub(crate) fill: String,
    pub(crate) border: Borders,
}

impl Default for BlankStyle {
    fn default() -> Self {
        Self {
            fill: NO_FILL.to_owned(),
            border: Borders::none(),
        }
    }
}

/// Immutable snapshot of one worksheet.
///
/// Only the cells the workbook lists are stored. Every other position inside
/// `1..=max_row` x `1..=max_col` reads as a blank cell carrying the row default
/// style, else the column default style, when the file defines one.
#[derive(Clone, Debug)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    max_row: usize,
    max_col: usize,
    /// Listed cells keyed by `(row, col)`, so iteration is row-major
    cells: BTreeMap<(usize, usize), Cell>,
    row_styles: HashMap<usize, BlankStyle>,
    column_styles: Vec<(usize, usize, BlankStyle)>,
}

impl Sheet {
    /// Builds a sheet from sparse cells, leaving every other position blank.
    pub fn with_cells(name: &str, cells: Vec<Cell>) -> Self {
        let cells: BTreeMap<(usize, usize), Cell> = cells
            .into_iter()
            .filter(|cell| cell.row > 0 && cell.col > 0)
            .map(|cell| ((cell.row, cell.col), cell))
            .collect();
        Self {
            name: name.to_owned(),
            max_row: cells.keys().map(|(row, _)| *row).max().unwrap_or(0),
            max_col: cells.keys().map(|(_, col)| *col).max().unwrap_or(0),
            cells,
            row_styles: HashMap::new(),
            column_styles: Vec::new(),
        }
    }

    /// Sets the styles of unlisted positions: per row (`customFormat` rows)
    /// and per inclusive column span. A row style wins over a column style.
    pub(crate) fn with_default_styles(
        mut self,
        row_styles: HashMap<usize, BlankStyle>,
        column_styles: Vec<(usize, usize, BlankStyle)>,
    ) -> Self {
        self.row_styles = row_styles;
        self.column_styles = column_styles;
        self
    }

    /// Last row holding a cell
    pub fn max_row(&self) -> usize {
        self.max_row
    }

    /// Last column holding a cell
    pub fn max_col(&self) -> usize {
        self.max_col
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a 1-based position, `None` outside the sheet.
    /// Unlisted positions are built on demand from the default styles.
    pub fn get(&self, row: usize, col: usize) -> Option<Cow<'_, Cell>> {
        if row == 0 || col == 0 || row > self.max_row || col > self.max_col {
            return None;
        }
        if let Some(cell) = self.cells.get(&(row, col)) {
            return Some(Cow::Borrowed(cell));
        }
        let style = self.row_styles.get(&row).or_else(|| {
            self.column_styles
                .iter()
                .find(|(min, max, _)| *min <= col && col <= *max)
                .map(|(_, _, style)| style)
        });
        let blank = match style {
            Some(style) => Cell::blank(row, col).with_fill(&style.fill).with_border(style.border),
            None => Cell::blank(row, col),
        };
        Some(Cow::Owned(blank))
    }

    /// Listed cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::with_cells("", Vec::new());

        assert!(sheet.is_empty());
        assert_eq!(sheet.max_row(), 0);
        assert_eq!(sheet.max_col(), 0);
        assert!(sheet.get(1, 1).is_none());
    }

    #[test]
    fn sheet_fills_holes() {
        let sheet = Sheet::with_cells("Plan", vec![
            Cell::text(1, 1, "a"),
            Cell::text(3, 2, "b").with_border(Borders::all()),
        ]);

        assert_eq!(sheet.max_row(), 3);
        assert_eq!(sheet.max_col(), 2);
        assert_eq!(sheet.cells().count(), 2);

        let hole = sheet.get(2, 2).unwrap();
        assert_eq!((hole.row, hole.col), (2, 2));
        assert!(hole.is_empty());
        assert_eq!(hole.fill, NO_FILL);

        let cell = sheet.get(3, 2).unwrap();
        assert_eq!(cell.border, Borders::all());
        assert!(sheet.get(4, 1).is_none());
        assert!(sheet.get(1, 3).is_none());
        assert!(sheet.get(0, 1).is_none());
    }

    #[test]
    fn sheet_default_styles() {
        let yellow = BlankStyle { fill: "FFFFFF00".to_owned(), border: Borders::none() };
        let framed = BlankStyle { fill: NO_FILL.to_owned(), border: Borders::all() };
        let sheet = Sheet::with_cells("", vec![Cell::text(3, 3, "x")])
            .with_default_styles(HashMap::from([(1, yellow)]), vec![(2, 3, framed)]);

        assert_eq!(sheet.get(1, 1).unwrap().fill, "FFFFFF00");
        assert_eq!(sheet.get(1, 2).unwrap().border, Borders::none());
        assert_eq!(sheet.get(2, 2).unwrap().border, Borders::all());
        assert_eq!(sheet.get(2, 1).unwrap().border, Borders::none());
        assert_eq!(sheet.get(3, 3).unwrap().fill, NO_FILL);
        assert_eq!(sheet.get(3, 3).unwrap().border, Borders::none());
    }

    #[test]
    fn cells_are_row_major() {
        let sheet = Sheet::with_cells("", vec![
            Cell::text(2, 1, "c"),
            Cell::text(1, 2, "b"),
            Cell::text(2, 2, "d"),
            Cell::text(1, 1, "a"),
        ]);
        let positions: Vec<_> = sheet.cells().map(|cell| (cell.row, cell.col)).collect();
        assert_eq!(positions, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn far_away_cell_stays_sparse() {
        let sheet = Sheet::with_cells("", vec![Cell::text(1, 1, "plan"), Cell::text(1_048_576, 16_384, "x")]);

        assert_eq!((sheet.max_row(), sheet.max_col()), (1_048_576, 16_384));
        assert_eq!(sheet.cells().count(), 2);
        assert!(sheet.get(500_000, 8_000).unwrap().is_empty());
        assert_eq!(sheet.get(1_048_576, 16_384).unwrap().value.to_string(), "x");
    }
}
