//! In-memory worksheet model.
//!
//! A [Grid] is an immutable, possibly ragged table of [Cell]s. Reads outside
//! the populated area return [Cell::Empty] instead of failing.

mod cell;
mod workbook;

pub use cell::{cell_date, cell_text, Cell};
pub use workbook::Workbook;

pub(crate) use cell::EMPTY;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string rows; `""` becomes an empty cell and
    /// anything that parses as a plain number becomes [Cell::Number].
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| {
                        let value = value.as_ref();
                        match value.trim().parse::<f64>() {
                            Ok(n) if !value.trim().is_empty() => Cell::Number(n),
                            _ => Cell::from(value),
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn from_range(range: &calamine::Range<calamine::Data>) -> Self {
        // calamine ranges start at the first used cell; pad back to A1 so
        // indices match what a user sees in the spreadsheet.
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let mut rows = vec![Vec::new(); row_offset];
        rows.extend(range.rows().map(|row| {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(Cell::from));
            cells
        }));
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Cell::is_blank))
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Cells of one row; an empty slice when out of range.
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Cells of one column, top to bottom, padded with empties for short rows.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell> {
        self.rows
            .iter()
            .map(move |row| row.get(col).unwrap_or(&EMPTY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_empty() {
        let grid = Grid::from_strings([vec!["a", "b"], vec!["c"]]);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.cell(1, 1), &Cell::Empty);
        assert_eq!(grid.cell(40, 3), &Cell::Empty);
        assert!(grid.row(9).is_empty());
    }

    #[test]
    fn from_strings_detects_numbers() {
        let grid = Grid::from_strings([vec!["2025", " 12.5 ", "5 сар", ""]]);
        assert_eq!(grid.cell(0, 0), &Cell::Number(2025.0));
        assert_eq!(grid.cell(0, 1), &Cell::Number(12.5));
        assert_eq!(grid.cell(0, 2), &Cell::text("5 сар"));
        assert_eq!(grid.cell(0, 3), &Cell::Empty);
    }

    #[test]
    fn column_pads_ragged_rows() {
        let grid = Grid::from_strings([vec!["a", "b"], vec!["c"], vec!["d", "e"]]);
        let col: Vec<&Cell> = grid.column(1).collect();
        assert_eq!(col, vec![&Cell::text("b"), &Cell::Empty, &Cell::text("e")]);
    }

    #[test]
    fn blank_grid_is_empty() {
        assert!(Grid::from_strings([vec!["", " "]]).is_empty());
        assert!(!Grid::from_strings([vec!["", "x"]]).is_empty());
    }
}
