use serde::Serialize;

use crate::error::{Anchor, ExtractError};
use crate::grid::{Cell, Grid};
use crate::locate::{
    find_header_row_with_year, find_row_index_by_cell_name, COMPANY_HEADER_WINDOW,
    SHEET_HEADER_WINDOW,
};
use crate::matchers::{is_four_digit_year, normalize_cell, parse_amount, parse_month_label};
use crate::pick::{pick_last_n_active_months, pick_year_column};

const TOTAL_ROW_PREFIX: &str = "нийт";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPoint {
    pub month: u32,
    pub label: String,
    pub value: f64,
}

impl MonthPoint {
    pub fn new(month: u32, value: f64) -> Self {
        Self {
            month,
            label: format!("{month} сар"),
            value,
        }
    }
}

/// Chart-ready month series. Both vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl MonthSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl From<Vec<MonthPoint>> for MonthSeries {
    fn from(points: Vec<MonthPoint>) -> Self {
        let (labels, data) = points.into_iter().map(|p| (p.label, p.value)).unzip();
        Self { labels, data }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MonthSeriesQuery<'a> {
    /// Scope the search to the block under this company's name.
    pub company: Option<&'a str>,
    /// Year column header, e.g. `"2025"`; the rightmost year column otherwise.
    pub year_label: Option<&'a str>,
    pub take_last: usize,
}

fn is_total_row(row: &[Cell]) -> bool {
    row.iter()
        .any(|cell| normalize_cell(cell).starts_with(TOTAL_ROW_PREFIX))
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

/// Month values under a year header, latest `take_last` active months.
///
/// Fails when the company block, the year header row or the year column
/// cannot be found. A header with no month rows under it is a valid empty
/// series.
pub fn extract_month_series(
    grid: &Grid,
    sheet: &str,
    query: &MonthSeriesQuery<'_>,
) -> Result<MonthSeries, ExtractError> {
    let window = match query.company {
        Some(company) => {
            let anchor = find_row_index_by_cell_name(grid, &[company], 0..grid.height(), None)
                .ok_or_else(|| {
                    ExtractError::missing_anchor(Anchor::CompanyBlock(company.to_string()), sheet)
                })?;
            anchor..anchor + COMPANY_HEADER_WINDOW + 1
        }
        None => 0..SHEET_HEADER_WINDOW,
    };

    let header_row = find_header_row_with_year(grid, window)
        .ok_or_else(|| ExtractError::missing_anchor(Anchor::YearHeader, sheet))?;
    let year_col = pick_year_column(grid.row(header_row), query.year_label).ok_or_else(|| {
        let label = query.year_label.unwrap_or("latest").to_string();
        ExtractError::missing_anchor(Anchor::YearColumn(label), sheet)
    })?;

    let mut points = Vec::new();
    for r in header_row + 1..grid.height() {
        let row = grid.row(r);
        let month = row
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != year_col)
            .find_map(|(_, cell)| parse_month_label(cell));

        if let Some(month) = month {
            points.push(MonthPoint::new(month, parse_amount(grid.cell(r, year_col))));
            continue;
        }
        if is_blank_row(row) {
            if points.is_empty() {
                continue;
            }
            break;
        }
        if is_total_row(row) || !points.is_empty() || row.iter().any(is_four_digit_year) {
            break;
        }
    }

    tracing::debug!(sheet, header_row, year_col, months = points.len(), "month rows collected");
    Ok(pick_last_n_active_months(points, query.take_last).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(take_last: usize) -> MonthSeriesQuery<'static> {
        MonthSeriesQuery {
            company: None,
            year_label: Some("2025"),
            take_last,
        }
    }

    #[test]
    fn collects_months_until_total() {
        let grid = Grid::from_strings([
            vec!["Дуудлагын статистик", "", ""],
            vec!["Сар", "2024", "2025"],
            vec!["1 сар", "90", "100"],
            vec!["2 сар", "80", "110"],
            vec!["3 сар", "85", "0"],
            vec!["Нийт", "255", "210"],
            vec!["4 сар", "1", "999"],
        ]);
        let series = extract_month_series(&grid, "Stats", &query(4)).expect("series");
        assert_eq!(series.labels, vec!["1 сар", "2 сар"]);
        assert_eq!(series.data, vec![100.0, 110.0]);
    }

    #[test]
    fn header_without_months_is_empty_series() {
        let grid = Grid::from_strings([vec!["Сар", "2025"], vec!["", ""], vec!["Тайлбар", ""]]);
        let series = extract_month_series(&grid, "Stats", &query(4)).expect("empty is ok");
        assert!(series.is_empty());
        assert!(series.data.is_empty());
    }

    #[test]
    fn missing_year_header_is_an_error() {
        let grid = Grid::from_strings([vec!["Сар", "Тоо"], vec!["1 сар", "5"]]);
        let err = extract_month_series(&grid, "Stats", &query(4)).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingAnchor {
                anchor: Anchor::YearHeader,
                ..
            }
        ));
    }

    #[test]
    fn company_block_scopes_the_search() {
        let grid = Grid::from_strings([
            vec!["ARB", "", ""],
            vec!["Сар", "2024", "2025"],
            vec!["1 сар", "1", "11"],
            vec!["", "", ""],
            vec!["Golomt", "", ""],
            vec!["Сар", "2024", "2025"],
            vec!["1 сар", "2", "22"],
            vec!["2 сар", "3", "33"],
        ]);
        let q = MonthSeriesQuery {
            company: Some("golomt"),
            year_label: None,
            take_last: 4,
        };
        let series = extract_month_series(&grid, "Stats", &q).expect("series");
        assert_eq!(series.data, vec![22.0, 33.0]);

        let missing = MonthSeriesQuery {
            company: Some("Khan"),
            ..q
        };
        let err = extract_month_series(&grid, "Stats", &missing).unwrap_err();
        assert!(err.to_string().contains("company block 'Khan'"), "{err}");
    }

    #[test]
    fn stops_at_next_block_header() {
        let grid = Grid::from_strings([
            vec!["Сар", "2025"],
            vec!["1 сар", "5"],
            vec!["Дараагийн хүснэгт", "2025"],
            vec!["2 сар", "7"],
        ]);
        let series = extract_month_series(&grid, "Stats", &query(4)).expect("series");
        assert_eq!(series.data, vec![5.0]);
    }
}
