//! Column and row choices made relative to located anchors.

use crate::extract::MonthPoint;
use crate::grid::Cell;
use crate::locate::find_column_by_exact_label;
use crate::matchers::is_four_digit_year;

/// Column of `preferred_year` in a header row. Without an exact match the
/// rightmost year-looking column is used, so a sheet that already rolled
/// into a new year still yields its latest column.
pub fn pick_year_column(header_row: &[Cell], preferred_year: Option<&str>) -> Option<usize> {
    let exact = preferred_year.and_then(|label| find_column_by_exact_label(header_row, label));
    if exact.is_some() {
        return exact;
    }
    let fallback = header_row.iter().rposition(is_four_digit_year);
    if let (Some(label), Some(col)) = (preferred_year, fallback) {
        tracing::debug!(
            year = label,
            column = col,
            "year label not found; using rightmost year column"
        );
    }
    fallback
}

/// Last `n` points with a positive value, in their original order. Never pads.
pub fn pick_last_n_active_months(points: Vec<MonthPoint>, n: usize) -> Vec<MonthPoint> {
    let mut active: Vec<MonthPoint> = points.into_iter().filter(|p| p.value > 0.0).collect();
    let skip = active.len().saturating_sub(n);
    active.drain(..skip);
    active
}

/// Rightmost `n` columns of an ascending list, still ascending.
pub fn pick_last_n_week_columns(week_columns: &[usize], n: usize) -> Vec<usize> {
    let skip = week_columns.len().saturating_sub(n);
    week_columns[skip..].to_vec()
}

/// Nearest week column strictly left of `current_column`.
pub fn pick_previous_week_column(week_columns: &[usize], current_column: usize) -> Option<usize> {
    week_columns
        .iter()
        .copied()
        .filter(|&col| col < current_column)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn point(month: u32, value: f64) -> MonthPoint {
        MonthPoint::new(month, value)
    }

    #[test]
    fn year_column_exact_then_rightmost() {
        let grid = Grid::from_strings([vec!["Сар", "2023", "2024", "2025", "Өөрчлөлт"]]);
        let header = grid.row(0);
        assert_eq!(pick_year_column(header, Some("2024")), Some(2));
        assert_eq!(pick_year_column(header, Some("2026")), Some(3));
        assert_eq!(pick_year_column(header, None), Some(3));
        assert_eq!(pick_year_column(&[], Some("2025")), None);
    }

    #[test]
    fn last_active_months_skip_leading_zeros() {
        let points = vec![
            point(1, 0.0),
            point(2, -4.0),
            point(3, 10.0),
            point(4, 11.0),
            point(5, 12.0),
            point(6, 13.0),
            point(7, 14.0),
            point(8, 15.0),
            point(9, 16.0),
        ];
        let picked = pick_last_n_active_months(points, 4);
        let months: Vec<u32> = picked.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![6, 7, 8, 9]);
    }

    #[test]
    fn last_active_months_never_pad() {
        let picked = pick_last_n_active_months(vec![point(1, 5.0), point(2, 0.0)], 4);
        assert_eq!(picked, vec![point(1, 5.0)]);
        assert!(pick_last_n_active_months(Vec::new(), 3).is_empty());
    }

    #[test]
    fn last_week_columns_keep_order() {
        assert_eq!(pick_last_n_week_columns(&[2, 3, 5, 8, 9], 3), vec![5, 8, 9]);
        assert_eq!(pick_last_n_week_columns(&[2, 3], 4), vec![2, 3]);
        assert!(pick_last_n_week_columns(&[2, 3], 0).is_empty());
    }

    #[test]
    fn previous_week_column_is_nearest_left() {
        assert_eq!(pick_previous_week_column(&[1, 3, 6, 7], 6), Some(3));
        assert_eq!(pick_previous_week_column(&[1, 3, 6, 7], 1), None);
        assert_eq!(pick_previous_week_column(&[1, 3], 10), Some(3));
    }
}
