//! Searches over a [Grid] for labeled anchors.
//!
//! Locators return `None` (or an empty list) when nothing matches and never
//! fail; deciding whether an absent anchor is fatal is left to the extractors.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::ops::Range;

use crate::grid::{Cell, Grid};
use crate::matchers::{
    is_four_digit_year, normalize_cell, normalize_text, parse_week_range, MatchMode, WeekRange,
};

/// Rows searched for a year header when no company block scopes the search.
pub const SHEET_HEADER_WINDOW: usize = 30;
/// Rows below a company name searched for that block's year header.
pub const COMPANY_HEADER_WINDOW: usize = 8;

/// First row index whose cells satisfy `predicate`.
pub fn find_row_matching<F>(grid: &Grid, predicate: F) -> Option<usize>
where
    F: Fn(&[Cell]) -> bool,
{
    find_row_matching_in(grid, 0..grid.height(), predicate)
}

pub fn find_row_matching_in<F>(grid: &Grid, rows: Range<usize>, predicate: F) -> Option<usize>
where
    F: Fn(&[Cell]) -> bool,
{
    let end = rows.end.min(grid.height());
    (rows.start..end).find(|&r| predicate(grid.row(r)))
}

/// First row inside `window` holding a 4-digit year cell.
pub fn find_header_row_with_year(grid: &Grid, window: Range<usize>) -> Option<usize> {
    find_row_matching_in(grid, window, |row| row.iter().any(is_four_digit_year))
}

/// Column whose trimmed text equals `label` exactly.
pub fn find_column_by_exact_label(row: &[Cell], label: &str) -> Option<usize> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    row.iter()
        .position(|cell| crate::grid::cell_text(cell) == label)
}

/// Column whose header matches any synonym: normalized equality first, then
/// containment.
pub fn find_column_by_header<S: AsRef<str>>(row: &[Cell], synonyms: &[S]) -> Option<usize> {
    find_column_by_header_except(row, synonyms, &[])
}

/// [find_column_by_header] ignoring columns already claimed by another field.
pub fn find_column_by_header_except<S: AsRef<str>>(
    row: &[Cell],
    synonyms: &[S],
    taken: &[usize],
) -> Option<usize> {
    let wanted: Vec<String> = synonyms.iter().map(|s| normalize_text(s.as_ref())).collect();
    let headers: Vec<String> = row.iter().map(normalize_cell).collect();
    [MatchMode::Exact, MatchMode::Contains].into_iter().find_map(|mode| {
        headers.iter().enumerate().find_map(|(col, header)| {
            let hit = !taken.contains(&col) && wanted.iter().any(|w| mode.matches(header, w));
            hit.then_some(col)
        })
    })
}

/// First row inside `window` where every synonym group matches some cell.
pub fn find_header_row<S: AsRef<str>>(
    grid: &Grid,
    groups: &[&[S]],
    window: Range<usize>,
) -> Option<usize> {
    find_row_matching_in(grid, window, |row| {
        groups
            .iter()
            .all(|synonyms| find_column_by_header(row, synonyms).is_some())
    })
}

/// Every column holding at least one week-range label, in any row.
pub fn find_all_week_columns(grid: &Grid) -> Vec<usize> {
    let mut columns = BTreeSet::new();
    for row in grid.rows() {
        for (col, cell) in row.iter().enumerate() {
            if parse_week_range(cell).is_some() {
                columns.insert(col);
            }
        }
    }
    columns.into_iter().collect()
}

/// Week labels found in one column, top to bottom.
pub fn week_labels_in_column(grid: &Grid, col: usize) -> Vec<WeekRange> {
    grid.column(col).filter_map(parse_week_range).collect()
}

/// First label text of a week column, used as its display label.
pub fn week_column_label(grid: &Grid, col: usize) -> Option<String> {
    week_labels_in_column(grid, col)
        .into_iter()
        .next()
        .map(|w| w.raw)
}

/// Row holding a cell named like one of `names`, limited to `columns` when
/// given. Exact matches anywhere win over prefix matches, which win over
/// containment, so `Гомдол` finds the `Гомдол` row before `Нийт гомдол`.
pub fn find_row_by_cell_name<'g, S: AsRef<str>>(
    grid: &'g Grid,
    names: &[S],
    columns: Option<Range<usize>>,
) -> Option<&'g [Cell]> {
    find_row_index_by_cell_name(grid, names, 0..grid.height(), columns).map(|r| grid.row(r))
}

pub fn find_row_index_by_cell_name<S: AsRef<str>>(
    grid: &Grid,
    names: &[S],
    rows: Range<usize>,
    columns: Option<Range<usize>>,
) -> Option<usize> {
    let wanted: Vec<String> = names
        .iter()
        .map(|n| normalize_text(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect();
    if wanted.is_empty() {
        return None;
    }
    let end = rows.end.min(grid.height());
    let rows = rows.start..end;

    MatchMode::TIERS.into_iter().find_map(|mode| {
        rows.clone().find(|&r| {
            let row = grid.row(r);
            let cells = match &columns {
                Some(cols) => {
                    let hi = cols.end.min(row.len());
                    &row[cols.start.min(hi)..hi]
                }
                None => row,
            };
            cells.iter().any(|cell| {
                let text = normalize_cell(cell);
                wanted.iter().any(|w| mode.matches(&text, w))
            })
        })
    })
}

/// Week column labelled closest to `target`.
///
/// Each column is scored by the best of its labels: end-date distance, then
/// start-date distance; ties go to the rightmost column. A column within
/// one day of the target's end is returned; otherwise the rightmost week
/// column is taken as the most recent available week.
pub fn find_closest_week_column(grid: &Grid, target: &WeekRange) -> Option<usize> {
    let columns = find_all_week_columns(grid);
    let best = columns
        .iter()
        .filter_map(|&col| {
            week_labels_in_column(grid, col)
                .iter()
                .map(|w| (w.end_distance_days(target), w.start_distance_days(target)))
                .min()
                .map(|(end, start)| (end, start, Reverse(col)))
        })
        .min();

    match best {
        Some((_, _, Reverse(col)))
            if week_labels_in_column(grid, col)
                .iter()
                .any(|w| w.is_close_to(target)) =>
        {
            Some(col)
        }
        _ => {
            let fallback = columns.last().copied();
            if let Some(col) = fallback {
                tracing::debug!(
                    target_week = %target,
                    column = col,
                    "no week column within tolerance; using rightmost week column"
                );
            }
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::parse_week_range_str;

    fn week(text: &str) -> WeekRange {
        parse_week_range_str(text).expect("valid week label")
    }

    #[test]
    fn row_matching_respects_window() {
        let grid = Grid::from_strings([vec!["x"], vec!["2024"], vec!["2025"]]);
        assert_eq!(find_header_row_with_year(&grid, 0..30), Some(1));
        assert_eq!(find_header_row_with_year(&grid, 2..30), Some(2));
        assert_eq!(find_header_row_with_year(&grid, 0..1), None);
        assert_eq!(find_row_matching(&grid, |row| row.is_empty()), None);
    }

    #[test]
    fn exact_label_column() {
        let grid = Grid::from_strings([vec!["", "2024", " 2025 ", "2025 он"]]);
        assert_eq!(find_column_by_exact_label(grid.row(0), "2025"), Some(2));
        assert_eq!(find_column_by_exact_label(grid.row(0), "2026"), None);
        assert_eq!(find_column_by_exact_label(grid.row(0), ""), None);
    }

    #[test]
    fn header_synonyms_prefer_exact() {
        let grid = Grid::from_strings([vec!["Company name", "Компани", "Огноо"]]);
        assert_eq!(find_column_by_header(grid.row(0), &["компани", "company"]), Some(1));
        assert_eq!(find_column_by_header(grid.row(0), &["company"]), Some(0));
        assert_eq!(find_column_by_header(grid.row(0), &["ангилал"]), None);
    }

    #[test]
    fn header_row_requires_every_group() {
        let grid = Grid::from_strings([
            vec!["Тайлан"],
            vec!["Ангилал", "Огноо"],
            vec!["Ангилал", "Дэд ангилал", "Огноо"],
        ]);
        let category: &[&str] = &["ангилал"];
        let sub: &[&str] = &["дэд ангилал"];
        assert_eq!(find_header_row(&grid, &[category], 0..10), Some(1));
        assert_eq!(find_header_row(&grid, &[category, sub], 0..10), Some(2));
    }

    #[test]
    fn week_columns_found_in_any_row() {
        let grid = Grid::from_strings([
            vec!["", "07.21-07.27", "", ""],
            vec!["Лавлагаа", "10", "12", "07.28-08.03"],
            vec!["", "", "9/08 - 9/14", ""],
        ]);
        assert_eq!(find_all_week_columns(&grid), vec![1, 2, 3]);
        assert_eq!(week_column_label(&grid, 2).as_deref(), Some("9/08 - 9/14"));
        assert!(find_all_week_columns(&Grid::default()).is_empty());
    }

    #[test]
    fn cell_name_tiers_prefer_exact_rows() {
        let grid = Grid::from_strings([
            vec!["Нийт гомдол", "3"],
            vec!["Гомдол шийдвэрлэлт", "4"],
            vec!["  гомдол ", "5"],
        ]);
        assert_eq!(find_row_index_by_cell_name(&grid, &["Гомдол"], 0..10, None), Some(2));
        let prefix_only = Grid::from_strings([vec!["Нийт гомдол"], vec!["Гомдол шийдвэрлэлт"]]);
        assert_eq!(
            find_row_index_by_cell_name(&prefix_only, &["Гомдол"], 0..10, None),
            Some(1)
        );
        let row = find_row_by_cell_name(&grid, &["гомдол"], None).expect("row");
        assert_eq!(row[1], Cell::Number(5.0));
    }

    #[test]
    fn cell_name_respects_column_limit() {
        let grid = Grid::from_strings([vec!["x", "Лавлагаа"], vec!["Лавлагаа", "y"]]);
        assert_eq!(find_row_index_by_cell_name(&grid, &["лавлагаа"], 0..9, Some(0..1)), Some(1));
        assert_eq!(find_row_index_by_cell_name(&grid, &["лавлагаа"], 0..9, Some(5..9)), None);
        assert_eq!(find_row_index_by_cell_name(&grid, &[""], 0..9, None), None);
    }

    #[test]
    fn closest_week_column_within_tolerance() {
        let grid = Grid::from_strings([vec![
            "",
            "07.14-07.20",
            "07.21-07.27",
            "07.28-08.03",
            "08.04-08.10",
        ]]);
        assert_eq!(find_closest_week_column(&grid, &week("07.28-08.04")), Some(3));
        assert_eq!(find_closest_week_column(&grid, &week("07.21-07.26")), Some(2));
    }

    #[test]
    fn closest_week_column_falls_back_to_rightmost() {
        let grid = Grid::from_strings([vec!["07.14-07.20", "07.21-07.27"]]);
        assert_eq!(find_closest_week_column(&grid, &week("09.01-09.07")), Some(1));
        assert_eq!(find_closest_week_column(&Grid::default(), &week("09.01-09.07")), None);
    }

    #[test]
    fn closest_week_column_is_deterministic_on_ties() {
        // Same label in two columns: the rightmost wins every time.
        let grid = Grid::from_strings([vec!["07.28-08.03", "x", "07.28-08.03"]]);
        for _ in 0..5 {
            assert_eq!(find_closest_week_column(&grid, &week("07.28-08.03")), Some(2));
        }
    }
}
