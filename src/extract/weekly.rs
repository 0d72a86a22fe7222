use serde::Serialize;

use crate::error::{Anchor, ExtractError};
use crate::extract::CategorySpec;
use crate::grid::Grid;
use crate::locate::{find_all_week_columns, find_row_index_by_cell_name, week_column_label};
use crate::matchers::parse_amount;
use crate::pick::pick_last_n_week_columns;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub category: String,
    pub data: Vec<f64>,
}

/// Per-category values for consecutive weeks, oldest first. Every
/// `series[i].data` has one entry per label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklySeries {
    pub labels: Vec<String>,
    pub series: Vec<CategorySeries>,
}

/// Last `take_last` weeks of every category row in a multi-week sheet.
///
/// Fails when the sheet has no week columns or a category row is missing;
/// the error names the category.
pub fn extract_weekly_category_series(
    grid: &Grid,
    sheet: &str,
    categories: &[CategorySpec],
    take_last: usize,
) -> Result<WeeklySeries, ExtractError> {
    let week_columns = find_all_week_columns(grid);
    if week_columns.is_empty() {
        return Err(ExtractError::missing_anchor(Anchor::WeekColumns, sheet));
    }
    let columns = pick_last_n_week_columns(&week_columns, take_last);
    let labels = columns
        .iter()
        .map(|&col| week_column_label(grid, col).unwrap_or_default())
        .collect();

    let series = categories
        .iter()
        .map(|spec| {
            let row = find_row_index_by_cell_name(grid, &spec.names(), 0..grid.height(), None)
                .ok_or_else(|| {
                    ExtractError::missing_anchor(Anchor::CategoryRow(spec.label.clone()), sheet)
                })?;
            let data = columns
                .iter()
                .map(|&col| parse_amount(grid.cell(row, col)))
                .collect();
            Ok(CategorySeries {
                category: spec.label.clone(),
                data,
            })
        })
        .collect::<Result<Vec<_>, ExtractError>>()?;

    Ok(WeeklySeries { labels, series })
}
