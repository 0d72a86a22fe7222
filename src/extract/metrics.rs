use serde::{Deserialize, Serialize};

use crate::compare::delta;
use crate::grid::{Cell, Grid};
use crate::locate::{find_all_week_columns, find_closest_week_column, find_row_index_by_cell_name};
use crate::matchers::{parse_amount, parse_percent, WeekRange};
use crate::pick::pick_previous_week_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    Amount,
    /// Stored as a fraction; `"85%"` reads as `0.85`.
    Percent,
}

impl MetricKind {
    fn read(self, cell: &Cell) -> f64 {
        match self {
            Self::Amount => parse_amount(cell),
            Self::Percent => parse_percent(cell),
        }
    }
}

/// A labeled KPI row, e.g. answered calls or service level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub label: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub kind: MetricKind,
}

impl MetricSpec {
    pub fn new(label: &str, kind: MetricKind) -> Self {
        Self {
            label: label.to_string(),
            synonyms: Vec::new(),
            kind,
        }
    }

    fn names(&self) -> Vec<&str> {
        std::iter::once(self.label.as_str())
            .chain(self.synonyms.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: String,
    pub kind: MetricKind,
    pub prev: f64,
    pub curr: f64,
    pub delta: f64,
}

/// Week columns holding the current period and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodColumns {
    pub prev: Option<usize>,
    pub curr: usize,
}

/// Current column closest to `current` (the last week column when no period
/// is known) and the nearest week column to its left.
pub fn locate_period_columns(grid: &Grid, current: Option<&WeekRange>) -> Option<PeriodColumns> {
    let week_columns = find_all_week_columns(grid);
    let curr = match current {
        Some(target) => find_closest_week_column(grid, target)?,
        None => *week_columns.last()?,
    };
    let prev = pick_previous_week_column(&week_columns, curr);
    Some(PeriodColumns { prev, curr })
}

/// Previous and current values of every metric whose row can be found left
/// of the current column. Missing rows are skipped.
pub fn extract_metric_pairs(
    grid: &Grid,
    metrics: &[MetricSpec],
    columns: PeriodColumns,
) -> Vec<MetricRow> {
    metrics
        .iter()
        .filter_map(|spec| {
            let names = spec.names();
            let Some(row) =
                find_row_index_by_cell_name(grid, &names, 0..grid.height(), Some(0..columns.curr))
            else {
                tracing::warn!(metric = %spec.label, "metric row not found; skipped");
                return None;
            };
            let curr = spec.kind.read(grid.cell(row, columns.curr));
            let prev = columns
                .prev
                .map(|col| spec.kind.read(grid.cell(row, col)))
                .unwrap_or(0.0);
            Some(MetricRow {
                label: spec.label.clone(),
                kind: spec.kind,
                prev,
                curr,
                delta: delta(prev, curr),
            })
        })
        .collect()
}
