//! Extractors composed from locators and pickers.
//!
//! Extractors are the only layer that raises [ExtractError](crate::ExtractError):
//! they know which anchors are required. Optional structure that is missing
//! yields empty results instead.

mod fallback;
mod metrics;
mod month;
mod tickets;
mod weekly;

pub use fallback::{resolve_weekly_series, WeeklyOutcome, WeeklySource, WeeklyStrategy};
pub use metrics::{
    extract_metric_pairs, locate_period_columns, MetricKind, MetricRow, MetricSpec,
    PeriodColumns,
};
pub use month::{extract_month_series, MonthPoint, MonthSeries, MonthSeriesQuery};
pub use tickets::{
    extract_category_counts_for_period, locate_ticket_columns, CategoryCount, CategoryCounts,
    CompanyFilter, CompanyMatch, CountQuery, TicketColumns, TicketHeaders,
};
pub use weekly::{extract_weekly_category_series, CategorySeries, WeeklySeries};

use serde::{Deserialize, Serialize};

use crate::compare::{top_n, TopRow};

/// A ticket category and the labels it goes by in different sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub label: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl CategorySpec {
    pub fn new(label: &str, synonyms: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Label followed by synonyms.
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.label.as_str())
            .chain(self.synonyms.iter().map(String::as_str))
            .collect()
    }

    /// Лавлагаа / Үйлчилгээ / Гомдол (inquiry, service, complaint).
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Лавлагаа", &["Inquiry", "Лавлагаа мэдээлэл"]),
            Self::new("Үйлчилгээ", &["Service", "Хүсэлт"]),
            Self::new("Гомдол", &["Complaint", "Гомдол санал"]),
        ]
    }
}

/// Ranked subcategories of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub rows: Vec<TopRow>,
}

/// Top `n` subcategories per category, previous vs current period.
pub fn extract_top_n_by_category(
    prev: &CategoryCounts,
    curr: &CategoryCounts,
    categories: &[CategorySpec],
    n: usize,
) -> Vec<CategoryBreakdown> {
    categories
        .iter()
        .map(|spec| CategoryBreakdown {
            category: spec.label.clone(),
            rows: top_n(&prev.for_spec(spec), &curr.for_spec(spec), n),
        })
        .collect()
}
