use serde::Serialize;

use crate::error::ExtractError;
use crate::extract::{
    extract_weekly_category_series, CategoryCounts, CategorySeries, CategorySpec, WeeklySeries,
};
use crate::grid::Workbook;

/// Which strategy produced a report's weekly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklySource {
    MultiWeekSheet,
    PeriodPair,
}

impl WeeklySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiWeekSheet => "multi_week_sheet",
            Self::PeriodPair => "period_pair",
        }
    }
}

/// One way of building the weekly series, tried in list order.
#[derive(Debug, Clone, Copy)]
pub enum WeeklyStrategy<'a> {
    /// Week-range columns of a statistics sheet, one row per category.
    MultiWeekSheet { workbook: &'a Workbook, sheet: &'a str },
    /// Two points built from the previous and current ticket counts.
    /// Never fails.
    PeriodPair {
        prev_label: &'a str,
        curr_label: &'a str,
        prev: &'a CategoryCounts,
        curr: &'a CategoryCounts,
    },
}

impl WeeklyStrategy<'_> {
    pub fn source(&self) -> WeeklySource {
        match self {
            Self::MultiWeekSheet { .. } => WeeklySource::MultiWeekSheet,
            Self::PeriodPair { .. } => WeeklySource::PeriodPair,
        }
    }

    fn run(
        &self,
        categories: &[CategorySpec],
        take_last: usize,
    ) -> Result<WeeklySeries, ExtractError> {
        match *self {
            Self::MultiWeekSheet { workbook, sheet } => {
                let grid = workbook.sheet(sheet)?;
                extract_weekly_category_series(grid, sheet, categories, take_last)
            }
            Self::PeriodPair {
                prev_label,
                curr_label,
                prev,
                curr,
            } => Ok(period_pair_series(prev_label, curr_label, prev, curr, categories)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyOutcome {
    pub series: WeeklySeries,
    pub source: WeeklySource,
}

fn period_pair_series(
    prev_label: &str,
    curr_label: &str,
    prev: &CategoryCounts,
    curr: &CategoryCounts,
    categories: &[CategorySpec],
) -> WeeklySeries {
    let series = categories
        .iter()
        .map(|spec| CategorySeries {
            category: spec.label.clone(),
            data: vec![
                prev.for_spec(spec).total() as f64,
                curr.for_spec(spec).total() as f64,
            ],
        })
        .collect();
    WeeklySeries {
        labels: vec![prev_label.to_string(), curr_label.to_string()],
        series,
    }
}

/// Run `strategies` in order and keep the first that succeeds.
///
/// Each attempt is logged with the report name and strategy. When every
/// strategy fails the last error is returned.
pub fn resolve_weekly_series(
    strategies: &[WeeklyStrategy<'_>],
    categories: &[CategorySpec],
    take_last: usize,
    report: &str,
) -> Result<WeeklyOutcome, ExtractError> {
    let mut last_err = None;
    for strategy in strategies {
        let source = strategy.source();
        match strategy.run(categories, take_last) {
            Ok(series) => {
                tracing::info!(
                    report,
                    strategy = source.as_str(),
                    weeks = series.labels.len(),
                    "weekly series resolved"
                );
                return Ok(WeeklyOutcome { series, source });
            }
            Err(err) => {
                tracing::warn!(
                    report,
                    strategy = source.as_str(),
                    error = %err,
                    "weekly strategy failed; trying next"
                );
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        ExtractError::Period(format!("no weekly series strategy available for report '{report}'"))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn counts(entries: &[(&str, &str, usize)]) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for (category, sub, n) in entries {
            for _ in 0..*n {
                counts.increment(category, sub);
            }
        }
        counts
    }

    fn stats_workbook() -> Workbook {
        let arb = Grid::from_strings([
            vec!["Ангилал", "07.21-07.27", "07.28-08.03"],
            vec!["Лавлагаа", "3", "4"],
            vec!["Үйлчилгээ", "30", "40"],
            vec!["Гомдол", "0", "2"],
        ]);
        Workbook::from_sheets("stats.xlsx", vec![("ARB".to_string(), arb)])
    }

    #[test]
    fn multi_week_sheet_wins_when_present() {
        let workbook = stats_workbook();
        let prev = CategoryCounts::default();
        let curr = CategoryCounts::default();
        let strategies = [
            WeeklyStrategy::MultiWeekSheet {
                workbook: &workbook,
                sheet: "ARB",
            },
            WeeklyStrategy::PeriodPair {
                prev_label: "07.21-07.27",
                curr_label: "07.28-08.03",
                prev: &prev,
                curr: &curr,
            },
        ];
        let outcome = resolve_weekly_series(&strategies, &CategorySpec::defaults(), 4, "arb")
            .expect("weekly");
        assert_eq!(outcome.source, WeeklySource::MultiWeekSheet);
        assert_eq!(outcome.series.series[1].data, vec![30.0, 40.0]);
    }

    #[test]
    fn missing_sheet_falls_back_to_period_pair() {
        let workbook = stats_workbook();
        let prev = counts(&[("Лавлагаа", "Нууц код сэргээх", 2), ("Гомдол", "Удаан", 1)]);
        let curr = counts(&[("Лавлагаа", "Нууц код сэргээх", 5), ("Inquiry", "Other", 1)]);
        let strategies = [
            WeeklyStrategy::MultiWeekSheet {
                workbook: &workbook,
                sheet: "Golomt",
            },
            WeeklyStrategy::PeriodPair {
                prev_label: "07.21-07.27",
                curr_label: "07.28-08.03",
                prev: &prev,
                curr: &curr,
            },
        ];
        let outcome = resolve_weekly_series(&strategies, &CategorySpec::defaults(), 4, "golomt")
            .expect("fallback never fails");
        assert_eq!(outcome.source, WeeklySource::PeriodPair);
        assert_eq!(outcome.series.labels, vec!["07.21-07.27", "07.28-08.03"]);
        assert_eq!(outcome.series.series[0].data, vec![2.0, 6.0], "synonyms merged");
        assert_eq!(outcome.series.series[1].data, vec![0.0, 0.0]);
        assert_eq!(outcome.series.series[2].data, vec![1.0, 0.0]);
    }

    #[test]
    fn last_error_is_returned_when_everything_fails() {
        let workbook = stats_workbook();
        let strategies = [WeeklyStrategy::MultiWeekSheet {
            workbook: &workbook,
            sheet: "Missing",
        }];
        let err = resolve_weekly_series(&strategies, &CategorySpec::defaults(), 4, "arb")
            .unwrap_err();
        assert!(matches!(err, ExtractError::MissingSheet { .. }), "{err}");

        let err = resolve_weekly_series(&[], &CategorySpec::defaults(), 4, "arb").unwrap_err();
        assert!(err.to_string().contains("'arb'"), "{err}");
    }

    #[test]
    fn source_serializes_in_snake_case() {
        let json = serde_json::to_string(&WeeklySource::PeriodPair).expect("json");
        assert_eq!(json, "\"period_pair\"");
        assert_eq!(WeeklySource::MultiWeekSheet.as_str(), "multi_week_sheet");
    }
}
