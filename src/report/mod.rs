//! Assembles one [ExtractionResult] per configured report.

mod export;

pub use export::{write_outputs, write_result_json, write_top_rows_csv};

use chrono::Datelike;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{AppConfig, ReportConfig};
use crate::error::{Anchor, ExtractError};
use crate::extract::{
    extract_category_counts_for_period, extract_metric_pairs, extract_month_series,
    extract_top_n_by_category, locate_period_columns, locate_ticket_columns, resolve_weekly_series,
    CategoryBreakdown, CategoryCounts, CompanyFilter, CountQuery, MetricRow, MonthSeries,
    MonthSeriesQuery, WeeklySeries, WeeklySource, WeeklyStrategy,
};
use crate::grid::Workbook;
use crate::matchers::{week_range_from_file_name, WeekRange};
use crate::parallel::WorkerPool;

const DAYS_PER_WEEK: i64 = 7;

/// Everything a renderer needs for one report. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub report: String,
    pub company: Option<String>,
    pub prev_week: String,
    pub curr_week: String,
    pub prev_tickets: usize,
    pub curr_tickets: usize,
    pub months: MonthSeries,
    pub weekly: WeeklySeries,
    pub weekly_source: WeeklySource,
    pub top: Vec<CategoryBreakdown>,
    pub metrics: Vec<MetricRow>,
}

/// Workbooks already opened for one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    /// Current-period ticket export.
    pub curr: &'a Workbook,
    /// Previous-period ticket export; without it both periods are cut from
    /// `curr` by date.
    pub prev: Option<&'a Workbook>,
    /// Month and weekly statistics; `curr` when absent.
    pub stats: Option<&'a Workbook>,
    /// Year for week labels that carry none.
    pub default_year: i32,
}

/// A period's label and, when it can be placed on the calendar, its dates.
struct Period {
    week: Option<WeekRange>,
    label: String,
}

impl Period {
    fn label_for(week: Option<WeekRange>, fallback: &Workbook) -> Self {
        let label = match &week {
            Some(w) => w.label(),
            None => fallback
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
        };
        Self { week, label }
    }
}

fn count_tickets(
    workbook: &Workbook,
    config: &ReportConfig,
    filter: Option<&CompanyFilter>,
    periods: &[Option<(chrono::NaiveDate, chrono::NaiveDate)>],
) -> Result<Vec<CategoryCounts>, ExtractError> {
    let sheet = config.ticket_sheet.as_str();
    let grid = workbook.sheet(sheet)?;
    let columns = locate_ticket_columns(grid, sheet, &config.ticket_headers)?;
    if filter.is_some() && columns.company.is_none() {
        let header = config.ticket_headers.company.first().cloned().unwrap_or_default();
        return Err(ExtractError::missing_anchor(Anchor::Column(header), sheet));
    }
    if periods.iter().any(Option::is_some) && columns.date.is_none() {
        return Err(ExtractError::Period(format!(
            "sheet '{sheet}' in {} has no date column to split periods",
            workbook.path().display()
        )));
    }

    let counts = periods
        .iter()
        .map(|&period| {
            let query = CountQuery {
                company_filter: filter,
                period,
                ..CountQuery::for_columns(&columns)
            };
            extract_category_counts_for_period(grid.rows().skip(columns.header_row + 1), &query)
        })
        .collect();
    Ok(counts)
}

/// Build one report from opened workbooks.
///
/// With a previous workbook every ticket row of each workbook is counted.
/// With only one workbook the current week must come from its file name and
/// both weeks are cut from it by date.
pub fn extract_report(
    config: &ReportConfig,
    inputs: &ReportInputs<'_>,
) -> Result<ExtractionResult, ExtractError> {
    let report = config.name.as_str();
    let year = inputs.default_year;
    let curr_week = week_range_from_file_name(inputs.curr.path());
    let prev_week = inputs
        .prev
        .and_then(|wb| week_range_from_file_name(wb.path()))
        .or_else(|| curr_week.as_ref()?.shifted_days(-DAYS_PER_WEEK, year));

    let filter = config.company_filter();
    let (prev_counts, curr_counts) = match inputs.prev {
        Some(prev_wb) => {
            let mut prev = count_tickets(prev_wb, config, filter.as_ref(), &[None])?;
            let mut curr = count_tickets(inputs.curr, config, filter.as_ref(), &[None])?;
            (prev.remove(0), curr.remove(0))
        }
        None => {
            let dates = |week: &Option<WeekRange>| week.as_ref().and_then(|w| w.to_dates(year));
            let (Some(prev_dates), Some(curr_dates)) = (dates(&prev_week), dates(&curr_week)) else {
                return Err(ExtractError::Period(format!(
                    "no week range in file name {} and no previous workbook",
                    inputs.curr.path().display()
                )));
            };
            let mut counts = count_tickets(
                inputs.curr,
                config,
                filter.as_ref(),
                &[Some(prev_dates), Some(curr_dates)],
            )?;
            let curr = counts.remove(1);
            (counts.remove(0), curr)
        }
    };
    tracing::debug!(
        report,
        prev = prev_counts.rows_counted(),
        curr = curr_counts.rows_counted(),
        "tickets counted"
    );

    let prev = Period::label_for(prev_week, inputs.prev.unwrap_or(inputs.curr));
    let curr = Period::label_for(curr_week, inputs.curr);
    let stats = inputs.stats.unwrap_or(inputs.curr);

    let months = match config.month_sheet.as_deref() {
        Some(sheet) => {
            let query = MonthSeriesQuery {
                company: config.month_block.as_deref(),
                year_label: config.year_label.as_deref(),
                take_last: config.take_last_months,
            };
            extract_month_series(stats.sheet(sheet)?, sheet, &query)?
        }
        None => MonthSeries::default(),
    };

    let mut strategies = Vec::with_capacity(2);
    match config.weekly_sheet.as_deref() {
        Some(sheet) => strategies.push(WeeklyStrategy::MultiWeekSheet {
            workbook: stats,
            sheet,
        }),
        None => tracing::info!(
            report,
            strategy = "multi_week_sheet",
            "no weekly sheet configured; skipped"
        ),
    }
    strategies.push(WeeklyStrategy::PeriodPair {
        prev_label: &prev.label,
        curr_label: &curr.label,
        prev: &prev_counts,
        curr: &curr_counts,
    });
    let weekly = resolve_weekly_series(
        &strategies,
        &config.categories,
        config.take_last_weeks,
        report,
    )?;

    let metrics = extract_report_metrics(config, stats, curr.week.as_ref());
    let top = extract_top_n_by_category(
        &prev_counts,
        &curr_counts,
        &config.categories,
        config.top_n,
    );

    Ok(ExtractionResult {
        report: config.name.clone(),
        company: config.company.clone(),
        prev_week: prev.label,
        curr_week: curr.label,
        prev_tickets: prev_counts.rows_counted(),
        curr_tickets: curr_counts.rows_counted(),
        months,
        weekly: weekly.series,
        weekly_source: weekly.source,
        top,
        metrics,
    })
}

/// KPI rows from the weekly sheet. Metrics are optional, so a missing sheet
/// or missing week columns only log.
fn extract_report_metrics(
    config: &ReportConfig,
    stats: &Workbook,
    curr_week: Option<&WeekRange>,
) -> Vec<MetricRow> {
    if config.metrics.is_empty() {
        return Vec::new();
    }
    let Some(sheet) = config.weekly_sheet.as_deref() else {
        tracing::warn!(report = %config.name, "metrics configured without a weekly sheet; skipped");
        return Vec::new();
    };
    let grid = match stats.sheet(sheet) {
        Ok(grid) => grid,
        Err(err) => {
            tracing::warn!(report = %config.name, error = %err, "metrics skipped");
            return Vec::new();
        }
    };
    match locate_period_columns(grid, curr_week) {
        Some(columns) => extract_metric_pairs(grid, &config.metrics, columns),
        None => {
            tracing::warn!(report = %config.name, sheet, "no week columns for metrics; skipped");
            Vec::new()
        }
    }
}

/// Open the report's workbooks and extract it.
pub fn run_report(config: &ReportConfig) -> Result<ExtractionResult, ExtractError> {
    let curr = Workbook::open(&config.curr_workbook)?;
    let prev = config.prev_workbook.as_ref().map(Workbook::open).transpose()?;
    let stats = config.stats_workbook.as_ref().map(Workbook::open).transpose()?;
    let default_year = config
        .label_year()
        .unwrap_or_else(|| chrono::Utc::now().year());

    let inputs = ReportInputs {
        curr: &curr,
        prev: prev.as_ref(),
        stats: stats.as_ref(),
        default_year,
    };
    let result = extract_report(config, &inputs);
    match &result {
        Ok(r) => tracing::info!(
            report = %config.name,
            weekly_source = r.weekly_source.as_str(),
            "report extracted"
        ),
        Err(err) => tracing::error!(report = %config.name, error = %err, "report failed"),
    }
    result
}

/// Run every report on the configured worker pool. Output keeps config order.
pub fn run_reports(config: &AppConfig) -> Vec<(String, Result<ExtractionResult, ExtractError>)> {
    WorkerPool::with_workers(config.workers).install(|| {
        config
            .reports
            .par_iter()
            .map(|report| (report.name.clone(), run_report(report)))
            .collect()
    })
}
