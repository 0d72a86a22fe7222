use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Anchor, ExtractError};
use crate::extract::CategorySpec;
use crate::grid::{cell_date, cell_text, Cell, Grid, EMPTY};
use crate::locate::{find_column_by_header_except, find_row_matching_in, SHEET_HEADER_WINDOW};
use crate::matchers::{normalize_cell, normalize_text, MatchMode};

/// Separators of combined `Category / Subcategory` help-topic cells.
const TOPIC_SEPARATORS: &[char] = &['/', '»', '>'];

/// Occurrences per subcategory, remembering first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCount {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl CategoryCount {
    pub fn increment(&mut self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&mut self, name: &str, n: u64) {
        match self.counts.get_mut(name) {
            Some(count) => *count += n,
            None => {
                self.order.push(name.to_string());
                self.counts.insert(name.to_string(), n);
            }
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order.iter().map(|name| (name.as_str(), self.get(name)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// [CategoryCount]s keyed by category, matched case- and space-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCounts {
    categories: Vec<(String, CategoryCount)>,
    rows_counted: usize,
}

impl CategoryCounts {
    pub fn increment(&mut self, category: &str, subcategory: &str) {
        let key = normalize_text(category);
        let idx = match self.categories.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.categories.push((key, CategoryCount::default()));
                self.categories.len() - 1
            }
        };
        self.categories[idx].1.increment(subcategory);
        self.rows_counted += 1;
    }

    pub fn category(&self, name: &str) -> Option<&CategoryCount> {
        let key = normalize_text(name);
        self.categories
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, count)| count)
    }

    /// Subcategory counts of every category named by `spec`, merged.
    pub fn for_spec(&self, spec: &CategorySpec) -> CategoryCount {
        let mut merged = CategoryCount::default();
        let mut used: Vec<String> = Vec::new();
        for name in spec.names() {
            let key = normalize_text(name);
            if used.contains(&key) {
                continue;
            }
            if let Some(count) = self.category(&key) {
                for (sub, n) in count.iter() {
                    merged.add(sub, n);
                }
            }
            used.push(key);
        }
        merged
    }

    pub fn rows_counted(&self) -> usize {
        self.rows_counted
    }

    pub fn is_empty(&self) -> bool {
        self.rows_counted == 0
    }
}

/// Header names the ticket export uses for each field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketHeaders {
    pub company: Vec<String>,
    pub category: Vec<String>,
    pub subcategory: Vec<String>,
    pub date: Vec<String>,
}

impl Default for TicketHeaders {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            company: owned(&["Компани", "Байгууллага", "Company", "Organization"]),
            category: owned(&["Ангилал", "Category", "Help Topic", "Төрөл"]),
            subcategory: owned(&["Дэд ангилал", "Subcategory", "Sub category", "Subject"]),
            date: owned(&[
                "Нээсэн огноо",
                "Хаасан огноо",
                "Created",
                "Create Date",
                "Closed",
                "Огноо",
                "Date",
            ]),
        }
    }
}

/// Located ticket table columns. Without a subcategory column the category
/// cell is read as a combined `Category / Subcategory` topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketColumns {
    pub header_row: usize,
    pub category: usize,
    pub subcategory: Option<usize>,
    pub company: Option<usize>,
    pub date: Option<usize>,
}

/// Find the ticket header row and its columns. Category is required; the
/// others are optional here. Callers that filter by company must check for
/// the company column themselves.
pub fn locate_ticket_columns(
    grid: &Grid,
    sheet: &str,
    headers: &TicketHeaders,
) -> Result<TicketColumns, ExtractError> {
    let missing_category = || {
        let name = headers.category.first().cloned().unwrap_or_default();
        ExtractError::missing_anchor(Anchor::Column(name), sheet)
    };
    let header_row = find_row_matching_in(grid, 0..SHEET_HEADER_WINDOW, |row| {
        find_column_by_header_except(row, &headers.category, &[]).is_some()
    })
    .ok_or_else(missing_category)?;
    let row = grid.row(header_row);

    // Subcategory first: its header usually contains the category's.
    let subcategory = find_column_by_header_except(row, &headers.subcategory, &[]);
    let taken: Vec<usize> = subcategory.into_iter().collect();
    let category =
        find_column_by_header_except(row, &headers.category, &taken).ok_or_else(missing_category)?;

    let mut taken = taken;
    taken.push(category);
    let company = find_column_by_header_except(row, &headers.company, &taken);
    taken.extend(company);
    let date = find_column_by_header_except(row, &headers.date, &taken);

    if company.is_none() {
        tracing::debug!(sheet, "no company column");
    }
    if date.is_none() {
        tracing::debug!(sheet, "no date column; period filter disabled");
    }

    Ok(TicketColumns {
        header_row,
        category,
        subcategory,
        company,
        date,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyMatch {
    /// Normalized cell equals one of the names.
    #[default]
    Exact,
    /// Equality, or the cell contains one of the names.
    Loose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyFilter {
    names: Vec<String>,
    mode: CompanyMatch,
}

impl CompanyFilter {
    pub fn new<S: AsRef<str>>(names: &[S], mode: CompanyMatch) -> Self {
        let names = names
            .iter()
            .map(|n| normalize_text(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();
        Self { names, mode }
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        let text = normalize_cell(cell);
        self.names.iter().any(|name| {
            MatchMode::Exact.matches(&text, name)
                || (self.mode == CompanyMatch::Loose && MatchMode::Contains.matches(&text, name))
        })
    }
}

/// Which rows to count and where their fields live.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountQuery<'a> {
    pub company_filter: Option<&'a CompanyFilter>,
    pub company_column: Option<usize>,
    pub category_column: usize,
    pub subcategory_column: Option<usize>,
    pub date_column: Option<usize>,
    /// Inclusive bounds.
    pub period: Option<(NaiveDate, NaiveDate)>,
}

impl<'a> CountQuery<'a> {
    pub fn for_columns(columns: &TicketColumns) -> Self {
        Self {
            company_column: columns.company,
            category_column: columns.category,
            subcategory_column: columns.subcategory,
            date_column: columns.date,
            ..Self::default()
        }
    }
}

fn split_topic(topic: &str) -> Option<(&str, &str)> {
    let (category, sub) = topic.split_once(TOPIC_SEPARATORS)?;
    let (category, sub) = (category.trim(), sub.trim());
    (!category.is_empty() && !sub.is_empty()).then_some((category, sub))
}

fn at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count tickets per (category, subcategory) in a single pass.
///
/// Period filtering applies only when both a date column and a period are
/// given; rows whose date cannot be read are then excluded. The company
/// filter applies only when a company column is known.
pub fn extract_category_counts_for_period<'r, I>(rows: I, query: &CountQuery<'_>) -> CategoryCounts
where
    I: IntoIterator<Item = &'r [Cell]>,
{
    let mut counts = CategoryCounts::default();
    for row in rows {
        if let (Some(col), Some((start, end))) = (query.date_column, query.period) {
            match cell_date(at(row, col)) {
                Some(date) if start <= date && date <= end => {}
                _ => continue,
            }
        }
        if let (Some(filter), Some(col)) = (query.company_filter, query.company_column) {
            if !filter.matches(at(row, col)) {
                continue;
            }
        }

        let category_text = collapse(&cell_text(at(row, query.category_column)));
        match query.subcategory_column {
            Some(col) => {
                let sub = collapse(&cell_text(at(row, col)));
                if category_text.is_empty() || sub.is_empty() {
                    continue;
                }
                counts.increment(&category_text, &sub);
            }
            None => {
                if let Some((category, sub)) = split_topic(&category_text) {
                    counts.increment(category, sub);
                }
            }
        }
    }
    counts
}
