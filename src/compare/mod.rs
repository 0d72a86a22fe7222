//! Joins previous- and current-period counts into ranked delta rows.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::extract::CategoryCount;

/// One subcategory's previous and current counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRow {
    pub name: String,
    pub prev: u64,
    pub curr: u64,
    /// Signed fraction; `0.5` is +50%.
    pub delta: f64,
}

/// Relative change from `prev` to `curr`.
///
/// The base is `prev` when positive, else `curr` when positive, else 1, so a
/// brand-new entry reads as +100% and a zero-to-zero pair as 0.
pub fn delta(prev: f64, curr: f64) -> f64 {
    let base = if prev > 0.0 {
        prev
    } else if curr > 0.0 {
        curr
    } else {
        1.0
    };
    let value = (curr - prev) / base;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One row per name in either map, sorted by `curr` then `prev`, both
/// descending. Remaining ties keep first-seen order: previous-period names
/// first, then names new in the current period.
pub fn join_counts(prev: &CategoryCount, curr: &CategoryCount) -> Vec<TopRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<TopRow> = prev
        .names()
        .chain(curr.names())
        .filter(|name| seen.insert(*name))
        .map(|name| {
            let p = prev.get(name);
            let c = curr.get(name);
            TopRow {
                name: name.to_string(),
                prev: p,
                curr: c,
                delta: delta(p as f64, c as f64),
            }
        })
        .collect();
    // sort_by is stable, which keeps the first-seen order for full ties.
    rows.sort_by(|a, b| match b.curr.cmp(&a.curr) {
        Ordering::Equal => b.prev.cmp(&a.prev),
        other => other,
    });
    rows
}

/// [join_counts] truncated to the first `n` rows.
pub fn top_n(prev: &CategoryCount, curr: &CategoryCount, n: usize) -> Vec<TopRow> {
    let mut rows = join_counts(prev, curr);
    rows.truncate(n);
    rows
}
