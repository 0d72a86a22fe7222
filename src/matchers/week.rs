use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::grid::Cell;

/// Year used to place year-less dates on a calendar. Leap, so 02.29 is valid.
const NOTIONAL_YEAR: i32 = 2024;

/// Tolerance for treating two independently typed week labels as the same week.
pub const CLOSE_WEEK_TOLERANCE_DAYS: i64 = 1;

/// Most days between start and end accepted for a day-first label.
const MAX_DAY_FIRST_SPAN_DAYS: i64 = 13;

/// `2025-07-28 - 2025-08-03`, `2025.07.28-08.03`
static YEAR_FIRST_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:^|\D)(\d{4})[-./](\d{1,2})[-./](\d{1,2})",
        r"\s*[-–—]\s*",
        r"(?:(\d{4})[-./])?(\d{1,2})[-./](\d{1,2})(?:\D|$)",
    ))
    .expect("valid year-first week regex")
});

/// `07.28-08.03`, `9/08 - 9/14`, `07.28.2025-08.03.2025`
static SHORT_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:^|[^\d./])(\d{1,2})[./](\d{1,2})(?:[./](\d{4}))?",
        r"\s*[-–—]\s*",
        r"(\d{1,2})[./](\d{1,2})(?:[./](\d{4}))?(?:[^\d./]|$)",
    ))
    .expect("valid short week regex")
});

/// `07-28 - 08-03`: dash inside the dates, so the range dash needs spaces.
static DASHED_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2})-(\d{1,2})\s+[-–—]\s+(\d{1,2})-(\d{1,2})(?:\D|$)")
        .expect("valid dashed week regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        // Validate against a leap year so 02.29 survives.
        NaiveDate::from_ymd_opt(NOTIONAL_YEAR, month, day)?;
        Some(Self { month, day })
    }

    fn in_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.month, self.day)
    }
}

/// A parsed "start–end" reporting-week label.
///
/// `year` is the year of the end date when the label carries one. A start
/// later than the end is only accepted for weeks that cross New Year
/// (December start, January end).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRange {
    pub start: MonthDay,
    pub end: MonthDay,
    pub year: Option<i32>,
    pub raw: String,
}

impl WeekRange {
    fn build(start: MonthDay, end: MonthDay, year: Option<i32>, raw: &str) -> Option<Self> {
        if start > end && !(start.month == 12 && end.month == 1) {
            return None;
        }
        if let Some(y) = year {
            end.in_year(y)?;
        }
        Some(Self {
            start,
            end,
            year,
            raw: raw.trim().to_string(),
        })
    }

    /// Canonical `MM.DD-MM.DD` form, independent of how the label was typed.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    pub fn crosses_year(&self) -> bool {
        self.start > self.end
    }

    /// Inclusive calendar dates, using `default_year` when the label has none.
    pub fn to_dates(&self, default_year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let end_year = self.year.unwrap_or(default_year);
        let end = self.end.in_year(end_year)?;
        let start_year = if self.crosses_year() { end_year - 1 } else { end_year };
        let start = self.start.in_year(start_year)?;
        Some((start, end))
    }

    /// The same week moved by `days` (negative = earlier). Keeps the year when
    /// the label had one.
    pub fn shifted_days(&self, days: i64, default_year: i32) -> Option<Self> {
        let (start, end) = self.to_dates(default_year)?;
        let shift = |date: NaiveDate| {
            if days >= 0 {
                date.checked_add_days(Days::new(days.unsigned_abs()))
            } else {
                date.checked_sub_days(Days::new(days.unsigned_abs()))
            }
        };
        let (start, end) = (shift(start)?, shift(end)?);
        let start_md = MonthDay::new(start.month(), start.day())?;
        let end_md = MonthDay::new(end.month(), end.day())?;
        Some(Self {
            start: start_md,
            end: end_md,
            year: self.year.map(|_| end.year()),
            raw: format!("{start_md}-{end_md}"),
        })
    }

    /// Days between the two end dates. Exact when both labels carry a year;
    /// otherwise measured on a notional leap year with wrap-around so that
    /// 12.31 and 01.01 are one day apart.
    pub fn end_distance_days(&self, other: &WeekRange) -> i64 {
        distance(self.end, self.year, other.end, other.year)
    }

    pub fn start_distance_days(&self, other: &WeekRange) -> i64 {
        let start_year = |w: &WeekRange| w.year.map(|y| if w.crosses_year() { y - 1 } else { y });
        distance(self.start, start_year(self), other.start, start_year(other))
    }

    /// Labels whose end dates differ by at most one day denote the same week.
    pub fn is_close_to(&self, other: &WeekRange) -> bool {
        self.end_distance_days(other) <= CLOSE_WEEK_TOLERANCE_DAYS
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn distance(a: MonthDay, a_year: Option<i32>, b: MonthDay, b_year: Option<i32>) -> i64 {
    if let (Some(ya), Some(yb)) = (a_year, b_year) {
        if let (Some(da), Some(db)) = (a.in_year(ya), b.in_year(yb)) {
            return (da - db).num_days().abs();
        }
    }
    let ordinal = |md: MonthDay| {
        md.in_year(NOTIONAL_YEAR)
            .map(|d| i64::from(d.ordinal()))
            .unwrap_or(0)
    };
    let diff = (ordinal(a) - ordinal(b)).abs();
    diff.min(366 - diff)
}

fn num(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn year(caps: &Captures<'_>, idx: usize) -> Option<i32> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Year of a range's end when only the start date carried one.
fn end_year_from_start(start: MonthDay, end: MonthDay, start_year: i32) -> i32 {
    if start > end {
        start_year + 1
    } else {
        start_year
    }
}

/// A day-first reading is only taken when it spans a plausible reporting week.
fn is_week_span(range: &WeekRange) -> bool {
    range
        .to_dates(NOTIONAL_YEAR)
        .is_some_and(|(start, end)| (end - start).num_days() <= MAX_DAY_FIRST_SPAN_DAYS)
}

fn short_range(
    caps: &Captures<'_>,
    (start_idx, end_idx): ((usize, usize), (usize, usize)),
    text: &str,
) -> Option<WeekRange> {
    let start = MonthDay::new(num(caps, start_idx.0)?, num(caps, start_idx.1)?)?;
    let end = MonthDay::new(num(caps, end_idx.0)?, num(caps, end_idx.1)?)?;
    let end_year = year(caps, 6)
        .or_else(|| year(caps, 3).map(|y| end_year_from_start(start, end, y)));
    WeekRange::build(start, end, end_year, text)
}

/// Parse a week label out of free text.
///
/// Short labels are read month-first (`07.28-08.03`). When that reading is
/// not a valid range, a day-first reading (`28.07-03.08`) is tried.
pub fn parse_week_range_str(text: &str) -> Option<WeekRange> {
    if let Some(caps) = YEAR_FIRST_RANGE_RE.captures(text) {
        let start = MonthDay::new(num(&caps, 2)?, num(&caps, 3)?);
        let end = MonthDay::new(num(&caps, 5)?, num(&caps, 6)?);
        if let (Some(start), Some(end)) = (start, end) {
            let end_year = year(&caps, 4)
                .or_else(|| year(&caps, 1).map(|y| end_year_from_start(start, end, y)));
            if let Some(range) = WeekRange::build(start, end, end_year, text) {
                return Some(range);
            }
        }
    }
    if let Some(caps) = SHORT_RANGE_RE.captures(text) {
        if let Some(range) = short_range(&caps, ((1, 2), (4, 5)), text) {
            return Some(range);
        }
        if let Some(range) = short_range(&caps, ((2, 1), (5, 4)), text).filter(is_week_span) {
            return Some(range);
        }
    }
    let caps = DASHED_RANGE_RE.captures(text)?;
    let start = MonthDay::new(num(&caps, 1)?, num(&caps, 2)?)?;
    let end = MonthDay::new(num(&caps, 3)?, num(&caps, 4)?)?;
    WeekRange::build(start, end, None, text)
}

/// Parse a week label held by a cell. Only text cells can carry one.
pub fn parse_week_range(cell: &Cell) -> Option<WeekRange> {
    match cell {
        Cell::Text(text) => parse_week_range_str(text),
        Cell::Empty | Cell::Number(_) => None,
    }
}

/// Week label embedded in a file's base name, e.g. `Osticket 07.28-08.03.xlsx`.
pub fn week_range_from_file_name(path: &Path) -> Option<WeekRange> {
    let stem = path.file_stem()?.to_str()?;
    parse_week_range_str(stem)
}
