//! Total, side-effect free recognizers for single cell values.
//!
//! None of these functions fail: unmatched input yields `None`, `0.0` or
//! `false`.

mod week;

pub use week::{
    parse_week_range, parse_week_range_str, week_range_from_file_name, MonthDay, WeekRange,
    CLOSE_WEEK_TOLERANCE_DAYS,
};

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::grid::{cell_text, Cell};

pub const MIN_YEAR: i32 = 2019;
pub const MAX_YEAR: i32 = 2100;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));

/// `5 сар`, `12сар`, `5 cap` (Latin look-alike), `5-р сар`
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})\s*(?:-?\s*р)?\s*(?:сар|cap)(?:\s|$|[.,:])")
        .expect("valid month regex")
});

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?\d+(?:[.,]\d+)?)\s*%$").expect("valid percent regex")
});

/// Year held by a cell: 4-digit text or an integral number within
/// [MIN_YEAR, MAX_YEAR].
pub fn year_value(cell: &Cell) -> Option<i32> {
    let year = match cell {
        Cell::Empty => return None,
        Cell::Text(s) => {
            let s = s.trim();
            if !YEAR_RE.is_match(s) {
                return None;
            }
            s.parse::<i32>().ok()?
        }
        Cell::Number(n) => {
            if !n.is_finite() || n.fract() != 0.0 {
                return None;
            }
            *n as i32
        }
    };
    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year)
}

pub fn is_four_digit_year(cell: &Cell) -> bool {
    year_value(cell).is_some()
}

/// Month number from a `N сар` label.
pub fn parse_month_label(cell: &Cell) -> Option<u32> {
    let Cell::Text(text) = cell else {
        return None;
    };
    let caps = MONTH_RE.captures(text.trim())?;
    let month: u32 = caps.get(1)?.as_str().parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Fraction held by a percentage cell: `"85%"` is `0.85`. Numbers are taken
/// as already fractional; numeric text without `%` likewise.
pub fn parse_percent(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Text(text) => {
            let text = text.trim();
            match PERCENT_RE.captures(text) {
                Some(caps) => caps
                    .get(1)
                    .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
                    .map(|v| v / 100.0)
                    .unwrap_or(0.0),
                None => text.parse::<f64>().unwrap_or(0.0),
            }
        }
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Number embedded in formatted text (`"1,234 ₮"` is `1234.0`). Every
/// character other than digits, `.` and `-` is dropped first.
pub fn parse_amount(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Text(text) => text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect::<String>()
            .parse::<f64>()
            .unwrap_or(0.0),
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Trim, collapse whitespace runs and lowercase.
pub fn normalize_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn normalize_cell(cell: &Cell) -> String {
    normalize_text(&cell_text(cell))
}

/// How a normalized cell is compared against a normalized candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Exact,
    Prefix,
    Contains,
}

impl MatchMode {
    /// Strictest first.
    pub const TIERS: [MatchMode; 3] = [MatchMode::Exact, MatchMode::Prefix, MatchMode::Contains];

    /// Both arguments must already be normalized. Empty candidates never match.
    pub fn matches(self, normalized: &str, candidate: &str) -> bool {
        if candidate.is_empty() || normalized.is_empty() {
            return false;
        }
        match self {
            Self::Exact => normalized == candidate,
            Self::Prefix => normalized.starts_with(candidate),
            Self::Contains => normalized.contains(candidate),
        }
    }
}

pub fn text_matches(cell: &Cell, candidate: &str, mode: MatchMode) -> bool {
    mode.matches(&normalize_cell(cell), &normalize_text(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_within_range() {
        assert!(is_four_digit_year(&Cell::text("2025")));
        assert!(is_four_digit_year(&Cell::text(" 2019 ")));
        assert!(is_four_digit_year(&Cell::Number(2100.0)));
        assert!(!is_four_digit_year(&Cell::text("2018")));
        assert!(!is_four_digit_year(&Cell::text("2101")));
        assert!(!is_four_digit_year(&Cell::text("2025 он")));
        assert!(!is_four_digit_year(&Cell::Number(2025.5)));
        assert!(!is_four_digit_year(&Cell::Empty));
    }

    #[test]
    fn month_labels() {
        assert_eq!(parse_month_label(&Cell::text("5 сар")), Some(5));
        assert_eq!(parse_month_label(&Cell::text("12сар")), Some(12));
        assert_eq!(parse_month_label(&Cell::text("3 CAP")), Some(3));
        assert_eq!(parse_month_label(&Cell::text("7-р сар")), Some(7));
        assert_eq!(parse_month_label(&Cell::text("13 сар")), None);
        assert_eq!(parse_month_label(&Cell::text("0 сар")), None);
        assert_eq!(parse_month_label(&Cell::text("сар")), None);
        assert_eq!(parse_month_label(&Cell::text("5 сарын тайлан")), None);
        assert_eq!(parse_month_label(&Cell::Number(5.0)), None);
    }

    #[test]
    fn percents() {
        assert_eq!(parse_percent(&Cell::text("85%")), 0.85);
        assert_eq!(parse_percent(&Cell::text("-12.5 %")), -0.125);
        assert_eq!(parse_percent(&Cell::text("7,5%")), 0.075);
        assert_eq!(parse_percent(&Cell::Number(0.42)), 0.42);
        assert_eq!(parse_percent(&Cell::text("n/a")), 0.0);
        assert_eq!(parse_percent(&Cell::Empty), 0.0);
        assert_eq!(parse_percent(&Cell::Number(f64::INFINITY)), 0.0);
    }

    #[test]
    fn amounts() {
        assert_eq!(parse_amount(&Cell::text("1,234 ₮")), 1234.0);
        assert_eq!(parse_amount(&Cell::text("-15.5")), -15.5);
        assert_eq!(parse_amount(&Cell::Number(42.0)), 42.0);
        assert_eq!(parse_amount(&Cell::text("нийт")), 0.0);
        assert_eq!(parse_amount(&Cell::text("1.2.3")), 0.0);
        assert_eq!(parse_amount(&Cell::text("--")), 0.0);
        assert_eq!(parse_amount(&Cell::Number(f64::NAN)), 0.0);
    }

    #[test]
    fn normalization_collapses_and_casefolds() {
        assert_eq!(normalize_text("  Нууц   код\tСЭРГЭЭХ "), "нууц код сэргээх");
        assert!(text_matches(&Cell::text("Лавлагаа "), "лавлагаа", MatchMode::Exact));
        assert!(text_matches(&Cell::text("Гомдол, санал"), "гомдол", MatchMode::Prefix));
        assert!(text_matches(&Cell::text("Нийт гомдол"), "Гомдол", MatchMode::Contains));
        assert!(!text_matches(&Cell::text("Нийт гомдол"), "Гомдол", MatchMode::Prefix));
        assert!(!text_matches(&Cell::Empty, "", MatchMode::Contains));
    }
}
