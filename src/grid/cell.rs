use chrono::{Days, NaiveDate};

/// Raw value of one worksheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

pub(crate) static EMPTY: Cell = Cell::Empty;

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d.%m.%Y", "%m/%d/%Y"];

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&calamine::Data> for Cell {
    fn from(value: &calamine::Data) -> Self {
        match value {
            calamine::Data::Empty | calamine::Data::Error(_) => Self::Empty,
            calamine::Data::String(s) => Self::Text(s.clone()),
            calamine::Data::Float(f) => Self::Number(*f),
            calamine::Data::Int(i) => Self::Number(*i as f64),
            calamine::Data::Bool(b) => Self::Text(b.to_string()),
            calamine::Data::DateTime(dt) => Self::Number(dt.as_f64()),
            calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => {
                Self::Text(s.clone())
            }
        }
    }
}

/// Display text of a cell; integral numbers render without a fraction.
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
    }
}

/// Calendar date held by a cell: an Excel serial number or a date-looking text.
/// Any time-of-day part is dropped.
pub fn cell_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => excel_serial_to_date(*n),
        Cell::Text(s) => parse_text_date(s),
    }
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_text_date(raw: &str) -> Option<NaiveDate> {
    let token = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(cell_text(&Cell::Number(2025.0)), "2025");
        assert_eq!(cell_text(&Cell::Number(0.25)), "0.25");
        assert_eq!(cell_text(&Cell::text("  Гомдол ")), "Гомдол");
        assert_eq!(cell_text(&Cell::Empty), "");
    }

    #[test]
    fn excel_serial_dates_decode() {
        // 45870 = 2025-08-01
        assert_eq!(
            cell_date(&Cell::Number(45870.6)),
            NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert_eq!(cell_date(&Cell::Number(-3.0)), None);
        assert_eq!(cell_date(&Cell::Number(f64::NAN)), None);
    }

    #[test]
    fn text_dates_decode_with_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 28);
        assert_eq!(cell_date(&Cell::text("2025-07-28 14:05:11")), expected);
        assert_eq!(cell_date(&Cell::text("2025-07-28T09:00")), expected);
        assert_eq!(cell_date(&Cell::text("28.07.2025")), expected);
        assert_eq!(cell_date(&Cell::text("07/28/2025")), expected);
        assert_eq!(cell_date(&Cell::text("not a date")), None);
    }

    #[test]
    fn blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::text("   ").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }
}
