use std::fmt;
use std::path::PathBuf;

/// A structural reference point an extractor needed but could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    CompanyBlock(String),
    YearHeader,
    YearColumn(String),
    WeekColumns,
    CategoryRow(String),
    Column(String),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompanyBlock(name) => write!(f, "company block '{name}'"),
            Self::YearHeader => write!(f, "year header row"),
            Self::YearColumn(label) => write!(f, "year column '{label}'"),
            Self::WeekColumns => write!(f, "week-range columns"),
            Self::CategoryRow(label) => write!(f, "category row '{label}'"),
            Self::Column(header) => write!(f, "required column '{header}'"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("sheet '{sheet}' not found in {}; available sheets: {}", .path.display(), .available.join(", "))]
    MissingSheet {
        sheet: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("{anchor} not found in sheet '{sheet}'")]
    MissingAnchor { anchor: Anchor, sheet: String },

    #[error("failed to read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot derive reporting period: {0}")]
    Period(String),
}

impl ExtractError {
    pub fn missing_anchor(anchor: Anchor, sheet: &str) -> Self {
        Self::MissingAnchor {
            anchor,
            sheet: sheet.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid {name}: {value}")]
    Env { name: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
