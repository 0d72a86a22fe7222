//! Report configuration loaded once from YAML.
//!
//! Environment overrides are applied inside [AppConfig::load]; nothing below
//! this module reads the environment.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::{CategorySpec, CompanyFilter, CompanyMatch, MetricSpec, TicketHeaders};

pub const CONFIG_ENV: &str = "WEEKSTAT_CONFIG";
pub const WORKERS_ENV: &str = "WEEKSTAT_WORKERS";
pub const DEFAULT_CONFIG_PATH: &str = "weekstat.yaml";

fn default_ticket_sheet() -> String {
    "Osticket1".to_string()
}

fn default_take_last() -> usize {
    4
}

fn default_top_n() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reports run at once; 0 uses every core.
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    pub reports: Vec<ReportConfig>,
}

/// One company report: which workbooks to read and how they are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    /// Other spellings of `company` in ticket exports.
    #[serde(default)]
    pub company_aliases: Vec<String>,
    #[serde(default)]
    pub company_match: CompanyMatch,
    pub curr_workbook: PathBuf,
    #[serde(default)]
    pub prev_workbook: Option<PathBuf>,
    #[serde(default)]
    pub stats_workbook: Option<PathBuf>,
    #[serde(default = "default_ticket_sheet")]
    pub ticket_sheet: String,
    #[serde(default)]
    pub weekly_sheet: Option<String>,
    #[serde(default)]
    pub month_sheet: Option<String>,
    /// Company block heading inside `month_sheet`, for sheets that stack
    /// several companies.
    #[serde(default)]
    pub month_block: Option<String>,
    #[serde(default)]
    pub year_label: Option<String>,
    #[serde(default = "default_take_last")]
    pub take_last_months: usize,
    #[serde(default = "default_take_last")]
    pub take_last_weeks: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "CategorySpec::defaults")]
    pub categories: Vec<CategorySpec>,
    #[serde(default)]
    pub ticket_headers: TicketHeaders,
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
}

impl ReportConfig {
    /// A report over one ticket workbook with every other field defaulted.
    pub fn new(name: &str, curr_workbook: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            company: None,
            company_aliases: Vec::new(),
            company_match: CompanyMatch::default(),
            curr_workbook: curr_workbook.into(),
            prev_workbook: None,
            stats_workbook: None,
            ticket_sheet: default_ticket_sheet(),
            weekly_sheet: None,
            month_sheet: None,
            month_block: None,
            year_label: None,
            take_last_months: default_take_last(),
            take_last_weeks: default_take_last(),
            top_n: default_top_n(),
            categories: CategorySpec::defaults(),
            ticket_headers: TicketHeaders::default(),
            metrics: Vec::new(),
        }
    }

    /// Filter over `company` and its aliases; `None` when no company is set.
    pub fn company_filter(&self) -> Option<CompanyFilter> {
        let company = self.company.as_deref()?;
        let names: Vec<&str> = std::iter::once(company)
            .chain(self.company_aliases.iter().map(String::as_str))
            .collect();
        Some(CompanyFilter::new(&names, self.company_match))
    }

    /// Year from `year_label` when it is numeric.
    pub fn label_year(&self) -> Option<i32> {
        self.year_label.as_deref()?.trim().parse().ok()
    }

    pub fn workbook_paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.curr_workbook.as_path())
            .chain(self.prev_workbook.as_deref())
            .chain(self.stats_workbook.as_deref())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.curr_workbook);
        if let Some(path) = self.prev_workbook.as_mut() {
            resolve(path);
        }
        if let Some(path) = self.stats_workbook.as_mut() {
            resolve(path);
        }
    }
}

impl AppConfig {
    /// Read, apply environment overrides, resolve relative workbook paths
    /// against the config file's directory, then validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&raw)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        if let Some(base) = path.parent() {
            for report in &mut config.reports {
                report.resolve_paths(base);
            }
            if let Some(dir) = config.output_dir.as_mut().filter(|dir| dir.is_relative()) {
                *dir = base.join(&*dir);
            }
        }
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            reports = config.reports.len(),
            workers = config.workers,
            "config loaded"
        );
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply overrides from `lookup` (the process environment in [load](Self::load)).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(WORKERS_ENV) {
            self.workers = value.trim().parse().map_err(|_| ConfigError::Env {
                name: WORKERS_ENV,
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reports.is_empty() {
            return Err(ConfigError::Invalid("no reports configured".to_string()));
        }
        let mut names = HashSet::new();
        for report in &self.reports {
            let name = report.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid("report name must not be empty".to_string()));
            }
            if !names.insert(name) {
                return Err(ConfigError::Invalid(format!("duplicate report name '{name}'")));
            }
            if report.take_last_months == 0 || report.take_last_weeks == 0 || report.top_n == 0 {
                return Err(ConfigError::Invalid(format!(
                    "report '{name}': take_last_months, take_last_weeks and top_n must be positive"
                )));
            }
            if report.categories.is_empty() {
                return Err(ConfigError::Invalid(format!("report '{name}': no categories")));
            }
            if report.ticket_headers.category.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "report '{name}': ticket_headers.category must name at least one header"
                )));
            }
        }
        Ok(())
    }
}

/// Config path from `WEEKSTAT_CONFIG`, else `weekstat.yaml`.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
