use std::path::{Path, PathBuf};

use calamine::Reader;

use crate::error::ExtractError;
use crate::grid::Grid;

/// All sheets of one workbook, decoded eagerly into [Grid]s.
#[derive(Debug, Clone)]
pub struct Workbook {
    path: PathBuf,
    sheets: Vec<(String, Grid)>,
}

impl Workbook {
    /// Open an `.xlsx`/`.xlsm`/`.xls`/`.ods` file and decode every sheet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let workbook_error = |source: calamine::Error| ExtractError::Workbook {
            path: path.to_path_buf(),
            source,
        };

        let mut wb = calamine::open_workbook_auto(path).map_err(workbook_error)?;
        let names = wb.sheet_names();
        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            let range = wb.worksheet_range(&name).map_err(workbook_error)?;
            sheets.push((name, Grid::from_range(&range)));
        }
        tracing::debug!(path = %path.display(), sheets = sheets.len(), "workbook loaded");
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Assemble a workbook from already-built grids.
    pub fn from_sheets(path: impl Into<PathBuf>, sheets: Vec<(String, Grid)>) -> Self {
        Self {
            path: path.into(),
            sheets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Sheet by exact (trimmed) name.
    pub fn sheet(&self, name: &str) -> Result<&Grid, ExtractError> {
        let wanted = name.trim();
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet.trim() == wanted)
            .map(|(_, grid)| grid)
            .ok_or_else(|| ExtractError::MissingSheet {
                sheet: name.to_string(),
                path: self.path.clone(),
                available: self.sheet_names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Workbook {
        Workbook::from_sheets(
            "stats.xlsx",
            vec![
                ("Osticket1".to_string(), Grid::from_strings([vec!["a"]])),
                ("Summary ".to_string(), Grid::default()),
            ],
        )
    }

    #[test]
    fn sheet_lookup_trims_names() {
        let wb = sample();
        assert!(wb.sheet("Summary").is_ok());
        assert!(wb.sheet(" Osticket1").is_ok());
    }

    #[test]
    fn missing_sheet_lists_available_names() {
        let wb = sample();
        match wb.sheet("ARB") {
            Err(ExtractError::MissingSheet {
                sheet,
                path,
                available,
            }) => {
                assert_eq!(sheet, "ARB");
                assert_eq!(path, PathBuf::from("stats.xlsx"));
                assert_eq!(available, vec!["Osticket1", "Summary "]);
            }
            other => panic!("expected MissingSheet, got {other:?}"),
        }
    }

    #[test]
    fn opening_missing_file_is_a_workbook_error() {
        let err = Workbook::open("/nonexistent/weekstat/missing.xlsx").unwrap_err();
        assert!(matches!(err, ExtractError::Workbook { .. }), "{err}");
    }
}
