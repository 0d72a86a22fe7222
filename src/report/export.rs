use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExportError;
use crate::report::ExtractionResult;

#[derive(Serialize)]
struct TopRowRecord<'a> {
    category: &'a str,
    name: &'a str,
    prev: u64,
    curr: u64,
    delta: f64,
}

/// One CSV line per ranked subcategory, grouped by category.
pub fn write_top_rows_csv(
    path: impl AsRef<Path>,
    result: &ExtractionResult,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for breakdown in &result.top {
        for row in &breakdown.rows {
            writer.serialize(TopRowRecord {
                category: &breakdown.category,
                name: &row.name,
                prev: row.prev,
                curr: row.curr,
                delta: row.delta,
            })?;
        }
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_result_json(
    path: impl AsRef<Path>,
    result: &ExtractionResult,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `<report>.json` and `<report>.top.csv` into `dir`, creating it when
/// needed. Returns the written paths.
pub fn write_outputs(dir: &Path, result: &ExtractionResult) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let json = dir.join(format!("{}.json", result.report));
    let csv = dir.join(format!("{}.top.csv", result.report));
    write_result_json(&json, result)?;
    write_top_rows_csv(&csv, result)?;
    tracing::debug!(report = %result.report, dir = %dir.display(), "outputs written");
    Ok(vec![json, csv])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::TopRow;
    use crate::extract::{CategoryBreakdown, MonthSeries, WeeklySeries, WeeklySource};

    fn sample() -> ExtractionResult {
        ExtractionResult {
            report: "arb".to_string(),
            company: Some("ARB".to_string()),
            prev_week: "07.21-07.27".to_string(),
            curr_week: "07.28-08.03".to_string(),
            prev_tickets: 10,
            curr_tickets: 11,
            months: MonthSeries::default(),
            weekly: WeeklySeries::default(),
            weekly_source: WeeklySource::PeriodPair,
            top: vec![CategoryBreakdown {
                category: "Лавлагаа".to_string(),
                rows: vec![
                    TopRow {
                        name: "Нууц код сэргээх".to_string(),
                        prev: 10,
                        curr: 8,
                        delta: -0.2,
                    },
                    TopRow {
                        name: "Данс цэнэглэх".to_string(),
                        prev: 0,
                        curr: 3,
                        delta: 1.0,
                    },
                ],
            }],
            metrics: Vec::new(),
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("weekstat-export-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = temp_dir("outputs");
        let written = write_outputs(&dir, &sample()).expect("write");
        assert_eq!(written.len(), 2);

        let csv = fs::read_to_string(dir.join("arb.top.csv")).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("category,name,prev,curr,delta"));
        assert_eq!(lines.next(), Some("Лавлагаа,Нууц код сэргээх,10,8,-0.2"));
        assert_eq!(lines.next(), Some("Лавлагаа,Данс цэнэглэх,0,3,1.0"));

        let raw = fs::read_to_string(dir.join("arb.json")).expect("json");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        assert_eq!(json["weekly_source"], "period_pair");
        assert_eq!(json["top"][0]["rows"][1]["curr"], 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
