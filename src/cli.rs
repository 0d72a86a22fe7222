use std::path::PathBuf;

use crate::config::{default_config_path, AppConfig, ReportConfig};
use crate::grid::Workbook;
use crate::locate::{find_all_week_columns, week_labels_in_column};
use crate::report::{run_reports, write_outputs, ExtractionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Extract,
    Validate,
    Weeks,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("extract") => Some(Command::Extract),
        Some("validate") => Some(Command::Validate),
        Some("weeks") => Some(Command::Weeks),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Extract) => handle_extract(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Weeks) => handle_weeks(args),
        None => {
            eprintln!("usage: weekstat <extract|validate|weeks> [args]");
            2
        }
    }
}

fn config_path(args: &[String]) -> PathBuf {
    args.get(2).map(PathBuf::from).unwrap_or_else(default_config_path)
}

fn load_config(args: &[String]) -> Result<AppConfig, i32> {
    let path = config_path(args);
    AppConfig::load(&path).map_err(|err| {
        eprintln!("config error: {err}");
        1
    })
}

fn handle_extract(args: &[String]) -> i32 {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let mut failed = 0usize;
    let mut results: Vec<ExtractionResult> = Vec::with_capacity(config.reports.len());
    for (name, outcome) in run_reports(&config) {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                eprintln!("report '{name}' failed: {err}");
                failed += 1;
            }
        }
    }

    if let Some(dir) = config.output_dir.as_deref() {
        for result in &results {
            if let Err(err) = write_outputs(dir, result) {
                eprintln!("report '{}' export failed: {err}", result.report);
                failed += 1;
            }
        }
    }

    match serde_json::to_string_pretty(&results) {
        Ok(payload) => println!("{payload}"),
        Err(err) => {
            eprintln!("failed to serialize extraction results: {err}");
            return 1;
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} report(s) failed", config.reports.len());
        1
    } else {
        0
    }
}

/// Problems that would make `extract` fail before any cell is read.
fn check_report(report: &ReportConfig) -> Vec<String> {
    let mut issues = Vec::new();
    let mut open = |path: &std::path::Path| match Workbook::open(path) {
        Ok(workbook) => Some(workbook),
        Err(err) => {
            issues.push(format!("{}: {err}", report.name));
            None
        }
    };
    let curr = open(&report.curr_workbook);
    let prev = report.prev_workbook.as_deref().and_then(&mut open);
    let stats = report.stats_workbook.as_deref().and_then(&mut open);

    for ticket_book in curr.iter().chain(prev.iter()) {
        if let Err(err) = ticket_book.sheet(&report.ticket_sheet) {
            issues.push(format!("{}: {err}", report.name));
        }
    }
    if let Some(stats_book) = stats.as_ref().or(curr.as_ref()) {
        for sheet in [&report.month_sheet, &report.weekly_sheet].into_iter().flatten() {
            if let Err(err) = stats_book.sheet(sheet) {
                issues.push(format!("{}: {err}", report.name));
            }
        }
    }
    issues
}

fn handle_validate(args: &[String]) -> i32 {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let issues: Vec<String> = config.reports.iter().flat_map(check_report).collect();
    if issues.is_empty() {
        println!(
            "validation passed: {} ({} report(s))",
            config_path(args).display(),
            config.reports.len()
        );
        0
    } else {
        eprintln!("validation failed: {} issue(s)", issues.len());
        for issue in issues {
            eprintln!("- {issue}");
        }
        1
    }
}

fn handle_weeks(args: &[String]) -> i32 {
    let (Some(path), Some(sheet)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: weekstat weeks <workbook> <sheet>");
        return 2;
    };

    let workbook = match Workbook::open(path) {
        Ok(workbook) => workbook,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let grid = match workbook.sheet(sheet) {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let columns = find_all_week_columns(grid);
    if columns.is_empty() {
        eprintln!("no week-range columns in sheet '{sheet}'");
        return 1;
    }
    println!("column\tlabels");
    for col in columns {
        let labels: Vec<String> = week_labels_in_column(grid, col)
            .iter()
            .map(|w| w.raw.clone())
            .collect();
        println!("{col}\t{}", labels.join(", "));
    }
    0
}
