//! Inspect a statistics or ticket workbook: print sheet names and the first rows of one sheet
//! as the extractors see them, with week-range columns marked.
//! Usage: cargo run --bin inspect_workbook -- path/to/stats.xlsx [sheet] [rows]

use std::path::Path;

use weekstat::grid::{cell_text, Workbook};
use weekstat::locate::find_all_week_columns;

const DEFAULT_ROWS: usize = 25;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("Usage: inspect_workbook <path-to.xlsx> [sheet] [rows]")?;
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let workbook = Workbook::open(path)?;
    let names = workbook.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));

    let sheet_name = match args.next() {
        Some(name) => name,
        None => names.first().cloned().ok_or("No sheets")?,
    };
    let rows = args
        .next()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_ROWS);
    let grid = workbook.sheet(&sheet_name)?;
    println!("\nUsing sheet: {sheet_name}");
    println!("Size: {} rows x {} cols", grid.height(), grid.width());

    let weeks = find_all_week_columns(grid);
    if !weeks.is_empty() {
        let cols: Vec<String> = weeks.iter().map(usize::to_string).collect();
        println!("Week-range columns: {}", cols.join(", "));
    }

    println!("First {rows} rows:");
    for (i, row) in grid.rows().take(rows).enumerate() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("  {}: {}", i, cells.join(" | "));
    }
    Ok(())
}
