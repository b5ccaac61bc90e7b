//! sheetward CLI - inspect, edit, chart and scan XLSX files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetward::prelude::*;
use sheetward::{access, CheckId};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetward")]
#[command(
    author,
    version,
    about = "Inspect, edit, chart and scan XLSX workbooks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show sheets, extents and counts
    Info {
        /// Input workbook
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the non-empty cells of a sheet as JSON
    Cells {
        /// Input workbook
        input: PathBuf,

        /// Sheet name (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Include formula text
        #[arg(long)]
        formulas: bool,

        /// Include cell styles
        #[arg(long)]
        styles: bool,
    },

    /// Apply a JSON batch of edit operations
    Edit {
        /// Input workbook
        input: PathBuf,

        /// JSON file holding an array of operations
        #[arg(long)]
        ops: PathBuf,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add a chart built from a cell range
    Chart {
        /// Input workbook
        input: PathBuf,

        /// Sheet holding the data; the chart is placed on the same sheet
        #[arg(short, long)]
        sheet: String,

        /// Data range, header row first and categories in the first column
        #[arg(short, long, value_parser = parse_range)]
        range: CellRange,

        /// bar, line, pie or scatter
        #[arg(short, long, default_value = "bar", value_parser = parse_kind)]
        kind: ChartKind,

        /// Top-left cell of the chart
        #[arg(short, long, value_parser = parse_address)]
        anchor: CellAddress,

        /// Chart size as COLSxROWS, e.g. 8x15
        #[arg(long, value_parser = parse_size)]
        size: Option<(u32, u32)>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        x_title: Option<String>,

        #[arg(long)]
        y_title: Option<String>,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run the security checks and print the report as JSON
    Scan {
        /// Input workbook
        input: PathBuf,

        /// Check to leave out (macro_check, hidden_sheets_check, external_links_check)
        #[arg(long = "skip", value_parser = parse_check)]
        skip: Vec<CheckId>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, json } => show_info(&input, json),
        Commands::Cells {
            input,
            sheet,
            formulas,
            styles,
        } => print_cells(&input, sheet.as_deref(), formulas, styles),
        Commands::Edit { input, ops, output } => edit(&input, &ops, &output),
        Commands::Chart {
            input,
            sheet,
            range,
            kind,
            anchor,
            size,
            title,
            x_title,
            y_title,
            output,
        } => {
            let spec = ChartSpec {
                sheet,
                kind,
                range,
                title,
                x_axis_title: x_title,
                y_axis_title: y_title,
                anchor,
                size,
            };
            chart(&input, spec, &output)
        }
        Commands::Scan { input, skip } => scan(&input, skip),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn open(path: &Path) -> Result<Workbook> {
    let bytes = read_input(path)?;
    Workbook::from_xlsx_bytes(&bytes).with_context(|| format!("Failed to open '{}'", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write '{}'", path.display()))
}

fn show_info(input: &Path, json: bool) -> Result<()> {
    let workbook = open(input)?;
    let summaries = access::summarize(&workbook);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("File: {}", input.display());
    println!("Sheets: {}", summaries.len());
    for (i, summary) in summaries.iter().enumerate() {
        println!();
        let marker = if i == workbook.active_sheet() { " (active)" } else { "" };
        println!("  Sheet {}: \"{}\"{}", i, summary.name, marker);
        if summary.visibility.is_hidden() {
            println!("    Visibility: {:?}", summary.visibility);
        }
        if summary.max_row == 0 {
            println!("    Used range: empty");
        } else {
            println!(
                "    Used range: {} rows x {} columns",
                summary.max_row, summary.max_column
            );
        }
        println!("    Cells: {}", summary.cell_count);
        println!("    Formulas: {}", summary.formula_count);
        println!("    Charts: {}", summary.chart_count);
    }

    Ok(())
}

fn print_cells(input: &Path, sheet: Option<&str>, formulas: bool, styles: bool) -> Result<()> {
    let workbook = open(input)?;
    let sheet = access::get_sheet(&workbook, sheet)?;
    let cells: Vec<_> = access::iter_cells(sheet, formulas, styles).collect();
    println!("{}", serde_json::to_string_pretty(&cells)?);
    Ok(())
}

fn edit(input: &Path, ops: &Path, output: &Path) -> Result<()> {
    let bytes = read_input(input)?;
    let ops_json = std::fs::read_to_string(ops)
        .with_context(|| format!("Failed to read '{}'", ops.display()))?;

    let (edited, report) = sheetward::edit_bytes(&bytes, &ops_json)
        .with_context(|| format!("Failed to edit '{}'", input.display()))?;
    write_output(output, &edited)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("{}; wrote '{}'", report.summary(), output.display());
    Ok(())
}

fn chart(input: &Path, spec: ChartSpec, output: &Path) -> Result<()> {
    let bytes = read_input(input)?;
    let kind = spec.kind;
    let sheet = spec.sheet.clone();

    let charted = sheetward::chart_bytes(&bytes, spec)
        .with_context(|| format!("Failed to add chart to '{}'", input.display()))?;
    write_output(output, &charted)?;

    eprintln!("Added {} chart to '{}'; wrote '{}'", kind, sheet, output.display());
    Ok(())
}

fn scan(input: &Path, skip: Vec<CheckId>) -> Result<()> {
    let bytes = read_input(input)?;
    let config = ScanConfig::default().without(skip);
    let report = sheetward::scan_bytes(&bytes, &config)
        .with_context(|| format!("Failed to scan '{}'", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn parse_range(s: &str) -> Result<CellRange, String> {
    CellRange::parse(s).map_err(|e| e.to_string())
}

fn parse_address(s: &str) -> Result<CellAddress, String> {
    CellAddress::parse(s).map_err(|e| e.to_string())
}

fn parse_kind(s: &str) -> Result<ChartKind, String> {
    ChartKind::parse(s).ok_or_else(|| format!("unknown chart kind '{s}' (bar, line, pie, scatter)"))
}

fn parse_check(s: &str) -> Result<CheckId, String> {
    s.parse()
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (cols, rows) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected COLSxROWS, got '{s}'"))?;
    let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("{v}: {e}"));
    let size = (parse(cols)?, parse(rows)?);
    if size.0 == 0 || size.1 == 0 {
        return Err("chart size must be at least 1x1".into());
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("8x15"), Ok((8, 15)));
        assert!(parse_size("0x5").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn test_chart_args() {
        let cli = Cli::try_parse_from([
            "sheetward", "chart", "in.xlsx", "--sheet", "Data", "--range", "A1:C5", "--kind",
            "line", "--anchor", "E2", "-o", "out.xlsx",
        ])
        .unwrap();
        match cli.command {
            Commands::Chart {
                range, kind, anchor, ..
            } => {
                assert_eq!(range, CellRange::parse("A1:C5").unwrap());
                assert_eq!(kind, ChartKind::Line);
                assert_eq!(anchor, CellAddress::new(2, 5));
            }
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn test_edit_and_chart_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xlsx");
        let ops = dir.path().join("ops.json");
        let edited = dir.path().join("edited.xlsx");
        let charted = dir.path().join("charted.xlsx");

        let bytes = sheetward::save_bytes(&Workbook::new()).unwrap();
        std::fs::write(&input, bytes).unwrap();
        std::fs::write(
            &ops,
            r#"[
                {"kind": "append_row", "values": ["Month", "Revenue"]},
                {"kind": "append_row", "values": ["Jan", 100]},
                {"kind": "append_row", "values": ["Feb", 140]}
            ]"#,
        )
        .unwrap();

        edit(&input, &ops, &edited).unwrap();
        let spec = ChartSpec::new(
            "Sheet1",
            ChartKind::Bar,
            CellRange::parse("A1:B3").unwrap(),
            CellAddress::new(1, 4),
        );
        chart(&edited, spec, &charted).unwrap();

        let workbook = open(&charted).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.max_row(), 3);
        assert_eq!(sheet.charts().len(), 1);
    }

    #[test]
    fn test_missing_input_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xlsx");
        let err = show_info(&missing, false).unwrap_err();
        assert!(err.to_string().contains("missing.xlsx"));
    }
}
