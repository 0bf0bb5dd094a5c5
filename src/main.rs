//! timetable-sheet CLI - extracts class sessions from an XLSX timetable

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;
use timetable_sheet::{scan_workbook, ScheduleSummary, Template, Workbook};

#[derive(Parser)]
#[command(name = "timetable-sheet")]
#[command(version)]
#[command(about = "Extracts class sessions from a timetable worksheet", long_about = None)]
struct Cli {
    /// Workbook to read (.xlsx / .xlsm)
    file: PathBuf,

    /// Worksheet holding the month (defaults to the first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Year of the month to scan
    #[arg(short, long, required_unless_present = "list_sheets")]
    year: Option<i32>,

    /// Month to scan (1-12)
    #[arg(short, long, required_unless_present = "list_sheets", value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// JSON file overriding the template layout
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Print the natural-key summary instead of the sessions
    #[arg(long)]
    summary: bool,

    /// Pretty print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List the worksheets of the workbook and exit
    #[arg(long)]
    list_sheets: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut workbook = Workbook::open(&cli.file)
        .with_context(|| format!("Cannot open '{}'", cli.file.display()))?;
    if cli.list_sheets {
        for name in workbook.sheet_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let template = match &cli.template {
        Some(path) => Template::from_json_file(path)
            .with_context(|| format!("Cannot load template '{}'", path.display()))?,
        None => Template::default(),
    };
    let sheet = match cli.sheet {
        Some(sheet) => sheet,
        None => match workbook.sheet_names().into_iter().next() {
            Some(sheet) => sheet,
            None => bail!("Workbook '{}' has no worksheets", cli.file.display()),
        },
    };
    let (Some(year), Some(month)) = (cli.year, cli.month) else {
        bail!("Both --year and --month are required");
    };

    let result = scan_workbook(&mut workbook, &sheet, year, month, &template)?;
    info!("{} recovered error(s)", result.errors().len());

    let json = match (cli.summary, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(&ScheduleSummary::from(&result))?,
        (true, false) => serde_json::to_string(&ScheduleSummary::from(&result))?,
        (false, true) => serde_json::to_string_pretty(&result)?,
        (false, false) => serde_json::to_string(&result)?,
    };
    match &cli.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
