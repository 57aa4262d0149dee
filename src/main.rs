use clap::{Parser, Subcommand};
use sheetbridge::cli;
use sheetbridge::error::BridgeResult;
use sheetbridge::export::DatePath;
use sheetbridge::import::ImportOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(about = "Records to spreadsheets with nested headers, and back again.")]
#[command(long_about = "Sheetbridge - spreadsheet export and import

COMMANDS:
  export  - Job file (YAML/JSON) to .xlsx or .csv with nested, merged headers
  import  - Spreadsheet cell range to field-keyed records
  sheets  - List the sheets of a spreadsheet

EXAMPLES:
  sheetbridge export job.yaml --root out --dated
  sheetbridge import users.xlsx --start-row 3 --field A=id --field B=name
  sheetbridge import users.xlsx --rows 3,5,9 --columns A,C -o rows.json

Logging is controlled with RUST_LOG (default: sheetbridge=info).")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export a job file to a spreadsheet.

The job lists per-sheet title trees, records and extra merge ranges:

  type: xlsx
  titles:
    - children:
        - { field: id, name: ID, width: 10 }
        - field: info
          name: Info
          children:
            - { field: name, name: Name, color: \"#0000ff\" }
  sheets:
    - name: users
      records:
        - { id: 1, name: alice }
  merges:
    - { sheet: 0, range: \"A4:A5\" }

Unknown or disabled types (including xls) fall back to xlsx.")]
    /// Export a job file to .xlsx or .csv
    Export {
        /// Path to the job file (.yaml, .yml or .json)
        job: PathBuf,

        /// Directory to write into (created if missing)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Write into a YYYYMMDD sub-directory
        #[arg(long, conflicts_with = "date_format")]
        dated: bool,

        /// Write into a date sub-directory with this strftime format (e.g. %Y/%m)
        #[arg(long)]
        date_format: Option<String>,

        /// File name without extension (default: job name, else a time hash)
        #[arg(short, long)]
        name: Option<String>,

        /// Output type: xlsx or csv (overrides the job)
        #[arg(short = 't', long = "type")]
        export_type: Option<String>,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Import a spreadsheet range as records
    Import {
        /// Spreadsheet to read (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
        file: PathBuf,

        /// Explicit rows to read, in order (overrides the row range)
        #[arg(long, value_delimiter = ',')]
        rows: Vec<u32>,

        /// Explicit columns to read, in order (overrides the column range)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        #[arg(long, default_value_t = 1)]
        start_row: u32,

        /// Last row (default: highest populated row)
        #[arg(long)]
        end_row: Option<u32>,

        #[arg(long, default_value = "A")]
        start_column: String,

        /// Last column (default: highest populated column)
        #[arg(long)]
        end_column: Option<String>,

        /// Read only these sheet indices (0-based)
        #[arg(long = "sheet-index", value_delimiter = ',')]
        sheet_indices: Vec<usize>,

        /// Read only sheets with these names
        #[arg(long = "sheet-name")]
        sheet_names: Vec<String>,

        /// Column to field mapping, e.g. A=id (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Output file (.json or .yaml); prints YAML when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose import steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the sheets of a spreadsheet
    Sheets {
        /// Spreadsheet to inspect
        file: PathBuf,
    },
}

fn parse_field(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((column, field)) if !column.trim().is_empty() && !field.is_empty() => {
            Ok((column.trim().to_uppercase(), field.to_string()))
        }
        _ => Err(format!("expected COLUMN=FIELD, got '{}'", value)),
    }
}

fn main() -> BridgeResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbridge=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            job,
            root,
            dated,
            date_format,
            name,
            export_type,
            verbose,
        } => {
            let date_path = match (dated, date_format) {
                (_, Some(format)) => DatePath::Format(format),
                (true, None) => DatePath::Today,
                (false, None) => DatePath::None,
            };
            cli::export(job, root, date_path, name, export_type, verbose)
        }

        Commands::Import {
            file,
            rows,
            columns,
            start_row,
            end_row,
            start_column,
            end_column,
            sheet_indices,
            sheet_names,
            fields,
            output,
            verbose,
        } => {
            let options = ImportOptions {
                start_row: start_row.max(1),
                end_row,
                start_column: start_column.to_uppercase(),
                end_column: end_column.map(|c| c.to_uppercase()),
                rows,
                columns: columns.iter().map(|c| c.trim().to_uppercase()).collect(),
                column_fields: fields.into_iter().collect(),
                sheet_indices,
                sheet_names,
            };
            cli::import(file, options, output, verbose)
        }

        Commands::Sheets { file } => cli::sheets(file),
    }
}
