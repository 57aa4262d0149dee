use super::job::load_job;
use crate::error::BridgeResult;
use crate::export::{DatePath, ExportConfig};
use crate::import::{ImportOptions, ImportedSheet, Importer};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the export command
pub fn export(
    job: PathBuf,
    root: PathBuf,
    date_path: DatePath,
    name: Option<String>,
    export_type: Option<String>,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "📊 Sheetbridge - Export".bold().green());
    println!("   Job:  {}", job.display());
    println!("   Root: {}\n", root.display());

    if verbose {
        println!("{}", "📖 Reading job file...".cyan());
    }

    let job = load_job(&job)?;
    let file_name = name.or_else(|| job.name.clone());

    if verbose {
        println!(
            "   Found {} sheets, {} title sets, {} merges\n",
            job.sheets.len(),
            job.titles.len(),
            job.merges.len()
        );
    }

    let mut exporter = job.into_exporter(ExportConfig::default())?;
    if let Some(kind) = export_type {
        exporter = exporter.with_type(kind);
    }

    if verbose {
        for (index, layout) in exporter.resolved_titles().iter().enumerate() {
            println!(
                "   Sheet {}: {} header rows, {} header cells",
                index,
                layout.header_rows(),
                layout.entries().len()
            );
            for field in layout.truncated() {
                println!("   {} dropped '{}'", "⚠️".yellow(), field.yellow());
            }
        }
        println!();
    }

    let saved = exporter.save(&root, &date_path, file_name.as_deref())?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   File: {}\n", saved.full_path().display());

    Ok(())
}

/// Execute the import command
pub fn import(
    file: PathBuf,
    options: ImportOptions,
    output: Option<PathBuf>,
    verbose: bool,
) -> BridgeResult<()> {
    let mut importer = Importer::new(&file).with_options(options);

    if verbose {
        eprintln!("{}", "📖 Reading spreadsheet...".cyan());
    }

    let sheets = importer.data()?;

    if verbose {
        for sheet in &sheets {
            eprintln!(
                "   📄 {}: {} records",
                sheet.sheet_name.bright_blue(),
                sheet.records.len()
            );
        }
    }

    match output {
        Some(path) => {
            fs::write(&path, serialize_sheets(&sheets, &path)?)?;
            println!("{}", "✅ Import Complete!".bold().green());
            println!("   Output: {}\n", path.display());
        }
        None => print!("{}", serde_yaml::to_string(&sheets)?),
    }

    Ok(())
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> BridgeResult<()> {
    let mut importer = Importer::new(&file);
    let info = importer.sheet_info()?;

    println!("{}", "📊 Sheetbridge - Sheets".bold().green());
    println!("   File: {}\n", file.display());

    for sheet in info {
        let extent = if sheet.highest_row == 0 {
            "empty".dimmed().to_string()
        } else {
            format!("A1:{}{}", sheet.highest_column, sheet.highest_row)
        };
        println!(
            "   {} {}  {}",
            format!("[{}]", sheet.index).cyan(),
            sheet.name.bright_blue(),
            extent
        );
    }
    println!();

    Ok(())
}

/// JSON for `.json` targets, YAML otherwise
fn serialize_sheets(sheets: &[ImportedSheet], path: &Path) -> BridgeResult<String> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::to_string_pretty(sheets)?)
    } else {
        Ok(serde_yaml::to_string(sheets)?)
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
