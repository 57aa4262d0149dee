//! Import integration tests: files written by the exporter read back as records

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sheetbridge::export::{DatePath, Exporter, Record, SheetData};
use sheetbridge::import::{ImportCell, Importer};
use sheetbridge::title::{SheetTitle, TitleNode};
use sheetbridge::types::CellValue;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

fn originals() -> Vec<IndexMap<String, CellValue>> {
    (1..=3i64)
        .map(|i| {
            let mut record = IndexMap::new();
            record.insert("id".to_string(), CellValue::from(i));
            record.insert("name".to_string(), CellValue::from(format!("user{}", i)));
            record
        })
        .collect()
}

fn nested_titles() -> SheetTitle {
    SheetTitle::new(vec![
        TitleNode::leaf("id", "ID"),
        TitleNode::group("info", "Info", vec![TitleNode::leaf("name", "Name")]),
    ])
}

fn export_users(temp: &TempDir, titles: SheetTitle, extension: &str) -> PathBuf {
    let records = originals().into_iter().map(Record::from).collect();
    Exporter::new(vec![SheetData::new("users", records)])
        .titles(vec![titles])
        .with_type(extension)
        .save(temp.path(), &DatePath::None, Some("users"))
        .unwrap()
        .full_path()
}

fn id_name_fields() -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert("A".to_string(), "id".to_string());
    fields.insert("B".to_string(), "name".to_string());
    fields
}

// ═══════════════════════════════════════════════════════════════════════════
// ROUND TRIPS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_xlsx_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = export_users(&temp, nested_titles(), "xlsx");

    let sheets = Importer::new(&path)
        .start_row(3)
        .column_fields(id_name_fields())
        .data()
        .unwrap();

    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].sheet_name, "users");
    assert_eq!(sheets[0].records, originals());
}

#[test]
fn test_csv_round_trip() {
    let temp = TempDir::new().unwrap();
    let titles = SheetTitle::new(vec![
        TitleNode::leaf("id", "ID"),
        TitleNode::leaf("name", "Name"),
    ]);
    let path = export_users(&temp, titles, "csv");

    let sheets = Importer::new(&path)
        .start_row(2)
        .column_fields(id_name_fields())
        .data()
        .unwrap();

    assert_eq!(sheets[0].records, originals());
}

#[test]
fn test_xlsx_headers_read_back() {
    let temp = TempDir::new().unwrap();
    let path = export_users(&temp, nested_titles(), "xlsx");

    let sheets = Importer::new(&path).end_row(2).data().unwrap();
    let headers = &sheets[0].records;

    assert_eq!(headers[0]["A"], CellValue::from("ID"));
    assert_eq!(headers[0]["B"], CellValue::from("Info"));
    assert_eq!(headers[1]["A"], CellValue::Empty);
    assert_eq!(headers[1]["B"], CellValue::from("Name"));
}

// ═══════════════════════════════════════════════════════════════════════════
// RANGES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_explicit_rows_and_columns() {
    let temp = TempDir::new().unwrap();
    let path = export_users(&temp, nested_titles(), "xlsx");

    let sheets = Importer::new(&path)
        .rows(vec![3, 5, 9])
        .columns(["A", "C"])
        .data()
        .unwrap();
    let records = &sheets[0].records;

    let entries: usize = records.iter().map(|r| r.len()).sum();
    assert_eq!(entries, 6);
    assert_eq!(records[0]["A"], CellValue::Number(1.0));
    assert_eq!(records[1]["A"], CellValue::Number(3.0));
    assert_eq!(records[2]["A"], CellValue::Empty);
    assert!(records.iter().all(|r| r["C"].is_empty()));
}

#[test]
fn test_column_range() {
    let temp = TempDir::new().unwrap();
    let path = export_users(&temp, nested_titles(), "xlsx");

    let sheets = Importer::new(&path)
        .start_row(3)
        .start_column("b")
        .end_column("b")
        .data()
        .unwrap();

    let names: Vec<&CellValue> = sheets[0].records.iter().map(|r| &r["B"]).collect();
    assert_eq!(
        names,
        vec![
            &CellValue::from("user1"),
            &CellValue::from("user2"),
            &CellValue::from("user3")
        ]
    );
}

#[test]
fn test_transform_applies_to_every_cell() {
    let temp = TempDir::new().unwrap();
    let path = export_users(&temp, nested_titles(), "xlsx");

    let mut importer = Importer::new(&path)
        .start_row(3)
        .column_fields(id_name_fields());
    let sheets = importer
        .data_with(|cell: ImportCell<'_>| match cell.field {
            "id" => CellValue::Text(format!("#{}", cell.value)),
            _ => cell.value,
        })
        .unwrap();

    assert_eq!(sheets[0].records[0]["id"], CellValue::from("#1"));
    assert_eq!(sheets[0].records[0]["name"], CellValue::from("user1"));
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET SELECTION
// ═══════════════════════════════════════════════════════════════════════════

fn three_sheet_book(temp: &TempDir) -> PathBuf {
    let sheets = ["first", "second", "third"]
        .iter()
        .enumerate()
        .map(|(i, name)| SheetData::new(*name, vec![Record::new().set("id", i as i64)]))
        .collect();
    let titles = SheetTitle::new(vec![TitleNode::leaf("id", "ID")]);

    Exporter::new(sheets)
        .titles(vec![titles.clone(), titles.clone(), titles])
        .save(temp.path(), &DatePath::None, Some("book"))
        .unwrap()
        .full_path()
}

#[test]
fn test_sheet_names() {
    let temp = TempDir::new().unwrap();
    let mut importer = Importer::new(three_sheet_book(&temp));
    assert_eq!(
        importer.sheet_names().unwrap(),
        vec!["first", "second", "third"]
    );
}

#[test]
fn test_sheet_index_and_name_union() {
    let temp = TempDir::new().unwrap();
    let sheets = Importer::new(three_sheet_book(&temp))
        .only_sheet_index(vec![0])
        .only_sheet_name(vec!["second".to_string()])
        .data()
        .unwrap();

    let names: Vec<&str> = sheets.iter().map(|s| s.sheet_name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_sheet_name_only() {
    let temp = TempDir::new().unwrap();
    let sheets = Importer::new(three_sheet_book(&temp))
        .only_sheet_name(vec!["third".to_string()])
        .start_row(2)
        .data()
        .unwrap();

    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].records[0]["A"], CellValue::Number(2.0));
}

#[test]
fn test_missing_file_is_document_error() {
    let temp = TempDir::new().unwrap();
    let result = Importer::new(temp.path().join("nope.xlsx")).data();
    assert!(matches!(
        result,
        Err(sheetbridge::BridgeError::Document(_))
    ));
}
