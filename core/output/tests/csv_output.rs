//! Integration tests: tables, texts and messages written through the CSV
//! driver.

use output::{driver_create, Diagnostic, Driver, OutputItem, TextSubtype};
use pivot_table::{Axis, Look, PivotTable, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Creates a CSV driver writing to a temporary file with the given extra
/// options, feeds it `items`, and returns what it wrote.
fn render(extra: &[(&str, &str)], items: &[OutputItem]) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut options: BTreeMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    options.insert("output-file".into(), path.to_string_lossy().into_owned());

    let (mut driver, warnings) = driver_create(options).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    assert_eq!(driver.name(), "csv");
    for item in items {
        driver.submit(item);
    }
    drop(driver);
    std::fs::read_to_string(&path).unwrap()
}

fn single_cell(title: &str, value: Value) -> PivotTable {
    let mut table = PivotTable::new(Value::text(title));
    table.create_dimension_with_leaves(Axis::Row, "A", &["x"]);
    table.create_dimension_with_leaves(Axis::Column, "B", &["y"]);
    table.put(&[0, 0], value);
    table
}

fn footnoted(look: Look) -> PivotTable {
    let mut table = single_cell("Notes", Value::number(3.14)).with_look(Arc::new(look));
    let first = table.create_footnote(Value::text("First"));
    let second = table.create_footnote(Value::text("Second"));
    table.put(&[0, 0], Value::number(3.14).with_footnote(first).with_footnote(second));
    table
}

#[test]
fn single_cell_table() {
    let table = single_cell("Default Title", Value::number(3.14));
    let csv = render(&[], &[OutputItem::table(table)]);
    assert_eq!(csv, "Table: Default Title\n,y\nx,3.14\n");
}

#[test]
fn field_with_separator_is_quoted() {
    let table = single_cell("Quoting", Value::text("a,b"));
    let csv = render(&[], &[OutputItem::table(table)]);
    assert_eq!(csv, "Table: Quoting\n,y\nx,\"a,b\"\n");
}

#[test]
fn titles_off_omits_title_row() {
    let table = single_cell("Hidden", Value::number(1.0));
    let csv = render(&[("titles", "false")], &[OutputItem::table(table)]);
    assert_eq!(csv, ",y\nx,1.00\n");
}

#[test]
fn alphabetic_footnote_markers() {
    let csv = render(&[], &[OutputItem::table(footnoted(Look::builtin_default()))]);
    assert_eq!(
        csv,
        "Table: Notes\n,y\nx,3.14[a][b]\nFootnote: a. First\nFootnote: b. Second\n"
    );
}

#[test]
fn numeric_footnote_markers() {
    let mut look = Look::builtin_default();
    look.show_numeric_markers = true;
    let csv = render(&[], &[OutputItem::table(footnoted(look))]);
    assert_eq!(
        csv,
        "Table: Notes\n,y\nx,3.14[1][2]\nFootnote: 1. First\nFootnote: 2. Second\n"
    );
}

#[test]
fn captions_off_omits_caption_and_footnotes() {
    let table = footnoted(Look::builtin_default()).with_caption(Value::text("Source: survey"));
    let with = render(&[], &[OutputItem::table(table.clone())]);
    assert!(with.contains("Caption: Source: survey\n"));

    let without = render(&[("captions", "false")], &[OutputItem::table(table)]);
    assert_eq!(without, "Table: Notes\n,y\nx,3.14[a][b]\n");
}

#[test]
fn hidden_footnotes_are_neither_marked_nor_listed() {
    let mut table = footnoted(Look::builtin_default());
    table.footnote_mut(0).unwrap().show = false;
    let csv = render(&[], &[OutputItem::table(table)]);
    assert_eq!(csv, "Table: Notes\n,y\nx,3.14[b]\nFootnote: b. Second\n");
}

#[test]
fn texts_and_messages() {
    let items = [
        OutputItem::text(TextSubtype::Title, "Summary"),
        OutputItem::text(TextSubtype::Syntax, "FREQUENCIES x."),
        OutputItem::message(Diagnostic::error("no cases")),
        OutputItem::text(TextSubtype::Log, "line one\nline, two"),
    ];
    let csv = render(&[], &items);
    assert_eq!(
        csv,
        "Summary\n\nerror: no cases\n\nline one\n\"line, two\"\n"
    );
}

#[test]
fn custom_separator() {
    let table = single_cell("Semi", Value::text("a,b"));
    let csv = render(&[("separator", ";")], &[OutputItem::table(table)]);
    assert_eq!(csv, "Table: Semi\n;y\nx;a,b\n");
}
