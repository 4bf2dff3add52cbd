//! Integration tests: plain text rendering of tables and other items.

use output::{driver_create, Diagnostic, Driver, OutputItem, TextSubtype};
use pivot_table::{Axis, PivotTable, Value};
use std::collections::BTreeMap;

fn render(extra: &[(&str, &str)], items: &[OutputItem]) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listing.txt");
    let mut options: BTreeMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    options.insert("output-file".into(), path.to_string_lossy().into_owned());

    let (mut driver, warnings) = driver_create(options).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    assert_eq!(driver.name(), "txt");
    for item in items {
        driver.submit(item);
    }
    drop(driver);
    std::fs::read_to_string(&path).unwrap()
}

#[test]
fn boxed_single_cell_table() {
    let mut table = PivotTable::new(Value::text("Default Title"));
    table.create_dimension_with_leaves(Axis::Row, "A", &["x"]);
    table.create_dimension_with_leaves(Axis::Column, "B", &["y"]);
    table.put(&[0, 0], Value::number(3.14));

    let text = render(&[], &[OutputItem::table(table)]);
    assert_eq!(
        text,
        "Default Title\n\
         +=+====+\n\
         | | y  |\n\
         +=+====+\n\
         |x|3.14|\n\
         +=+====+\n"
    );
}

#[test]
fn wide_table_splits_into_pages_with_row_headings() {
    let columns = ["c1", "c2", "c3", "c4", "c5", "c6"];
    let mut table = PivotTable::new(Value::text("Wide"));
    table.create_dimension_with_leaves(Axis::Row, "R", &["row"]);
    table.create_dimension_with_leaves(Axis::Column, "C", &columns);
    for c in 0..columns.len() {
        table.put(&[0, c], Value::number(1000.25));
    }

    let text = render(&[("width", "30")], &[OutputItem::table(table)]);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.iter().all(|line| line.chars().count() <= 30), "{}", text);
    assert_eq!(lines.iter().filter(|line| line.contains("|row|")).count(), 2);
    for column in columns {
        assert!(text.contains(column), "missing {} in\n{}", column, text);
    }
    assert_eq!(text.matches("1000.25").count(), 6);
}

#[test]
fn items_are_separated_by_blank_lines() {
    let items = [
        OutputItem::text(TextSubtype::Title, "Results"),
        OutputItem::text(TextSubtype::PageTitle, "ignored"),
        OutputItem::message(Diagnostic::note("2 cases skipped")),
    ];
    let text = render(&[], &items);
    assert_eq!(text, "Results\n\nnote: 2 cases skipped\n");
}

#[test]
fn page_break_is_a_form_feed() {
    let items = [
        OutputItem::text(TextSubtype::Log, "first"),
        OutputItem::page_break(),
        OutputItem::text(TextSubtype::Log, "second"),
    ];
    let text = render(&[], &items);
    assert_eq!(text, "first\n\x0csecond\n");
}

#[test]
fn long_output_is_paginated() {
    let lines: Vec<String> = (1..=5).map(|i| format!("line {}", i)).collect();
    let text = render(
        &[("length", "2")],
        &[OutputItem::text(TextSubtype::Log, lines.join("\n"))],
    );
    assert_eq!(text, "line 1\nline 2\n\x0cline 3\nline 4\n\x0cline 5\n");
}
