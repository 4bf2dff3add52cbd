//! Integration tests: HTML documents produced through the engine.

use output::{driver_create, Engine, OutputItem, TextSubtype};
use pivot_table::{Axis, PivotTable, Value};
use std::collections::BTreeMap;

fn render(extra: &[(&str, &str)], submit: impl FnOnce(&mut Engine)) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.html");
    let mut options: BTreeMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    options.insert("output-file".into(), path.to_string_lossy().into_owned());

    let (driver, warnings) = driver_create(options).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    let mut engine = Engine::new();
    engine.register(driver);
    submit(&mut engine);
    engine.flush();
    drop(engine);
    std::fs::read_to_string(&path).unwrap()
}

fn table() -> PivotTable {
    let mut table = PivotTable::new(Value::text("Scores & Ranks"));
    table.create_dimension_with_leaves(Axis::Row, "Student", &["ann", "bob"]);
    table.create_dimension_with_leaves(Axis::Column, "Measure", &["score"]);
    let note = table.create_footnote(Value::text("Rounded"));
    table.put(&[0, 0], Value::number(91.5).with_footnote(note));
    let mut low = Value::number(78.25);
    low.add_subscript("est");
    table.put(&[1, 0], low);
    table.notes = Some("Fall \"term\"".to_string());
    table
}

#[test]
fn document_wrapper_and_table_structure() {
    let html = render(&[], |engine| engine.submit(OutputItem::table(table())));

    assert!(html.starts_with("<!doctype html>\n<html>\n<head>\n<title>PSPP Output</title>\n"));
    assert!(html.contains("<style>\n"));
    assert!(html.ends_with("</body>\n</html>\n<!-- end of file -->\n"));

    assert!(html.contains("<table title=\"Fall &quot;term&quot;\">\n"));
    assert!(html.contains(">Scores &amp; Ranks</caption>\n"));
    assert!(html.contains("<tbody>\n"));
    assert!(html.contains(">ann</th>\n"));
    assert!(html.contains(">91.50<sup>a</sup></td>\n"));
    assert!(html.contains(">78.25<sub>est</sub></td>\n"));
    assert!(html.contains("<tfoot>\n<tr>\n"));
    assert!(html.contains(">a. Rounded</td>\n"));
    assert!(html.contains("</table>\n\n"));
}

#[test]
fn cell_styles_and_borders() {
    let html = render(&[], |engine| engine.submit(OutputItem::table(table())));
    assert!(html.contains("text-align: right"));
    assert!(html.contains("border-top: thick solid"));
    assert!(html.contains("font-family: &quot;"));

    let plain = render(&[("borders", "off")], |engine| {
        engine.submit(OutputItem::table(table()))
    });
    assert!(!plain.contains("border-top:"));
    assert!(!plain.contains("border-left:"));
}

#[test]
fn bare_document_without_css() {
    let html = render(&[("bare", "true"), ("css", "false")], |engine| {
        engine.output_log("plain <text>");
    });
    assert_eq!(html, "<p>plain &lt;text&gt;</p>\n");
}

#[test]
fn groups_nest_headings() {
    let html = render(&[("bare", "true")], |engine| {
        engine.submit(OutputItem::text(TextSubtype::Title, "Top"));
        engine.flush();
        let level = engine.open_group(OutputItem::group(Some("DESCRIPTIVES".into())));
        engine.submit(OutputItem::text(TextSubtype::Title, "Inner"));
        engine.submit(OutputItem::text(TextSubtype::Syntax, "DESCRIPTIVES x."));
        engine.close_groups(level);
    });
    assert_eq!(html, "<H1>Top</H1>\n<H2>Inner</H2>\n");
}
