//! Integration tests: loading looks from disk and making them the default.

use pivot_table::{set_default_look, Area, Look, LookError, PivotTable, Stroke, Value};
use std::io::Write;

const LOOK_XML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<tableProperties xmlns:vizml="http://www.ibm.com/software/analytics/spss/xml/visualization">
  <generalProperties hideEmptyRows="false"/>
  <footnoteProperties numberFormat="numeric"/>
  <borderProperties>
    <horizontalDimensionBorderRows borderStyleType="none"/>
  </borderProperties>
</tableProperties>"##;

#[test]
fn stt_file_names_unnamed_look_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Academic.stt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(LOOK_XML.as_bytes()).unwrap();
    drop(file);

    let look = Look::read_stt(&path).unwrap();
    assert_eq!(look.name.as_deref(), Some("Academic"));
    assert!(!look.omit_empty);
    assert!(look.show_numeric_markers);
}

#[test]
fn missing_stt_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Look::read_stt(&dir.path().join("absent.stt")).unwrap_err();
    assert!(matches!(err, LookError::Io(_)));
}

#[test]
fn json_round_trip_keeps_styles() {
    let mut look = Look::builtin_default();
    look.area_mut(Area::Title).font.bold = false;
    look.borders[0].stroke = Stroke::Double;

    let json = look.to_json().unwrap();
    let back = Look::from_json(&json).unwrap();
    assert_eq!(back, look);
}

#[test]
fn default_look_applies_to_new_tables_only() {
    let before = PivotTable::new(Value::text("before"));

    let mut look = Look::builtin_default();
    look.name = Some("Custom".to_string());
    set_default_look(look);

    let after = PivotTable::new(Value::text("after"));
    assert_eq!(after.look.name.as_deref(), Some("Custom"));
    assert_eq!(before.look.name, None);

    set_default_look(Look::builtin_default());
}
