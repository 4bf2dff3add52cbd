//! Integration test: routing items to drivers by device type. Kept in its
//! own test binary because it changes the process-wide routing table.

use output::{driver_create, Diagnostic, Driver, Engine, OutputItem, TextSubtype};
use pivot_table::{settings, update_settings, Axis, OutputDevices, OutputType, PivotTable, Value};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Counts the items passed on to the driver it wraps.
struct Counting {
    inner: Box<dyn Driver>,
    count: Rc<Cell<usize>>,
}

impl Driver for Counting {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn device_type(&self) -> OutputDevices {
        self.inner.device_type()
    }

    fn submit(&mut self, item: &OutputItem) {
        self.count.set(self.count.get() + 1);
        self.inner.submit(item);
    }
}

fn counting(options: &[(&str, String)]) -> (Box<dyn Driver>, Rc<Cell<usize>>) {
    let map: BTreeMap<String, String> = options
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    let (inner, warnings) = driver_create(map).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    let count = Rc::new(Cell::new(0));
    let driver = Counting {
        inner,
        count: count.clone(),
    };
    (Box::new(driver), count)
}

#[test]
fn notes_reach_only_drivers_on_the_note_route() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("out.csv");
    let txt_path = dir.path().join("out.txt");

    let (csv, csv_count) = counting(&[
        ("output-file", csv_path.to_string_lossy().into_owned()),
        ("device", "listing".to_string()),
    ]);
    let (txt, txt_count) = counting(&[
        ("output-file", txt_path.to_string_lossy().into_owned()),
        ("device", "terminal".to_string()),
    ]);
    assert_eq!(csv.device_type(), OutputDevices::LISTING);
    assert_eq!(txt.device_type(), OutputDevices::TERMINAL);

    let saved = settings();
    update_settings(|s| s.set_output_routing(OutputType::Note, OutputDevices::LISTING));

    let mut engine = Engine::new();
    engine.register(csv);
    engine.register(txt);
    assert_eq!(engine.driver_count(), 2);

    engine.submit(OutputItem::message(Diagnostic::note("listing only")));
    assert_eq!((csv_count.get(), txt_count.get()), (1, 0));

    engine.submit(OutputItem::message(Diagnostic::warning("everywhere")));
    assert_eq!((csv_count.get(), txt_count.get()), (2, 1));

    let mut table = PivotTable::new(Value::text("T"));
    table.create_dimension_with_leaves(Axis::Row, "A", &["x"]);
    table.put(&[0], Value::number(1.0));
    engine.submit(OutputItem::table(table));
    assert_eq!((csv_count.get(), txt_count.get()), (3, 2));

    // Syntax is routed nowhere by default.
    engine.submit(OutputItem::text(TextSubtype::Syntax, "LIST."));
    engine.flush();
    assert_eq!((csv_count.get(), txt_count.get()), (3, 2));

    drop(engine);
    update_settings(|s| *s = saved);

    let csv_text = std::fs::read_to_string(&csv_path).unwrap();
    let txt_text = std::fs::read_to_string(&txt_path).unwrap();
    assert!(csv_text.starts_with("note: listing only\n"));
    assert!(!csv_text.contains("LIST."));
    assert!(!txt_text.contains("listing only"));
    assert!(txt_text.contains("warning: everywhere"));
    assert!(!txt_text.contains("LIST."));
}
