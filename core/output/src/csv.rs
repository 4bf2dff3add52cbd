//! FILENAME: core/output/src/csv.rs
//! PURPOSE: Comma-separated values output.
//! CONTEXT: Each item becomes one or more CSV records, with a blank line
//! between items. Table cells are written at their anchor position and
//! left empty at the other positions they cover. Title, layer, caption and
//! footnote rows carry a leading `Table: `, `Layer: `, `Caption: ` or
//! `Footnote: ` label.
//!
//! Options: `separator` (default `,`), `quote` (default `"`, empty to never
//! quote), `titles` and `captions` (both default on).

use crate::driver::{open_output, Driver, OutputSink};
use crate::error::OutputError;
use crate::item::{ItemKind, OutputItem, TextSubtype};
use crate::options::DriverOptions;
use pivot_table::{FormatContext, OutputDevices, PivotTable, TableGrid, H, V};
use std::io::{self, Write};

pub struct CsvDriver {
    file_name: String,
    device_type: OutputDevices,
    file: OutputSink,
    separator: String,
    quote: Option<char>,
    /// Characters that force a field to be quoted.
    quote_set: String,
    titles: bool,
    captions: bool,
    n_items: usize,
}

impl CsvDriver {
    pub fn create(
        file_name: &str,
        device_type: OutputDevices,
        options: &mut DriverOptions,
    ) -> Result<Self, OutputError> {
        let separator = options.parse_string("separator", ",");
        let quote = options.parse_string("quote", "\"").chars().next();
        let titles = options.parse_boolean("titles", true);
        let captions = options.parse_boolean("captions", true);
        let file = open_output(file_name)?;

        let mut quote_set = format!("\n\r\t{}", separator);
        quote_set.extend(quote);
        Ok(CsvDriver {
            file_name: file_name.to_string(),
            device_type,
            file,
            separator,
            quote,
            quote_set,
            titles,
            captions,
            n_items: 0,
        })
    }

    // ------------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------------

    /// Appends `field` with its leading spaces removed, quoted if it contains
    /// a separator, quote or line break character.
    fn put_field(&self, out: &mut String, field: &str) {
        let field = field.trim_start_matches(' ');
        match self.quote {
            Some(quote) if field.contains(|c: char| self.quote_set.contains(c)) => {
                out.push(quote);
                for c in field.chars() {
                    if c == quote {
                        out.push(quote);
                    }
                    out.push(c);
                }
                out.push(quote);
            }
            _ => out.push_str(field),
        }
    }

    /// Separates this item from the previous one by a blank line.
    fn put_separator(&mut self, out: &mut String) {
        if self.n_items > 0 {
            out.push('\n');
        }
        self.n_items += 1;
    }

    /// Writes each line of `text` as a one-field record.
    fn put_lines(&self, out: &mut String, text: &str) {
        for line in text.split('\n') {
            self.put_field(out, line);
            out.push('\n');
        }
    }

    // ------------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------------

    fn put_grid(&self, out: &mut String, grid: Option<&TableGrid>, ctx: &FormatContext, leader: Option<&str>) {
        let Some(grid) = grid else {
            return;
        };
        for y in 0..grid.n[V] {
            for x in 0..grid.n[H] {
                if x > 0 {
                    out.push_str(&self.separator);
                }
                let cell = grid.get_cell(x, y);
                if !cell.is_anchor(x, y) {
                    continue;
                }
                let mut text = String::new();
                if let (0, Some(leader)) = (x, leader) {
                    text.push_str(leader);
                    text.push_str(": ");
                }
                cell.value.format(ctx, &mut text);
                self.put_field(out, &text);
            }
            out.push('\n');
        }
    }

    fn put_table(&self, out: &mut String, table: &PivotTable) {
        let ctx = table.format_context();
        for layer in table.layers(true) {
            let output = table.output(&layer, true);
            if self.titles {
                self.put_grid(out, output.title.as_ref(), &ctx, Some("Table"));
                self.put_grid(out, output.layers.as_ref(), &ctx, Some("Layer"));
            }
            self.put_grid(out, Some(&output.body), &ctx, None);
            if self.captions {
                self.put_grid(out, output.caption.as_ref(), &ctx, Some("Caption"));
                self.put_grid(out, output.footnotes.as_ref(), &ctx, Some("Footnote"));
            }
        }
    }

    fn render(&mut self, item: &OutputItem) -> String {
        let mut out = String::new();
        match &item.kind {
            ItemKind::Table(table) => {
                self.put_separator(&mut out);
                self.put_table(&mut out, table);
            }
            ItemKind::Text { subtype, .. } => {
                if !matches!(subtype, TextSubtype::Syntax | TextSubtype::PageTitle) {
                    self.put_separator(&mut out);
                    self.put_lines(&mut out, &item.plain_text());
                }
            }
            ItemKind::Message(diagnostic) => {
                self.put_separator(&mut out);
                self.put_field(&mut out, &diagnostic.to_string());
                out.push('\n');
            }
            ItemKind::PageBreak => {
                self.put_separator(&mut out);
                self.put_lines(&mut out, "");
            }
            ItemKind::Chart(_) | ItemKind::Image(_) | ItemKind::Group(_) => {}
        }
        out
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.file.write_all(text.as_bytes())
    }
}

impl Driver for CsvDriver {
    fn name(&self) -> &str {
        "csv"
    }

    fn device_type(&self) -> OutputDevices {
        self.device_type
    }

    fn submit(&mut self, item: &OutputItem) {
        let text = self.render(item);
        if let Err(e) = self.write(&text) {
            log::error!("{}: error writing output: {}", self.file_name, e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            log::error!("{}: error flushing output: {}", self.file_name, e);
        }
    }
}

impl Drop for CsvDriver {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn driver(pairs: &[(&str, &str)]) -> CsvDriver {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut options = DriverOptions::new("csv", map);
        CsvDriver::create("-", OutputDevices::TERMINAL, &mut options).unwrap()
    }

    fn field(driver: &CsvDriver, text: &str) -> String {
        let mut out = String::new();
        driver.put_field(&mut out, text);
        out
    }

    #[test]
    fn test_field_quoting() {
        let d = driver(&[]);
        assert_eq!(field(&d, "plain"), "plain");
        assert_eq!(field(&d, "   padded"), "padded");
        assert_eq!(field(&d, "a,b"), "\"a,b\"");
        assert_eq!(field(&d, "say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(field(&d, "two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_custom_separator_and_no_quote() {
        let d = driver(&[("separator", ";"), ("quote", "")]);
        assert_eq!(field(&d, "a;b"), "a;b");

        let d = driver(&[("separator", ";"), ("quote", "'")]);
        assert_eq!(field(&d, "a;b"), "'a;b'");
        assert_eq!(field(&d, "a,b"), "a,b");
        assert_eq!(field(&d, "it's"), "'it''s'");
    }

    #[test]
    fn test_items_separated_by_blank_line() {
        let mut d = driver(&[]);
        assert_eq!(d.render(&OutputItem::text(TextSubtype::Log, "one\ntwo")), "one\ntwo\n");
        assert_eq!(d.render(&OutputItem::text(TextSubtype::Syntax, "LIST.")), "");
        assert_eq!(d.render(&OutputItem::page_break()), "\n\n");
        assert_eq!(d.render(&OutputItem::text(TextSubtype::Title, "x")), "\nx\n");
    }
}
