//! FILENAME: core/output/src/html.rs
//! PURPOSE: HTML output.
//! CONTEXT: Writes one document per driver: the header when the driver is
//! created, one fragment per item, and the footer when the driver is
//! dropped. Tables become `<table>` elements with the title as caption,
//! layers in `<thead>`, and caption and footnotes in `<tfoot>`. Cell styles
//! become inline CSS.
//!
//! Options: `bare` (omit the document wrapper), `css` (embed a stylesheet),
//! `borders` (inline border styles), `charts` (file name template for
//! images), `background-color` and `foreground-color` (chart colors).

use crate::driver::{open_output, Driver, OutputSink};
use crate::error::OutputError;
use crate::item::{ItemKind, OutputItem, TextSubtype};
use crate::options::DriverOptions;
use pivot_table::{
    BorderStyle, Color, FormatContext, GridCell, HAlign, OutputDevices, PivotTable, Stroke,
    TableGrid, VAlign, H, V,
};
use std::fs;
use std::io::Write;

const STYLESHEET: &str = "<style>
<!--
body {
  background: white;
  color: black;
  padding: 0em 12em 0em 3em;
  margin: 0
}
body>p {
  margin: 0pt 0pt 0pt 0em
}
body>p + p {
  text-indent: 1.5em;
}
h1 {
  font-size: 150%;
  margin-left: -1.33em
}
h2 {
  font-size: 125%;
  font-weight: bold;
  margin-left: -.8em
}
h3 {
  font-size: 100%;
  font-weight: bold;
  margin-left: -.5em }
h4 {
  font-size: 100%;
  margin-left: 0em
}
h1, h2, h3, h4, h5, h6 {
  font-family: sans-serif;
  color: blue
}
html {
  margin: 0
}
code {
  font-family: sans-serif
}
table {
  border-collapse: collapse;
  margin-bottom: 1em
}
caption {
  text-align: left
}
th { font-weight: normal }
a:link {
  color: #1f00ff;
}
a:visited {
  color: #9900dd;
}
a:active {
  color: red;
}
-->
</style>
";

pub struct HtmlDriver {
    file_name: String,
    device_type: OutputDevices,
    file: OutputSink,
    bare: bool,
    css: bool,
    borders: bool,
    chart_file_name: Option<String>,
    n_charts: usize,
    bg: Color,
    fg: Color,
}

impl HtmlDriver {
    pub fn create(
        file_name: &str,
        device_type: OutputDevices,
        options: &mut DriverOptions,
    ) -> Result<Self, OutputError> {
        let bare = options.parse_boolean("bare", false);
        let css = options.parse_boolean("css", true);
        let borders = options.parse_boolean("borders", true);
        let chart_file_name = options.parse_chart_file_name("charts", file_name);
        let bg = options.parse_color("background-color", Color::WHITE);
        let fg = options.parse_color("foreground-color", Color::BLACK);
        let file = open_output(file_name)?;

        let mut driver = HtmlDriver {
            file_name: file_name.to_string(),
            device_type,
            file,
            bare,
            css,
            borders,
            chart_file_name,
            n_charts: 1,
            bg,
            fg,
        };
        if !driver.bare {
            let header = driver.header();
            driver.file.write_all(header.as_bytes())?;
        }
        Ok(driver)
    }

    /// Background and foreground colors for charts.
    pub fn chart_colors(&self) -> (Color, Color) {
        (self.bg, self.fg)
    }

    fn header(&self) -> String {
        let mut out = String::from("<!doctype html>\n<html>\n<head>\n");
        out.push_str(&title_tag("title", "PSPP Output"));
        out.push_str(&format!(
            "<meta name=\"generator\" content=\"{} {}\">\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        out.push_str("<meta http-equiv=\"content-type\" content=\"text/html; charset=utf-8\">\n");
        if self.css {
            out.push_str(STYLESHEET);
        }
        out.push_str("</head>\n<body>\n");
        out
    }

    // ------------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------------

    fn render(&mut self, out: &mut String, item: &OutputItem, level: usize) {
        match &item.kind {
            ItemKind::Group(children) => {
                for child in children {
                    self.render(out, child, level + 1);
                }
            }
            ItemKind::Table(table) => {
                for layer in table.layers(true) {
                    self.put_table_layer(out, table, &layer);
                }
            }
            ItemKind::Text { subtype, .. } => {
                let text = item.plain_text();
                match subtype {
                    TextSubtype::PageTitle => {}
                    TextSubtype::Title => {
                        out.push_str(&title_tag(&format!("H{}", level.min(5)), &text));
                    }
                    TextSubtype::Syntax => {
                        out.push_str("<pre class=\"syntax\">");
                        out.push_str(&escape(&text, " ", "<br>"));
                        out.push_str("</pre>\n");
                    }
                    TextSubtype::Log => {
                        out.push_str("<p>");
                        out.push_str(&escape(&text, " ", "<br>"));
                        out.push_str("</p>\n");
                    }
                }
            }
            ItemKind::Message(diagnostic) => {
                out.push_str("<p>");
                out.push_str(&escape(&diagnostic.to_string(), " ", "<br>"));
                out.push_str("</p>\n");
            }
            ItemKind::Image(image) => {
                let Some(template) = &self.chart_file_name else {
                    return;
                };
                self.n_charts += 1;
                let target = template.replace('#', &self.n_charts.to_string());
                match fs::copy(&image.path, &target) {
                    Ok(_) => out.push_str(&format!("<img src=\"{}\">", escape(&target, " ", "\n"))),
                    Err(e) => log::error!("{}: error writing `{}`: {}", self.file_name, target, e),
                }
            }
            ItemKind::Chart(chart) => {
                log::debug!(
                    "{}: chart `{}` not drawn",
                    self.file_name,
                    chart.title.as_deref().unwrap_or("untitled")
                );
            }
            ItemKind::PageBreak => {}
        }
    }

    // ------------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------------

    fn put_table_layer(&self, out: &mut String, table: &PivotTable, layer: &[usize]) {
        let ctx = table.format_context();
        let output = table.output(layer, true);
        let body = &output.body;

        out.push_str("<table");
        if let Some(notes) = &table.notes {
            out.push_str(&format!(" title=\"{}\"", escape(notes, " ", "\n")));
        }
        out.push_str(">\n");

        if let Some(title) = &output.title {
            self.put_cell(out, &ctx, title, &title.get_cell(0, 0), "caption", None);
        }

        if let Some(layers) = &output.layers {
            out.push_str("<thead>\n");
            for y in 0..layers.n[V] {
                self.put_full_width_row(out, &ctx, layers, y, body.n[H]);
            }
            out.push_str("</thead>\n");
        }

        out.push_str("<tbody>\n");
        for y in 0..body.n[V] {
            out.push_str("<tr>\n");
            let mut x = 0;
            while x < body.n[H] {
                let cell = body.get_cell(x, y);
                if cell.is_anchor(x, y) {
                    let tag = if body.is_header(&cell) { "th" } else { "td" };
                    self.put_cell(out, &ctx, body, &cell, tag, Some(body));
                }
                x = cell.d[H][1];
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");

        if output.caption.is_some() || output.footnotes.is_some() {
            out.push_str("<tfoot>\n");
            if let Some(caption) = &output.caption {
                self.put_full_width_row(out, &ctx, caption, 0, body.n[H]);
            }
            if let Some(footnotes) = &output.footnotes {
                for y in 0..footnotes.n[V] {
                    self.put_full_width_row(out, &ctx, footnotes, y, body.n[H]);
                }
            }
            out.push_str("</tfoot>\n");
        }

        out.push_str("</table>\n\n");
    }

    /// A row holding the first cell of row `y` of `grid`, stretched across
    /// `width` body columns.
    fn put_full_width_row(&self, out: &mut String, ctx: &FormatContext, grid: &TableGrid, y: usize, width: usize) {
        let mut cell = grid.get_cell(0, y);
        cell.d[H][1] = width.max(1);
        out.push_str("<tr>\n");
        self.put_cell(out, ctx, grid, &cell, "td", None);
        out.push_str("</tr>\n");
    }

    /// Writes one cell. Borders are drawn only for body cells, which pass
    /// the body grid as `rules`.
    fn put_cell(
        &self,
        out: &mut String,
        ctx: &FormatContext,
        grid: &TableGrid,
        cell: &GridCell,
        tag: &str,
        rules: Option<&TableGrid>,
    ) {
        let style = grid.cell_style(cell);
        let mut text = String::new();
        let numeric = cell.value.format_body(ctx, &mut text);

        let mut css: Vec<String> = Vec::new();
        match style.cell.halign.interpret(numeric) {
            HAlign::Right => css.push("text-align: right".to_string()),
            HAlign::Center => css.push("text-align: center".to_string()),
            _ => {}
        }
        match style.cell.valign {
            VAlign::Top => {}
            VAlign::Center => css.push("vertical-align: middle".to_string()),
            VAlign::Bottom => css.push("vertical-align: bottom".to_string()),
        }

        let font = &style.font;
        let stripe = cell.d[V][0] % 2;
        if let Some(bg) = css_color(font.bg[stripe], Color::WHITE) {
            css.push(format!("background: {}", bg));
        }
        if let Some(fg) = css_color(font.fg[stripe], Color::BLACK) {
            css.push(format!("color: {}", fg));
        }
        if let Some(typeface) = &font.typeface {
            css.push(format!(
                "font-family: &quot;{}&quot;, sans-serif",
                escape(typeface, " ", " ")
            ));
        }
        if font.bold {
            css.push("font-weight: bold".to_string());
        }
        if font.italic {
            css.push("font-style: italic".to_string());
        }
        if font.underline {
            css.push("text-decoration: underline".to_string());
        }
        if font.size != 0 {
            css.push(format!("font-size: {}pt", font.size));
        }

        if let (Some(rules), true) = (rules, self.borders) {
            let [[x0, x1], [y0, y1]] = cell.d;
            push_border(&mut css, "top", rules.get_rule(V, x0, y0));
            push_border(&mut css, "left", rules.get_rule(H, x0, y0));
            if y1 == rules.n[V] {
                push_border(&mut css, "bottom", rules.get_rule(V, x0, y1));
            }
            if x1 == rules.n[H] {
                push_border(&mut css, "right", rules.get_rule(H, x1, y0));
            }
        }

        out.push('<');
        out.push_str(tag);
        if !css.is_empty() {
            out.push_str(&format!(" style=\"{}\"", css.join("; ")));
        }
        if cell.colspan() > 1 {
            out.push_str(&format!(" colspan=\"{}\"", cell.colspan()));
        }
        if cell.rowspan() > 1 {
            out.push_str(&format!(" rowspan=\"{}\"", cell.rowspan()));
        }
        out.push('>');

        out.push_str(&escape(text.trim_start(), " ", "<br>"));

        let subscripts = cell.value.subscripts();
        if !subscripts.is_empty() {
            let parts: Vec<String> = subscripts
                .iter()
                .map(|s| escape(s, "&nbsp;", "<br>"))
                .collect();
            out.push_str(&format!("<sub>{}</sub>", parts.join(",")));
        }

        let markers: Vec<String> = cell
            .value
            .footnote_indexes()
            .iter()
            .filter_map(|&idx| ctx.footnotes.get(idx))
            .filter(|f| f.show)
            .map(|f| escape(&f.marker_text(ctx), " ", "<br>"))
            .collect();
        if !markers.is_empty() {
            out.push_str(&format!("<sup>{}</sup>", markers.join(",")));
        }

        out.push_str(&format!("</{}>\n", tag));
    }
}

impl Driver for HtmlDriver {
    fn name(&self) -> &str {
        "html"
    }

    fn device_type(&self) -> OutputDevices {
        self.device_type
    }

    fn handles_groups(&self) -> bool {
        true
    }

    fn submit(&mut self, item: &OutputItem) {
        let mut out = String::new();
        self.render(&mut out, item, 1);
        if let Err(e) = self.file.write_all(out.as_bytes()) {
            log::error!("{}: error writing output: {}", self.file_name, e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            log::error!("{}: error flushing output: {}", self.file_name, e);
        }
    }
}

impl Drop for HtmlDriver {
    fn drop(&mut self) {
        if !self.bare {
            let footer = "</body>\n</html>\n<!-- end of file -->\n";
            if let Err(e) = self.file.write_all(footer.as_bytes()) {
                log::error!("{}: error writing output: {}", self.file_name, e);
            }
        }
        self.flush();
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Escapes HTML special characters, replacing spaces by `space` and
/// newlines by `newline`.
pub fn escape(text: &str, space: &str, newline: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str(newline),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ' ' => out.push_str(space),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn title_tag(tag: &str, content: &str) -> String {
    format!("<{}>{}</{}>\n", tag, escape(content, " ", " - "), tag)
}

/// The CSS for `color`, or `None` if it equals the default.
fn css_color(color: Color, default: Color) -> Option<String> {
    (color != default).then(|| color.to_css())
}

fn push_border(css: &mut Vec<String>, side: &str, style: Option<BorderStyle>) {
    let Some(style) = style else {
        return;
    };
    let stroke = match style.stroke {
        Stroke::None => return,
        Stroke::Solid => "solid",
        Stroke::Dashed => "dashed",
        Stroke::Thick => "thick solid",
        Stroke::Thin => "thin solid",
        Stroke::Double => "double",
    };
    match css_color(style.color, Color::BLACK) {
        Some(color) => css.push(format!("border-{}: {} {}", side, stroke, color)),
        None => css.push(format!("border-{}: {}", side, stroke)),
    }
}
