//! FILENAME: core/output/src/txt.rs
//! PURPOSE: Plain text output for terminals and listing files.
//! CONTEXT: Table bodies are drawn on a character canvas with ASCII rules:
//! `-` for ordinary horizontal rules, `=` for thick and double ones, `|` for
//! vertical rules and `+` where rules cross. A rule line or column is only
//! reserved where the table actually draws a rule. Tables wider than the
//! page are split into horizontal pages of whole columns, repeating the row
//! headings on each page when they leave enough room.
//!
//! Options: `width` (default 79), `length` (lines per page in listing
//! files, default 66, 0 for no paging), `min-hbreak` (the narrowest data
//! area worth repeating row headings for; -1 means half the width).

use crate::driver::{open_output, Driver, OutputSink};
use crate::error::OutputError;
use crate::item::{ItemKind, OutputItem, TextSubtype};
use crate::options::DriverOptions;
use pivot_table::{FormatContext, HAlign, OutputDevices, PivotTable, Stroke, TableGrid, VAlign, H, V};
use std::io::Write;
use std::ops::Range;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Fills the second column of a double-width character.
const WIDE_TAIL: char = '\0';

pub struct TextDriver {
    file_name: String,
    device_type: OutputDevices,
    file: OutputSink,
    width: usize,
    length: usize,
    min_hbreak: usize,
    lines_on_page: usize,
    n_items: usize,
}

impl TextDriver {
    pub fn create(
        file_name: &str,
        device_type: OutputDevices,
        options: &mut DriverOptions,
    ) -> Result<Self, OutputError> {
        let width = options.parse_int("width", 79, 1, i32::MAX) as usize;
        let length = options.parse_int("length", 66, 0, i32::MAX) as usize;
        let min_hbreak = match options.parse_int("min-hbreak", -1, -1, i32::MAX) {
            -1 => width / 2,
            n => n as usize,
        };
        let file = open_output(file_name)?;
        Ok(TextDriver {
            file_name: file_name.to_string(),
            device_type,
            file,
            width,
            length,
            min_hbreak,
            lines_on_page: 0,
            n_items: 0,
        })
    }

    fn paginates(&self) -> bool {
        self.length > 0 && self.device_type != OutputDevices::TERMINAL
    }

    // ------------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------------

    fn render(&self, item: &OutputItem) -> Vec<String> {
        match &item.kind {
            ItemKind::Table(table) => render_table(table, self.width, self.min_hbreak),
            ItemKind::Text { subtype, .. } => match subtype {
                TextSubtype::PageTitle => Vec::new(),
                _ => item.plain_text().split('\n').map(str::to_string).collect(),
            },
            ItemKind::Message(diagnostic) => {
                diagnostic.to_string().split('\n').map(str::to_string).collect()
            }
            ItemKind::Group(children) => {
                let mut lines = Vec::new();
                for child in children {
                    let child_lines = self.render(child);
                    if !lines.is_empty() && !child_lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.extend(child_lines);
                }
                lines
            }
            ItemKind::Chart(chart) => {
                log::debug!(
                    "{}: chart `{}` not drawn",
                    self.file_name,
                    chart.title.as_deref().unwrap_or("untitled")
                );
                Vec::new()
            }
            ItemKind::Image(_) | ItemKind::PageBreak => Vec::new(),
        }
    }

    /// Writes `lines`, starting a new page whenever the current one is full.
    fn write_lines(&mut self, lines: &[String]) -> std::io::Result<()> {
        let mut out = String::new();
        for line in lines {
            if self.paginates() && self.lines_on_page >= self.length {
                out.push('\x0c');
                self.lines_on_page = 0;
            }
            out.push_str(line.trim_end());
            out.push('\n');
            self.lines_on_page += 1;
        }
        self.file.write_all(out.as_bytes())
    }

    fn page_break(&mut self) -> std::io::Result<()> {
        if self.lines_on_page == 0 {
            return Ok(());
        }
        self.lines_on_page = 0;
        self.n_items = 0;
        self.file.write_all(b"\x0c")
    }
}

impl Driver for TextDriver {
    fn name(&self) -> &str {
        "txt"
    }

    fn device_type(&self) -> OutputDevices {
        self.device_type
    }

    fn submit(&mut self, item: &OutputItem) {
        let result = if let ItemKind::PageBreak = item.kind {
            self.page_break()
        } else {
            let mut lines = self.render(item);
            if lines.is_empty() {
                return;
            }
            if self.n_items > 0 && self.lines_on_page > 0 {
                lines.insert(0, String::new());
            }
            self.n_items += 1;
            self.write_lines(&lines)
        };
        if let Err(e) = result {
            log::error!("{}: error writing output: {}", self.file_name, e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            log::error!("{}: error flushing output: {}", self.file_name, e);
        }
    }
}

impl Drop for TextDriver {
    fn drop(&mut self) {
        self.flush();
    }
}

// ============================================================================
// TABLES
// ============================================================================

/// Renders every layer of `table` that printing shows, one after another.
fn render_table(table: &PivotTable, width: usize, min_hbreak: usize) -> Vec<String> {
    let ctx = table.format_context();
    let mut lines = Vec::new();
    for layer in table.layers(true) {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        let output = table.output(&layer, true);
        let pages = render_body(&output.body, &ctx, width, min_hbreak);
        let body_width = pages
            .iter()
            .flatten()
            .map(|line| line.width())
            .max()
            .unwrap_or(0)
            .min(width);

        if let Some(title) = &output.title {
            for line in grid_lines(title, &ctx) {
                lines.push(align(&line, body_width.max(line.width()), HAlign::Center));
            }
        }
        if let Some(layers) = &output.layers {
            lines.extend(grid_lines(layers, &ctx));
        }
        for (i, page) in pages.into_iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(page);
        }
        for grid in [&output.caption, &output.footnotes].into_iter().flatten() {
            lines.extend(grid_lines(grid, &ctx));
        }
    }
    lines
}

/// The text of every anchor of a one-column grid, line by line.
fn grid_lines(grid: &TableGrid, ctx: &FormatContext) -> Vec<String> {
    grid.anchors()
        .flat_map(|(_, _, cell)| {
            cell.value
                .to_string_with(ctx)
                .split('\n')
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Pads `text` to `width` columns as `halign` says.
fn align(text: &str, width: usize, halign: HAlign) -> String {
    let slack = width.saturating_sub(text.width());
    let left = match halign {
        HAlign::Right => slack,
        HAlign::Center => slack / 2,
        _ => 0,
    };
    format!("{}{}", " ".repeat(left), text)
}

/// Character positions along one axis of the body.
struct AxisLayout {
    /// Start of each boundary, `n + 1` entries.
    rule_pos: Vec<usize>,
    /// Width of each boundary: 1 where a rule or gap is reserved, else 0.
    rule_size: Vec<usize>,
    /// Start of each row or column's content.
    cell_pos: Vec<usize>,
    cell_size: Vec<usize>,
    total: usize,
}

impl AxisLayout {
    fn new(cell_size: Vec<usize>, rule_size: Vec<usize>) -> Self {
        let n = cell_size.len();
        let mut rule_pos = Vec::with_capacity(n + 1);
        let mut cell_pos = Vec::with_capacity(n);
        let mut pos = 0;
        for i in 0..n {
            rule_pos.push(pos);
            pos += rule_size[i];
            cell_pos.push(pos);
            pos += cell_size[i];
        }
        rule_pos.push(pos);
        pos += rule_size[n];
        AxisLayout {
            rule_pos,
            rule_size,
            cell_pos,
            cell_size,
            total: pos,
        }
    }

    /// Content extent of cells `range`, including the boundaries between
    /// them.
    fn span(&self, range: Range<usize>) -> Range<usize> {
        let start = self.cell_pos[range.start];
        let last = range.end - 1;
        start..self.cell_pos[last] + self.cell_size[last]
    }

    /// Characters occupied by cells `range` together with their outer
    /// boundaries, or only the right one if `with_left` is false.
    fn extent(&self, range: Range<usize>, with_left: bool) -> Range<usize> {
        let start = if with_left {
            self.rule_pos[range.start]
        } else {
            self.cell_pos[range.start]
        };
        start..self.rule_pos[range.end] + self.rule_size[range.end]
    }
}

/// A grid of characters.
struct Canvas {
    rows: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Canvas {
            rows: vec![vec![' '; width]; height],
        }
    }

    fn get(&self, x: usize, y: usize) -> char {
        self.rows.get(y).and_then(|row| row.get(x)).copied().unwrap_or(' ')
    }

    fn put(&mut self, x: usize, y: usize, c: char) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = c;
        }
    }

    /// Writes `text` at (x, y), clipped to `max_width` columns.
    fn put_text(&mut self, x: usize, y: usize, max_width: usize, text: &str) {
        let mut used = 0;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            if used + w > max_width {
                break;
            }
            self.put(x + used, y, c);
            if w == 2 {
                self.put(x + used + 1, y, WIDE_TAIL);
            }
            used += w;
        }
    }

    fn line(&self, y: usize, ranges: &[Range<usize>]) -> String {
        let row = &self.rows[y];
        ranges
            .iter()
            .flat_map(|r| row[r.clone()].iter())
            .filter(|&&c| c != WIDE_TAIL)
            .collect()
    }
}

fn is_horizontal_rule(c: char) -> bool {
    c == '-' || c == '='
}

fn rule_char(stroke: Stroke, horizontal: bool) -> Option<char> {
    match stroke {
        Stroke::None => None,
        _ if !horizontal => Some('|'),
        Stroke::Thick | Stroke::Double => Some('='),
        _ => Some('-'),
    }
}

/// Draws the body and splits it into horizontal pages, each a list of
/// lines.
fn render_body(body: &TableGrid, ctx: &FormatContext, width: usize, min_hbreak: usize) -> Vec<Vec<String>> {
    let [nc, nr] = body.n;
    if nc == 0 || nr == 0 {
        return Vec::new();
    }

    // Cell text, keyed by anchor.
    let cells: Vec<_> = body
        .anchors()
        .map(|(_, _, cell)| {
            let mut text = String::new();
            let numeric = cell.value.format(ctx, &mut text);
            let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
            (cell, numeric, lines)
        })
        .collect();

    let stroke_at = |axis: usize, x: usize, y: usize| -> Option<char> {
        body.get_rule(axis, x, y)
            .and_then(|style| rule_char(style.stroke, axis == V))
    };

    // Reserve a character for every boundary that draws a rule anywhere,
    // and a space between adjacent columns that have none.
    let vrule_size: Vec<usize> = (0..=nc)
        .map(|x| {
            let ruled = (0..nr).any(|y| stroke_at(H, x, y).is_some());
            usize::from(ruled || (x > 0 && x < nc))
        })
        .collect();
    let hrule_size: Vec<usize> = (0..=nr)
        .map(|y| usize::from((0..nc).any(|x| stroke_at(V, x, y).is_some())))
        .collect();

    let mut widths = vec![0; nc];
    let mut heights = vec![0; nr];
    for (cell, _, lines) in &cells {
        if cell.colspan() == 1 {
            let w = lines.iter().map(|l| l.width()).max().unwrap_or(0);
            widths[cell.d[H][0]] = widths[cell.d[H][0]].max(w);
        }
        if cell.rowspan() == 1 {
            heights[cell.d[V][0]] = heights[cell.d[V][0]].max(lines.len());
        }
    }
    for (cell, _, lines) in &cells {
        let [[x0, x1], [y0, y1]] = cell.d;
        if cell.colspan() > 1 {
            let need = lines.iter().map(|l| l.width()).max().unwrap_or(0);
            let have = widths[x0..x1].iter().sum::<usize>() + vrule_size[x0 + 1..x1].iter().sum::<usize>();
            if need > have {
                widths[x1 - 1] += need - have;
            }
        }
        if cell.rowspan() > 1 {
            let have = heights[y0..y1].iter().sum::<usize>() + hrule_size[y0 + 1..y1].iter().sum::<usize>();
            if lines.len() > have {
                heights[y1 - 1] += lines.len() - have;
            }
        }
    }

    let columns = AxisLayout::new(widths, vrule_size);
    let rows = AxisLayout::new(heights, hrule_size);
    let mut canvas = Canvas::new(columns.total, rows.total);

    // Horizontal rules, except inside joined cells.
    for y in 0..=nr {
        if rows.rule_size[y] == 0 {
            continue;
        }
        for x in 0..nc {
            if y > 0 && y < nr && body.get_cell(x, y - 1).d == body.get_cell(x, y).d {
                continue;
            }
            if let Some(c) = stroke_at(V, x, y) {
                for cx in columns.span(x..x + 1) {
                    canvas.put(cx, rows.rule_pos[y], c);
                }
            }
        }
    }

    // Vertical rules, likewise.
    for x in 0..=nc {
        if columns.rule_size[x] == 0 {
            continue;
        }
        for y in 0..nr {
            if x > 0 && x < nc && body.get_cell(x - 1, y).d == body.get_cell(x, y).d {
                continue;
            }
            if let Some(c) = stroke_at(H, x, y) {
                for cy in rows.span(y..y + 1) {
                    canvas.put(columns.rule_pos[x], cy, c);
                }
            }
        }
    }

    // Junctions, where rule lines meet boundary columns.
    for y in (0..=nr).filter(|&y| rows.rule_size[y] > 0) {
        let cy = rows.rule_pos[y];
        for x in (0..=nc).filter(|&x| columns.rule_size[x] > 0) {
            let cx = columns.rule_pos[x];
            let left = if cx > 0 { canvas.get(cx - 1, cy) } else { ' ' };
            let right = canvas.get(cx + 1, cy);
            let vertical = (cy > 0 && canvas.get(cx, cy - 1) == '|') || canvas.get(cx, cy + 1) == '|';
            let horizontal = is_horizontal_rule(left) || is_horizontal_rule(right);
            let c = match (vertical, horizontal) {
                (true, true) => '+',
                (true, false) => '|',
                (false, true) if left == '=' || right == '=' => '=',
                (false, true) => '-',
                (false, false) => ' ',
            };
            canvas.put(cx, cy, c);
        }
    }

    // Cell contents.
    for (cell, numeric, lines) in &cells {
        let [[x0, x1], [y0, y1]] = cell.d;
        let style = body.cell_style(cell);
        let xs = columns.span(x0..x1);
        let ys = rows.span(y0..y1);
        let space = ys.len().saturating_sub(lines.len());
        let top = match style.cell.valign {
            VAlign::Top => 0,
            VAlign::Center => space / 2,
            VAlign::Bottom => space,
        };
        let halign = style.cell.halign.interpret(*numeric);
        for (i, line) in lines.iter().enumerate().take(ys.len()) {
            let text = align(line, xs.len(), halign);
            canvas.put_text(xs.start, ys.start + top + i, xs.len(), &text);
        }
    }

    horizontal_pages(&columns, body.h[H][0], width, min_hbreak)
        .into_iter()
        .map(|ranges| (0..rows.total).map(|y| canvas.line(y, &ranges)).collect())
        .collect()
}

/// Splits the columns into pages no wider than `width` where possible. Each
/// page is a list of character ranges: the row headings, when repeated,
/// then a run of data columns.
fn horizontal_pages(columns: &AxisLayout, n_headers: usize, width: usize, min_hbreak: usize) -> Vec<Vec<Range<usize>>> {
    let n = columns.cell_size.len();
    if columns.total <= width {
        return vec![vec![0..columns.total]];
    }

    let headers = columns.extent(0..n_headers, true);
    let repeat = n_headers > 0 && n_headers < n && headers.len() <= width.saturating_sub(min_hbreak);
    let (first, fixed) = if repeat { (n_headers, headers.len()) } else { (0, 0) };

    let mut pages = Vec::new();
    let mut start = first;
    while start < n {
        let with_left = !repeat;
        let mut end = start + 1;
        while end < n && fixed + columns.extent(start..end + 1, with_left).len() <= width {
            end += 1;
        }
        let mut ranges = Vec::new();
        if repeat {
            ranges.push(headers.clone());
        }
        ranges.push(columns.extent(start..end, with_left));
        pages.push(ranges);
        start = end;
    }
    pages
}
