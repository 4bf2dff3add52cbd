//! FILENAME: core/pivot-table/src/value.rs
//! PURPOSE: The tagged values displayed in pivot-table cells, headings,
//! titles and footnotes, and their rendering to text.
//! CONTEXT: A value knows how to render its body. Display policy (value vs.
//! label), the small-number threshold and footnote markers come from a
//! `FormatContext`, which a table builds from its own settings or which
//! `FormatContext::standalone` builds from the process settings.

use crate::footnote::Footnote;
use crate::look::{AreaStyle, CellStyle, FontStyle};
use crate::settings::{settings, ValueShow};
use dictionary::{data_out_with, DataOutOptions, Format, FormatType, Variable};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// VALUE KINDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberValue {
    pub x: f64,
    /// Unset until the value is stored in a table, which assigns one.
    pub format: Option<Format>,
    /// Render tiny nonzero magnitudes in E notation.
    pub honor_small: bool,
    pub show: ValueShow,
    pub var_name: Option<String>,
    pub value_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringValue {
    pub s: String,
    /// Render as hexadecimal byte pairs.
    pub hex: bool,
    pub show: ValueShow,
    pub var_name: Option<String>,
    pub value_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableValue {
    pub var_name: String,
    pub var_label: Option<String>,
    pub show: ValueShow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub local: String,
    pub id: Option<String>,
    /// Supplied by the user (e.g. a TITLE command) rather than by a procedure.
    pub user_provided: bool,
}

/// Text with positional arguments; see `Value::template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateValue {
    pub local: String,
    pub args: Vec<Vec<Value>>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueInner {
    Number(NumberValue),
    String(StringValue),
    Variable(VariableValue),
    Text(TextValue),
    Template(TemplateValue),
}

/// Rarely used decorations, boxed so plain values stay small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueEx {
    pub font_style: Option<FontStyle>,
    pub cell_style: Option<CellStyle>,
    pub subscripts: Vec<String>,
    /// Indexes into the owning table's footnotes, sorted and distinct.
    pub footnote_indexes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub inner: ValueInner,
    pub ex: Option<Box<ValueEx>>,
}

impl From<ValueInner> for Value {
    fn from(inner: ValueInner) -> Self {
        Value { inner, ex: None }
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl Value {
    /// A number with no format yet. Storing it in a table assigns one.
    pub fn number(x: f64) -> Self {
        ValueInner::Number(NumberValue {
            x,
            format: None,
            honor_small: false,
            show: ValueShow::Default,
            var_name: None,
            value_label: None,
        })
        .into()
    }

    /// A number that always renders as an integer.
    pub fn integer(x: f64) -> Self {
        let mut value = Value::number(x);
        if let ValueInner::Number(n) = &mut value.inner {
            n.format = Some(Format::new(FormatType::F, 40, 0));
        }
        value
    }

    pub fn number_with_format(x: f64, format: Format) -> Self {
        let mut value = Value::number(x);
        if let ValueInner::Number(n) = &mut value.inner {
            n.format = Some(format);
        }
        value
    }

    /// A value of `variable`, rendered with its print format and value label.
    pub fn var_value(variable: &Variable, value: &dictionary::Value) -> Self {
        let value_label = variable.value_label(value).map(str::to_string);
        let var_name = Some(variable.name.clone());
        match value {
            dictionary::Value::Number(x) => ValueInner::Number(NumberValue {
                x: *x,
                format: Some(variable.print_format),
                honor_small: false,
                show: ValueShow::Default,
                var_name,
                value_label,
            })
            .into(),
            dictionary::Value::String(_) => ValueInner::String(StringValue {
                s: value.trimmed_str().unwrap_or_default(),
                hex: variable.print_format.format_type == FormatType::AHex,
                show: ValueShow::Default,
                var_name,
                value_label,
            })
            .into(),
        }
    }

    /// The name and label of `variable`.
    pub fn variable(variable: &Variable) -> Self {
        ValueInner::Variable(VariableValue {
            var_name: variable.name.clone(),
            var_label: variable.label.clone(),
            show: ValueShow::Default,
        })
        .into()
    }

    /// Text supplied by a procedure.
    pub fn text(s: impl Into<String>) -> Self {
        ValueInner::Text(TextValue {
            local: s.into(),
            id: None,
            user_provided: false,
        })
        .into()
    }

    /// Text supplied by the user.
    pub fn user_text(s: impl Into<String>) -> Self {
        ValueInner::Text(TextValue {
            local: s.into(),
            id: None,
            user_provided: true,
        })
        .into()
    }

    /// Text with markup such as `<b>bold</b>`. Renderers that cannot show
    /// markup display only the text content.
    pub fn markup(s: impl Into<String>) -> Self {
        let mut value = Value::user_text(s);
        value.font_style_mut().markup = true;
        value
    }

    /// Templated text. `^N` inserts the first value of argument N (1-based).
    /// `[inner:inner2:]N` repeats over the values of argument N: `inner` is
    /// expanded once with `%M` naming the Mth remaining value, then `inner2`
    /// is repeated with `^M` until the values run out. `\n` is a newline and
    /// a backslash makes any other character literal.
    pub fn template(local: impl Into<String>, args: Vec<Vec<Value>>) -> Self {
        ValueInner::Template(TemplateValue {
            local: local.into(),
            args,
            id: None,
        })
        .into()
    }

    // ------------------------------------------------------------------------
    // Decorations
    // ------------------------------------------------------------------------

    fn ex_mut(&mut self) -> &mut ValueEx {
        self.ex.get_or_insert_with(Box::default)
    }

    /// Attaches footnote `idx`. Attaching the same footnote twice has no
    /// effect.
    pub fn add_footnote(&mut self, idx: usize) {
        let indexes = &mut self.ex_mut().footnote_indexes;
        if let Err(pos) = indexes.binary_search(&idx) {
            indexes.insert(pos, idx);
        }
    }

    pub fn with_footnote(mut self, idx: usize) -> Self {
        self.add_footnote(idx);
        self
    }

    pub fn add_subscript(&mut self, subscript: impl Into<String>) {
        self.ex_mut().subscripts.push(subscript.into());
    }

    pub fn footnote_indexes(&self) -> &[usize] {
        self.ex
            .as_ref()
            .map(|ex| ex.footnote_indexes.as_slice())
            .unwrap_or(&[])
    }

    pub fn subscripts(&self) -> &[String] {
        self.ex
            .as_ref()
            .map(|ex| ex.subscripts.as_slice())
            .unwrap_or(&[])
    }

    pub fn font_style(&self) -> Option<&FontStyle> {
        self.ex.as_ref().and_then(|ex| ex.font_style.as_ref())
    }

    pub fn cell_style(&self) -> Option<&CellStyle> {
        self.ex.as_ref().and_then(|ex| ex.cell_style.as_ref())
    }

    /// The value's own font style, created from the default if absent.
    pub fn font_style_mut(&mut self) -> &mut FontStyle {
        self.ex_mut().font_style.get_or_insert_with(FontStyle::default)
    }

    pub fn set_font_style(&mut self, font: FontStyle) {
        self.ex_mut().font_style = Some(font);
    }

    pub fn set_cell_style(&mut self, cell: CellStyle) {
        self.ex_mut().cell_style = Some(cell);
    }

    /// Sets the value-level show policy. Only numbers, strings and variables
    /// have one.
    pub fn set_show(&mut self, show: ValueShow) {
        match &mut self.inner {
            ValueInner::Number(n) => n.show = show,
            ValueInner::String(s) => s.show = show,
            ValueInner::Variable(v) => v.show = show,
            ValueInner::Text(_) | ValueInner::Template(_) => {}
        }
    }

    /// `base` with this value's overrides applied.
    pub fn style(&self, base: &AreaStyle) -> AreaStyle {
        AreaStyle {
            cell: self.cell_style().cloned().unwrap_or_else(|| base.cell.clone()),
            font: self.font_style().cloned().unwrap_or_else(|| base.font.clone()),
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Appends the body of this value (no subscripts or footnote markers) to
    /// `out`. Returns true if the text is a number, possibly with a label.
    pub fn format_body(&self, ctx: &FormatContext, out: &mut String) -> bool {
        match &self.inner {
            ValueInner::Number(n) => {
                let show = interpret_show(
                    ctx.global_show_values,
                    ctx.show_values,
                    n.show,
                    n.value_label.is_some(),
                );
                if show.shows_value() {
                    let format = n.format.unwrap_or(ctx.default_format);
                    let format = if format.format_type == FormatType::F
                        && n.honor_small
                        && n.x != 0.0
                        && n.x.abs() < ctx.small
                    {
                        Format::new(FormatType::E, 40, format.d)
                    } else {
                        format
                    };
                    let options = DataOutOptions {
                        include_leading_zero: ctx.include_leading_zero,
                    };
                    let text = data_out_with(&dictionary::Value::Number(n.x), &format, options);
                    out.push_str(text.trim_start_matches(' '));
                }
                push_label(out, show, n.value_label.as_deref());
                !show.shows_label()
            }
            ValueInner::String(s) => {
                let show = interpret_show(
                    ctx.global_show_values,
                    ctx.show_values,
                    s.show,
                    s.value_label.is_some(),
                );
                if show.shows_value() {
                    if s.hex {
                        for byte in s.s.bytes() {
                            out.push_str(&format!("{:02X}", byte));
                        }
                    } else {
                        out.push_str(&s.s);
                    }
                }
                push_label(out, show, s.value_label.as_deref());
                false
            }
            ValueInner::Variable(v) => {
                let show = interpret_show(
                    ctx.global_show_variables,
                    ctx.show_variables,
                    v.show,
                    v.var_label.is_some(),
                );
                if show.shows_value() {
                    out.push_str(&v.var_name);
                }
                push_label(out, show, v.var_label.as_deref());
                false
            }
            ValueInner::Text(t) => {
                if self.font_style().is_some_and(|f| f.markup) {
                    out.push_str(&strip_markup(&t.local));
                } else {
                    out.push_str(&t.local);
                }
                false
            }
            ValueInner::Template(t) => {
                format_template(out, &t.local, &t.args, ctx);
                false
            }
        }
    }

    /// Appends the full text of this value to `out`: the body, then
    /// subscripts as `_a,b`, then the marker of each shown footnote in
    /// brackets.
    pub fn format(&self, ctx: &FormatContext, out: &mut String) -> bool {
        let numeric = self.format_body(ctx, out);
        for (i, subscript) in self.subscripts().iter().enumerate() {
            out.push(if i == 0 { '_' } else { ',' });
            out.push_str(subscript);
        }
        for &idx in self.footnote_indexes() {
            if let Some(footnote) = ctx.footnotes.get(idx).filter(|f| f.show) {
                out.push('[');
                out.push_str(&footnote.marker_text(ctx));
                out.push(']');
            }
        }
        numeric
    }

    pub fn to_string_with(&self, ctx: &FormatContext) -> String {
        let mut out = String::new();
        self.format(ctx, &mut out);
        out
    }

    pub fn body_string(&self, ctx: &FormatContext) -> String {
        let mut out = String::new();
        self.format_body(ctx, &mut out);
        out
    }
}

/// Renders with the process settings and no table.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatContext::standalone()))
    }
}

fn push_label(out: &mut String, show: ValueShow, label: Option<&str>) {
    if show.shows_label() {
        if show.shows_value() {
            out.push(' ');
        }
        out.push_str(label.unwrap_or_default());
    }
}

/// Resolves the show policy: a value without a label always shows the value;
/// otherwise the first non-default of the value's, the table's and the
/// global policy wins.
fn interpret_show(
    global: ValueShow,
    table: ValueShow,
    value: ValueShow,
    has_label: bool,
) -> ValueShow {
    if !has_label {
        return ValueShow::Value;
    }
    [value, table, global]
        .into_iter()
        .find(|show| *show != ValueShow::Default)
        .unwrap_or(ValueShow::Label)
}

// ============================================================================
// FORMAT CONTEXT
// ============================================================================

/// Everything outside a value that affects how it renders.
#[derive(Debug, Clone)]
pub struct FormatContext<'a> {
    pub show_values: ValueShow,
    pub show_variables: ValueShow,
    pub global_show_values: ValueShow,
    pub global_show_variables: ValueShow,
    pub default_format: Format,
    pub small: f64,
    pub include_leading_zero: bool,
    pub footnotes: &'a [Footnote],
    pub show_numeric_markers: bool,
}

impl FormatContext<'static> {
    /// Formatting outside any table: process show policies, no small-number
    /// substitution, no footnotes.
    pub fn standalone() -> Self {
        let s = settings();
        FormatContext {
            show_values: ValueShow::Default,
            show_variables: ValueShow::Default,
            global_show_values: s.show_values,
            global_show_variables: s.show_variables,
            default_format: s.default_format,
            small: 0.0,
            include_leading_zero: s.include_leading_zero,
            footnotes: &[],
            show_numeric_markers: false,
        }
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Parses a decimal number at the start of `s`, returning it (0 if there are
/// no digits) and the rest of `s`.
fn consume_int(s: &str) -> (usize, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let n = s[..end]
        .bytes()
        .fold(0usize, |n, d| n.saturating_mul(10).saturating_add((d - b'0') as usize));
    (n, &s[end..])
}

/// Splits off an inner template, which ends at an unescaped `:` (consumed)
/// or at the end of input.
fn extract_inner_template(s: &str) -> (&str, &str) {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => i += 2,
            b':' => return (&s[..i], &s[i + 1..]),
            _ => i += 1,
        }
    }
    (s, "")
}

/// Appends the escaped character following a backslash in `rest` and
/// returns what follows it.
fn push_escape<'t>(out: &mut String, rest: &'t str) -> &'t str {
    let mut chars = rest.chars();
    match chars.next() {
        Some('n') => out.push('\n'),
        Some(c) => out.push(c),
        None => out.push('\\'),
    }
    chars.as_str()
}

/// Expands an inner template against `values`, returning how many values it
/// consumed (the largest index it referenced).
fn format_inner_template(
    out: &mut String,
    template: &str,
    escape: char,
    values: &[Value],
    ctx: &FormatContext,
) -> usize {
    let mut consumed = 0;
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];
        if c == ':' {
            break;
        } else if c == '\\' && !after.is_empty() {
            rest = push_escape(out, after);
        } else if c == escape {
            let (index, tail) = consume_int(after);
            if index >= 1 && index <= values.len() {
                values[index - 1].format(ctx, out);
                consumed = consumed.max(index);
            }
            rest = tail;
        } else {
            out.push(c);
            rest = after;
        }
    }
    consumed
}

fn format_template(out: &mut String, template: &str, args: &[Vec<Value>], ctx: &FormatContext) {
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];
        match c {
            '\\' if !after.is_empty() => rest = push_escape(out, after),
            '^' => {
                let (index, tail) = consume_int(after);
                if index >= 1 && index <= args.len() {
                    if let Some(first) = args[index - 1].first() {
                        first.format(ctx, out);
                    }
                }
                rest = tail;
            }
            '[' => {
                let (first, tail) = extract_inner_template(after);
                let (second, tail) = extract_inner_template(tail);
                let tail = tail.strip_prefix(']').unwrap_or(tail);
                let (index, tail) = consume_int(tail);
                rest = tail;
                if index < 1 || index > args.len() {
                    continue;
                }

                let values = &args[index - 1];
                let mut left = values.len();
                while left > 0 {
                    let start = values.len() - left;
                    let (inner, escape) = if left == values.len() && !first.is_empty() {
                        (first, '%')
                    } else {
                        (second, '^')
                    };
                    let used = format_inner_template(out, inner, escape, &values[start..], ctx);
                    if used == 0 || used > left {
                        break;
                    }
                    left -= used;
                }
            }
            _ => {
                out.push(c);
                rest = after;
            }
        }
    }
}

// ============================================================================
// MARKUP
// ============================================================================

/// The text content of `markup`, or `markup` itself if it is not well formed.
fn strip_markup(markup: &str) -> String {
    let wrapped = format!("<xml>{}</xml>", markup);
    let mut reader = Reader::from_str(&wrapped);
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => return markup.to_string(),
            },
            Ok(Event::CData(t)) => text.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::Eof) => return text,
            Ok(_) => {}
            Err(_) => return markup.to_string(),
        }
    }
}
