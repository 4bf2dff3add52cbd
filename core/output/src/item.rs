//! FILENAME: core/output/src/item.rs
//! PURPOSE: Output items: the units that procedures submit to the engine and
//! that drivers render.
//! CONTEXT: Items are cheap to clone. Tables are shared through `Arc`, so a
//! table submitted once can reach several drivers without copying.

use crate::message::{Diagnostic, Severity};
use pivot_table::{FormatContext, PivotTable, Value, ValueInner};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSubtype {
    /// The page title, from TITLE and SUBTITLE.
    PageTitle,
    /// A heading within the output.
    Title,
    /// Echoed command syntax.
    Syntax,
    /// Other plain text.
    Log,
}

impl TextSubtype {
    pub fn label(self) -> &'static str {
        match self {
            TextSubtype::PageTitle => "Page Title",
            TextSubtype::Title => "Title",
            TextSubtype::Syntax => "Syntax",
            TextSubtype::Log => "Log",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: Option<String>,
}

/// A PNG image already written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Table(Arc<PivotTable>),
    Text { subtype: TextSubtype, content: Value },
    Chart(Chart),
    Image(Image),
    PageBreak,
    Message(Diagnostic),
    Group(Vec<OutputItem>),
}

#[derive(Debug, Clone)]
pub struct OutputItem {
    /// Overrides the default label for the item's kind.
    pub label: Option<String>,
    pub command_name: Option<String>,
    /// Hidden items reach only drivers that handle visibility themselves.
    pub show: bool,
    pub kind: ItemKind,
}

impl OutputItem {
    pub fn new(kind: ItemKind) -> Self {
        OutputItem {
            label: None,
            command_name: None,
            show: true,
            kind,
        }
    }

    pub fn table(table: impl Into<Arc<PivotTable>>) -> Self {
        OutputItem::new(ItemKind::Table(table.into()))
    }

    pub fn text(subtype: TextSubtype, text: impl Into<String>) -> Self {
        OutputItem::text_value(subtype, Value::user_text(text))
    }

    pub fn text_value(subtype: TextSubtype, content: Value) -> Self {
        OutputItem::new(ItemKind::Text { subtype, content })
    }

    pub fn message(diagnostic: Diagnostic) -> Self {
        OutputItem::new(ItemKind::Message(diagnostic))
    }

    pub fn page_break() -> Self {
        OutputItem::new(ItemKind::PageBreak)
    }

    pub fn chart(title: Option<String>) -> Self {
        OutputItem::new(ItemKind::Chart(Chart { title }))
    }

    pub fn image(image: Image) -> Self {
        OutputItem::new(ItemKind::Image(image))
    }

    /// An empty group, typically the output of one command.
    pub fn group(command_name: Option<String>) -> Self {
        OutputItem {
            command_name,
            ..OutputItem::new(ItemKind::Group(Vec::new()))
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_command_name(mut self, command_name: impl Into<String>) -> Self {
        self.command_name = Some(command_name.into());
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The explicit label, or a default that depends on the kind.
    pub fn label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match &self.kind {
            ItemKind::Table(table) => match &table.title {
                Some(_) => table.title_text(),
                None => "Table".to_string(),
            },
            ItemKind::Text { subtype, .. } => subtype.label().to_string(),
            ItemKind::Chart(chart) => chart.title.clone().unwrap_or_else(|| "Chart".to_string()),
            ItemKind::Image(_) => "Image".to_string(),
            ItemKind::PageBreak => "Page Break".to_string(),
            ItemKind::Message(d) => match d.severity {
                Severity::Error => "Error",
                Severity::Warning => "Warning",
                Severity::Note => "Note",
            }
            .to_string(),
            ItemKind::Group(_) => self.command_name.clone().unwrap_or_else(|| "Group".to_string()),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ItemKind::Group(_))
    }

    pub fn children(&self) -> &[OutputItem] {
        match &self.kind {
            ItemKind::Group(children) => children,
            _ => &[],
        }
    }

    /// Appends `child` to this group. Panics if this is not a group.
    pub fn add_child(&mut self, child: OutputItem) {
        match &mut self.kind {
            ItemKind::Group(children) => children.push(child),
            _ => panic!("add_child on a {} item", self.label()),
        }
    }

    /// A group with the same label, command name and visibility as this one
    /// but no children.
    pub fn clone_empty(&self) -> OutputItem {
        OutputItem {
            label: self.label.clone(),
            command_name: self.command_name.clone(),
            show: self.show,
            kind: ItemKind::Group(Vec::new()),
        }
    }

    pub fn text_subtype(&self) -> Option<TextSubtype> {
        match &self.kind {
            ItemKind::Text { subtype, .. } => Some(*subtype),
            _ => None,
        }
    }

    /// The content of a text item as plain text; empty for other kinds.
    pub fn plain_text(&self) -> String {
        match &self.kind {
            ItemKind::Text { content, .. } => content.to_string_with(&FormatContext::standalone()),
            _ => String::new(),
        }
    }

    /// Appends the text of `src` to this text item, separated by a newline,
    /// if the two can be combined: both plain text of the same subtype (other
    /// than page titles) with the same label and font, and this one without
    /// markup. Returns whether `src` was absorbed.
    pub fn append_text(&mut self, src: &OutputItem) -> bool {
        let same_label = self.label() == src.label();
        let (
            ItemKind::Text { subtype: ds, content: dc },
            ItemKind::Text { subtype: ss, content: sc },
        ) = (&mut self.kind, &src.kind)
        else {
            return false;
        };
        if *ds != *ss
            || *ds == TextSubtype::PageTitle
            || !same_label
            || dc.font_style() != sc.font_style()
            || dc.font_style().is_some_and(|f| f.markup)
        {
            return false;
        }
        match (&mut dc.inner, &sc.inner) {
            (ValueInner::Text(dst), ValueInner::Text(src)) => {
                dst.local.push('\n');
                dst.local.push_str(&src.local);
                dst.id = None;
                true
            }
            _ => false,
        }
    }
}
