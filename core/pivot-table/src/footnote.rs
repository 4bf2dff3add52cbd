//! FILENAME: core/pivot-table/src/footnote.rs
//! PURPOSE: Table footnotes and their markers.

use crate::value::{FormatContext, Value};
use serde::{Deserialize, Serialize};

/// A footnote owned by a table and referenced by index from its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub idx: usize,
    pub content: Option<Value>,
    /// Overrides the automatic marker.
    pub marker: Option<Value>,
    /// Hidden footnotes are neither listed nor marked.
    pub show: bool,
}

impl Footnote {
    pub fn new(idx: usize) -> Self {
        Footnote {
            idx,
            content: None,
            marker: None,
            show: true,
        }
    }

    /// The marker text: the custom marker if there is one, otherwise
    /// `idx + 1` as a number or as letters depending on `ctx`.
    pub fn marker_text(&self, ctx: &FormatContext) -> String {
        match &self.marker {
            Some(marker) => marker.body_string(ctx),
            None if ctx.show_numeric_markers => (self.idx + 1).to_string(),
            None => alphabetic_marker(self.idx + 1),
        }
    }

    pub fn content_text(&self, ctx: &FormatContext) -> String {
        self.content
            .as_ref()
            .map(|content| content.to_string_with(ctx))
            .unwrap_or_default()
    }
}

/// Bijective base-26 letters: 1 is "a", 26 is "z", 27 is "aa", 702 is "zz".
/// Returns an empty string for 0.
pub fn alphabetic_marker(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabetic_markers() {
        assert_eq!(alphabetic_marker(1), "a");
        assert_eq!(alphabetic_marker(26), "z");
        assert_eq!(alphabetic_marker(27), "aa");
        assert_eq!(alphabetic_marker(28), "ab");
        assert_eq!(alphabetic_marker(52), "az");
        assert_eq!(alphabetic_marker(53), "ba");
        assert_eq!(alphabetic_marker(702), "zz");
        assert_eq!(alphabetic_marker(703), "aaa");
        assert_eq!(alphabetic_marker(0), "");
    }

    #[test]
    fn test_marker_text() {
        let mut ctx = FormatContext::standalone();
        let mut footnote = Footnote::new(1);
        assert_eq!(footnote.marker_text(&ctx), "b");

        ctx.show_numeric_markers = true;
        assert_eq!(footnote.marker_text(&ctx), "2");

        footnote.marker = Some(Value::text("*"));
        assert_eq!(footnote.marker_text(&ctx), "*");
    }
}
