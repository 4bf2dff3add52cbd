//! FILENAME: core/dictionary/src/format.rs
//! PURPOSE: Print format specifications such as F8.2, PCT40.1 or A10.
//! CONTEXT: A format pairs a type with a field width and a number of decimal
//! places. Formats are parsed from their textual form and rendered back to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a format specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("empty format specification")]
    Empty,

    #[error("unknown format type `{0}`")]
    UnknownType(String),

    #[error("format `{0}` lacks a valid width")]
    BadWidth(String),

    #[error("format `{spec}` allows at most {max} decimal places")]
    TooManyDecimals { spec: String, max: u8 },

    #[error("format `{0}` has width outside the range {1}..={2}")]
    WidthOutOfRange(String, u16, u16),
}

/// The category of a print format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FormatType {
    #[default]
    F,
    Comma,
    Dot,
    Dollar,
    Pct,
    E,
    A,
    AHex,
}

impl FormatType {
    pub fn name(self) -> &'static str {
        match self {
            FormatType::F => "F",
            FormatType::Comma => "COMMA",
            FormatType::Dot => "DOT",
            FormatType::Dollar => "DOLLAR",
            FormatType::Pct => "PCT",
            FormatType::E => "E",
            FormatType::A => "A",
            FormatType::AHex => "AHEX",
        }
    }

    pub fn is_string(self) -> bool {
        matches!(self, FormatType::A | FormatType::AHex)
    }

    fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        [
            FormatType::F,
            FormatType::Comma,
            FormatType::Dot,
            FormatType::Dollar,
            FormatType::Pct,
            FormatType::E,
            FormatType::A,
            FormatType::AHex,
        ]
        .into_iter()
        .find(|t| t.name() == upper)
    }

    fn width_range(self) -> (u16, u16) {
        match self {
            FormatType::E => (6, 40),
            FormatType::A => (1, 32767),
            FormatType::AHex => (2, 32767),
            _ => (1, 40),
        }
    }
}

/// A print format: type, width and decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Format {
    pub format_type: FormatType,
    pub w: u16,
    pub d: u8,
}

impl Format {
    pub const fn new(format_type: FormatType, w: u16, d: u8) -> Self {
        Format { format_type, w, d }
    }

    /// F8.2, the default numeric format.
    pub const fn default_numeric() -> Self {
        Format::new(FormatType::F, 8, 2)
    }

    /// F8.2 for numeric variables, A{width} for strings.
    pub fn for_width(width: usize) -> Self {
        if width == 0 {
            Format::default_numeric()
        } else {
            Format::new(FormatType::A, width.min(32767) as u16, 0)
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::default_numeric()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format_type.is_string() {
            write!(f, "{}{}", self.format_type.name(), self.w)
        } else {
            write!(f, "{}{}.{}", self.format_type.name(), self.w, self.d)
        }
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        if spec.is_empty() {
            return Err(FormatError::Empty);
        }

        let name_end = spec
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| FormatError::BadWidth(spec.to_string()))?;
        let format_type = FormatType::from_name(&spec[..name_end])
            .ok_or_else(|| FormatError::UnknownType(spec[..name_end].to_string()))?;

        let rest = &spec[name_end..];
        let (w_text, d_text) = match rest.split_once('.') {
            Some((w, d)) => (w, Some(d)),
            None => (rest, None),
        };
        let w: u16 = w_text
            .parse()
            .map_err(|_| FormatError::BadWidth(spec.to_string()))?;
        let d: u8 = match d_text {
            Some(d) => d.parse().map_err(|_| FormatError::BadWidth(spec.to_string()))?,
            None => 0,
        };

        let (min_w, max_w) = format_type.width_range();
        if w < min_w || w > max_w {
            return Err(FormatError::WidthOutOfRange(spec.to_string(), min_w, max_w));
        }
        let max_d = if format_type.is_string() { 0 } else { 16.min(w.saturating_sub(1)) as u8 };
        if d > max_d {
            return Err(FormatError::TooManyDecimals { spec: spec.to_string(), max: max_d });
        }

        Ok(Format::new(format_type, w, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("F8.2".parse::<Format>(), Ok(Format::new(FormatType::F, 8, 2)));
        assert_eq!("pct40.1".parse::<Format>(), Ok(Format::new(FormatType::Pct, 40, 1)));
        assert_eq!("A10".parse::<Format>(), Ok(Format::new(FormatType::A, 10, 0)));
        assert_eq!("AHEX8".parse::<Format>(), Ok(Format::new(FormatType::AHex, 8, 0)));
        assert_eq!("F5".parse::<Format>(), Ok(Format::new(FormatType::F, 5, 0)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Format>(), Err(FormatError::Empty));
        assert!(matches!("X8.2".parse::<Format>(), Err(FormatError::UnknownType(_))));
        assert!(matches!("F".parse::<Format>(), Err(FormatError::BadWidth(_))));
        assert!(matches!("F50.2".parse::<Format>(), Err(FormatError::WidthOutOfRange(..))));
        assert!(matches!("F4.4".parse::<Format>(), Err(FormatError::TooManyDecimals { .. })));
    }

    #[test]
    fn test_display_round_trip() {
        for spec in ["F8.2", "COMMA12.0", "E40.3", "A20"] {
            assert_eq!(spec.parse::<Format>().unwrap().to_string(), spec);
        }
    }

    #[test]
    fn test_format_for_width() {
        assert_eq!(Format::for_width(0), Format::default_numeric());
        assert_eq!(Format::for_width(12).to_string(), "A12");
    }
}
