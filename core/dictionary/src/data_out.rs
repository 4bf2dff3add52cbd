//! FILENAME: core/dictionary/src/data_out.rs
//! PURPOSE: Renders values as text according to a print format.
//! CONTEXT: Numeric output is right-justified to the format width. When a
//! number does not fit, decimals are dropped one at a time, then the leading
//! zero of a pure fraction, and finally the field is filled with asterisks.

use crate::format::{Format, FormatType};
use crate::value::{Value, SYSMIS};

/// Options that affect numeric rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataOutOptions {
    /// Print "0.5" rather than ".5" for pure fractions.
    pub include_leading_zero: bool,
}

/// Format a value according to the specified print format.
pub fn data_out(value: &Value, format: &Format) -> String {
    data_out_with(value, format, DataOutOptions::default())
}

/// Format a value according to the specified print format and options.
pub fn data_out_with(value: &Value, format: &Format, options: DataOutOptions) -> String {
    match (value, format.format_type) {
        (Value::String(s), FormatType::AHex) => format_ahex(s, format.w as usize),
        (Value::String(s), _) => format_string(s, format.w as usize),
        (Value::Number(x), FormatType::A | FormatType::AHex) => {
            let numeric = Format::new(FormatType::F, format.w.clamp(1, 40), 0);
            format_number(*x, &numeric, options)
        }
        (Value::Number(x), _) => format_number(*x, format, options),
    }
}

/// Format a number according to a numeric print format.
pub fn format_number(x: f64, format: &Format, options: DataOutOptions) -> String {
    let width = format.w as usize;
    if x == SYSMIS {
        return pad_left(".", width);
    }
    if !x.is_finite() {
        let text = if x.is_nan() {
            "NaN"
        } else if x > 0.0 {
            "+Infinity"
        } else {
            "-Infinity"
        };
        return fit_or_stars(text.to_string(), width);
    }

    for decimals in (0..=format.d as usize).rev() {
        let mut text = render_numeric(x, format.format_type, decimals);
        if !options.include_leading_zero {
            text = drop_leading_zero(&text).unwrap_or(text);
        }
        if text.len() <= width {
            return pad_left(&text, width);
        }
        if let Some(short) = drop_leading_zero(&text) {
            if short.len() <= width {
                return pad_left(&short, width);
            }
        }
    }
    "*".repeat(width)
}

fn render_numeric(x: f64, format_type: FormatType, decimals: usize) -> String {
    match format_type {
        FormatType::F | FormatType::A | FormatType::AHex => format_fixed(x, decimals),
        FormatType::Comma => add_grouping(&format_fixed(x, decimals), ',', '.'),
        FormatType::Dot => add_grouping(&format_fixed(x, decimals).replace('.', ","), '.', ','),
        FormatType::Dollar => {
            let grouped = add_grouping(&round_magnitude(x, decimals), ',', '.');
            if is_negative_after_rounding(x, decimals) {
                format!("-${}", grouped)
            } else {
                format!("${}", grouped)
            }
        }
        FormatType::Pct => format!("{}%", format_fixed(x, decimals)),
        FormatType::E => format_exponential(x, decimals),
    }
}

/// Fixed-point rendering that never produces a negative zero.
fn format_fixed(x: f64, decimals: usize) -> String {
    let magnitude = round_magnitude(x, decimals);
    if is_negative_after_rounding(x, decimals) {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Renders |x| to `decimals` places, rounding exact halves away from zero.
fn round_magnitude(x: f64, decimals: usize) -> String {
    let magnitude = x.abs();
    let probe = format!("{:.prec$}", magnitude, prec = decimals + 2);
    if probe.ends_with("50") {
        let nudged = magnitude + magnitude * f64::EPSILON * 8.0;
        format!("{:.prec$}", nudged, prec = decimals)
    } else {
        format!("{:.prec$}", magnitude, prec = decimals)
    }
}

fn is_negative_after_rounding(x: f64, decimals: usize) -> bool {
    x < 0.0
        && round_magnitude(x, decimals)
            .chars()
            .any(|c| c.is_ascii_digit() && c != '0')
}

/// Scientific notation with a signed three-digit exponent, e.g. 1.200E-005.
fn format_exponential(x: f64, decimals: usize) -> String {
    let text = format!("{:.prec$e}", x, prec = decimals);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}E{}{:03}",
        mantissa,
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

/// Insert a grouping character every three digits of the integer part.
fn add_grouping(s: &str, group: char, decimal: char) -> String {
    let (integer_part, fraction) = match s.find(decimal) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: Vec<char> = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    if negative {
        result.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(group);
        }
        result.push(*c);
    }

    if let Some(fraction) = fraction {
        result.push(decimal);
        result.push_str(fraction);
    }
    result
}

fn drop_leading_zero(text: &str) -> Option<String> {
    if let Some(rest) = text.strip_prefix("0.") {
        Some(format!(".{}", rest))
    } else {
        text.strip_prefix("-0.").map(|rest| format!("-.{}", rest))
    }
}

fn format_string(s: &[u8], width: usize) -> String {
    let end = width.min(s.len());
    let mut text = String::from_utf8_lossy(&s[..end]).into_owned();
    while text.len() < width {
        text.push(' ');
    }
    text
}

fn format_ahex(s: &[u8], width: usize) -> String {
    s.iter()
        .take(width / 2)
        .map(|b| format!("{:02X}", b))
        .collect()
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

fn fit_or_stars(text: String, width: usize) -> String {
    if text.len() <= width {
        pad_left(&text, width)
    } else {
        "*".repeat(width)
    }
}
