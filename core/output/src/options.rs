//! FILENAME: core/output/src/options.rs
//! PURPOSE: Typed parsing of driver options.
//! CONTEXT: Drivers receive their options as a string map. Each parser
//! removes the key it reads, so whatever is left after a driver is built
//! was not recognized. An unparsable value falls back to the default and
//! records a warning.

use crate::message::Diagnostic;
use once_cell::sync::Lazy;
use pivot_table::{parse_length, Color};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::Path;

pub struct DriverOptions {
    driver_name: String,
    map: BTreeMap<String, String>,
    warnings: Vec<Diagnostic>,
}

impl DriverOptions {
    pub fn new(driver_name: impl Into<String>, map: BTreeMap<String, String>) -> Self {
        DriverOptions {
            driver_name: driver_name.into(),
            map,
            warnings: Vec::new(),
        }
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Removes and returns the value of `key`.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    /// Keys that no parser has read.
    pub fn remaining_keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn warn(&mut self, text: String) {
        log::warn!("{}", text);
        self.warnings.push(Diagnostic::warning(text));
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    fn warn_value(&mut self, key: &str, value: &str, requirement: &str) {
        let text = format!(
            "{}: `{}` is `{}` but {}",
            self.driver_name, key, value, requirement
        );
        self.warn(text);
    }

    // ========================================================================
    // PARSERS
    // ========================================================================

    /// Accepts `on`/`true`/`yes`/`1` and `off`/`false`/`no`/`0`.
    pub fn parse_boolean(&mut self, key: &str, default: bool) -> bool {
        let Some(value) = self.take(key) else {
            return default;
        };
        match value.as_str() {
            "on" | "true" | "yes" | "1" => true,
            "off" | "false" | "no" | "0" => false,
            _ => {
                self.warn_value(key, &value, "a Boolean value is required");
                default
            }
        }
    }

    /// Returns the value paired with the option's value in `choices`.
    pub fn parse_enum<T: Copy>(&mut self, key: &str, default: T, choices: &[(&str, T)]) -> T {
        let Some(value) = self.take(key) else {
            return default;
        };
        if let Some(&(_, choice)) = choices.iter().find(|(name, _)| *name == value) {
            return choice;
        }
        let names: Vec<String> = choices.iter().map(|(name, _)| format!("`{}`", name)).collect();
        let requirement = format!("one of the following is required: {}", names.join(", "));
        self.warn_value(key, &value, &requirement);
        default
    }

    /// Parses a decimal, `0x` hexadecimal or `0` octal integer in
    /// `min..=max`.
    pub fn parse_int(&mut self, key: &str, default: i32, min: i32, max: i32) -> i32 {
        let Some(value) = self.take(key) else {
            return default;
        };
        match parse_c_int(&value) {
            Some(n) if (min..=max).contains(&n) => n,
            _ => {
                let requirement = if max == i32::MAX {
                    match min {
                        0 => "a non-negative integer is required".to_string(),
                        1 => "a positive integer is required".to_string(),
                        i32::MIN => "an integer is required".to_string(),
                        _ => format!("an integer greater than {} is required", min - 1),
                    }
                } else {
                    format!("an integer between {} and {} is required", min, max)
                };
                self.warn_value(key, &value, &requirement);
                default
            }
        }
    }

    pub fn parse_string(&mut self, key: &str, default: &str) -> String {
        self.take(key).unwrap_or_else(|| default.to_string())
    }

    /// A length in inches; see `pivot_table::parse_length` for the syntax.
    pub fn parse_dimension(&mut self, key: &str, default: Option<f64>) -> Option<f64> {
        let Some(value) = self.take(key) else {
            return default;
        };
        match parse_length(&value) {
            Some(inches) if inches >= 0.0 => Some(inches),
            _ => {
                self.warn_value(key, &value, "a length is required");
                default
            }
        }
    }

    /// The template for chart file names, which contains `#` where a chart
    /// number goes, or `None` if charts should not be written. The default
    /// derives from `output_file`: `out.html` becomes `out-#`, and `-`
    /// disables charts.
    pub fn parse_chart_file_name(&mut self, key: &str, output_file: &str) -> Option<String> {
        match self.take(key) {
            None => default_chart_file_name(output_file),
            Some(value) if value == "none" => None,
            Some(value) if value.contains('#') => Some(value),
            Some(value) => {
                self.warn_value(key, &value, "a file name that contains `#` is required");
                default_chart_file_name(output_file)
            }
        }
    }

    pub fn parse_color(&mut self, key: &str, default: Color) -> Color {
        let Some(value) = self.take(key) else {
            return default;
        };
        match parse_color(&value) {
            Some(color) => color,
            None => {
                let text = format!(
                    "{}: `{}` is `{}`, which could not be parsed as a color",
                    self.driver_name, key, value
                );
                self.warn(text);
                default
            }
        }
    }
}

fn parse_c_int(s: &str) -> Option<i32> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn default_chart_file_name(output_file: &str) -> Option<String> {
    if output_file == "-" {
        return None;
    }
    let stem = Path::new(output_file).with_extension("");
    Some(format!("{}-#", stem.to_string_lossy()))
}

// ============================================================================
// COLORS
// ============================================================================

/// Parses `#rgb`, `#rrggbb`, `#rrrrggggbbbb`, `rrggbb`, `rgb(r, g, b)`,
/// `rgba(r, g, b, alpha)` with alpha in `[0, 1]`, a CSS color name, or
/// `transparent`.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return match hex.len() {
            3 if hex.is_ascii() => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Color::new(channel(0)?, channel(1)?, channel(2)?))
            }
            6 => Color::from_hex(hex),
            12 if hex.is_ascii() => {
                let channel = |i: usize| u16::from_str_radix(&hex[i * 4..i * 4 + 4], 16).ok();
                Some(Color::new(
                    (channel(0)? >> 8) as u8,
                    (channel(1)? >> 8) as u8,
                    (channel(2)? >> 8) as u8,
                ))
            }
            _ => None,
        };
    }
    if s.len() == 6 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Color::from_hex(s);
    }
    if let Some(args) = css_function_args(s, "rgba") {
        let [r, g, b, a] = args.as_slice() else {
            return None;
        };
        let alpha: f64 = a.parse().ok()?;
        let alpha = if alpha <= 0.0 {
            0
        } else if alpha >= 1.0 {
            255
        } else {
            (alpha * 255.0) as u8
        };
        return Some(Color::with_alpha(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?, alpha));
    }
    if let Some(args) = css_function_args(s, "rgb") {
        let [r, g, b] = args.as_slice() else {
            return None;
        };
        return Some(Color::new(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?));
    }
    if s == "transparent" {
        return Some(Color::TRANSPARENT);
    }
    CSS_COLORS.get(s).map(|&code| Color::from_rgb(code))
}

/// The trimmed, comma-separated arguments of `name(...)`.
fn css_function_args<'a>(s: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let inner = s
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

static CSS_COLORS: Lazy<FxHashMap<&'static str, u32>> =
    Lazy::new(|| NAMED_COLORS.iter().copied().collect());

const NAMED_COLORS: [(&str, u32); 148] = [
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];
