//! FILENAME: core/pivot-table/src/look.rs
//! PURPOSE: Defines the style data structures of a pivot table and the
//! "look" that bundles them.
//! CONTEXT: A look is shared by many tables, so tables hold it behind an
//! `Arc` and copy it only when a caller customizes one table's look.
//!
//! Architecture:
//! - Eight areas (title, caption, footer, corner, column labels, row labels,
//!   data, layers), each with a cell style and a font style.
//! - Nineteen borders, each with a stroke and a color.
//! - Flags that control empty-row suppression, footnote markers, layer
//!   printing and continuation text.

use crate::error::LookError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

// ============================================================================
// COLORS AND STROKES
// ============================================================================

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // Alpha channel (255 = opaque)
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const TRANSPARENT: Color = Color::with_alpha(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Builds an opaque color from a 0xRRGGBB code.
    pub const fn from_rgb(code: u32) -> Self {
        Color::new((code >> 16) as u8, (code >> 8) as u8, code as u8)
    }

    /// Convert to CSS: `#rrggbb` when opaque, otherwise `rgba()`.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f64 / 255.0
            )
        }
    }

    /// Parse from hex string (e.g., "#FF0000" or "FF0000").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::new(r, g, b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Line style for a rule. Later variants are "heavier": combining two strokes
/// keeps the heavier one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Stroke {
    #[default]
    None,
    Solid,
    Dashed,
    Thick,
    Thin,
    Double,
}

impl Stroke {
    pub fn name(self) -> &'static str {
        match self {
            Stroke::None => "none",
            Stroke::Solid => "solid",
            Stroke::Dashed => "dashed",
            Stroke::Thick => "thick",
            Stroke::Thin => "thin",
            Stroke::Double => "double",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Stroke::None),
            "solid" => Some(Stroke::Solid),
            "dashed" => Some(Stroke::Dashed),
            "thick" => Some(Stroke::Thick),
            "thin" => Some(Stroke::Thin),
            "double" => Some(Stroke::Double),
            _ => None,
        }
    }

    pub fn combine(self, other: Stroke) -> Stroke {
        self.max(other)
    }
}

/// Stroke and color of one border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BorderStyle {
    pub stroke: Stroke,
    pub color: Color,
}

impl BorderStyle {
    pub const fn new(stroke: Stroke) -> Self {
        BorderStyle {
            stroke,
            color: Color::BLACK,
        }
    }
}

// ============================================================================
// LENGTHS
// ============================================================================

/// Parses a length such as `1.5in`, `12pt`, `96px` or `2,54cm` and returns it
/// in inches. A bare number is in points. Localized unit names written by
/// translated versions of other products are accepted too.
pub fn parse_length(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+')))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let number: f64 = number.replace(',', ".").parse().ok()?;
    let per_inch = match unit.trim() {
        "in" | "인치" | "pol." | "cala" | "cali" => 1.0,
        "" | "pt" | "пт" => 72.0,
        "px" => 96.0,
        "cm" | "см" => 2.54,
        _ => return None,
    };
    Some(number / per_inch)
}

// ============================================================================
// CELL AND FONT STYLES
// ============================================================================

/// Horizontal alignment. `Mixed` aligns numbers right and text left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HAlign {
    Right,
    #[default]
    Left,
    Center,
    Mixed,
    Decimal,
}

impl HAlign {
    /// Resolves `Mixed` for a cell whose content is (or is not) numeric.
    pub fn interpret(self, numeric: bool) -> HAlign {
        match self {
            HAlign::Mixed if numeric => HAlign::Right,
            HAlign::Mixed => HAlign::Left,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Alignment and margins of a cell. Margins are in 1/96" units, indexed
/// `[axis][side]` where axis 0 is horizontal (left, right) and axis 1 is
/// vertical (top, bottom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub halign: HAlign,
    pub valign: VAlign,
    pub decimal_offset: f64,
    pub decimal_char: char,
    pub margin: [[i32; 2]; 2],
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle {
            halign: HAlign::Left,
            valign: VAlign::Top,
            decimal_offset: 0.0,
            decimal_char: '.',
            margin: [[8, 11], [1, 1]],
        }
    }
}

impl CellStyle {
    pub fn with_halign(mut self, halign: HAlign) -> Self {
        self.halign = halign;
        self
    }

    pub fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }
}

/// Font configuration. `fg` and `bg` hold the normal and the alternating-row
/// colors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// The text carries inline markup that renderers should strip.
    pub markup: bool,
    pub fg: [Color; 2],
    pub bg: [Color; 2],
    pub typeface: Option<String>,
    /// In 1/72" units. 0 means unspecified.
    pub size: i32,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            bold: false,
            italic: false,
            underline: false,
            markup: false,
            fg: [Color::BLACK; 2],
            bg: [Color::WHITE; 2],
            typeface: None,
            size: 0,
        }
    }
}

impl FontStyle {
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_fg(mut self, color: Color) -> Self {
        self.fg = [color; 2];
        self
    }

    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = [color; 2];
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AreaStyle {
    pub cell: CellStyle,
    pub font: FontStyle,
}

// ============================================================================
// AREAS AND BORDERS
// ============================================================================

/// A region of a rendered pivot table that shares one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    Title,
    Caption,
    Footer,
    Corner,
    ColumnLabels,
    RowLabels,
    Data,
    Layers,
}

pub const AREA_COUNT: usize = 8;

impl Area {
    pub const ALL: [Area; AREA_COUNT] = [
        Area::Title,
        Area::Caption,
        Area::Footer,
        Area::Corner,
        Area::ColumnLabels,
        Area::RowLabels,
        Area::Data,
        Area::Layers,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Area::Title => "title",
            Area::Caption => "caption",
            Area::Footer => "footer",
            Area::Corner => "corner",
            Area::ColumnLabels => "column labels",
            Area::RowLabels => "row labels",
            Area::Data => "data",
            Area::Layers => "layers",
        }
    }
}

/// A rule of a rendered pivot table that shares one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Border {
    Title,
    OuterLeft,
    OuterTop,
    OuterRight,
    OuterBottom,
    InnerLeft,
    InnerTop,
    InnerRight,
    InnerBottom,
    DataLeft,
    DataTop,
    DimRowHorz,
    DimRowVert,
    DimColHorz,
    DimColVert,
    CatRowHorz,
    CatRowVert,
    CatColHorz,
    CatColVert,
}

pub const BORDER_COUNT: usize = 19;

impl Border {
    pub const ALL: [Border; BORDER_COUNT] = [
        Border::Title,
        Border::OuterLeft,
        Border::OuterTop,
        Border::OuterRight,
        Border::OuterBottom,
        Border::InnerLeft,
        Border::InnerTop,
        Border::InnerRight,
        Border::InnerBottom,
        Border::DataLeft,
        Border::DataTop,
        Border::DimRowHorz,
        Border::DimRowVert,
        Border::DimColHorz,
        Border::DimColVert,
        Border::CatRowHorz,
        Border::CatRowVert,
        Border::CatColHorz,
        Border::CatColVert,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The category border that a dimension border defers to when the look
    /// leaves it unset. Other borders map to themselves.
    pub fn fallback(self) -> Border {
        match self {
            Border::DimRowHorz => Border::CatRowHorz,
            Border::DimRowVert => Border::CatRowVert,
            Border::DimColHorz => Border::CatColHorz,
            Border::DimColVert => Border::CatColVert,
            other => other,
        }
    }
}

// ============================================================================
// LOOK
// ============================================================================

/// The style bundle applied to a pivot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Look {
    pub name: Option<String>,

    /// Hide rows and columns whose data cells are all empty.
    pub omit_empty: bool,
    /// Show row dimension labels in the corner rather than as a heading row.
    pub row_labels_in_corner: bool,
    /// Number footnotes 1, 2, 3 rather than a, b, c.
    pub show_numeric_markers: bool,
    /// Show footnote markers as superscripts rather than subscripts.
    pub footnote_marker_superscripts: bool,

    pub print_all_layers: bool,
    pub paginate_layers: bool,
    /// Shrink wide (index 0) or long (index 1) tables to fit the page.
    pub shrink_to_fit: [bool; 2],
    pub top_continuation: bool,
    pub bottom_continuation: bool,
    pub continuation: Option<String>,
    pub n_orphan_lines: usize,

    /// Minimum and maximum heading widths, in 1/96", for column headings
    /// (index 0) and row headings (index 1).
    pub width_ranges: [[i32; 2]; 2],

    pub areas: [AreaStyle; AREA_COUNT],
    pub borders: [BorderStyle; BORDER_COUNT],
}

impl Default for Look {
    fn default() -> Self {
        Look::builtin_default()
    }
}

fn builtin_area(bold: bool, halign: HAlign, valign: VAlign, margins: [i32; 4]) -> AreaStyle {
    let [l, r, t, b] = margins;
    AreaStyle {
        cell: CellStyle {
            halign,
            valign,
            margin: [[l, r], [t, b]],
            ..CellStyle::default()
        },
        font: FontStyle {
            bold,
            typeface: Some("Sans Serif".to_string()),
            size: 9,
            ..FontStyle::default()
        },
    }
}

impl Look {
    /// The look used when no other look has been configured.
    pub fn builtin_default() -> Self {
        use HAlign as H;
        use VAlign as V;

        let areas = [
            builtin_area(true, H::Center, V::Center, [8, 11, 1, 8]), // Title
            builtin_area(false, H::Left, V::Top, [8, 11, 1, 1]),     // Caption
            builtin_area(false, H::Left, V::Top, [11, 8, 2, 3]),     // Footer
            builtin_area(false, H::Left, V::Bottom, [8, 11, 1, 1]),  // Corner
            builtin_area(false, H::Center, V::Bottom, [8, 11, 1, 3]), // ColumnLabels
            builtin_area(false, H::Left, V::Top, [8, 11, 1, 3]),     // RowLabels
            builtin_area(false, H::Mixed, V::Top, [8, 11, 1, 1]),    // Data
            builtin_area(false, H::Left, V::Bottom, [8, 11, 1, 3]),  // Layers
        ];

        let mut borders = [BorderStyle::default(); BORDER_COUNT];
        for border in Border::ALL {
            let stroke = match border {
                Border::Title
                | Border::OuterLeft
                | Border::OuterTop
                | Border::OuterRight
                | Border::OuterBottom
                | Border::DimRowVert
                | Border::CatRowHorz
                | Border::CatRowVert => Stroke::None,
                Border::InnerLeft
                | Border::InnerTop
                | Border::InnerRight
                | Border::InnerBottom
                | Border::DataLeft
                | Border::DataTop => Stroke::Thick,
                Border::DimRowHorz
                | Border::DimColHorz
                | Border::DimColVert
                | Border::CatColHorz
                | Border::CatColVert => Stroke::Solid,
            };
            borders[border.index()] = BorderStyle::new(stroke);
        }

        Look {
            name: None,
            omit_empty: true,
            row_labels_in_corner: true,
            show_numeric_markers: false,
            footnote_marker_superscripts: true,
            print_all_layers: false,
            paginate_layers: false,
            shrink_to_fit: [false, false],
            top_continuation: false,
            bottom_continuation: false,
            continuation: None,
            n_orphan_lines: 0,
            width_ranges: [[36, 72], [36, 120]],
            areas,
            borders,
        }
    }

    pub fn area(&self, area: Area) -> &AreaStyle {
        &self.areas[area.index()]
    }

    pub fn area_mut(&mut self, area: Area) -> &mut AreaStyle {
        &mut self.areas[area.index()]
    }

    pub fn border(&self, border: Border) -> BorderStyle {
        self.borders[border.index()]
    }

    pub fn set_border(&mut self, border: Border, style: BorderStyle) {
        self.borders[border.index()] = style;
    }

    /// The style drawn for `border`: its own style if it has a stroke, else
    /// the style of its fallback border, else a dashed grid line if
    /// `show_grid_lines`, else no line.
    pub fn resolve_border(&self, border: Border, show_grid_lines: bool) -> BorderStyle {
        let own = self.border(border);
        if own.stroke != Stroke::None {
            return own;
        }
        let fallback = self.border(border.fallback());
        if fallback.stroke != Stroke::None {
            return fallback;
        }
        if show_grid_lines {
            BorderStyle::new(Stroke::Dashed)
        } else {
            fallback
        }
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String, LookError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LookError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a look from a `.stt` table-look file.
    pub fn read_stt(path: &Path) -> Result<Self, LookError> {
        let xml = std::fs::read_to_string(path)?;
        let mut look = Look::from_stt_str(&xml)?;
        if look.name.is_none() {
            look.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(look)
    }

    /// Parses a look from the XML text of a `.stt` table-look file.
    pub fn from_stt_str(xml: &str) -> Result<Self, LookError> {
        crate::look_xml::parse_table_look(xml)
    }

    // ------------------------------------------------------------------------
    // Process default
    // ------------------------------------------------------------------------

    /// The look that newly created tables use.
    pub fn shared_default() -> Arc<Look> {
        match DEFAULT_LOOK.read() {
            Ok(look) => Arc::clone(&look),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

static DEFAULT_LOOK: Lazy<RwLock<Arc<Look>>> =
    Lazy::new(|| RwLock::new(Arc::new(Look::builtin_default())));

/// Replaces the look that newly created tables use. Existing tables keep
/// their look.
pub fn set_default_look(look: Look) {
    let mut slot = match DEFAULT_LOOK.write() {
        Ok(slot) => slot,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Arc::new(look);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_default_areas() {
        let look = Look::builtin_default();
        let title = look.area(Area::Title);
        assert!(title.font.bold);
        assert_eq!(title.cell.halign, HAlign::Center);
        assert_eq!(title.cell.margin, [[8, 11], [1, 8]]);

        let data = look.area(Area::Data);
        assert!(!data.font.bold);
        assert_eq!(data.cell.halign, HAlign::Mixed);
        assert_eq!(data.font.typeface.as_deref(), Some("Sans Serif"));
        assert_eq!(data.font.size, 9);

        assert_eq!(look.area(Area::Footer).cell.margin, [[11, 8], [2, 3]]);
        assert!(look.omit_empty);
        assert!(look.row_labels_in_corner);
    }

    #[test]
    fn test_builtin_default_borders() {
        let look = Look::builtin_default();
        assert_eq!(look.border(Border::OuterTop).stroke, Stroke::None);
        assert_eq!(look.border(Border::InnerTop).stroke, Stroke::Thick);
        assert_eq!(look.border(Border::DataLeft).stroke, Stroke::Thick);
        assert_eq!(look.border(Border::DimColVert).stroke, Stroke::Solid);
        assert_eq!(look.border(Border::CatRowHorz).stroke, Stroke::None);
    }

    #[test]
    fn test_border_resolution_falls_back() {
        let mut look = Look::builtin_default();
        // DimRowVert is unset and so is its fallback, CatRowVert.
        assert_eq!(
            look.resolve_border(Border::DimRowVert, false).stroke,
            Stroke::None
        );
        assert_eq!(
            look.resolve_border(Border::DimRowVert, true).stroke,
            Stroke::Dashed
        );

        look.set_border(Border::CatRowVert, BorderStyle::new(Stroke::Double));
        assert_eq!(
            look.resolve_border(Border::DimRowVert, true).stroke,
            Stroke::Double
        );
        assert_eq!(
            look.resolve_border(Border::InnerLeft, true).stroke,
            Stroke::Thick
        );
    }

    #[test]
    fn test_halign_interpret() {
        assert_eq!(HAlign::Mixed.interpret(true), HAlign::Right);
        assert_eq!(HAlign::Mixed.interpret(false), HAlign::Left);
        assert_eq!(HAlign::Center.interpret(true), HAlign::Center);
    }

    #[test]
    fn test_color_css() {
        assert_eq!(Color::from_rgb(0x1e90ff).to_css(), "#1e90ff");
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::new(255, 0, 0)));
        assert_eq!(Color::from_hex("12345"), None);
        assert_eq!(Color::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0.000)");
    }

    #[test]
    fn test_look_json_round_trip() {
        let mut look = Look::builtin_default();
        look.name = Some("Custom".to_string());
        look.show_numeric_markers = true;
        let json = look.to_json().unwrap();
        let back = Look::from_json(&json).unwrap();
        assert_eq!(back, look);
    }

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("2in"), Some(2.0));
        assert_eq!(parse_length("36"), Some(0.5));
        assert_eq!(parse_length("48px"), Some(0.5));
        assert_eq!(parse_length("1,5in"), Some(1.5));
        assert_eq!(parse_length("72пт"), Some(1.0));
        assert_eq!(parse_length("3 인치"), Some(3.0));
        assert!((parse_length("2.54см").unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(parse_length("3furlongs"), None);
        assert_eq!(parse_length("in"), None);
    }

    #[test]
    fn test_stroke_combine_keeps_heavier() {
        assert_eq!(Stroke::Solid.combine(Stroke::Thick), Stroke::Thick);
        assert_eq!(Stroke::None.combine(Stroke::Dashed), Stroke::Dashed);
        assert_eq!(Stroke::from_name("double"), Some(Stroke::Double));
        assert_eq!(Stroke::Double.name(), "double");
    }
}
