//! FILENAME: core/pivot-table/src/look_xml.rs
//! PURPOSE: Reads table looks from `.stt` XML documents.
//! CONTEXT: The loader starts from the builtin default look and overrides
//! whatever the document specifies. Elements and attributes it does not know
//! are skipped so that files written by newer software still load.

use crate::error::LookError;
use crate::look::{parse_length, Area, Border, Color, HAlign, Look, Stroke, VAlign};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Which part of the document the reader is inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Other,
    CellFormats,
    Borders,
}

pub(crate) fn parse_table_look(xml: &str) -> Result<Look, LookError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut look = Look::builtin_default();
    let mut seen_root = false;
    let mut section = Section::Other;
    let mut current_area: Option<Area> = None;

    loop {
        let (element, is_empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"cellFormatProperties" | b"borderProperties" => section = Section::Other,
                    name if area_from_name(name).is_some() => current_area = None,
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = element.local_name();
        let name = name.as_ref();
        let attrs = attributes(&element)?;

        if !seen_root {
            if name != b"tableProperties" {
                return Err(LookError::NotTableLook(
                    String::from_utf8_lossy(name).into_owned(),
                ));
            }
            seen_root = true;
            if let Some(value) = find(&attrs, "name") {
                look.name = Some(value.to_string());
            }
            continue;
        }

        match (section, name) {
            (_, b"generalProperties") => apply_general(&mut look, &attrs)?,
            (_, b"footnoteProperties") => apply_footnotes(&mut look, &attrs)?,
            (_, b"printingProperties") => apply_printing(&mut look, &attrs)?,
            (_, b"cellFormatProperties") if !is_empty => section = Section::CellFormats,
            (_, b"borderProperties") if !is_empty => section = Section::Borders,
            (Section::CellFormats, b"style") => {
                if let Some(area) = current_area {
                    apply_style(&mut look, area, &attrs)?;
                }
            }
            (Section::CellFormats, _) => {
                if let Some(area) = area_from_name(name) {
                    if !is_empty {
                        current_area = Some(area);
                    }
                }
            }
            (Section::Borders, _) => {
                if let Some(border) = border_from_name(name) {
                    apply_border(&mut look, border, &attrs)?;
                }
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(LookError::NotTableLook(String::new()));
    }
    Ok(look)
}

// ============================================================================
// ELEMENT HANDLERS
// ============================================================================

fn apply_general(look: &mut Look, attrs: &[(String, String)]) -> Result<(), LookError> {
    for (key, value) in attrs {
        match key.as_str() {
            "hideEmptyRows" => look.omit_empty = parse_bool(key, value)?,
            "rowDimensionLabels" => {
                look.row_labels_in_corner = match value.as_str() {
                    "inCorner" => true,
                    "nested" => false,
                    _ => return Err(invalid(key, value)),
                }
            }
            "minimumColumnWidth" => look.width_ranges[0][0] = parse_px(key, value)?,
            "maximumColumnWidth" => look.width_ranges[0][1] = parse_px(key, value)?,
            "minimumRowWidth" => look.width_ranges[1][0] = parse_px(key, value)?,
            "maximumRowWidth" => look.width_ranges[1][1] = parse_px(key, value)?,
            _ => {}
        }
    }
    Ok(())
}

fn apply_footnotes(look: &mut Look, attrs: &[(String, String)]) -> Result<(), LookError> {
    for (key, value) in attrs {
        match key.as_str() {
            "markerPosition" => {
                look.footnote_marker_superscripts = match value.as_str() {
                    "superscript" => true,
                    "subscript" => false,
                    _ => return Err(invalid(key, value)),
                }
            }
            "numberFormat" => {
                look.show_numeric_markers = match value.as_str() {
                    "numeric" => true,
                    "alphabetic" => false,
                    _ => return Err(invalid(key, value)),
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn apply_printing(look: &mut Look, attrs: &[(String, String)]) -> Result<(), LookError> {
    for (key, value) in attrs {
        match key.as_str() {
            "printAllLayers" => look.print_all_layers = parse_bool(key, value)?,
            "printEachLayerOnSeparatePage" => look.paginate_layers = parse_bool(key, value)?,
            "rescaleWideTableToFitPage" => look.shrink_to_fit[0] = parse_bool(key, value)?,
            "rescaleLongTableToFitPage" => look.shrink_to_fit[1] = parse_bool(key, value)?,
            "windowOrphanLines" => {
                look.n_orphan_lines = value.trim().parse().map_err(|_| invalid(key, value))?
            }
            "continuationText" => look.continuation = Some(value.clone()),
            "continuationTextAtTop" => look.top_continuation = parse_bool(key, value)?,
            "continuationTextAtBottom" => look.bottom_continuation = parse_bool(key, value)?,
            _ => {}
        }
    }
    Ok(())
}

fn apply_style(look: &mut Look, area: Area, attrs: &[(String, String)]) -> Result<(), LookError> {
    let style = look.area_mut(area);
    let mut alternating_fg = None;
    let mut alternating_bg = None;

    for (key, value) in attrs {
        match key.as_str() {
            "color" => style.font.fg[0] = parse_color(key, value)?,
            "color2" => style.font.bg[0] = parse_color(key, value)?,
            "alternatingTextColor" => alternating_fg = Some(parse_color(key, value)?),
            "alternatingColor" => alternating_bg = Some(parse_color(key, value)?),
            "font-family" => style.font.typeface = Some(value.clone()),
            "font-size" => style.font.size = parse_dimension(key, value, 72.0)?.round() as i32,
            "font-weight" => style.font.bold = value == "bold",
            "font-style" => style.font.italic = value == "italic",
            "font-underline" => style.font.underline = value == "underline",
            "labelLocationVertical" => {
                style.cell.valign = match value.as_str() {
                    "positive" => VAlign::Top,
                    "negative" => VAlign::Bottom,
                    "center" => VAlign::Center,
                    _ => return Err(invalid(key, value)),
                }
            }
            "textAlignment" => {
                style.cell.halign = match value.as_str() {
                    "left" => HAlign::Left,
                    "right" => HAlign::Right,
                    "center" => HAlign::Center,
                    "decimal" => HAlign::Decimal,
                    "mixed" => HAlign::Mixed,
                    _ => return Err(invalid(key, value)),
                }
            }
            "decimal-offset" => style.cell.decimal_offset = parse_dimension(key, value, 96.0)?,
            "margin-left" => style.cell.margin[0][0] = parse_px(key, value)?,
            "margin-right" => style.cell.margin[0][1] = parse_px(key, value)?,
            "margin-top" => style.cell.margin[1][0] = parse_px(key, value)?,
            "margin-bottom" => style.cell.margin[1][1] = parse_px(key, value)?,
            _ => {}
        }
    }

    style.font.fg[1] = alternating_fg.unwrap_or(style.font.fg[0]);
    style.font.bg[1] = alternating_bg.unwrap_or(style.font.bg[0]);
    Ok(())
}

fn apply_border(look: &mut Look, border: Border, attrs: &[(String, String)]) -> Result<(), LookError> {
    let mut style = look.border(border);
    for (key, value) in attrs {
        match key.as_str() {
            "borderStyleType" => {
                style.stroke = Stroke::from_name(value).ok_or_else(|| invalid(key, value))?
            }
            "color" => style.color = parse_color(key, value)?,
            _ => {}
        }
    }
    look.set_border(border, style);
    Ok(())
}

// ============================================================================
// NAME TABLES
// ============================================================================

fn area_from_name(name: &[u8]) -> Option<Area> {
    match name {
        b"title" => Some(Area::Title),
        b"caption" => Some(Area::Caption),
        b"footnotes" => Some(Area::Footer),
        b"cornerLabels" => Some(Area::Corner),
        b"columnLabels" => Some(Area::ColumnLabels),
        b"rowLabels" => Some(Area::RowLabels),
        b"data" => Some(Area::Data),
        b"layers" => Some(Area::Layers),
        _ => None,
    }
}

fn border_from_name(name: &[u8]) -> Option<Border> {
    let border = match name {
        b"titleLayerSeparator" => Border::Title,
        b"leftOuterFrame" => Border::OuterLeft,
        b"topOuterFrame" => Border::OuterTop,
        b"rightOuterFrame" => Border::OuterRight,
        b"bottomOuterFrame" => Border::OuterBottom,
        b"leftInnerFrame" => Border::InnerLeft,
        b"topInnerFrame" => Border::InnerTop,
        b"rightInnerFrame" => Border::InnerRight,
        b"bottomInnerFrame" => Border::InnerBottom,
        b"dataAreaLeft" => Border::DataLeft,
        b"dataAreaTop" => Border::DataTop,
        b"horizontalDimensionBorderRows" => Border::DimRowHorz,
        b"verticalDimensionBorderRows" => Border::DimRowVert,
        b"horizontalDimensionBorderColumns" => Border::DimColHorz,
        b"verticalDimensionBorderColumns" => Border::DimColVert,
        b"horizontalCategoryBorderRows" => Border::CatRowHorz,
        b"verticalCategoryBorderRows" => Border::CatRowVert,
        b"horizontalCategoryBorderColumns" => Border::CatColHorz,
        b"verticalCategoryBorderColumns" => Border::CatColVert,
        _ => return None,
    };
    Some(border)
}

// ============================================================================
// ATTRIBUTE PARSING
// ============================================================================

fn attributes(element: &BytesStart) -> Result<Vec<(String, String)>, LookError> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn find<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn invalid(key: &str, value: &str) -> LookError {
    LookError::InvalidAttribute {
        attribute: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, LookError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_color(key: &str, value: &str) -> Result<Color, LookError> {
    if value == "transparent" {
        return Ok(Color::TRANSPARENT);
    }
    Color::from_hex(value).ok_or_else(|| invalid(key, value))
}

/// Parses a length such as `8pt`, `0.5in`, `1cm` or `12px` and returns it in
/// units of 1/`per_inch` inch. A bare number is in points.
fn parse_dimension(key: &str, value: &str, per_inch: f64) -> Result<f64, LookError> {
    parse_length(value)
        .map(|inches| inches * per_inch)
        .ok_or_else(|| invalid(key, value))
}

fn parse_px(key: &str, value: &str) -> Result<i32, LookError> {
    Ok(parse_dimension(key, value, 96.0)?.round() as i32)
}
