//! FILENAME: core/pivot-table/src/lib.rs
//! PURPOSE: The pivot-table model: values, dimensions, cells, footnotes,
//! looks, and the layout that turns a table into renderable grids.
//! CONTEXT: Statistical procedures build `PivotTable`s and submit them to the
//! output engine. Drivers call `PivotTable::output` for each layer and render
//! the resulting `TableGrid`s.
//!
//! Architecture:
//! - `value` - cell contents and their text rendering
//! - `dimension` / `table` - the category trees and the sparse cell store
//! - `look` / `look_xml` - styling, with `.stt` and JSON persistence
//! - `grid` / `output` - layout of one layer into joined cells and rules
//! - `settings` - process-wide display and routing defaults

pub mod dimension;
pub mod error;
pub mod footnote;
pub mod grid;
pub mod look;
mod look_xml;
pub mod output;
pub mod settings;
pub mod table;
pub mod value;

pub use dimension::{Axis, Category, CategoryId, Dimension, ResultClass};
pub use error::LookError;
pub use footnote::{alphabetic_marker, Footnote};
pub use grid::{GridCell, TableGrid, H, V};
pub use look::{
    parse_length, set_default_look, Area, AreaStyle, Border, BorderStyle, CellStyle, Color, FontStyle, HAlign,
    Look, Stroke, VAlign,
};
pub use output::PivotOutput;
pub use settings::{settings, update_settings, OutputDevices, OutputType, Settings, ValueShow};
pub use table::{CellIndex, PivotTable};
pub use value::{FormatContext, Value, ValueInner};
