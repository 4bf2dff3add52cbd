//! FILENAME: core/output/src/lib.rs
//! PURPOSE: The output subsystem: items, the engine stack that routes them,
//! and the drivers that render them.
//! CONTEXT: Procedures build pivot tables and texts, wrap them in
//! `OutputItem`s and submit them to an `OutputStack`. Drivers are created
//! from option maps with `driver_create` and registered with the current
//! engine.
//!
//! Architecture:
//! - `item` / `message` - what gets submitted
//! - `engine` - deferral, grouping and per-driver routing
//! - `driver` / `options` - the driver interface, factories, option parsing
//! - `csv` / `html` / `txt` - the renderers

pub mod csv;
pub mod driver;
pub mod engine;
pub mod error;
pub mod html;
pub mod item;
pub mod message;
pub mod options;
pub mod txt;

pub use csv::CsvDriver;
pub use driver::{driver_create, find_factory, parse_option, Driver, DriverFactory};
pub use engine::{Engine, OutputStack};
pub use error::OutputError;
pub use html::HtmlDriver;
pub use item::{Chart, Image, ItemKind, OutputItem, TextSubtype};
pub use message::{Category, Diagnostic, Location, Severity};
pub use options::{parse_color, DriverOptions};
pub use txt::TextDriver;
