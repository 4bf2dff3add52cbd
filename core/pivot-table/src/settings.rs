//! FILENAME: core/pivot-table/src/settings.rs
//! PURPOSE: Process-wide settings that affect how values are displayed and
//! where output is routed.
//! CONTEXT: Tables carry their own display policy, which falls back to these
//! settings when left at `ValueShow::Default`. The output engine reads the
//! routing table at submission time.

use dictionary::Format;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use std::sync::RwLock;

/// Whether to show a value, its label, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueShow {
    /// Defer to the next level of policy (value, then table, then settings).
    #[default]
    Default,
    Value,
    Label,
    Both,
}

impl ValueShow {
    pub fn shows_value(self) -> bool {
        matches!(self, ValueShow::Value | ValueShow::Both)
    }

    pub fn shows_label(self) -> bool {
        matches!(self, ValueShow::Label | ValueShow::Both)
    }
}

/// A set of output device types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OutputDevices(u8);

impl OutputDevices {
    pub const NONE: OutputDevices = OutputDevices(0);
    /// A file or printer.
    pub const LISTING: OutputDevices = OutputDevices(1);
    /// The screen.
    pub const TERMINAL: OutputDevices = OutputDevices(2);
    /// Receives all output, with no routing.
    pub const UNFILTERED: OutputDevices = OutputDevices(4);

    pub fn intersects(self, other: OutputDevices) -> bool {
        self.0 & other.0 != 0
    }

    pub fn contains(self, other: OutputDevices) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OutputDevices {
    type Output = OutputDevices;

    fn bitor(self, rhs: OutputDevices) -> OutputDevices {
        OutputDevices(self.0 | rhs.0)
    }
}

/// The kinds of output that can be routed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputType {
    /// Errors and warnings.
    Error,
    Note,
    Syntax,
    /// Everything else.
    Result,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub show_values: ValueShow,
    pub show_variables: ValueShow,
    /// Format for numeric cells that have no other format.
    pub default_format: Format,
    /// Nonzero magnitudes below this threshold are shown in E notation.
    pub small: f64,
    pub include_leading_zero: bool,
    routing: [OutputDevices; 4],
}

impl Default for Settings {
    fn default() -> Self {
        let both = OutputDevices::LISTING | OutputDevices::TERMINAL;
        Settings {
            show_values: ValueShow::Label,
            show_variables: ValueShow::Label,
            default_format: Format::default_numeric(),
            small: 0.0001,
            include_leading_zero: false,
            routing: [both, both, OutputDevices::NONE, both],
        }
    }
}

impl Settings {
    /// The devices that should receive output of type `output_type`. Devices
    /// of type `UNFILTERED` always do.
    pub fn output_routing(&self, output_type: OutputType) -> OutputDevices {
        self.routing[output_type as usize] | OutputDevices::UNFILTERED
    }

    pub fn set_output_routing(&mut self, output_type: OutputType, devices: OutputDevices) {
        self.routing[output_type as usize] = devices;
    }
}

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

/// Returns a snapshot of the current settings.
pub fn settings() -> Settings {
    match SETTINGS.read() {
        Ok(s) => s.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Applies `f` to the process-wide settings.
pub fn update_settings(f: impl FnOnce(&mut Settings)) {
    let mut guard = match SETTINGS.write() {
        Ok(s) => s,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut guard);
}
