//! FILENAME: core/dictionary/src/missing.rs
//! PURPOSE: User-missing value sets and the missing-value class mask.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Which kinds of missing values a test should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MvClass(u8);

impl MvClass {
    /// No value is considered missing.
    pub const NONE: MvClass = MvClass(0);
    /// Values declared missing by the user.
    pub const USER: MvClass = MvClass(1);
    /// The system-missing value.
    pub const SYSTEM: MvClass = MvClass(2);
    /// Both user- and system-missing values.
    pub const ANY: MvClass = MvClass(3);

    pub fn contains(self, other: MvClass) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl Default for MvClass {
    fn default() -> Self {
        MvClass::ANY
    }
}

impl std::ops::BitOr for MvClass {
    type Output = MvClass;

    fn bitor(self, rhs: MvClass) -> MvClass {
        MvClass(self.0 | rhs.0)
    }
}

/// A variable's user-missing values: up to three discrete values, or a
/// numeric range plus at most one discrete value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingValues {
    values: SmallVec<[Value; 3]>,
    range: Option<(f64, f64)>,
}

impl MissingValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a discrete missing value. Returns false if the set is full.
    pub fn add_value(&mut self, value: Value) -> bool {
        let limit = if self.range.is_some() { 1 } else { 3 };
        if self.values.len() >= limit {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Sets the missing range `low..=high`. Returns false if more than one
    /// discrete value is already present.
    pub fn set_range(&mut self, low: f64, high: f64) -> bool {
        if self.values.len() > 1 || low > high {
            return false;
        }
        self.range = Some((low, high));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.range.is_none()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Tests whether `value` is missing under `class`.
    pub fn is_missing(&self, value: &Value, class: MvClass) -> bool {
        if value.is_sysmis() {
            return class.contains(MvClass::SYSTEM);
        }
        if !class.contains(MvClass::USER) {
            return false;
        }
        if self.values.iter().any(|mv| mv == value) {
            return true;
        }
        match (value, self.range) {
            (Value::Number(x), Some((low, high))) => *x >= low && *x <= high,
            _ => false,
        }
    }
}
