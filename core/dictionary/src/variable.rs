//! FILENAME: core/dictionary/src/variable.rs
//! PURPOSE: Variables and the shared references to them that the rest of the
//! system passes around.
//! CONTEXT: The output core uses variables only by identity, so `VarRef`
//! compares and hashes by pointer rather than by content.

use crate::format::Format;
use crate::missing::{MissingValues, MvClass};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// A column of the active dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// 0 for numeric variables, otherwise the string width in bytes.
    pub width: usize,
    pub print_format: Format,
    pub label: Option<String>,
    pub value_labels: BTreeMap<Value, String>,
    pub missing_values: MissingValues,
    /// Position of this variable's value within a case.
    pub case_index: usize,
}

impl Variable {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Variable {
            name: name.into(),
            width,
            print_format: Format::for_width(width),
            label: None,
            value_labels: BTreeMap::new(),
            missing_values: MissingValues::new(),
            case_index: 0,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Variable::new(name, 0)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_print_format(mut self, format: Format) -> Self {
        self.print_format = format;
        self
    }

    pub fn with_value_label(mut self, value: Value, label: impl Into<String>) -> Self {
        self.value_labels.insert(value, label.into());
        self
    }

    pub fn with_missing_values(mut self, missing_values: MissingValues) -> Self {
        self.missing_values = missing_values;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.width == 0
    }

    /// Returns the label for `value`, if one is defined.
    pub fn value_label(&self, value: &Value) -> Option<&str> {
        self.value_labels.get(value).map(String::as_str)
    }

    /// Tests whether `value` is missing for this variable under `class`.
    pub fn is_value_missing(&self, value: &Value, class: MvClass) -> bool {
        self.missing_values.is_missing(value, class)
    }
}

/// A shared, identity-compared handle to a variable.
#[derive(Clone)]
pub struct VarRef(Arc<Variable>);

impl VarRef {
    pub fn new(variable: Variable) -> Self {
        VarRef(Arc::new(variable))
    }

    pub fn ptr_eq(&self, other: &VarRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for VarRef {
    type Target = Variable;

    fn deref(&self) -> &Variable {
        &self.0
    }
}

impl PartialEq for VarRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for VarRef {}

impl Hash for VarRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarRef({})", self.0.name)
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = VarRef::new(Variable::numeric("x"));
        let b = VarRef::new(Variable::numeric("x"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_labels() {
        let var = Variable::numeric("sex")
            .with_value_label(Value::Number(1.0), "Male")
            .with_value_label(Value::Number(2.0), "Female");
        assert_eq!(var.value_label(&Value::Number(2.0)), Some("Female"));
        assert_eq!(var.value_label(&Value::Number(3.0)), None);
    }

    #[test]
    fn test_default_print_format() {
        assert_eq!(Variable::numeric("x").print_format.to_string(), "F8.2");
        assert_eq!(Variable::new("s", 6).print_format.to_string(), "A6");
    }
}
