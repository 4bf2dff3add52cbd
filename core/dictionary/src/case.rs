//! FILENAME: core/dictionary/src/case.rs
//! PURPOSE: A case is one row of data: a value per variable, addressed by the
//! variable's case index.

use crate::value::Value;
use crate::variable::Variable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    values: Vec<Value>,
}

impl Case {
    pub fn new(values: Vec<Value>) -> Self {
        Case { values }
    }

    /// Returns the value this case holds for `var`.
    ///
    /// Panics if the case was built for a different dictionary and has no
    /// slot for the variable.
    pub fn data(&self, var: &Variable) -> &Value {
        self.values.get(var.case_index).unwrap_or_else(|| {
            panic!(
                "case has {} values but variable {} has case index {}",
                self.values.len(),
                var.name,
                var.case_index
            )
        })
    }

    /// Returns the numeric value for `var`, or `None` for string variables.
    pub fn num(&self, var: &Variable) -> Option<f64> {
        self.data(var).as_number()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl From<Vec<Value>> for Case {
    fn from(values: Vec<Value>) -> Self {
        Case::new(values)
    }
}
