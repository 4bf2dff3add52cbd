//! FILENAME: core/dictionary/src/dictionary.rs
//! PURPOSE: An ordered collection of variables plus the optional weight
//! variable.
//! CONTEXT: Variables added to a dictionary receive sequential case indices,
//! so cases built for the dictionary hold values in declaration order.

use crate::case::Case;
use crate::missing::MvClass;
use crate::variable::{VarRef, Variable};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    vars: Vec<VarRef>,
    by_name: FxHashMap<String, usize>,
    weight: Option<VarRef>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `var` with the next free case index and returns a shared
    /// reference to it. Returns `None` if a variable with the same name
    /// (case-insensitive) already exists.
    pub fn add_var(&mut self, mut var: Variable) -> Option<VarRef> {
        let key = var.name.to_ascii_uppercase();
        if self.by_name.contains_key(&key) {
            return None;
        }
        var.case_index = self.vars.len();
        let var = VarRef::new(var);
        self.by_name.insert(key, self.vars.len());
        self.vars.push(var.clone());
        Some(var)
    }

    /// Looks up a variable by name, ignoring case.
    pub fn lookup_var(&self, name: &str) -> Option<&VarRef> {
        self.by_name
            .get(&name.to_ascii_uppercase())
            .map(|&i| &self.vars[i])
    }

    pub fn vars(&self) -> &[VarRef] {
        &self.vars
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Sets (or clears) the weight variable. The variable must be numeric.
    pub fn set_weight(&mut self, var: Option<VarRef>) {
        if let Some(v) = &var {
            assert!(v.is_numeric(), "weight variable {} must be numeric", v.name);
        }
        self.weight = var;
    }

    pub fn weight(&self) -> Option<&VarRef> {
        self.weight.as_ref()
    }

    /// Returns the weight of `case` and whether it was valid.
    pub fn case_weight(&self, case: &Case) -> (f64, bool) {
        case_weight(self.weight.as_deref(), case)
    }

    /// Builds a case for this dictionary from `values` in declaration order.
    pub fn make_case(&self, values: Vec<crate::value::Value>) -> Case {
        assert_eq!(
            values.len(),
            self.vars.len(),
            "case needs one value per variable"
        );
        Case::new(values)
    }
}

/// Returns the weight of `case` under the weight variable `weight` and
/// whether it was valid.
///
/// Without a weight variable every case weighs 1. A weight that is missing,
/// negative or not finite is invalid and counts as 0.
pub fn case_weight(weight: Option<&Variable>, case: &Case) -> (f64, bool) {
    let Some(var) = weight else {
        return (1.0, true);
    };
    let value = case.data(var);
    match value.as_number() {
        Some(w) if w.is_finite() && w >= 0.0 && !var.is_value_missing(value, MvClass::ANY) => {
            (w, true)
        }
        _ => (0.0, false),
    }
}
