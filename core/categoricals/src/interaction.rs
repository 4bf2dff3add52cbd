//! FILENAME: core/categoricals/src/interaction.rs
//! PURPOSE: An ordered set of variables whose joint values identify a cell of
//! a factorial design.
//! CONTEXT: Interactions are commutative mathematically, but matching and
//! rendering need a stable order, so the variable order is recorded as given
//! and callers build canonical orders where they need them.

use dictionary::{Case, MvClass, VarRef};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// An ordered sequence of distinct variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    vars: SmallVec<[VarRef; 4]>,
}

impl Interaction {
    /// Creates an empty interaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an interaction holding only `var`.
    pub fn with_var(var: VarRef) -> Self {
        let mut iact = Interaction::new();
        iact.vars.push(var);
        iact
    }

    /// Appends `var`. The variable must not already be present.
    pub fn add_var(&mut self, var: VarRef) {
        debug_assert!(
            !self.contains(&var),
            "variable {} already in interaction",
            var.name
        );
        self.vars.push(var);
    }

    pub fn vars(&self) -> &[VarRef] {
        &self.vars
    }

    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, var: &VarRef) -> bool {
        self.vars.iter().any(|v| v == var)
    }

    /// True if every variable in `self` is also in `other`.
    pub fn is_subset(&self, other: &Interaction) -> bool {
        self.vars.len() <= other.vars.len() && self.vars.iter().all(|v| other.contains(v))
    }

    /// True if `self` is a subset of `other` and `other` has more variables.
    pub fn is_proper_subset(&self, other: &Interaction) -> bool {
        self.vars.len() < other.vars.len() && self.is_subset(other)
    }

    /// Order-sensitive hash of the values `case` holds for these variables.
    pub fn case_hash(&self, case: &Case, seed: u64) -> u64 {
        self.vars
            .iter()
            .fold(seed, |hash, var| case.data(var).hash_with(var.width, hash))
    }

    /// True if `c1` and `c2` hold equal values for every variable.
    pub fn case_equal(&self, c1: &Case, c2: &Case) -> bool {
        self.vars
            .iter()
            .all(|var| c1.data(var).equal(c2.data(var), var.width))
    }

    /// Lexicographic comparison of the values in `c1` and `c2`, in variable
    /// order.
    pub fn case_cmp_3way(&self, c1: &Case, c2: &Case) -> Ordering {
        for var in &self.vars {
            match c1.data(var).compare_3way(c2.data(var), var.width) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// True if any variable's value in `case` is missing under `exclude`.
    pub fn case_is_missing(&self, case: &Case, exclude: MvClass) -> bool {
        self.vars
            .iter()
            .any(|var| var.is_value_missing(case.data(var), exclude))
    }
}

impl fmt::Display for Interaction {
    /// Variable names (or labels) joined by a multiplication sign.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, var) in self.vars.iter().enumerate() {
            if i > 0 {
                f.write_str(" × ")?;
            }
            f.write_str(var.label.as_deref().unwrap_or(&var.name))?;
        }
        Ok(())
    }
}

impl FromIterator<VarRef> for Interaction {
    fn from_iter<I: IntoIterator<Item = VarRef>>(iter: I) -> Self {
        let mut iact = Interaction::new();
        for var in iter {
            iact.add_var(var);
        }
        iact
    }
}
