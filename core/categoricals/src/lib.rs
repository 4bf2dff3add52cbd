//! FILENAME: core/categoricals/src/lib.rs
//! PURPOSE: Interactions of categorical variables and the engine that turns
//! observed cases into design-matrix bookkeeping.
//! CONTEXT: Factorial procedures (GLM, logistic regression, one-way ANOVA)
//! build a `Categoricals` over their interactions, feed it every case, call
//! `done`, and then read degrees of freedom and codings from it.

pub mod categoricals;
pub mod interaction;

pub use categoricals::{Categoricals, NoPayload, Payload};
pub use interaction::Interaction;
