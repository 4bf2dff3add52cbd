//! FILENAME: core/dictionary/src/lib.rs
//! PURPOSE: Variables, values, cases and print formats.
//! CONTEXT: This crate is the data-dictionary surface that the categoricals
//! engine and the pivot-table model consume. It knows nothing about output.

pub mod case;
pub mod data_out;
pub mod dictionary;
pub mod format;
pub mod missing;
pub mod value;
pub mod variable;

pub use case::Case;
pub use data_out::{data_out, data_out_with, DataOutOptions};
pub use dictionary::{case_weight, Dictionary};
pub use format::{Format, FormatError, FormatType};
pub use missing::{MissingValues, MvClass};
pub use value::{Value, SYSMIS};
pub use variable::{VarRef, Variable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_round_trip_through_json() {
        let var = Variable::numeric("income")
            .with_label("Household income")
            .with_print_format("DOLLAR12.2".parse().unwrap());
        let json = serde_json::to_string(&var).unwrap();
        let back: Variable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "income");
        assert_eq!(back.print_format.to_string(), "DOLLAR12.2");
    }

    #[test]
    fn test_case_values_render_with_print_format() {
        let mut dict = Dictionary::new();
        let x = dict
            .add_var(Variable::numeric("x").with_print_format("F6.1".parse().unwrap()))
            .unwrap();
        let case = dict.make_case(vec![Value::Number(12.34)]);
        assert_eq!(data_out(case.data(&x), &x.print_format), "  12.3");
    }
}
