//! Integration tests: building design-matrix rows from a finalized
//! categoricals object, the way factorial procedures consume it.

use categoricals::{Categoricals, Interaction};
use dictionary::{Case, Dictionary, MvClass, Value, VarRef, Variable};

fn two_factor_data(weights: [f64; 6]) -> (Dictionary, VarRef, VarRef, Vec<Case>) {
    let mut dict = Dictionary::new();
    let a = dict.add_var(Variable::numeric("a")).unwrap();
    let b = dict.add_var(Variable::new("b", 1)).unwrap();
    let w = dict.add_var(Variable::numeric("w")).unwrap();
    dict.set_weight(Some(w));

    let mut cases = Vec::new();
    let mut i = 0;
    for a_val in [10.0, 20.0, 30.0] {
        for b_val in ["x", "y"] {
            cases.push(dict.make_case(vec![
                Value::Number(a_val),
                Value::string(b_val, 1),
                Value::Number(weights[i]),
            ]));
            i += 1;
        }
    }
    (dict, a, b, cases)
}

fn finalize(dict: &Dictionary, iacts: Vec<Interaction>, cases: &[Case]) -> Categoricals {
    let mut cat = Categoricals::new(iacts, dict.weight().cloned(), MvClass::ANY);
    for case in cases {
        cat.update(case);
    }
    cat.done();
    cat
}

#[test]
fn main_effects_and_interaction_layout() {
    let (dict, a, b, cases) = two_factor_data([1.0; 6]);
    let ab: Interaction = [a.clone(), b.clone()].into_iter().collect();
    let cat = finalize(
        &dict,
        vec![Interaction::with_var(a.clone()), Interaction::with_var(b.clone()), ab],
        &cases,
    );

    assert!(cat.sane());
    assert_eq!(cat.df(0), 2);
    assert_eq!(cat.df(1), 1);
    assert_eq!(cat.df(2), 2);
    assert_eq!(cat.df_total(), 5);
    assert_eq!(cat.n_total(), 3 + 2 + 6);

    // subscripts are contiguous per interaction in declaration order
    let owners: Vec<String> = (0..cat.df_total())
        .map(|s| cat.get_interaction_by_subscript(s).to_string())
        .collect();
    assert_eq!(owners, vec!["a", "a", "b", "a × b", "a × b"]);

    // categories likewise; the interaction's categories start after a and b
    let c = cat.get_case_by_category(5).unwrap();
    assert_eq!(c.num(&a), Some(10.0));
    assert_eq!(c.data(&b).trimmed_str().as_deref(), Some("x"));
}

#[test]
fn effects_rows_sum_to_zero_when_balanced() {
    let (dict, a, b, cases) = two_factor_data([2.0; 6]);
    let ab: Interaction = [a, b].into_iter().collect();
    let cat = finalize(&dict, vec![ab], &cases);

    assert!(cat.isbalanced());
    for s in 0..cat.df_total() {
        let column: f64 = cases
            .iter()
            .map(|c| cat.get_effects_code_for_case(s, c))
            .sum();
        assert_eq!(column, 0.0);
        assert_eq!(cat.get_sum_by_subscript(s), 0.0);
        assert_eq!(cat.get_weight_by_subscript(s), 12.0);
    }
}

#[test]
fn effects_code_negates_last_level_of_a() {
    let (dict, a, b, cases) = two_factor_data([1.0; 6]);
    let ab: Interaction = [a, b.clone()].into_iter().collect();
    let cat = finalize(&dict, vec![ab], &cases);

    // cases[4] is a=30 (last level), b=x
    let last_a = &cases[4];
    for s in 0..cat.df_total() {
        let others: f64 = cases[..4]
            .iter()
            .filter(|c| c.data(&b) == last_a.data(&b))
            .map(|c| cat.get_dummy_code_for_case(s, c))
            .sum();
        assert_eq!(cat.get_effects_code_for_case(s, last_a), -others);
    }
}

#[test]
fn unbalanced_weights_are_reported() {
    let (dict, a, b, cases) = two_factor_data([1.0, 1.0, 1.0, 1.0, 1.0, 3.0]);
    let ab: Interaction = [a, b].into_iter().collect();
    let cat = finalize(&dict, vec![ab], &cases);
    assert!(!cat.isbalanced());
    assert_ne!(cat.get_sum_by_subscript(0), 0.0);
}
