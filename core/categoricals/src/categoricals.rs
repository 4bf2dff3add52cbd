//! FILENAME: core/categoricals/src/categoricals.rs
//! PURPOSE: Enumerates the distinct values of categorical variables and of
//! their interactions, and derives the degrees-of-freedom bookkeeping and
//! dummy/effects codings that design matrices are built from.
//! CONTEXT: The object has two phases. While accumulating, cases are fed to
//! `update`. `done` freezes it: values get stable indices in ascending order,
//! subscripts and categories are laid out per interaction in declaration
//! order, and the per-subscript coding sums are tallied. Only then may the
//! query functions be called.
//!
//! Architecture:
//! - Each distinct value of each variable is interned once per object
//! - Each distinct combination of an interaction's values keeps a
//!   representative case and the total weight of matching cases
//! - Subscripts (the "short" map) index the df space; categories (the "long"
//!   map) index all combinations

use crate::interaction::Interaction;
use dictionary::{case_weight, Case, MvClass, Value, VarRef};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

// ============================================================================
// PAYLOAD HOOKS
// ============================================================================

/// Per-combination user data maintained alongside the frequency counts, for
/// example running moments of a dependent variable per cell.
pub trait Payload {
    type Data;

    /// Creates the data for a combination seen for the first time.
    fn create(&self) -> Self::Data;

    /// Folds `case`, carrying `weight`, into `data`.
    fn update(&self, data: &mut Self::Data, case: &Case, weight: f64);

    /// Called once per combination when the object is finalized.
    fn calculate(&self, _data: &mut Self::Data) {}

    /// Called once per combination when the object is dropped.
    fn destroy(&self, _data: Self::Data) {}
}

/// The payload used when no per-combination data is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPayload;

impl Payload for NoPayload {
    type Data = ();

    fn create(&self) -> Self::Data {}

    fn update(&self, _data: &mut (), _case: &Case, _weight: f64) {}
}

// ============================================================================
// INTERNAL NODES
// ============================================================================

/// The distinct values observed for one variable.
#[derive(Debug)]
struct VariableNode {
    var: VarRef,
    /// Maps each value to its index. Before finalization the index is the
    /// order of first appearance; afterward it is the rank in ascending order.
    index: FxHashMap<Value, usize>,
    /// Distinct values; sorted once finalized.
    values: Vec<Value>,
}

impl VariableNode {
    fn new(var: VarRef) -> Self {
        VariableNode {
            var,
            index: FxHashMap::default(),
            values: Vec::new(),
        }
    }

    fn observe(&mut self, value: &Value) {
        if !self.index.contains_key(value) {
            self.index.insert(value.clone(), self.values.len());
            self.values.push(value.clone());
        }
    }

    fn assign_indices(&mut self) {
        let width = self.var.width;
        self.values.sort_by(|a, b| a.compare_3way(b, width));
        for (i, value) in self.values.iter().enumerate() {
            self.index.insert(value.clone(), i);
        }
    }

    fn n_values(&self) -> usize {
        self.values.len()
    }

    fn index_of(&self, value: &Value) -> Option<usize> {
        self.index.get(value).copied()
    }
}

/// One observed combination of an interaction's values.
#[derive(Debug)]
struct InteractionValue<D> {
    /// A case representative of the combination.
    case: Case,
    /// Total weight of the cases with this combination.
    cc: f64,
    user_data: D,
}

#[derive(Debug)]
struct InteractParams<D> {
    iact: Interaction,
    /// For each variable of `iact`, its position in `Categoricals::var_nodes`.
    var_nodes: SmallVec<[usize; 4]>,
    /// Buckets of `ivs` positions keyed by combination hash, for lookup while
    /// accumulating.
    iv_map: FxHashMap<u64, SmallVec<[usize; 1]>>,
    /// Observed combinations; sorted by value once finalized.
    ivs: Vec<InteractionValue<D>>,

    base_df: usize,
    base_cats: usize,
    /// Product of the variables' value counts.
    n_cats: usize,
    /// Product of the variables' degrees of freedom.
    df_prod: usize,
    enc_sum: Vec<f64>,
    /// Sum of `ivs[*].cc`.
    cc: f64,
}

impl<D> InteractParams<D> {
    fn lookup(&self, hash: u64, case: &Case) -> Option<usize> {
        self.iv_map.get(&hash).and_then(|bucket| {
            bucket
                .iter()
                .copied()
                .find(|&i| self.iact.case_equal(case, &self.ivs[i].case))
        })
    }
}

// ============================================================================
// CATEGORICALS
// ============================================================================

/// Distinct values and coding bookkeeping for a set of interactions.
pub struct Categoricals<P: Payload = NoPayload> {
    iap: Vec<InteractParams<P::Data>>,
    var_nodes: Vec<VariableNode>,
    var_lookup: FxHashMap<VarRef, usize>,

    weight: Option<VarRef>,
    /// Missing values of these classes in factor variables exclude a case
    /// from an interaction.
    exclude: MvClass,
    payload: P,

    /// Interaction position for each subscript; `Some` once finalized.
    df_to_iact: Option<Vec<usize>>,
    /// Interaction position for each category.
    cat_to_iact: Vec<usize>,
    n_cats_total: usize,

    finalized: bool,
    sane: bool,
    n_invalid_weights: usize,
}

impl Categoricals<NoPayload> {
    /// Creates an accumulating object over `interactions`. Cases are weighted
    /// by `weight` when given; cases whose factor values are missing under
    /// `exclude` are skipped for the interactions involving those factors.
    pub fn new(interactions: Vec<Interaction>, weight: Option<VarRef>, exclude: MvClass) -> Self {
        Categoricals::with_payload(interactions, weight, exclude, NoPayload)
    }
}

impl<P: Payload> Categoricals<P> {
    /// Like [`Categoricals::new`], with `payload` maintaining user data for
    /// every observed combination.
    pub fn with_payload(
        interactions: Vec<Interaction>,
        weight: Option<VarRef>,
        exclude: MvClass,
        payload: P,
    ) -> Self {
        let mut var_nodes: Vec<VariableNode> = Vec::new();
        let mut var_lookup: FxHashMap<VarRef, usize> = FxHashMap::default();

        let iap = interactions
            .into_iter()
            .map(|iact| {
                let nodes = iact
                    .vars()
                    .iter()
                    .map(|var| {
                        *var_lookup.entry(var.clone()).or_insert_with(|| {
                            var_nodes.push(VariableNode::new(var.clone()));
                            var_nodes.len() - 1
                        })
                    })
                    .collect();
                InteractParams {
                    iact,
                    var_nodes: nodes,
                    iv_map: FxHashMap::default(),
                    ivs: Vec::new(),
                    base_df: 0,
                    base_cats: 0,
                    n_cats: 0,
                    df_prod: 0,
                    enc_sum: Vec::new(),
                    cc: 0.0,
                }
            })
            .collect();

        Categoricals {
            iap,
            var_nodes,
            var_lookup,
            weight,
            exclude,
            payload,
            df_to_iact: None,
            cat_to_iact: Vec::new(),
            n_cats_total: 0,
            finalized: false,
            sane: false,
            n_invalid_weights: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Accumulation
    // ------------------------------------------------------------------------

    /// Records `case`.
    ///
    /// Panics if called after [`Categoricals::done`].
    pub fn update(&mut self, case: &Case) {
        assert!(!self.finalized, "Categoricals::update called after done()");

        let (weight, valid) = case_weight(self.weight.as_deref(), case);
        if !valid {
            if self.n_invalid_weights == 0 {
                log::warn!(
                    "At least one case in the data file had a weight value that was \
                     user-missing, system-missing, zero, or negative. These case(s) were ignored."
                );
            }
            self.n_invalid_weights += 1;
        }

        for node in &mut self.var_nodes {
            node.observe(case.data(&node.var));
        }

        let exclude = self.exclude;
        for iap in &mut self.iap {
            if iap.iact.case_is_missing(case, exclude) {
                continue;
            }

            let hash = iap.iact.case_hash(case, 0);
            let pos = match iap.lookup(hash, case) {
                Some(pos) => {
                    iap.ivs[pos].cc += weight;
                    pos
                }
                None => {
                    iap.ivs.push(InteractionValue {
                        case: case.clone(),
                        cc: weight,
                        user_data: self.payload.create(),
                    });
                    let pos = iap.ivs.len() - 1;
                    iap.iv_map.entry(hash).or_default().push(pos);
                    pos
                }
            };
            iap.cc += weight;
            self.payload
                .update(&mut iap.ivs[pos].user_data, case, weight);
        }
    }

    /// Finalizes the object. Afterward `update` may not be called and the
    /// query functions may, provided [`Categoricals::sane`] returns true.
    ///
    /// A factor variable with no observed values leaves the object not sane.
    /// Calling `done` more than once has no further effect.
    pub fn done(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;

        for node in &mut self.var_nodes {
            if node.n_values() == 0 {
                log::debug!("variable {} has no values; categoricals not sane", node.var.name);
                self.sane = false;
                return;
            }
            node.assign_indices();
        }

        let mut df_sum = 0;
        let mut n_cats_total = 0;
        for iap in &mut self.iap {
            iap.df_prod = 1;
            iap.n_cats = 1;
            for &v in &iap.var_nodes {
                let n_values = self.var_nodes[v].n_values();
                iap.df_prod *= n_values - 1;
                iap.n_cats *= n_values;
            }
            if !iap.iact.is_empty() {
                df_sum += iap.df_prod;
            }
            n_cats_total += iap.n_cats;
        }

        let mut df_to_iact = Vec::with_capacity(df_sum);
        let mut cat_to_iact = Vec::with_capacity(n_cats_total);
        for (i, iap) in self.iap.iter_mut().enumerate() {
            iap.base_df = df_to_iact.len();
            iap.base_cats = cat_to_iact.len();

            let iact = &iap.iact;
            iap.ivs.sort_by(|a, b| iact.case_cmp_3way(&a.case, &b.case));
            iap.iv_map = FxHashMap::default();

            if !iap.iact.is_empty() {
                df_to_iact.extend(std::iter::repeat(i).take(iap.df_prod));
            }
            cat_to_iact.extend(std::iter::repeat(i).take(iap.n_cats));
        }
        self.df_to_iact = Some(df_to_iact);
        self.cat_to_iact = cat_to_iact;
        self.n_cats_total = n_cats_total;

        for i in 0..self.iap.len() {
            let iap = &self.iap[i];
            let df = if iap.iact.is_empty() { 0 } else { iap.df_prod };
            let base = iap.base_df;
            let enc_sum: Vec<f64> = (base..base + df)
                .map(|subscript| {
                    iap.ivs
                        .iter()
                        .map(|iv| self.code_for_case(subscript, &iv.case, true) * iv.cc)
                        .sum()
                })
                .collect();

            let iap = &mut self.iap[i];
            iap.enc_sum = enc_sum;
            for iv in &mut iap.ivs {
                self.payload.calculate(&mut iv.user_data);
            }
        }

        log::debug!(
            "categoricals finalized: {} interactions, df total {}, {} categories",
            self.iap.len(),
            df_sum,
            n_cats_total
        );
        self.sane = true;
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// True once [`Categoricals::done`] has succeeded.
    pub fn sane(&self) -> bool {
        self.sane
    }

    /// True once the subscript and category maps have been built.
    pub fn is_complete(&self) -> bool {
        self.df_to_iact.is_some()
    }

    /// Number of cases seen with an invalid weight.
    pub fn n_invalid_weights(&self) -> usize {
        self.n_invalid_weights
    }

    pub fn n_interactions(&self) -> usize {
        self.iap.len()
    }

    pub fn interaction(&self, iact: usize) -> &Interaction {
        &self.iap[iact].iact
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Number of distinct combinations observed for interaction `iact`.
    pub fn n_count(&self, iact: usize) -> usize {
        self.iap[iact].ivs.len()
    }

    /// Total number of categories across all interactions, or 0 before the
    /// object is complete.
    pub fn n_total(&self) -> usize {
        if self.is_complete() {
            self.n_cats_total
        } else {
            0
        }
    }

    /// Degrees of freedom of interaction `iact`.
    pub fn df(&self, iact: usize) -> usize {
        self.check_sane();
        self.iap[iact].df_prod
    }

    /// Number of categories (all value combinations) of interaction `iact`.
    pub fn n_cats(&self, iact: usize) -> usize {
        self.check_sane();
        self.iap[iact].n_cats
    }

    /// Total degrees of freedom, or 0 before the object is complete.
    pub fn df_total(&self) -> usize {
        self.df_to_iact.as_ref().map_or(0, Vec::len)
    }

    /// True if, within each interaction, every observed combination carries
    /// the same total weight.
    pub fn isbalanced(&self) -> bool {
        self.check_sane();
        self.iap.iter().all(|iap| {
            iap.ivs
                .first()
                .map_or(true, |first| iap.ivs.iter().all(|iv| iv.cc == first.cc))
        })
    }

    /// The distinct values of `var`, in ascending order.
    ///
    /// Panics if `var` is not a factor of any interaction.
    pub fn get_var_values(&self, var: &VarRef) -> &[Value] {
        self.check_sane();
        let node = self
            .var_lookup
            .get(var)
            .unwrap_or_else(|| panic!("variable {} is not a factor", var.name));
        &self.var_nodes[*node].values
    }

    pub fn get_interaction_by_subscript(&self, subscript: usize) -> &Interaction {
        &self.df_to_iap(subscript).iact
    }

    /// Total weight of the interaction owning `subscript`.
    pub fn get_weight_by_subscript(&self, subscript: usize) -> f64 {
        self.df_to_iap(subscript).cc
    }

    /// Weighted sum of the effects coding at `subscript` over all observed
    /// combinations.
    pub fn get_sum_by_subscript(&self, subscript: usize) -> f64 {
        let iap = self.df_to_iap(subscript);
        iap.enc_sum[subscript - iap.base_df]
    }

    /// 1 if `case` falls in the cell that `subscript` stands for, else 0.
    pub fn get_dummy_code_for_case(&self, subscript: usize, case: &Case) -> f64 {
        self.check_sane();
        self.code_for_case(subscript, case, false)
    }

    /// Like the dummy code, except that each factor at its last level flips
    /// the sign instead of being matched (deviation contrasts).
    pub fn get_effects_code_for_case(&self, subscript: usize, case: &Case) -> f64 {
        self.check_sane();
        self.code_for_case(subscript, case, true)
    }

    /// A representative case of category `cat_index`, or `None` if that
    /// combination was never observed.
    pub fn get_case_by_category(&self, cat_index: usize) -> Option<&Case> {
        let (iap, offset) = self.cat_index_to_iap(cat_index);
        iap.ivs.get(offset).map(|iv| &iv.case)
    }

    /// The payload data of category `cat_index`, if observed.
    pub fn get_user_data_by_category(&self, cat_index: usize) -> Option<&P::Data> {
        let (iap, offset) = self.cat_index_to_iap(cat_index);
        iap.ivs.get(offset).map(|iv| &iv.user_data)
    }

    /// A representative case of the `n`th observed combination of
    /// interaction `iact`.
    pub fn get_case_by_category_real(&self, iact: usize, n: usize) -> Option<&Case> {
        self.check_sane();
        self.iap[iact].ivs.get(n).map(|iv| &iv.case)
    }

    /// The payload data of the `n`th observed combination of interaction
    /// `iact`.
    pub fn get_user_data_by_category_real(&self, iact: usize, n: usize) -> Option<&P::Data> {
        self.check_sane();
        self.iap[iact].ivs.get(n).map(|iv| &iv.user_data)
    }

    /// Index among its variable's values of the value that variable `var_idx`
    /// holds in the `cat`th observed combination of interaction `iact`.
    pub fn value_index_by_category(&self, iact: usize, cat: usize, var_idx: usize) -> usize {
        self.check_sane();
        let iap = &self.iap[iact];
        let var = &iap.iact.vars()[var_idx];
        let node = &self.var_nodes[iap.var_nodes[var_idx]];
        let value = iap.ivs[cat].case.data(var);
        node.index_of(value)
            .unwrap_or_else(|| panic!("value of {} was never observed", var.name))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn check_sane(&self) {
        assert!(
            self.sane,
            "categoricals queried before done() or after done() found a factor with no values"
        );
    }

    fn df_to_iap(&self, subscript: usize) -> &InteractParams<P::Data> {
        self.check_sane();
        let map = self.df_to_iact.as_deref().unwrap_or_default();
        assert!(
            subscript < map.len(),
            "subscript {} out of range 0..{}",
            subscript,
            map.len()
        );
        &self.iap[map[subscript]]
    }

    fn cat_index_to_iap(&self, cat_index: usize) -> (&InteractParams<P::Data>, usize) {
        self.check_sane();
        assert!(
            cat_index < self.n_cats_total,
            "category {} out of range 0..{}",
            cat_index,
            self.n_cats_total
        );
        let iap = &self.iap[self.cat_to_iact[cat_index]];
        (iap, cat_index - iap.base_cats)
    }

    /// Decodes `subscript` into one value index per factor, treating the
    /// offset within its interaction as a mixed-radix number whose digits are
    /// in base (n_values - 1), first factor least significant.
    fn code_for_case(&self, subscript: usize, case: &Case, effects_coding: bool) -> f64 {
        let map = self.df_to_iact.as_deref().unwrap_or_default();
        let iap = &self.iap[map[subscript]];
        let offset = subscript - iap.base_df;

        let mut result = 1.0;
        let mut dfp = 1;
        for (var, &v) in iap.iact.vars().iter().zip(&iap.var_nodes) {
            let node = &self.var_nodes[v];
            let Some(index) = node.index_of(case.data(var)) else {
                return 0.0;
            };

            let df = node.n_values() - 1;
            let dfpn = dfp * df;
            if effects_coding && index == df {
                result = -result;
            } else if index != (offset % dfpn) / dfp {
                return 0.0;
            }
            dfp = dfpn;
        }
        result
    }
}

impl<P: Payload> Drop for Categoricals<P> {
    fn drop(&mut self) {
        for iap in &mut self.iap {
            for iv in iap.ivs.drain(..) {
                self.payload.destroy(iv.user_data);
            }
        }
    }
}

impl<P: Payload> std::fmt::Debug for Categoricals<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Categoricals")
            .field("n_interactions", &self.iap.len())
            .field("df_total", &self.df_total())
            .field("n_total", &self.n_total())
            .field("sane", &self.sane)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictionary::{Dictionary, MissingValues, Variable};

    struct Design {
        dict: Dictionary,
        a: VarRef,
        b: VarRef,
    }

    /// A has values 1, 2, 3; B has values 1, 2; the weight variable is w.
    fn design() -> Design {
        let mut dict = Dictionary::new();
        let a = dict.add_var(Variable::numeric("a")).unwrap();
        let mut mv = MissingValues::new();
        mv.add_value(Value::Number(9.0));
        let b = dict
            .add_var(Variable::numeric("b").with_missing_values(mv))
            .unwrap();
        let w = dict.add_var(Variable::numeric("w")).unwrap();
        dict.set_weight(Some(w));
        Design { dict, a, b }
    }

    fn case(d: &Design, a: f64, b: f64, w: f64) -> Case {
        d.dict
            .make_case(vec![Value::Number(a), Value::Number(b), Value::Number(w)])
    }

    fn full_factorial(d: &Design, weight: impl Fn(f64, f64) -> f64) -> Vec<Case> {
        let mut cases = Vec::new();
        // insertion order deliberately not sorted
        for a in [3.0, 1.0, 2.0] {
            for b in [2.0, 1.0] {
                cases.push(case(d, a, b, weight(a, b)));
            }
        }
        cases
    }

    fn ab_categoricals(d: &Design, cases: &[Case]) -> Categoricals {
        let ab: Interaction = [d.a.clone(), d.b.clone()].into_iter().collect();
        let mut cat = Categoricals::new(vec![ab], d.dict.weight().cloned(), MvClass::ANY);
        for c in cases {
            cat.update(c);
        }
        cat.done();
        cat
    }

    #[test]
    fn test_degrees_of_freedom() {
        let d = design();
        let cat = ab_categoricals(&d, &full_factorial(&d, |_, _| 1.0));

        assert!(cat.sane());
        assert_eq!(cat.df(0), 2);
        assert_eq!(cat.n_cats(0), 6);
        assert_eq!(cat.df_total(), 2);
        assert_eq!(cat.n_total(), 6);
        assert_eq!(cat.n_count(0), 6);
        assert!(cat.isbalanced());
    }

    #[test]
    fn test_values_sorted_and_indexed() {
        let d = design();
        let cat = ab_categoricals(&d, &full_factorial(&d, |_, _| 1.0));

        let values: Vec<f64> = cat
            .get_var_values(&d.a)
            .iter()
            .filter_map(Value::as_number)
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);

        // combinations sorted lexicographically: (1,1), (1,2), (2,1), ...
        let first = cat.get_case_by_category(0).unwrap();
        assert_eq!(first.num(&d.a), Some(1.0));
        assert_eq!(first.num(&d.b), Some(1.0));
        assert_eq!(cat.value_index_by_category(0, 5, 0), 2);
        assert_eq!(cat.value_index_by_category(0, 5, 1), 1);
    }

    #[test]
    fn test_unbalanced_weights() {
        let d = design();
        let cases = full_factorial(&d, |a, _| if a == 3.0 { 2.0 } else { 1.0 });
        let cat = ab_categoricals(&d, &cases);
        assert!(!cat.isbalanced());
        assert_eq!(cat.get_weight_by_subscript(0), 8.0);
    }

    #[test]
    fn test_dummy_codes_partition_cases() {
        let d = design();
        let cases = full_factorial(&d, |_, _| 1.0);
        let cat = ab_categoricals(&d, &cases);
        for c in &cases {
            let total: f64 = (0..cat.df_total())
                .map(|s| cat.get_dummy_code_for_case(s, c))
                .sum();
            assert!(total <= 1.0);
        }
        // subscript 0 stands for a=1, b=1
        assert_eq!(cat.get_dummy_code_for_case(0, &case(&d, 1.0, 1.0, 1.0)), 1.0);
        assert_eq!(cat.get_dummy_code_for_case(0, &case(&d, 2.0, 1.0, 1.0)), 0.0);
        assert_eq!(cat.get_dummy_code_for_case(1, &case(&d, 2.0, 1.0, 1.0)), 1.0);
    }

    #[test]
    fn test_effects_code_last_level() {
        let d = design();
        let cases = full_factorial(&d, |_, _| 1.0);
        let cat = ab_categoricals(&d, &cases);

        // a at its last level: negated, b still matched
        assert_eq!(cat.get_effects_code_for_case(0, &case(&d, 3.0, 1.0, 1.0)), -1.0);
        assert_eq!(cat.get_effects_code_for_case(1, &case(&d, 3.0, 1.0, 1.0)), -1.0);
        // both at their last level: two sign flips
        assert_eq!(cat.get_effects_code_for_case(0, &case(&d, 3.0, 2.0, 1.0)), 1.0);
        // balanced data sums to zero in every column
        for s in 0..cat.df_total() {
            assert_eq!(cat.get_sum_by_subscript(s), 0.0);
        }
    }

    #[test]
    fn test_missing_factor_values_skip_interaction() {
        let d = design();
        let mut cases = full_factorial(&d, |_, _| 1.0);
        cases.push(case(&d, 1.0, 9.0, 1.0));
        let ab: Interaction = [d.a.clone(), d.b.clone()].into_iter().collect();
        let just_a = Interaction::with_var(d.a.clone());
        let mut cat = Categoricals::new(vec![just_a, ab], d.dict.weight().cloned(), MvClass::USER);
        for c in &cases {
            cat.update(c);
        }
        cat.done();

        assert_eq!(cat.n_count(1), 6);
        // the missing value is still a distinct value of b
        assert_eq!(cat.get_var_values(&d.b).len(), 3);
        assert_eq!(cat.get_weight_by_subscript(0), 7.0);
        assert_eq!(cat.df_total(), 2 + 4);
    }

    #[test]
    fn test_invalid_weights_counted() {
        let d = design();
        let cases = vec![case(&d, 1.0, 1.0, -2.0), case(&d, 2.0, 1.0, 1.0), case(&d, 1.0, 2.0, f64::NAN)];
        let cat = ab_categoricals(&d, &cases);
        assert_eq!(cat.n_invalid_weights(), 2);
    }

    #[test]
    fn test_empty_variable_not_sane() {
        let d = design();
        let mut cat = Categoricals::new(vec![Interaction::with_var(d.a.clone())], None, MvClass::ANY);
        cat.done();
        assert!(!cat.sane());
        assert!(!cat.is_complete());
        assert_eq!(cat.df_total(), 0);
        assert_eq!(cat.n_total(), 0);
    }

    #[test]
    #[should_panic(expected = "after done")]
    fn test_update_after_done_panics() {
        let d = design();
        let mut cat = ab_categoricals(&d, &full_factorial(&d, |_, _| 1.0));
        cat.update(&case(&d, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_single_level_factor_has_no_df() {
        let d = design();
        let cases = vec![case(&d, 1.0, 1.0, 1.0), case(&d, 1.0, 2.0, 1.0)];
        let cat = ab_categoricals(&d, &cases);
        assert_eq!(cat.df(0), 0);
        assert_eq!(cat.n_cats(0), 2);
        assert_eq!(cat.df_total(), 0);
        assert_eq!(cat.n_total(), 2);
    }

    struct Mean;

    impl Payload for Mean {
        type Data = (f64, f64, u32);

        fn create(&self) -> Self::Data {
            (0.0, 0.0, 0)
        }

        fn update(&self, data: &mut Self::Data, case: &Case, weight: f64) {
            data.0 += case.values()[0].as_number().unwrap_or(0.0) * weight;
            data.1 += weight;
        }

        fn calculate(&self, data: &mut Self::Data) {
            data.0 /= data.1;
            data.2 += 1;
        }
    }

    #[test]
    fn test_payload_calculated_once() {
        let d = design();
        let mut cat = Categoricals::with_payload(
            vec![Interaction::with_var(d.b.clone())],
            None,
            MvClass::ANY,
            Mean,
        );
        for c in full_factorial(&d, |_, _| 1.0) {
            cat.update(&c);
        }
        cat.done();
        cat.done();

        // b = 1 sees a = 3, 1, 2
        let &(mean, weight, calls) = cat.get_user_data_by_category(0).unwrap();
        assert_eq!(mean, 2.0);
        assert_eq!(weight, 3.0);
        assert_eq!(calls, 1);
    }
}
