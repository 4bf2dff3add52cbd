//! Benchmarks for accumulating cases into a categoricals object and
//! finalizing it.

use categoricals::{Categoricals, Interaction};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dictionary::{Case, Dictionary, MvClass, Value, Variable};

fn build_cases(n: usize) -> (Dictionary, Vec<Case>) {
    let mut dict = Dictionary::new();
    dict.add_var(Variable::numeric("a")).unwrap();
    dict.add_var(Variable::new("b", 8)).unwrap();
    dict.add_var(Variable::numeric("c")).unwrap();

    let cases = (0..n)
        .map(|i| {
            dict.make_case(vec![
                Value::Number((i % 7) as f64),
                Value::string(&format!("g{}", i % 5), 8),
                Value::Number((i % 3) as f64),
            ])
        })
        .collect();
    (dict, cases)
}

fn interactions(dict: &Dictionary) -> Vec<Interaction> {
    let vars = dict.vars();
    vec![
        Interaction::with_var(vars[0].clone()),
        Interaction::with_var(vars[1].clone()),
        vars.iter().cloned().collect(),
    ]
}

fn bench_update_and_done(c: &mut Criterion) {
    let mut group = c.benchmark_group("categoricals");
    for n in [1_000usize, 10_000, 100_000] {
        let (dict, cases) = build_cases(n);
        group.bench_with_input(BenchmarkId::new("update_done", n), &cases, |b, cases| {
            b.iter(|| {
                let mut cat = Categoricals::new(interactions(&dict), None, MvClass::ANY);
                for case in cases {
                    cat.update(case);
                }
                cat.done();
                black_box(cat.df_total())
            })
        });
    }
    group.finish();
}

fn bench_effects_coding(c: &mut Criterion) {
    let (dict, cases) = build_cases(10_000);
    let mut cat = Categoricals::new(interactions(&dict), None, MvClass::ANY);
    for case in &cases {
        cat.update(case);
    }
    cat.done();

    c.bench_function("effects_code_row", |b| {
        b.iter(|| {
            let case = &cases[black_box(42)];
            (0..cat.df_total())
                .map(|s| cat.get_effects_code_for_case(s, case))
                .sum::<f64>()
        })
    });
}

criterion_group!(benches, bench_update_and_done, bench_effects_coding);
criterion_main!(benches);
