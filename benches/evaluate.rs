use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tollgate::{
    evaluate, parse_str, tokenize, Checklist, Environment, FormulaRegistry, Gatekeeper, Rule,
};

/// Source text ANDing `n` comparisons, each on its own variable.
fn conjunction(n: usize) -> (String, Environment) {
    let mut env = Environment::new();
    let mut parts = Vec::with_capacity(n);
    for i in 0..n {
        parts.push(format!("(f{i} * 2 + 1) >= 3"));
        env.insert(&format!("f{i}"), 10_i64.into());
    }
    (parts.join(" and "), env)
}

/// A checklist with `n` condition items and the built-in formulas.
fn build_checklist(n: usize) -> (Checklist, Environment) {
    let mut checklist = Checklist::new()
        .item("haven", "Safe haven", Rule::formula("safe_haven"))
        .item("ocean", "Blue ocean", Rule::formula("blue_ocean"));
    let mut env = Environment::new()
        .set("risk_score", 10)
        .set("market_size", 900)
        .set("competition_index", 3)
        .set("revenue_score", 200);
    for i in 0..n {
        let rule = Rule::condition(&format!("f{i} > 1 or f{i} == 0")).unwrap();
        checklist = checklist.item(&format!("c{i}"), "Condition", rule);
        env.insert(&format!("f{i}"), 5_i64.into());
    }
    (checklist, env)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for &n in &[5, 20, 50] {
        let (source, _) = conjunction(n);
        group.bench_function(format!("{n}_terms_tokenize"), |b| {
            b.iter(|| tokenize(black_box(&source)));
        });
        group.bench_function(format!("{n}_terms_parse"), |b| {
            b.iter(|| parse_str(black_box(&source)));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for &n in &[5, 20, 50] {
        let (source, env) = conjunction(n);
        let tree = parse_str(&source).unwrap();
        group.bench_function(format!("{n}_terms"), |b| {
            b.iter(|| evaluate(black_box(&tree), black_box(&env)));
        });
    }

    group.finish();
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_refresh");
    let registry = FormulaRegistry::with_builtins();
    let gate = Gatekeeper::new(&registry);

    for &n in &[10, 50] {
        let (checklist, env) = build_checklist(n);
        group.bench_function(format!("{n}_items"), |b| {
            b.iter(|| gate.refresh(black_box(&checklist), black_box(&env)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_refresh);
criterion_main!(benches);
