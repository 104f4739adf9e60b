use tollgate::{Definitions, Environment, FormulaRegistry, Gatekeeper};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let definitions = Definitions::from_file("demos/gate.def").expect("failed to load definitions");
    let (registry, checklist) = definitions
        .load_into(FormulaRegistry::with_builtins())
        .expect("definitions refer to unknown formulas");

    println!("{registry}");

    let env = Environment::new()
        .set("risk_score", 12)
        .set("market_size", 800)
        .set("revenue_score", 120)
        .set("competition_index", 10);

    let report = Gatekeeper::new(&registry).refresh(&checklist, &env);
    println!("{report}");
    for item in report.checklist() {
        println!("  [{}] {} ({})", item.status(), item.label(), item.rule());
    }
}
