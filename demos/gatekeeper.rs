use tollgate::{Checklist, CompareOp, Environment, FormulaRegistry, Gatekeeper, Rule};

fn print_report(title: &str, report: &tollgate::GateReport) {
    println!("{title}: {report}");
    for item in report.blocking() {
        match item.error() {
            Some(err) => println!("  {} is {}: {err}", item.label(), item.status()),
            None => println!("  {} is {}", item.label(), item.status()),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = FormulaRegistry::with_builtins();
    let checklist = Checklist::new()
        .item(
            "risk",
            "Risk below appetite",
            Rule::threshold("risk_score", CompareOp::Lt, 30),
        )
        .item("haven", "Conservative entry", Rule::formula("safe_haven"))
        .item(
            "entry",
            "Entry conditions",
            Rule::condition("risk_score < 30 and market_size > 500").expect("valid condition"),
        );
    let gate = Gatekeeper::new(&registry);

    // The profile fills in over time; the gate is re-run on every change.
    let mut env = Environment::new().set("market_size", 600);
    print_report("intake", &gate.refresh(&checklist, &env));

    env.insert("risk_score", 50_i64.into());
    print_report("risk assessed", &gate.refresh(&checklist, &env));

    env.insert("risk_score", 20_i64.into());
    print_report("risk mitigated", &gate.refresh(&checklist, &env));
}
