use tollgate::{Environment, FormulaRegistry};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut registry = FormulaRegistry::with_builtins();
    registry
        .register("Margin", "(revenue_score - cost_score) / revenue_score * 100")
        .expect("failed to register formula");

    println!("{registry}");
    for formula in registry.list() {
        println!("  {formula}");
    }

    let env = Environment::new()
        .set("revenue_score", 180)
        .set("cost_score", 45)
        .set("risk_score", 22)
        .set("market_size", 750)
        .set("competition_index", 35);

    for entry in registry.evaluate_all(&env).iter() {
        match &entry.outcome {
            Ok(value) => println!("{} = {value}", entry.id),
            Err(err) => println!("{} failed: {err}", entry.id),
        }
    }

    // Unsaved source can be tried before it is saved.
    match registry.try_source("revenue_score / 0", &env) {
        Ok(value) => println!("try: {value}"),
        Err(err) => println!("try failed: {err}"),
    }
}
