use tollgate::{
    evaluate, parse, tokenize, Checklist, Environment, EvalError, FormulaRegistry, Gatekeeper,
    ParseError, RegistryError, Rule, Status, Value,
};

fn run(source: &str, env: &Environment) -> Result<Value, EvalError> {
    let tree = parse(&tokenize(source)).unwrap();
    evaluate(&tree, env)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(run("2 + 3 * 4", &Environment::new()), Ok(Value::Number(14.0)));
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(run("(2 + 3) * 4", &Environment::new()), Ok(Value::Number(20.0)));
}

#[test]
fn literal_arithmetic_matches_f64() {
    let env = Environment::new();
    let cases = [
        ("10 - 4 - 3", 3.0),
        ("100 / 10 / 2", 5.0),
        ("-3 * -2", 6.0),
        ("2 * (3 + 4) - 1", 13.0),
        ("7.5 / 2.5", 3.0),
        ("1 - -1", 2.0),
    ];
    for (source, expected) in cases {
        assert_eq!(run(source, &env), Ok(Value::Number(expected)), "for {source}");
    }
}

#[test]
fn short_circuit_never_surfaces_skipped_errors() {
    let env = Environment::new();
    assert_eq!(
        run("false and undefined_var > 5", &env),
        Ok(Value::Bool(false))
    );
    assert_eq!(run("true or undefined_var > 5", &env), Ok(Value::Bool(true)));
}

#[test]
fn unknown_variable_law() {
    assert_eq!(
        run("risk_score < 30", &Environment::new()),
        Err(EvalError::UnknownVariable {
            name: "risk_score".into()
        })
    );
    assert_eq!(
        run("risk_score < 30", &Environment::new().set("risk_score", 10)),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        run("risk_score < 30", &Environment::new().set("risk_score", 40)),
        Ok(Value::Bool(false))
    );
}

#[test]
fn division_by_zero() {
    assert_eq!(
        run("10 / x", &Environment::new().set("x", 0)),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn division_by_literal_zero_parses() {
    assert!(parse(&tokenize("10 / 0")).is_ok());
    assert_eq!(
        run("10 / 0", &Environment::new()),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn type_mismatch() {
    assert!(matches!(
        run("true and 5", &Environment::new()),
        Err(EvalError::TypeMismatch { op: "and", .. })
    ));
    assert!(matches!(
        run("1 + true", &Environment::new()),
        Err(EvalError::TypeMismatch { op: "+", .. })
    ));
    assert!(matches!(
        run("not 1", &Environment::new()),
        Err(EvalError::TypeMismatch { op: "not", .. })
    ));
}

#[test]
fn comparator_chaining_is_rejected() {
    assert!(matches!(
        parse(&tokenize("1 < 2 < 3")),
        Err(ParseError::Syntax { offset: 6, .. })
    ));
}

#[test]
fn connectives_are_case_insensitive() {
    let env = Environment::new();
    assert_eq!(run("true AND NOT false", &env), Ok(Value::Bool(true)));
    assert_eq!(run("false Or true", &env), Ok(Value::Bool(true)));
    assert_eq!(run("true && !false || false", &env), Ok(Value::Bool(true)));
}

#[test]
fn identifiers_are_case_sensitive() {
    let env = Environment::new().set("Risk", 1);
    assert!(matches!(
        run("risk > 0", &env),
        Err(EvalError::UnknownVariable { .. })
    ));
}

#[test]
fn tokenizer_surfaces_unexpected_characters_through_the_parser() {
    let tokens = tokenize("risk_score $ 30");
    assert_eq!(tokens.len(), 3);
    assert_eq!(
        parse(&tokens),
        Err(ParseError::UnexpectedCharacter {
            character: '$',
            offset: 11
        })
    );
}

#[test]
fn syntax_errors_carry_position() {
    let cases = [
        ("(1 + 2", 6),
        ("1 + 2)", 5),
        ("1 +", 3),
        ("", 0),
        ("a b", 2),
    ];
    for (source, offset) in cases {
        let err = parse(&tokenize(source)).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "for {source:?}: {err}");
        assert_eq!(err.offset(), offset, "for {source:?}");
    }
}

#[test]
fn long_flat_chains_evaluate() {
    let env = Environment::new();
    assert_eq!(run(&vec!["1"; 100].join(" + "), &env), Ok(Value::Number(100.0)));
    assert_eq!(run(&vec!["2"; 70].join(" - "), &env), Ok(Value::Number(-136.0)));
    let conjunction = vec!["1 < 2"; 80].join(" and ");
    assert_eq!(run(&conjunction, &env), Ok(Value::Bool(true)));
}

#[test]
fn pathological_nesting_is_too_complex() {
    let source = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    assert!(matches!(
        parse(&tokenize(&source)),
        Err(ParseError::ExpressionTooComplex { limit: 64, .. })
    ));
    let source = "not ".repeat(5000) + "true";
    assert!(matches!(
        parse(&tokenize(&source)),
        Err(ParseError::ExpressionTooComplex { .. })
    ));
}

#[test]
fn registry_round_trip() {
    let mut registry = FormulaRegistry::with_builtins();
    registry.register("X", "a + b").unwrap();
    let env = Environment::new().set("a", 2).set("b", 3);
    assert_eq!(registry.evaluate("X", &env), Ok(Value::Number(5.0)));
    assert!(matches!(
        registry.remove("safe_haven"),
        Err(RegistryError::ProtectedFormula { .. })
    ));
}

#[test]
fn registry_lists_builtins_first() {
    let mut registry = FormulaRegistry::with_builtins();
    registry.register("mine", "1").unwrap();
    let ids: Vec<&str> = registry.list().map(|f| f.id()).collect();
    assert_eq!(ids, ["high_roi_threshold", "safe_haven", "blue_ocean", "mine"]);
}

fn scenario() -> Checklist {
    Checklist::new().item(
        "entry",
        "Entry conditions",
        Rule::condition("risk_score < 30 and market_size > 500").unwrap(),
    )
}

#[test]
fn end_to_end_pass_fail_pending() {
    let registry = FormulaRegistry::new();
    let gate = Gatekeeper::new(&registry);
    let checklist = scenario();

    let pass = Environment::new().set("risk_score", 20).set("market_size", 600);
    let fail = Environment::new().set("risk_score", 50).set("market_size", 600);
    let pending = Environment::new().set("market_size", 600);

    assert_eq!(
        gate.refresh(&checklist, &pass).checklist().status("entry"),
        Some(Status::Pass)
    );
    assert_eq!(
        gate.refresh(&checklist, &fail).checklist().status("entry"),
        Some(Status::Fail)
    );
    assert_eq!(
        gate.refresh(&checklist, &pending).checklist().status("entry"),
        Some(Status::Pending)
    );
}

fn statuses(checklist: &Checklist) -> Vec<(String, Status)> {
    checklist
        .iter()
        .map(|i| (i.id().to_owned(), i.status()))
        .collect()
}

#[test]
fn refresh_is_idempotent() {
    let registry = FormulaRegistry::with_builtins();
    let gate = Gatekeeper::new(&registry);
    let checklist = Checklist::new()
        .item("roi", "ROI", Rule::formula("high_roi_threshold"))
        .item("haven", "Haven", Rule::formula("safe_haven"))
        .item("ocean", "Ocean", Rule::formula("blue_ocean"));
    let env = Environment::new()
        .set("revenue_score", 200)
        .set("risk_score", 10)
        .set("market_size", 100);

    let first = gate.refresh(&checklist, &env);
    let second = gate.refresh(first.checklist(), &env);
    assert_eq!(statuses(first.checklist()), statuses(second.checklist()));
    assert_eq!(first.checklist(), second.checklist());
}

#[test]
fn changing_one_variable_only_touches_dependent_items() {
    let registry = FormulaRegistry::with_builtins();
    let gate = Gatekeeper::new(&registry);
    let checklist = Checklist::new()
        .item("roi", "ROI", Rule::formula("high_roi_threshold"))
        .item("haven", "Haven", Rule::formula("safe_haven"))
        .item("ocean", "Ocean", Rule::formula("blue_ocean"));
    let before = Environment::new()
        .set("revenue_score", 200)
        .set("risk_score", 10)
        .set("market_size", 600)
        .set("competition_index", 5);
    let after = before.clone().set("risk_score", 90);

    let changed = before.changed_names(&after);
    assert_eq!(changed, ["risk_score"]);

    let a = gate.refresh(&checklist, &before);
    let b = gate.refresh(&checklist, &after);
    for (x, y) in a.checklist().iter().zip(b.checklist()) {
        let dependent = changed.iter().any(|n| x.rule().depends_on(n, &registry));
        if !dependent {
            assert_eq!(x.status(), y.status(), "item {} changed", x.id());
        }
    }
    assert_eq!(b.checklist().status("haven"), Some(Status::Fail));
    assert_eq!(a.checklist().status("haven"), Some(Status::Pass));
}

#[test]
fn gate_blocks_on_any_fail_or_pending() {
    let registry = FormulaRegistry::with_builtins();
    let gate = Gatekeeper::new(&registry);
    let checklist = Checklist::new()
        .item("ocean", "Ocean", Rule::formula("blue_ocean"))
        .item("risk", "Risk", Rule::condition("risk_score < 30").unwrap());

    let open = Environment::new().set("competition_index", 5).set("risk_score", 1);
    assert!(gate.refresh(&checklist, &open).all_pass());

    let pending = Environment::new().set("competition_index", 5);
    let report = gate.refresh(&checklist, &pending);
    assert!(!report.all_pass());
    assert_eq!(report.count(Status::Pending), 1);

    let failed = Environment::new().set("competition_index", 50).set("risk_score", 1);
    assert!(!gate.refresh(&checklist, &failed).all_pass());
}
