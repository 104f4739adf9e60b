
use proptest::prelude::*;
use strategies::{
    arb_bool_expr, arb_environment, arb_expr, arb_flat_arithmetic, arb_numeric_expr,
    reference_value, render_flat,
};
use tollgate::{evaluate, parse_str, tokenize, Environment, EvalError, Value};

proptest! {
    /// Evaluation is a pure function of (tree, environment).
    #[test]
    fn evaluation_is_deterministic(expr in arb_expr(), env in arb_environment()) {
        let first = evaluate(&expr, &env);
        for _ in 0..3 {
            prop_assert_eq!(&first, &evaluate(&expr, &env));
        }
    }

    /// `*` binds tighter than `+` and `-`, and both are left-associative.
    #[test]
    fn precedence_matches_reference((first, rest) in arb_flat_arithmetic()) {
        let source = render_flat(first, &rest);
        let tree = parse_str(&source).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let expected = reference_value(first, &rest) as f64;
        prop_assert_eq!(
            evaluate(&tree, &Environment::new()),
            Ok(Value::Number(expected)),
            "source: {}", source
        );
    }

    /// Printing a tree and parsing it back preserves its meaning.
    #[test]
    fn display_preserves_meaning(expr in arb_expr(), env in arb_environment()) {
        let reparsed = parse_str(&expr.to_string()).unwrap();
        prop_assert_eq!(evaluate(&expr, &env), evaluate(&reparsed, &env));
    }

    /// Well-typed boolean trees only fail on unbound variables or zero
    /// divisors, never on operand kinds.
    #[test]
    fn well_typed_trees_never_mismatch(expr in arb_bool_expr(), env in arb_environment()) {
        match evaluate(&expr, &env) {
            Ok(Value::Bool(_))
            | Err(EvalError::UnknownVariable { .. } | EvalError::DivisionByZero) => {}
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    /// Numeric trees evaluate to numbers when they evaluate at all.
    #[test]
    fn numeric_trees_yield_numbers(expr in arb_numeric_expr(), env in arb_environment()) {
        if let Ok(value) = evaluate(&expr, &env) {
            prop_assert!(value.as_number().is_some());
        }
    }

    /// The tokenizer is total: every non-whitespace character of any input
    /// lands in exactly one token, in order.
    #[test]
    fn tokenizer_is_total(source in any::<String>()) {
        let tokens = tokenize(&source);
        let mut cursor = 0;
        for token in &tokens {
            prop_assert!(token.offset >= cursor);
            prop_assert!(source[cursor..token.offset].chars().all(char::is_whitespace));
            prop_assert_eq!(&source[token.offset..token.end()], token.text);
            prop_assert!(!token.text.is_empty());
            cursor = token.end();
        }
        prop_assert!(source[cursor..].chars().all(char::is_whitespace));
    }

    /// Parsing never panics, whatever the input.
    #[test]
    fn parser_never_panics(source in "[a-z0-9 ()+*/<>=!&|.-]{0,64}") {
        let _ = parse_str(&source);
    }
}
