use thiserror::Error;

use super::ValueKind;
use crate::parse::ParseError;

/// Errors raised while evaluating an expression tree against an environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("type mismatch: '{op}' cannot be applied to {}", join_kinds(.operands))]
    TypeMismatch {
        op: &'static str,
        operands: Vec<ValueKind>,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression too complex: exceeds limit of {limit}")]
    ExpressionTooComplex { limit: usize },
}

/// Errors raised by [`FormulaRegistry`](super::FormulaRegistry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("formula name must not be empty")]
    EmptyName,

    #[error("invalid expression for formula '{name}': {source}")]
    Validation { name: String, source: ParseError },

    #[error("unknown formula '{id}'")]
    UnknownFormula { id: String },

    #[error("formula '{id}' is a system formula and cannot be changed or removed")]
    ProtectedFormula { id: String },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn join_kinds(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}
