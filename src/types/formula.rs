use std::fmt;

use super::{Environment, EvalError, Expr, Limits, Value};
use crate::parse::ParseError;

/// Source text paired with the tree parsed from it.
///
/// An `Expression` can only be obtained by parsing, so holding one proves
/// the source is well formed. The source is kept verbatim for display and
/// audit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Expression {
    source: String,
    tree: Expr,
}

impl Expression {
    /// Parse `source` with the default [`Limits`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a complete expression.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Self::parse_with(source, &Limits::default())
    }

    /// Parse `source` with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a complete expression or
    /// exceeds `limits`.
    pub fn parse_with(source: &str, limits: &Limits) -> Result<Self, ParseError> {
        let tokens = crate::parse::tokenize(source);
        let tree = crate::parse::parse_with(&tokens, limits)?;
        Ok(Self {
            source: source.to_owned(),
            tree,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    /// Evaluate against `env`.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](crate::evaluate).
    pub fn evaluate(&self, env: &Environment, limits: &Limits) -> Result<Value, EvalError> {
        crate::evaluate_with(&self.tree, env, limits)
    }
}

impl TryFrom<String> for Expression {
    type Error = ParseError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        let tree = crate::parse::parse(&crate::parse::tokenize(&source))?;
        Ok(Self { source, tree })
    }
}

impl From<Expression> for String {
    fn from(expr: Expression) -> Self {
        expr.source
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A named, validated expression held by a
/// [`FormulaRegistry`](super::FormulaRegistry).
///
/// System formulas are built in and cannot be replaced or removed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    id: String,
    name: String,
    expression: Expression,
    variables: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    is_system: bool,
}

impl Formula {
    pub(crate) fn new(id: String, name: String, expression: Expression, is_system: bool) -> Self {
        let variables = expression.tree().variables();
        Self {
            id,
            name,
            expression,
            variables,
            is_system,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source text this formula was saved with.
    #[must_use]
    pub fn source(&self) -> &str {
        self.expression.source()
    }

    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Variables the formula refers to. Informational only: evaluation
    /// fails on the first unbound variable it actually reaches.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.id, self.expression)
    }
}
