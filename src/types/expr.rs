use std::fmt;
use std::ops;

use super::Value;

/// Comparison operators. Comparisons are binary predicates and never chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation, `-x`.
    Neg,
    /// Logical negation, `not x`.
    Not,
}

/// Infix arithmetic and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
}

/// Parsed expression tree.
///
/// Every interior node owns exactly two (or, for [`Expr::Unary`], one)
/// children, and leaves always carry a literal or a non-empty variable name.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
}

impl CompareOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

impl UnaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        }
    }
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prints fully parenthesised source text that parses back to an equivalent
/// tree (a negated literal comes back as a negative literal).
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(v) => write!(f, "{v}"),
            Expr::Bool(v) => write!(f, "{v}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Unary(UnaryOp::Neg, inner) => write!(f, "(-{inner})"),
            Expr::Unary(UnaryOp::Not, inner) => write!(f, "(not {inner})"),
            Expr::Binary(op, a, b) => write!(f, "({a} {op} {b})"),
            Expr::Compare(op, a, b) => write!(f, "({a} {op} {b})"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::Binary(BinaryOp::And, Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Binary(BinaryOp::Or, Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn compare(self, op: CompareOp, other: impl Into<Expr>) -> Expr {
        Expr::Compare(op, Box::new(self), Box::new(other.into()))
    }

    #[must_use]
    pub fn equals(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Eq, other)
    }

    #[must_use]
    pub fn not_equals(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Neq, other)
    }

    #[must_use]
    pub fn gt(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gt, other)
    }

    #[must_use]
    pub fn gte(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gte, other)
    }

    #[must_use]
    pub fn lt(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lt, other)
    }

    #[must_use]
    pub fn lte(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lte, other)
    }

    /// Names of all variables referenced by this tree, in first-seen order,
    /// without duplicates.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_variables(self, &mut out);
        out
    }

    /// Whether `name` appears anywhere in this tree.
    #[must_use]
    pub fn references(&self, name: &str) -> bool {
        match self {
            Expr::Var(v) => v == name,
            Expr::Number(_) | Expr::Bool(_) => false,
            Expr::Unary(_, inner) => inner.references(name),
            Expr::Binary(_, a, b) | Expr::Compare(_, a, b) => {
                a.references(name) || b.references(name)
            }
        }
    }
}

fn collect_variables(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Var(name) => {
            if !out.iter().any(|seen| seen == name) {
                out.push(name.clone());
            }
        }
        Expr::Number(_) | Expr::Bool(_) => {}
        Expr::Unary(_, inner) => collect_variables(inner, out),
        Expr::Binary(_, a, b) | Expr::Compare(_, a, b) => {
            collect_variables(a, out);
            collect_variables(b, out);
        }
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Number(v)
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr::Number(f64::from(v))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Bool(v)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        match v {
            Value::Number(n) => Expr::Number(n),
            Value::Bool(b) => Expr::Bool(b),
        }
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary(UnaryOp::Not, Box::new(self))
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Unary(UnaryOp::Neg, Box::new(self))
    }
}

macro_rules! arithmetic_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Expr>> ops::$trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::Binary($op, Box::new(self), Box::new(rhs.into()))
            }
        }
    };
}

arithmetic_op!(Add, add, BinaryOp::Add);
arithmetic_op!(Sub, sub, BinaryOp::Sub);
arithmetic_op!(Mul, mul, BinaryOp::Mul);
arithmetic_op!(Div, div, BinaryOp::Div);

/// A reference to a named variable.
#[must_use]
pub fn var(name: &str) -> Expr {
    Expr::Var(name.to_owned())
}

#[must_use]
pub fn num(value: f64) -> Expr {
    Expr::Number(value)
}
