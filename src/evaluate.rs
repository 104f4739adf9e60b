use crate::types::{BinaryOp, CompareOp, Environment, EvalError, Expr, Limits, UnaryOp, Value};

/// Evaluate `expr` against `env` with the default [`Limits`].
///
/// Evaluation is a pure tree walk: the same tree and environment always
/// produce the same result or the same error.
///
/// # Errors
///
/// Returns [`EvalError`] for unbound variables, operand kinds an operator
/// does not accept, division by zero, and trees taller than the limit.
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<Value, EvalError> {
    evaluate_with(expr, env, &Limits::default())
}

/// Evaluate `expr` against `env`, rejecting trees taller than
/// `limits.max_height`. Parsed trees never are; the check guards trees built
/// by hand.
///
/// # Errors
///
/// See [`evaluate`].
pub fn evaluate_with(
    expr: &Expr,
    env: &Environment,
    limits: &Limits,
) -> Result<Value, EvalError> {
    let walker = Walker {
        env,
        limit: limits.max_height,
    };
    walker.eval(expr, 0)
}

struct Walker<'e> {
    env: &'e Environment,
    limit: usize,
}

impl Walker<'_> {
    fn eval(&self, expr: &Expr, depth: usize) -> Result<Value, EvalError> {
        if depth > self.limit {
            return Err(EvalError::ExpressionTooComplex { limit: self.limit });
        }
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var(name) => self
                .env
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() }),
            Expr::Unary(op, inner) => {
                let value = self.eval(inner, depth + 1)?;
                match (op, value) {
                    (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (op, other) => Err(EvalError::TypeMismatch {
                        op: op.symbol(),
                        operands: vec![other.kind()],
                    }),
                }
            }
            Expr::Binary(op @ (BinaryOp::And | BinaryOp::Or), a, b) => {
                self.eval_logical(*op, a, b, depth)
            }
            Expr::Binary(op, a, b) => {
                let left = self.eval(a, depth + 1)?;
                let right = self.eval(b, depth + 1)?;
                arithmetic(*op, left, right)
            }
            Expr::Compare(op, a, b) => {
                let left = self.eval(a, depth + 1)?;
                let right = self.eval(b, depth + 1)?;
                compare(*op, left, right)
            }
        }
    }

    /// `and`/`or` with short-circuit: the right operand is never evaluated
    /// once the left operand decides the result, so errors it would raise
    /// never surface.
    fn eval_logical(
        &self,
        op: BinaryOp,
        a: &Expr,
        b: &Expr,
        depth: usize,
    ) -> Result<Value, EvalError> {
        let left = match self.eval(a, depth + 1)? {
            Value::Bool(l) => l,
            other => {
                return Err(EvalError::TypeMismatch {
                    op: op.symbol(),
                    operands: vec![other.kind()],
                })
            }
        };
        match (op, left) {
            (BinaryOp::And, false) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, true) => return Ok(Value::Bool(true)),
            _ => {}
        }
        match self.eval(b, depth + 1)? {
            Value::Bool(r) => Ok(Value::Bool(r)),
            other => Err(EvalError::TypeMismatch {
                op: op.symbol(),
                operands: vec![Value::Bool(left).kind(), other.kind()],
            }),
        }
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let (Value::Number(l), Value::Number(r)) = (left, right) else {
        return Err(EvalError::TypeMismatch {
            op: op.symbol(),
            operands: vec![left.kind(), right.kind()],
        });
    };
    let n = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l / r
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators are evaluated lazily"),
    };
    Ok(Value::Number(n))
}

pub(crate) fn compare(op: CompareOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let result = match (left, right) {
        (Value::Number(l), Value::Number(r)) => match op {
            CompareOp::Eq => l == r,
            CompareOp::Neq => l != r,
            CompareOp::Gt => l > r,
            CompareOp::Gte => l >= r,
            CompareOp::Lt => l < r,
            CompareOp::Lte => l <= r,
        },
        (Value::Bool(l), Value::Bool(r)) if op == CompareOp::Eq => l == r,
        (Value::Bool(l), Value::Bool(r)) if op == CompareOp::Neq => l != r,
        _ => {
            return Err(EvalError::TypeMismatch {
                op: op.symbol(),
                operands: vec![left.kind(), right.kind()],
            })
        }
    };
    Ok(Value::Bool(result))
}
