use std::time::Instant;

use thiserror::Error;
use tracing::{debug, trace};

use crate::snapshot::VariableSource;
use crate::types::{
    Checklist, Environment, EvalError, FormulaRegistry, GateReport, RegistryError, Rule, Status,
    Value,
};

/// Why a checklist item did not pass, attached to the item for display.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("rule produced {value}, expected a boolean")]
    NotBoolean { value: Value },
}

/// Runs a [`Checklist`] against a variable snapshot.
///
/// Every refresh recomputes every item from scratch, so the same checklist
/// and snapshot always give the same statuses. Errors never escape a
/// refresh: they become a `fail` (or `pending`, for a missing variable in a
/// direct rule) with the error attached to the item.
#[derive(Debug, Clone, Copy)]
pub struct Gatekeeper<'r> {
    registry: &'r FormulaRegistry,
}

impl<'r> Gatekeeper<'r> {
    #[must_use]
    pub fn new(registry: &'r FormulaRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &'r FormulaRegistry {
        self.registry
    }

    /// Evaluate every item of `checklist` against `env`.
    ///
    /// The input checklist is left untouched; the report carries the
    /// updated copy along with every formula's value.
    pub fn refresh(&self, checklist: &Checklist, env: &Environment) -> GateReport {
        let start = Instant::now();
        let mut updated = checklist.clone();
        for item in updated.iter_mut() {
            let (status, value, error) = self.judge(item.rule(), env);
            trace!(item = item.id(), %status, "checklist item settled");
            item.settle(status, value, error);
        }
        let store = self.registry.evaluate_all(env);
        let report = GateReport::new(updated, store, start.elapsed());
        debug!(
            items = report.checklist().len(),
            passed = report.count(Status::Pass),
            all_pass = report.all_pass(),
            "gate refreshed"
        );
        report
    }

    /// [`refresh`](Self::refresh) against a snapshot taken from `source`.
    pub fn refresh_from<S>(&self, checklist: &Checklist, source: &S) -> GateReport
    where
        S: VariableSource + ?Sized,
    {
        self.refresh(checklist, &source.snapshot())
    }

    fn judge(&self, rule: &Rule, env: &Environment) -> (Status, Option<Value>, Option<RuleError>) {
        match rule {
            Rule::Threshold {
                variable,
                op,
                threshold,
            } => {
                let Some(&value) = env.get(variable) else {
                    let missing = EvalError::UnknownVariable {
                        name: variable.clone(),
                    };
                    return (Status::Pending, None, Some(missing.into()));
                };
                match crate::evaluate::compare(*op, value, *threshold) {
                    Ok(outcome) => (verdict(outcome), Some(value), None),
                    Err(err) => (Status::Fail, Some(value), Some(err.into())),
                }
            }
            Rule::Condition(expression) => {
                match expression.evaluate(env, self.registry.limits()) {
                    Ok(value) => boolean(value),
                    Err(err @ EvalError::UnknownVariable { .. }) => {
                        (Status::Pending, None, Some(err.into()))
                    }
                    Err(err) => (Status::Fail, None, Some(err.into())),
                }
            }
            Rule::Formula(id) => match self.registry.evaluate(id, env) {
                Ok(value) => boolean(value),
                Err(err) => (Status::Fail, None, Some(err.into())),
            },
        }
    }
}

fn verdict(outcome: Value) -> Status {
    if outcome == Value::Bool(true) {
        Status::Pass
    } else {
        Status::Fail
    }
}

fn boolean(value: Value) -> (Status, Option<Value>, Option<RuleError>) {
    match value {
        Value::Bool(true) => (Status::Pass, Some(value), None),
        Value::Bool(false) => (Status::Fail, Some(value), None),
        Value::Number(_) => (
            Status::Fail,
            Some(value),
            Some(RuleError::NotBoolean { value }),
        ),
    }
}
