use std::fmt;

use super::formula::Expression;
use super::{CompareOp, FormulaRegistry, Limits, Value};
use crate::gate::RuleError;
use crate::parse::ParseError;

/// What a checklist item checks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rule {
    /// Compare one variable against a fixed threshold.
    Threshold {
        variable: String,
        op: CompareOp,
        threshold: Value,
    },
    /// An inline boolean expression.
    Condition(Expression),
    /// A registry formula, by id, expected to evaluate to a boolean.
    Formula(String),
}

impl Rule {
    #[must_use]
    pub fn threshold(variable: &str, op: CompareOp, threshold: impl Into<Value>) -> Self {
        Rule::Threshold {
            variable: variable.to_owned(),
            op,
            threshold: threshold.into(),
        }
    }

    /// Parse `source` as an inline condition with the default [`Limits`].
    ///
    /// The [`Gatekeeper`](crate::Gatekeeper) evaluates conditions under its
    /// registry's limits; use [`condition_with`](Self::condition_with) when
    /// those are tighter than the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a complete expression.
    pub fn condition(source: &str) -> Result<Self, ParseError> {
        Self::condition_with(source, &Limits::default())
    }

    /// Parse `source` as an inline condition under `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `source` is not a complete expression or
    /// exceeds `limits`.
    pub fn condition_with(source: &str, limits: &Limits) -> Result<Self, ParseError> {
        Ok(Rule::Condition(Expression::parse_with(source, limits)?))
    }

    #[must_use]
    pub fn formula(id: &str) -> Self {
        Rule::Formula(id.to_owned())
    }

    /// Variables this rule depends on. Formula rules are resolved through
    /// `registry`; an unknown formula depends on nothing.
    #[must_use]
    pub fn variables(&self, registry: &FormulaRegistry) -> Vec<String> {
        match self {
            Rule::Threshold { variable, .. } => vec![variable.clone()],
            Rule::Condition(expr) => expr.tree().variables(),
            Rule::Formula(id) => registry
                .get(id)
                .map(|f| f.variables().to_vec())
                .unwrap_or_default(),
        }
    }

    /// Whether a change to variable `name` can change this rule's outcome.
    #[must_use]
    pub fn depends_on(&self, name: &str, registry: &FormulaRegistry) -> bool {
        match self {
            Rule::Threshold { variable, .. } => variable == name,
            Rule::Condition(expr) => expr.tree().references(name),
            Rule::Formula(id) => registry
                .get(id)
                .is_some_and(|f| f.expression().tree().references(name)),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Threshold {
                variable,
                op,
                threshold,
            } => write!(f, "{variable} {op} {threshold}"),
            Rule::Condition(expr) => write!(f, "{expr}"),
            Rule::Formula(id) => write!(f, "formula {id}"),
        }
    }
}

/// Gate status of one checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Status {
    /// Not answerable yet: a variable the rule needs is missing.
    #[default]
    Pending,
    Pass,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Pass => write!(f, "pass"),
            Status::Fail => write!(f, "fail"),
        }
    }
}

/// One go/no-go condition. Its status, value and error are recomputed by
/// the [`Gatekeeper`](crate::Gatekeeper) on every refresh.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChecklistItem {
    id: String,
    label: String,
    rule: Rule,
    #[cfg_attr(feature = "serde", serde(default))]
    status: Status,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    value: Option<Value>,
    #[cfg_attr(feature = "serde", serde(skip))]
    error: Option<RuleError>,
}

impl ChecklistItem {
    #[must_use]
    pub fn new(id: &str, label: &str, rule: Rule) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            rule,
            status: Status::Pending,
            value: None,
            error: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// The value the rule last looked at: the compared variable for a
    /// threshold rule, the evaluation result otherwise.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.value
    }

    /// Why the item failed or is pending, for display.
    #[must_use]
    pub fn error(&self) -> Option<&RuleError> {
        self.error.as_ref()
    }

    pub(crate) fn settle(&mut self, status: Status, value: Option<Value>, error: Option<RuleError>) {
        self.status = status;
        self.value = value;
        self.error = error;
    }
}

/// An ordered list of checklist items. Evaluation never reorders it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Checklist {
    items: Vec<ChecklistItem>,
}

impl Checklist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item (builder style).
    #[must_use]
    pub fn item(mut self, id: &str, label: &str, rule: Rule) -> Self {
        self.push(ChecklistItem::new(id, label, rule));
        self
    }

    pub fn push(&mut self, item: ChecklistItem) {
        self.items.push(item);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Status of item `id`, if present.
    #[must_use]
    pub fn status(&self, id: &str) -> Option<Status> {
        self.get(id).map(ChecklistItem::status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChecklistItem> {
        self.items.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether every item passes. An empty checklist passes.
    #[must_use]
    pub fn all_pass(&self) -> bool {
        self.items.iter().all(|i| i.status == Status::Pass)
    }
}

impl FromIterator<ChecklistItem> for Checklist {
    fn from_iter<T: IntoIterator<Item = ChecklistItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Checklist {
    type Item = &'a ChecklistItem;
    type IntoIter = std::slice::Iter<'a, ChecklistItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
