use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use super::error::{EvalError, RegistryError};
use super::formula::{Expression, Formula};
use super::{Environment, Limits, Value};

/// Built-in formulas seeded by [`FormulaRegistry::with_builtins`]:
/// `(id, display name, source)`.
pub const BUILTIN_FORMULAS: &[(&str, &str, &str)] = &[
    (
        "high_roi_threshold",
        "High ROI Threshold",
        "(revenue_score * 0.5) > 80",
    ),
    (
        "safe_haven",
        "Safe Haven Rule",
        "risk_score < 30 and market_size > 500",
    ),
    ("blue_ocean", "Blue Ocean", "competition_index < 20"),
];

/// Named formulas, validated on the way in.
///
/// A broken expression never enters the registry: [`register`](Self::register)
/// parses eagerly and rejects invalid source. Formulas are listed in
/// insertion order. Cloning is cheap (formulas are shared), so a clone is a
/// consistent snapshot for concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    formulas: Vec<Arc<Formula>>,
    limits: Limits,
}

impl FormulaRegistry {
    /// An empty registry with default [`Limits`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry that parses and evaluates with `limits`.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            formulas: Vec::new(),
            limits,
        }
    }

    /// A registry seeded with the [`BUILTIN_FORMULAS`] as system formulas.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (id, name, source) in BUILTIN_FORMULAS {
            match Expression::parse_with(source, &registry.limits) {
                Ok(expression) => {
                    let formula =
                        Formula::new((*id).to_owned(), (*name).to_owned(), expression, true);
                    registry.push(formula);
                }
                Err(err) => warn!(formula = *id, error = %err, "skipping built-in formula"),
            }
        }
        registry
    }

    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Validate and save a user formula.
    ///
    /// The trimmed `name` is kept as the display name. The id is the name
    /// with every run of characters outside `[A-Za-z0-9_]` replaced by a
    /// single `_`, so that `"High ROI"` is saved as `High_ROI` and can be
    /// referenced from a definition file. Case is preserved.
    ///
    /// Saving under an existing user formula's id replaces that formula in
    /// place; formulas are never edited partially.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EmptyName`] if `name` has no letters, digits or `_`.
    /// - [`RegistryError::Validation`] if `source` does not parse.
    /// - [`RegistryError::ProtectedFormula`] if the id belongs to a system formula.
    pub fn register(&mut self, name: &str, source: &str) -> Result<&Formula, RegistryError> {
        self.insert(name, source, false)
    }

    /// Validate and save a system formula. System formulas cannot be
    /// replaced or removed afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_system(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<&Formula, RegistryError> {
        self.insert(name, source, true)
    }

    fn insert(
        &mut self,
        name: &str,
        source: &str,
        is_system: bool,
    ) -> Result<&Formula, RegistryError> {
        let id = formula_id(name).ok_or(RegistryError::EmptyName)?;
        let expression = self.validate(&id, source)?;
        let formula = Formula::new(id, name.trim().to_owned(), expression, is_system);
        let idx = self.store(formula)?;
        Ok(&self.formulas[idx])
    }

    /// Insert a formula parsed elsewhere, replacing any user formula with
    /// the same id. The source is validated again under this registry's
    /// limits.
    pub(crate) fn put(&mut self, formula: Formula) -> Result<(), RegistryError> {
        self.validate(formula.id(), formula.source())?;
        self.store(formula).map(|_| ())
    }

    fn store(&mut self, formula: Formula) -> Result<usize, RegistryError> {
        match self.position(formula.id()) {
            Some(idx) if self.formulas[idx].is_system() => Err(RegistryError::ProtectedFormula {
                id: formula.id().to_owned(),
            }),
            Some(idx) => {
                debug!(formula = formula.id(), "replacing formula");
                self.formulas[idx] = Arc::new(formula);
                Ok(idx)
            }
            None => {
                debug!(formula = formula.id(), system = formula.is_system(), "registering formula");
                Ok(self.push(formula))
            }
        }
    }

    fn validate(&self, name: &str, source: &str) -> Result<Expression, RegistryError> {
        Expression::parse_with(source, &self.limits).map_err(|err| RegistryError::Validation {
            name: name.to_owned(),
            source: err,
        })
    }

    fn push(&mut self, formula: Formula) -> usize {
        self.formulas.push(Arc::new(formula));
        self.formulas.len() - 1
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.formulas.iter().position(|f| f.id() == id)
    }

    /// Delete a user formula, returning it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownFormula`] if no formula has this id.
    /// - [`RegistryError::ProtectedFormula`] if it is a system formula.
    pub fn remove(&mut self, id: &str) -> Result<Arc<Formula>, RegistryError> {
        let idx = self.position(id).ok_or_else(|| RegistryError::UnknownFormula {
            id: id.to_owned(),
        })?;
        if self.formulas[idx].is_system() {
            return Err(RegistryError::ProtectedFormula { id: id.to_owned() });
        }
        debug!(formula = id, "removing formula");
        Ok(self.formulas.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Formula> {
        self.formulas.iter().find(|f| f.id() == id).map(|f| &**f)
    }

    /// All formulas in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &Formula> {
        self.formulas.iter().map(|f| &**f)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Evaluate the formula `id` against `env`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownFormula`] if the id is absent, otherwise any
    /// [`EvalError`] wrapped in [`RegistryError::Eval`].
    pub fn evaluate(&self, id: &str, env: &Environment) -> Result<Value, RegistryError> {
        let formula = self.get(id).ok_or_else(|| RegistryError::UnknownFormula {
            id: id.to_owned(),
        })?;
        Ok(formula.expression().evaluate(env, &self.limits)?)
    }

    /// Parse and evaluate `source` without saving it.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] if `source` does not parse, otherwise
    /// any evaluation error.
    pub fn try_source(&self, source: &str, env: &Environment) -> Result<Value, RegistryError> {
        let expression = self.validate("(unsaved)", source)?;
        Ok(expression.evaluate(env, &self.limits)?)
    }

    /// Evaluate every formula against `env`, in registry order.
    pub fn evaluate_all(&self, env: &Environment) -> FormulaStore {
        let entries = self
            .formulas
            .iter()
            .map(|f| StoreEntry {
                id: f.id().to_owned(),
                outcome: f.expression().evaluate(env, &self.limits),
            })
            .collect();
        FormulaStore { entries }
    }
}

/// Identifier form of a formula name, or `None` if nothing usable is left.
fn formula_id(name: &str) -> Option<String> {
    let id = name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    match id.chars().next() {
        None => None,
        Some(c) if c.is_ascii_digit() => Some(format!("_{id}")),
        Some(_) => Some(id),
    }
}

impl fmt::Display for FormulaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let system = self.formulas.iter().filter(|f| f.is_system()).count();
        write!(
            f,
            "FormulaRegistry({} formulas, {} system)",
            self.formulas.len(),
            system
        )
    }
}

/// One formula's outcome inside a [`FormulaStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    pub id: String,
    pub outcome: Result<Value, EvalError>,
}

/// The value (or error) of every formula for one environment, keyed by
/// formula id and kept in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormulaStore {
    entries: Vec<StoreEntry>,
}

impl FormulaStore {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Result<Value, EvalError>> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.outcome)
    }

    /// The value of `id`, if it evaluated successfully.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<Value> {
        self.get(id).and_then(|outcome| outcome.as_ref().ok().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A registry shared between threads.
///
/// Mutations take the write lock, so they are serialized against reads.
/// [`snapshot`](Self::snapshot) hands out a copy-on-write clone for callers
/// that want to evaluate many times without holding the lock.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<FormulaRegistry>>,
}

impl SharedRegistry {
    #[must_use]
    pub fn new(registry: FormulaRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// A consistent copy of the registry at this moment.
    #[must_use]
    pub fn snapshot(&self) -> FormulaRegistry {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// See [`FormulaRegistry::register`]. Returns a copy of the saved formula.
    ///
    /// # Errors
    ///
    /// Same as [`FormulaRegistry::register`].
    pub fn register(&self, name: &str, source: &str) -> Result<Formula, RegistryError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.register(name, source).cloned()
    }

    /// See [`FormulaRegistry::remove`].
    ///
    /// # Errors
    ///
    /// Same as [`FormulaRegistry::remove`].
    pub fn remove(&self, id: &str) -> Result<Arc<Formula>, RegistryError> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// See [`FormulaRegistry::evaluate`].
    ///
    /// # Errors
    ///
    /// Same as [`FormulaRegistry::evaluate`].
    pub fn evaluate(&self, id: &str, env: &Environment) -> Result<Value, RegistryError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .evaluate(id, env)
    }
}

impl From<FormulaRegistry> for SharedRegistry {
    fn from(registry: FormulaRegistry) -> Self {
        Self::new(registry)
    }
}
