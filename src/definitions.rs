use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::parse::grammar::{self, Declaration, Kind};
use crate::parse::DefinitionError;
use crate::types::{
    Checklist, ChecklistItem, Expr, Expression, Formula, FormulaRegistry, Limits, Rule, Value,
};

/// Formulas and checklist items loaded from a definition file.
///
/// ```text
/// # comment
/// system formula safe_haven "Safe Haven Rule": risk_score < 30 and market_size > 500
/// formula roi "High ROI": (revenue_score * 0.5) > 80
/// item risk "Risk below appetite": risk_score < 30
/// item haven "Conservative entry": formula safe_haven
/// ```
///
/// An item body of the shape `<variable> <comparator> <literal>` becomes a
/// [`Rule::Threshold`], `formula <id>` a [`Rule::Formula`], and anything
/// else a [`Rule::Condition`]. Labels are optional and default to the id.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    formulas: Vec<(usize, Formula)>,
    checklist: Checklist,
    references: Vec<(usize, String)>,
}

impl Definitions {
    /// Parse definition text with the default [`Limits`].
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for malformed lines, invalid expressions,
    /// duplicate ids and `system` items.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        Self::parse_with(text, &Limits::default())
    }

    /// Parse definition text, validating every expression with `limits`.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_with(text: &str, limits: &Limits) -> Result<Self, DefinitionError> {
        let mut defs = Self::default();
        let mut formula_ids = HashSet::new();
        let mut item_ids = HashSet::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let Some(decl) = grammar::parse_line(raw, line)? else {
                continue;
            };
            match decl.kind {
                Kind::Formula { system } => {
                    if !formula_ids.insert(decl.id) {
                        return Err(duplicate(line, "formula", decl.id));
                    }
                    let formula = compile_formula(&decl, system, line, limits)?;
                    defs.formulas.push((line, formula));
                }
                Kind::Item { system: true } => return Err(DefinitionError::SystemItem { line }),
                Kind::Item { system: false } => {
                    if !item_ids.insert(decl.id) {
                        return Err(duplicate(line, "item", decl.id));
                    }
                    let rule = compile_rule(decl.body, line, limits)?;
                    if let Rule::Formula(id) = &rule {
                        defs.references.push((line, id.clone()));
                    }
                    let label = decl.label.as_deref().unwrap_or(decl.id);
                    defs.checklist.push(ChecklistItem::new(decl.id, label, rule));
                }
            }
        }

        debug!(
            formulas = defs.formulas.len(),
            items = defs.checklist.len(),
            "definitions parsed"
        );
        Ok(defs)
    }

    /// Read and parse a definition file.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on I/O or definition failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Formulas in file order.
    pub fn formulas(&self) -> impl Iterator<Item = &Formula> {
        self.formulas.iter().map(|(_, f)| f)
    }

    #[must_use]
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// A registry holding only these formulas, plus the checklist.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::UnknownFormula`] if an item refers to a formula
    /// that is not defined.
    pub fn into_parts(self) -> Result<(FormulaRegistry, Checklist), DefinitionError> {
        self.load_into(FormulaRegistry::new())
    }

    /// Add these formulas to `registry` (for example one seeded with the
    /// built-ins), then check every formula reference against it.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::Registry`] if a formula would replace a system
    ///   formula or exceeds the registry's [`Limits`].
    /// - [`DefinitionError::UnknownFormula`] for a dangling reference.
    pub fn load_into(
        self,
        mut registry: FormulaRegistry,
    ) -> Result<(FormulaRegistry, Checklist), DefinitionError> {
        for (line, formula) in self.formulas {
            registry
                .put(formula)
                .map_err(|source| DefinitionError::Registry { line, source })?;
        }
        for (line, id) in self.references {
            if registry.get(&id).is_none() {
                return Err(DefinitionError::UnknownFormula { line, id });
            }
        }
        debug!(
            formulas = registry.len(),
            items = self.checklist.len(),
            "definitions loaded"
        );
        Ok((registry, self.checklist))
    }
}

fn duplicate(line: usize, what: &'static str, id: &str) -> DefinitionError {
    DefinitionError::Duplicate {
        line,
        what,
        id: id.to_owned(),
    }
}

fn expression(body: &str, line: usize, limits: &Limits) -> Result<Expression, DefinitionError> {
    Expression::parse_with(body, limits).map_err(|source| DefinitionError::Expression { line, source })
}

fn compile_formula(
    decl: &Declaration<'_>,
    system: bool,
    line: usize,
    limits: &Limits,
) -> Result<Formula, DefinitionError> {
    let expression = expression(decl.body, line, limits)?;
    let name = decl.label.clone().unwrap_or_else(|| decl.id.to_owned());
    Ok(Formula::new(decl.id.to_owned(), name, expression, system))
}

fn compile_rule(body: &str, line: usize, limits: &Limits) -> Result<Rule, DefinitionError> {
    if let Some(id) = grammar::formula_reference(body) {
        return Ok(Rule::formula(id));
    }
    let expression = expression(body, line, limits)?;
    if let Expr::Compare(op, left, right) = expression.tree() {
        if let (Expr::Var(variable), Some(threshold)) = (left.as_ref(), literal(right)) {
            return Ok(Rule::threshold(variable, *op, threshold));
        }
    }
    Ok(Rule::Condition(expression))
}

fn literal(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Number(n) => Some(Value::Number(*n)),
        Expr::Bool(b) => Some(Value::Bool(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompareOp, RegistryError, Status};

    const SAMPLE: &str = r#"
# Go/no-go definitions
system formula safe_haven "Safe Haven Rule": risk_score < 30 and market_size > 500
formula roi "High ROI": (revenue_score * 0.5) > 80

item risk "Risk below appetite": risk_score < 30
item haven "Conservative entry": formula safe_haven
item growth: revenue_score / 2 > 40 or roi_override == true
"#;

    #[test]
    fn parses_formulas_and_items() {
        let defs = Definitions::parse(SAMPLE).unwrap();
        let ids: Vec<&str> = defs.formulas().map(Formula::id).collect();
        assert_eq!(ids, ["safe_haven", "roi"]);
        assert!(defs.formulas().next().unwrap().is_system());
        assert_eq!(defs.formulas().nth(1).unwrap().name(), "High ROI");

        let checklist = defs.checklist();
        assert_eq!(checklist.len(), 3);
        assert_eq!(
            checklist.get("risk").unwrap().rule(),
            &Rule::threshold("risk_score", CompareOp::Lt, 30)
        );
        assert_eq!(checklist.get("haven").unwrap().rule(), &Rule::formula("safe_haven"));
        assert!(matches!(
            checklist.get("growth").unwrap().rule(),
            Rule::Condition(_)
        ));
        assert_eq!(checklist.get("growth").unwrap().label(), "growth");
    }

    #[test]
    fn threshold_needs_variable_on_the_left() {
        let defs = Definitions::parse("item a: 30 > risk_score\nitem b: flag == false").unwrap();
        assert!(matches!(
            defs.checklist().get("a").unwrap().rule(),
            Rule::Condition(_)
        ));
        assert_eq!(
            defs.checklist().get("b").unwrap().rule(),
            &Rule::threshold("flag", CompareOp::Eq, false)
        );
    }

    #[test]
    fn into_parts_builds_registry() {
        let (registry, checklist) = Definitions::parse(SAMPLE).unwrap().into_parts().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("safe_haven").unwrap().is_system());
        assert!(checklist.iter().all(|i| i.status() == Status::Pending));
    }

    #[test]
    fn invalid_expression_reports_line() {
        let err = Definitions::parse("\nformula bad: 1 +").unwrap_err();
        assert!(matches!(err, DefinitionError::Expression { line: 2, .. }));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = Definitions::parse("item a: x > 1\nitem a: y > 1").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::Duplicate {
                line: 2,
                what: "item",
                id: "a".into()
            }
        );
        assert!(Definitions::parse("formula f: 1\nformula f: 2").is_err());
    }

    #[test]
    fn system_items_rejected() {
        assert_eq!(
            Definitions::parse("system item a: x > 1").unwrap_err(),
            DefinitionError::SystemItem { line: 1 }
        );
    }

    #[test]
    fn dangling_reference_rejected() {
        let defs = Definitions::parse("item a: formula blue_ocean").unwrap();
        assert_eq!(
            defs.clone().into_parts().unwrap_err(),
            DefinitionError::UnknownFormula {
                line: 1,
                id: "blue_ocean".into()
            }
        );
        let (registry, _) = defs.load_into(FormulaRegistry::with_builtins()).unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn cannot_shadow_builtins() {
        let defs = Definitions::parse("formula safe_haven: true").unwrap();
        assert!(matches!(
            defs.load_into(FormulaRegistry::with_builtins()),
            Err(DefinitionError::Registry { line: 1, .. })
        ));
    }

    #[test]
    fn registry_limits_apply_on_load() {
        let loose = Limits::default().with_max_depth(100);
        let text = format!("formula big: {}x{} > 0", "(".repeat(70), ")".repeat(70));
        let defs = Definitions::parse_with(&text, &loose).unwrap();

        assert!(matches!(
            defs.clone().into_parts(),
            Err(DefinitionError::Registry {
                line: 1,
                source: RegistryError::Validation { .. }
            })
        ));

        let (registry, _) = defs.load_into(FormulaRegistry::with_limits(loose)).unwrap();
        let env = crate::Environment::new().set("x", 1_i64);
        assert_eq!(registry.evaluate("big", &env), Ok(Value::Bool(true)));
    }

    #[test]
    fn limits_apply_to_bodies() {
        let limits = Limits::default().with_max_depth(2);
        assert!(matches!(
            Definitions::parse_with("item deep: ((((x)))) > 1", &limits),
            Err(DefinitionError::Expression { line: 1, .. })
        ));
    }
}
