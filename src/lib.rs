//! A safe formula engine and go/no-go checklist gatekeeper.
//!
//! Formula text is tokenized, parsed into an [`Expr`] tree and evaluated
//! against an [`Environment`] of named numbers and booleans. Nothing is ever
//! handed to a host evaluator: only the fixed grammar is interpreted.
//!
//! ```
//! use tollgate::{Checklist, Environment, FormulaRegistry, Gatekeeper, Rule, Status};
//!
//! let registry = FormulaRegistry::with_builtins();
//! let checklist = Checklist::new()
//!     .item("entry", "Conservative entry", Rule::formula("safe_haven"))
//!     .item("risk", "Risk check", Rule::condition("risk_score < 30").unwrap());
//!
//! let env = Environment::new()
//!     .set("risk_score", 20)
//!     .set("market_size", 600);
//! let report = Gatekeeper::new(&registry).refresh(&checklist, &env);
//! assert!(report.all_pass());
//!
//! let report = Gatekeeper::new(&registry).refresh(&checklist, &Environment::new());
//! assert_eq!(report.checklist().status("risk"), Some(Status::Pending));
//! assert_eq!(report.checklist().status("entry"), Some(Status::Fail));
//! ```

mod definitions;
mod error;
mod evaluate;
mod gate;
pub mod parse;
mod snapshot;
mod types;

pub use definitions::Definitions;
pub use error::Error;
pub use evaluate::{evaluate, evaluate_with};
pub use gate::{Gatekeeper, RuleError};
pub use parse::{parse, parse_str, parse_with, tokenize, DefinitionError, ParseError, Token, TokenKind};
pub use snapshot::VariableSource;
pub use types::{
    num, var, BinaryOp, Checklist, ChecklistItem, CompareOp, Environment, EvalError, Expr,
    Expression, Formula, FormulaRegistry, FormulaStore, GateReport, Limits, RegistryError, Rule,
    SharedRegistry, Status, StoreEntry, UnaryOp, Value, ValueKind, BUILTIN_FORMULAS,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_HEIGHT,
};
