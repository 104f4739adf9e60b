mod checklist;
mod environment;
mod error;
mod expr;
mod formula;
mod limits;
mod registry;
mod report;
mod value;

pub use checklist::{Checklist, ChecklistItem, Rule, Status};
pub use environment::Environment;
pub use error::{EvalError, RegistryError};
pub use expr::{num, var, BinaryOp, CompareOp, Expr, UnaryOp};
pub use formula::{Expression, Formula};
pub use limits::{Limits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_HEIGHT};
pub use registry::{FormulaRegistry, FormulaStore, SharedRegistry, StoreEntry, BUILTIN_FORMULAS};
pub use report::GateReport;
pub use value::{Value, ValueKind};
