use std::fmt;
use std::time::Duration;

use super::checklist::{Checklist, ChecklistItem, Status};
use super::registry::FormulaStore;

/// Result of one [`Gatekeeper::refresh`](crate::Gatekeeper::refresh).
///
/// Holds the checklist with every item's status, value and error set, the
/// value of every registry formula for the same snapshot, and the
/// wall-clock duration of the refresh.
#[derive(Debug, Clone)]
#[must_use]
pub struct GateReport {
    checklist: Checklist,
    store: FormulaStore,
    duration: Duration,
}

impl GateReport {
    pub(crate) fn new(checklist: Checklist, store: FormulaStore, duration: Duration) -> Self {
        Self {
            checklist,
            store,
            duration,
        }
    }

    #[must_use]
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Take the updated checklist, dropping the rest of the report.
    #[must_use]
    pub fn into_checklist(self) -> Checklist {
        self.checklist
    }

    /// The go/no-go decision: `true` iff every item passed.
    #[must_use]
    pub fn all_pass(&self) -> bool {
        self.checklist.all_pass()
    }

    /// Number of items with `status`.
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.checklist.iter().filter(|i| i.status() == status).count()
    }

    /// Items holding the gate closed, in checklist order.
    pub fn blocking(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.checklist.iter().filter(|i| i.status() != Status::Pass)
    }

    /// Every formula's value (or error) for the same snapshot.
    #[must_use]
    pub fn store(&self) -> &FormulaStore {
        &self.store
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for GateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decision = if self.all_pass() { "open" } else { "blocked" };
        write!(
            f,
            "gate: {decision} ({} pass, {} fail, {} pending)",
            self.count(Status::Pass),
            self.count(Status::Fail),
            self.count(Status::Pending)
        )?;
        write!(f, ", duration: {:?}", self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompareOp, Rule, Value};

    fn report() -> GateReport {
        let mut checklist = Checklist::new()
            .item("a", "A", Rule::threshold("x", CompareOp::Gt, 1))
            .item("b", "B", Rule::threshold("y", CompareOp::Gt, 1))
            .item("c", "C", Rule::threshold("z", CompareOp::Gt, 1));
        let statuses = [Status::Pass, Status::Fail, Status::Pending];
        for (item, status) in checklist.iter_mut().zip(statuses) {
            item.settle(status, Some(Value::Number(1.0)), None);
        }
        GateReport::new(checklist, FormulaStore::default(), Duration::from_nanos(500))
    }

    #[test]
    fn counts_by_status() {
        let report = report();
        assert_eq!(report.count(Status::Pass), 1);
        assert_eq!(report.count(Status::Fail), 1);
        assert_eq!(report.count(Status::Pending), 1);
        assert!(!report.all_pass());
        assert_eq!(report.duration(), Duration::from_nanos(500));
    }

    #[test]
    fn blocking_items_in_order() {
        let report = report();
        let ids: Vec<&str> = report.blocking().map(ChecklistItem::id).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn display_summary() {
        let s = report().to_string();
        assert!(s.starts_with("gate: blocked (1 pass, 1 fail, 1 pending)"));
        assert!(s.contains("duration: 500ns"));
    }
}
