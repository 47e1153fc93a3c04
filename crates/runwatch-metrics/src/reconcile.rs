//! Snapshot store and delta reconciliation.
//!
//! Each cycle recounts every category from a full snapshot. The store keeps
//! the last two counts per category so the difference can be added to a
//! monotonic counter.
//!
//! ```text
//! cycle N-1 ──► previous ─┐
//!                         ├─► reconcile ─► [(repo, workflow, amount)]
//! cycle N   ──► current  ─┘
//! ```

use crate::aggregate::AggregatedTable;
use crate::classify::Category;

/// Amount to add to one labelled counter cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Increment {
    pub repository: String,
    pub workflow: String,
    /// Signed: a shrinking source yields a negative amount.
    pub amount: i64,
}

/// Difference between two tables for every cell present in `current`.
///
/// Cells only in `previous` are not visited. The subtraction is not clamped.
pub fn reconcile(previous: &AggregatedTable, current: &AggregatedTable) -> Vec<Increment> {
    current
        .iter()
        .map(|(repository, workflow, count)| Increment {
            repository: repository.to_string(),
            workflow: workflow.to_string(),
            amount: count as i64 - previous.get(repository, workflow) as i64,
        })
        .collect()
}

/// The two most recent tables for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePair {
    pub previous: AggregatedTable,
    pub current: AggregatedTable,
}

impl TablePair {
    /// Increments from `previous` to `current`.
    pub fn deltas(&self) -> Vec<Increment> {
        reconcile(&self.previous, &self.current)
    }
}

/// Previous/current tables for every category. Starts empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotStore {
    pairs: [TablePair; 3],
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `table` as the new current for `category`, demoting the old
    /// current to previous.
    pub fn advance(&mut self, category: Category, table: AggregatedTable) -> &TablePair {
        let pair = &mut self.pairs[category.index()];
        pair.previous = std::mem::replace(&mut pair.current, table);
        pair
    }

    pub fn pair(&self, category: Category) -> &TablePair {
        &self.pairs[category.index()]
    }

    pub fn previous(&self, category: Category) -> &AggregatedTable {
        &self.pair(category).previous
    }

    pub fn current(&self, category: Category) -> &AggregatedTable {
        &self.pair(category).current
    }
}
