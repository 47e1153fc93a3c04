//! Per-category counting of runs by repository and workflow.

use std::collections::BTreeMap;

use runwatch_state::ActionRun;

use crate::classify::Category;

/// Counts keyed by repository, then workflow.
///
/// Only cells with at least one match exist; a missing cell reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedTable {
    cells: BTreeMap<String, BTreeMap<String, u64>>,
}

impl AggregatedTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the (repository, workflow) cell.
    pub fn record(&mut self, repository: &str, workflow: &str) {
        *self
            .cells
            .entry(repository.to_string())
            .or_default()
            .entry(workflow.to_string())
            .or_insert(0) += 1;
    }

    /// Count for a cell, zero when absent.
    pub fn get(&self, repository: &str, workflow: &str) -> u64 {
        self.cells
            .get(repository)
            .and_then(|workflows| workflows.get(workflow))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate `(repository, workflow, count)` in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u64)> + '_ {
        self.cells.iter().flat_map(|(repository, workflows)| {
            workflows
                .iter()
                .map(move |(workflow, count)| (repository.as_str(), workflow.as_str(), *count))
        })
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, _, count)| count).sum()
    }
}

/// Count the runs in `runs` that belong to `category`.
pub fn aggregate(runs: &[ActionRun], category: Category) -> AggregatedTable {
    let mut table = AggregatedTable::new();
    for run in runs.iter().filter(|run| category.matches(run)) {
        table.record(run.repository_label(), run.workflow_label());
    }
    table
}
