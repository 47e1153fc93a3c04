//! Counter sink and the in-process counter registry.
//!
//! Counter cells are atomics; the per-family map is only write-locked when
//! a new label pair appears.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::warn;

use crate::classify::Category;

/// Receives counter increments produced by the poller.
///
/// Implementations must tolerate concurrent calls.
pub trait CounterSink: Send + Sync {
    /// Add `amount` to the counter for `category` labelled
    /// (`repository`, `workflow`).
    fn increment(&self, category: Category, repository: &str, workflow: &str, amount: i64);
}

/// One exported counter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSample {
    pub repository: String,
    pub workflow: String,
    pub value: u64,
}

type LabelPair = (String, String);

/// Monotonic counter families, one per [`Category`].
///
/// A cell is created by its first increment, zero included, so a label pair
/// that matched once keeps being exported. Negative increments are refused.
#[derive(Debug, Default)]
pub struct CounterRegistry {
    families: [RwLock<BTreeMap<LabelPair, AtomicU64>>; 3],
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of one cell, if it has been created.
    pub fn get(&self, category: Category, repository: &str, workflow: &str) -> Option<u64> {
        let family = self.families[category.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        family
            .get(&(repository.to_string(), workflow.to_string()))
            .map(|cell| cell.load(Ordering::Relaxed))
    }

    /// All cells of a family, sorted by labels.
    pub fn samples(&self, category: Category) -> Vec<CounterSample> {
        let family = self.families[category.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        family
            .iter()
            .map(|((repository, workflow), cell)| CounterSample {
                repository: repository.clone(),
                workflow: workflow.clone(),
                value: cell.load(Ordering::Relaxed),
            })
            .collect()
    }

    /// Sum of every cell in a family.
    pub fn family_total(&self, category: Category) -> u64 {
        self.samples(category).iter().map(|s| s.value).sum()
    }

    fn add(&self, category: Category, repository: &str, workflow: &str, amount: u64) {
        let lock = &self.families[category.index()];
        let key = (repository.to_string(), workflow.to_string());

        {
            let family = lock.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cell) = family.get(&key) {
                cell.fetch_add(amount, Ordering::Relaxed);
                return;
            }
        }

        let mut family = lock.write().unwrap_or_else(PoisonError::into_inner);
        family
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }
}

impl CounterSink for CounterRegistry {
    fn increment(&self, category: Category, repository: &str, workflow: &str, amount: i64) {
        match u64::try_from(amount) {
            Ok(amount) => self.add(category, repository, workflow, amount),
            Err(_) => warn!(
                %category,
                repository,
                workflow,
                amount,
                "negative increment refused, counters only go up"
            ),
        }
    }
}
