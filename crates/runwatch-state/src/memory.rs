//! In-memory record source.
//!
//! Holds a replaceable snapshot and a queue of injected failures, so poll
//! cycles can be scripted without a database.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::source::{FetchFuture, RecordSource};
use crate::types::ActionRun;

#[derive(Default)]
struct Inner {
    runs: Vec<ActionRun>,
    failures: VecDeque<SourceError>,
    fetches: u64,
}

/// Scriptable record source. Clones share the same snapshot.
#[derive(Clone, Default)]
pub struct MemoryRunSource {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRunSource {
    /// Create a source with an initial snapshot.
    pub fn new(runs: Vec<ActionRun>) -> Self {
        let source = Self::default();
        source.set_runs(runs);
        source
    }

    /// Replace the snapshot returned by subsequent fetches.
    pub fn set_runs(&self, runs: Vec<ActionRun>) {
        self.lock().runs = runs;
    }

    /// Append one run to the snapshot.
    pub fn push_run(&self, run: ActionRun) {
        self.lock().runs.push(run);
    }

    /// Make the next fetch fail with `error`. Queued failures are consumed
    /// in order, one per fetch.
    pub fn fail_next(&self, error: SourceError) {
        self.lock().failures.push_back(error);
    }

    /// Number of fetches attempted so far, failed ones included.
    pub fn fetch_count(&self) -> u64 {
        self.lock().fetches
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_snapshot(&self) -> SourceResult<Vec<ActionRun>> {
        let mut inner = self.lock();
        inner.fetches += 1;
        if let Some(err) = inner.failures.pop_front() {
            debug!(error = %err, "injected fetch failure");
            return Err(err);
        }
        Ok(inner.runs.clone())
    }
}

impl RecordSource for MemoryRunSource {
    fn fetch_all(&self) -> FetchFuture<'_> {
        let result = self.take_snapshot();
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;

    fn run(id: i64) -> ActionRun {
        ActionRun {
            id,
            status: Some(Status::Success),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn returns_full_snapshot_each_fetch() {
        let source = MemoryRunSource::new(vec![run(1), run(2)]);

        assert_eq!(source.fetch_all().await.unwrap().len(), 2);
        assert_eq!(source.fetch_all().await.unwrap().len(), 2);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let source = MemoryRunSource::new(vec![run(1)]);
        source.fail_next(SourceError::Query("boom".to_string()));

        assert!(matches!(
            source.fetch_all().await,
            Err(SourceError::Query(_))
        ));
        assert_eq!(source.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let source = MemoryRunSource::default();
        let handle = source.clone();

        handle.push_run(run(3));
        let runs = source.fetch_all().await.unwrap();
        assert_eq!(runs, vec![run(3)]);
    }
}
