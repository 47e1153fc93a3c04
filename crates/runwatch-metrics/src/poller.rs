//! Poller — the periodic fetch/aggregate/reconcile loop.
//!
//! One cycle fetches the full run list, recounts every category, advances
//! the snapshot store, and forwards the deltas to the counter sink. A failed
//! fetch leaves the snapshot store untouched so the next good cycle diffs
//! against the last good state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use runwatch_state::{RecordSource, SourceError, SourceResult};

use crate::aggregate::aggregate;
use crate::classify::Category;
use crate::counters::CounterSink;
use crate::reconcile::{Increment, SnapshotStore};

/// Interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Fetch timeout used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Runs in the fetched snapshot.
    pub runs: usize,
    increments: [Vec<Increment>; 3],
}

impl CycleReport {
    /// Increments forwarded to the sink for `category`.
    pub fn increments(&self, category: Category) -> &[Increment] {
        &self.increments[category.index()]
    }

    /// Net amount forwarded for `category`.
    pub fn net(&self, category: Category) -> i64 {
        self.increments(category).iter().map(|i| i.amount).sum()
    }
}

/// Drives poll cycles and owns the snapshot store.
pub struct Poller {
    source: Arc<dyn RecordSource>,
    sink: Arc<dyn CounterSink>,
    snapshots: SnapshotStore,
    interval: Duration,
    fetch_timeout: Duration,
}

impl Poller {
    /// Create a poller with the default interval and fetch timeout.
    pub fn new(source: Arc<dyn RecordSource>, sink: Arc<dyn CounterSink>) -> Self {
        Self {
            source,
            sink,
            snapshots: SnapshotStore::new(),
            interval: DEFAULT_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Set the tick interval. A zero interval keeps the current one.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!("zero poll interval ignored");
        } else {
            self.interval = interval;
        }
        self
    }

    /// Bound each fetch. A zero timeout keeps the current one.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            warn!("zero fetch timeout ignored");
        } else {
            self.fetch_timeout = timeout;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// The previous/current tables as of the last successful cycle.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Run one cycle.
    ///
    /// On a fetch error nothing is changed and the error is returned.
    pub async fn poll_once(&mut self) -> SourceResult<CycleReport> {
        let runs = match tokio::time::timeout(self.fetch_timeout, self.source.fetch_all()).await {
            Ok(result) => result?,
            Err(_) => return Err(SourceError::Timeout(self.fetch_timeout)),
        };

        let mut report = CycleReport {
            runs: runs.len(),
            ..Default::default()
        };

        for category in Category::ALL {
            let table = aggregate(&runs, category);
            let increments = self.snapshots.advance(category, table).deltas();
            for inc in &increments {
                self.sink
                    .increment(category, &inc.repository, &inc.workflow, inc.amount);
            }
            debug!(
                %category,
                cells = increments.len(),
                net = increments.iter().map(|i| i.amount).sum::<i64>(),
                "category reconciled"
            );
            report.increments[category.index()] = increments;
        }

        Ok(report)
    }

    /// Run cycles on the interval until `shutdown` fires.
    ///
    /// The first cycle starts immediately. Ticks missed while a cycle is in
    /// flight are dropped.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            fetch_timeout_secs = self.fetch_timeout.as_secs(),
            "poller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(report) => info!(
                            runs = report.runs,
                            failure = report.net(Category::Failure),
                            not_success = report.net(Category::NotSuccess),
                            failure_or_cancelled = report.net(Category::FailureOrCancelled),
                            "counters updated"
                        ),
                        Err(e) => warn!(error = %e, "fetch failed, cycle skipped"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("poller shutting down");
                    break;
                }
            }
        }
    }
}
