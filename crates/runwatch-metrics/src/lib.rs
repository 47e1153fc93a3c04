//! runwatch-metrics — turns run snapshots into monotonic counters.
//!
//! Every cycle the poller fetches the complete set of runs, counts them per
//! category by (repository, workflow), and adds the difference from the
//! previous cycle to a counter sink. The registry renders those counters in
//! Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! Poller::run()  (one tokio task)
//!   └── poll_once()
//!         ├── RecordSource::fetch_all()
//!         ├── aggregate()           × 3 categories
//!         ├── SnapshotStore::advance()
//!         ├── reconcile()           → Vec<Increment>
//!         └── CounterSink::increment()
//!
//! Prometheus exposition
//!   └── render_prometheus(&CounterRegistry) → text/plain for /metrics
//! ```

pub mod aggregate;
pub mod classify;
pub mod counters;
pub mod poller;
pub mod prometheus;
pub mod reconcile;

pub use aggregate::{aggregate, AggregatedTable};
pub use classify::{classify, Category};
pub use counters::{CounterRegistry, CounterSample, CounterSink};
pub use poller::{CycleReport, Poller, DEFAULT_FETCH_TIMEOUT, DEFAULT_INTERVAL};
pub use prometheus::render_prometheus;
pub use reconcile::{reconcile, Increment, SnapshotStore, TablePair};
