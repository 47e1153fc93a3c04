//! The record source seam between the poller and the backing store.

use std::future::Future;
use std::pin::Pin;

use crate::error::SourceResult;
use crate::types::ActionRun;

/// Boxed future alias for a full fetch.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = SourceResult<Vec<ActionRun>>> + Send + 'a>>;

/// Supplies the complete current set of runs.
///
/// Each call must return the full state, never a delta: the aggregation
/// downstream recounts every category from scratch per cycle.
pub trait RecordSource: Send + Sync {
    /// Fetch every run known to the store.
    fn fetch_all(&self) -> FetchFuture<'_>;
}
