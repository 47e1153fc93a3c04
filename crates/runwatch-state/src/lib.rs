//! runwatch-state — workflow-run records and the sources that supply them.
//!
//! Every poll cycle asks a [`RecordSource`] for the complete current set of
//! runs. The production source reads Gitea's `action_run` table through a
//! sqlx Postgres pool; the in-memory source is scriptable and backs tests.
//!
//! # Architecture
//!
//! ```text
//! RecordSource
//!   ├── PgRunSource     → SELECT ... FROM action_run JOIN repository
//!   └── MemoryRunSource → fixed snapshot, optional injected failures
//! ```

pub mod error;
pub mod memory;
pub mod postgres;
pub mod source;
pub mod types;

pub use error::{SourceError, SourceResult};
pub use memory::MemoryRunSource;
pub use postgres::{PgRunSource, PgSettings};
pub use source::{FetchFuture, RecordSource};
pub use types::*;
