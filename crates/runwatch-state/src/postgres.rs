//! Postgres record source backed by a sqlx connection pool.
//!
//! Reads Gitea's `action_run` table joined with `repository` so every run
//! carries its repository name. The whole table is fetched each time.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::source::{FetchFuture, RecordSource};
use crate::types::{ActionRun, Status};

const ACTION_RUNS_QUERY: &str = r#"
SELECT
    ar.id,
    ar.title,
    ar.repo_id,
    ar.owner_id,
    ar.workflow_id,
    ar.index,
    ar.trigger_user_id,
    ar.schedule_id,
    ar.ref,
    ar.event,
    ar.trigger_event,
    ar.status,
    ar.version,
    ar.started,
    ar.stopped,
    ar.created,
    ar.updated,
    r.name AS repository_name
FROM public.action_run ar
INNER JOIN public.repository r ON ar.repo_id = r.id
ORDER BY ar.id DESC
"#;

/// Connection settings for the Gitea database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection before giving up.
    pub acquire_timeout: Duration,
}

impl Default for PgSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl PgSettings {
    /// Build sqlx connect options. TLS is disabled.
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable);

        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

/// One row of [`ACTION_RUNS_QUERY`].
#[derive(Debug, Clone, Default, sqlx::FromRow)]
struct ActionRunRow {
    id: i64,
    title: Option<String>,
    repo_id: Option<i64>,
    owner_id: Option<i64>,
    workflow_id: Option<String>,
    index: Option<i64>,
    trigger_user_id: Option<i64>,
    schedule_id: Option<i64>,
    #[sqlx(rename = "ref")]
    git_ref: Option<String>,
    event: Option<String>,
    trigger_event: Option<String>,
    status: Option<i32>,
    version: Option<i32>,
    started: Option<i64>,
    stopped: Option<i64>,
    created: Option<i64>,
    updated: Option<i64>,
    repository_name: Option<String>,
}

impl From<ActionRunRow> for ActionRun {
    fn from(row: ActionRunRow) -> Self {
        ActionRun {
            id: row.id,
            title: row.title,
            repo_id: row.repo_id,
            owner_id: row.owner_id,
            workflow_id: row.workflow_id,
            index: row.index,
            trigger_user_id: row.trigger_user_id,
            schedule_id: row.schedule_id,
            git_ref: row.git_ref,
            event: row.event,
            trigger_event: row.trigger_event,
            status: row.status.map(Status::from_code),
            version: row.version,
            started: row.started,
            stopped: row.stopped,
            created: row.created,
            updated: row.updated,
            repository_name: row.repository_name,
        }
    }
}

/// Record source reading from Postgres.
#[derive(Clone)]
pub struct PgRunSource {
    pool: PgPool,
}

impl PgRunSource {
    /// Open the pool. Fails if the first connection cannot be established.
    pub async fn connect(settings: &PgSettings) -> SourceResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(settings.connect_options())
            .await
            .map_err(|e| SourceError::Connect(e.to_string()))?;

        info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            "connected to postgres"
        );
        Ok(Self { pool })
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn query_runs(&self) -> SourceResult<Vec<ActionRun>> {
        let rows = sqlx::query_as::<_, ActionRunRow>(ACTION_RUNS_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(classify_error)?;

        debug!(rows = rows.len(), "fetched action runs");
        Ok(rows.into_iter().map(ActionRun::from).collect())
    }
}

impl RecordSource for PgRunSource {
    fn fetch_all(&self) -> FetchFuture<'_> {
        Box::pin(self.query_runs())
    }
}

/// Map a sqlx error onto the source error taxonomy.
fn classify_error(err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => SourceError::Connect(err.to_string()),
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_) => SourceError::Decode(err.to_string()),
        other => SourceError::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_decodes_status() {
        let row = ActionRunRow {
            id: 11,
            workflow_id: Some("build.yml".to_string()),
            status: Some(2),
            stopped: Some(1_700_000_100),
            repository_name: Some("api".to_string()),
            ..Default::default()
        };

        let run = ActionRun::from(row);
        assert_eq!(run.id, 11);
        assert_eq!(run.status, Some(Status::Failure));
        assert_eq!(run.repository_label(), "api");
        assert_eq!(run.workflow_label(), "build.yml");
        assert!(run.is_stopped());
    }

    #[test]
    fn row_without_status_stays_unevaluable() {
        let run = ActionRun::from(ActionRunRow {
            id: 1,
            ..Default::default()
        });
        assert_eq!(run.status, None);
    }

    #[test]
    fn sqlx_errors_are_classified() {
        assert!(matches!(
            classify_error(sqlx::Error::PoolTimedOut),
            SourceError::Connect(_)
        ));
        assert!(matches!(
            classify_error(sqlx::Error::ColumnNotFound("status".to_string())),
            SourceError::Decode(_)
        ));
        assert!(matches!(
            classify_error(sqlx::Error::RowNotFound),
            SourceError::Query(_)
        ));
    }

    #[test]
    fn default_settings_match_documented_defaults() {
        let settings = PgSettings::default();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.user, "postgres");
        assert_eq!(settings.database, "postgres");
        assert!(settings.password.is_empty());
    }
}
