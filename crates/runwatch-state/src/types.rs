//! Domain types for workflow runs.
//!
//! An [`ActionRun`] mirrors one row of Gitea's `action_run` table joined with
//! its repository name. Every column is optional except the id, because the
//! exporter must cope with partially populated rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used when a run has no repository name or workflow id.
pub const UNKNOWN_LABEL: &str = "unknown";

// ── Status ────────────────────────────────────────────────────────

/// Status of an action run.
///
/// The integer codes match what Gitea stores in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unknown,
    Success,
    Failure,
    Cancelled,
    Skipped,
    Waiting,
    Running,
    Blocked,
}

impl Status {
    /// Every status, in code order.
    pub const ALL: [Status; 8] = [
        Status::Unknown,
        Status::Success,
        Status::Failure,
        Status::Cancelled,
        Status::Skipped,
        Status::Waiting,
        Status::Running,
        Status::Blocked,
    ];

    /// Decode a database status code. Codes outside the known range map to
    /// [`Status::Unknown`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Status::Success,
            2 => Status::Failure,
            3 => Status::Cancelled,
            4 => Status::Skipped,
            5 => Status::Waiting,
            6 => Status::Running,
            7 => Status::Blocked,
            _ => Status::Unknown,
        }
    }

    /// The database status code.
    pub fn code(self) -> i32 {
        match self {
            Status::Unknown => 0,
            Status::Success => 1,
            Status::Failure => 2,
            Status::Cancelled => 3,
            Status::Skipped => 4,
            Status::Waiting => 5,
            Status::Running => 6,
            Status::Blocked => 7,
        }
    }

    /// Lowercase name, as used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "unknown",
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Cancelled => "cancelled",
            Status::Skipped => "skipped",
            Status::Waiting => "waiting",
            Status::Running => "running",
            Status::Blocked => "blocked",
        }
    }

    /// Whether the status is final.
    pub fn is_done(self) -> bool {
        matches!(
            self,
            Status::Success | Status::Failure | Status::Cancelled | Status::Skipped
        )
    }

    /// Whether the status is the result of actually running.
    pub fn has_run(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ActionRun ─────────────────────────────────────────────────────

/// One workflow run as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRun {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    /// Workflow file name, e.g. `ci.yaml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<i64>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_event: Option<String>,
    /// `None` means the run cannot be evaluated yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    /// Unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<i64>,
    /// Unix seconds; Gitea writes 0 until the run stops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_name: Option<String>,
}

impl ActionRun {
    /// Whether the run has a stop time after the epoch.
    pub fn is_stopped(&self) -> bool {
        self.stopped.is_some_and(|ts| ts > 0)
    }

    /// Repository label, falling back to [`UNKNOWN_LABEL`].
    pub fn repository_label(&self) -> &str {
        self.repository_name.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// Workflow label, falling back to [`UNKNOWN_LABEL`].
    pub fn workflow_label(&self) -> &str {
        self.workflow_id.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}
