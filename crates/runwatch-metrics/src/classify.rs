//! Run classification into exported counter categories.

use std::fmt;

use runwatch_state::{ActionRun, Status};

/// A counter family derived from run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Runs whose status is `failure`.
    Failure,
    /// Stopped runs that did not succeed.
    NotSuccess,
    /// Runs whose status is `failure` or `cancelled`.
    FailureOrCancelled,
}

impl Category {
    /// Every category, in exposition order.
    pub const ALL: [Category; 3] = [
        Category::Failure,
        Category::NotSuccess,
        Category::FailureOrCancelled,
    ];

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Category::Failure => 0,
            Category::NotSuccess => 1,
            Category::FailureOrCancelled => 2,
        }
    }

    /// Short name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Failure => "failure",
            Category::NotSuccess => "notSuccess",
            Category::FailureOrCancelled => "failureOrCancelled",
        }
    }

    /// Prometheus metric name.
    pub fn metric_name(self) -> &'static str {
        match self {
            Category::Failure => "action_runs_failure_total",
            Category::NotSuccess => "action_runs_not_success_total",
            Category::FailureOrCancelled => "action_runs_failure_or_cancelled_total",
        }
    }

    /// Prometheus help text.
    pub fn help(self) -> &'static str {
        match self {
            Category::Failure => "Total number of all action runs with status 'failure'",
            Category::NotSuccess => {
                "Total number of stopped action runs with status that isn't success"
            }
            Category::FailureOrCancelled => {
                "Total number of all action runs with status 'failure' or 'cancelled'"
            }
        }
    }

    /// Whether `run` belongs to this category. Runs without a status never do.
    pub fn matches(self, run: &ActionRun) -> bool {
        match run.status {
            Some(status) => self.matches_status(status, run.is_stopped()),
            None => false,
        }
    }

    fn matches_status(self, status: Status, stopped: bool) -> bool {
        match self {
            Category::Failure => status == Status::Failure,
            Category::NotSuccess => status != Status::Success && stopped,
            Category::FailureOrCancelled => {
                matches!(status, Status::Failure | Status::Cancelled)
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories `run` belongs to, in [`Category::ALL`] order.
pub fn classify(run: &ActionRun) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|category| category.matches(run))
        .collect()
}
