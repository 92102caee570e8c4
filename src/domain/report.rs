//! Build invocation results

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to a scheduled task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded,
    Failed { message: String },
    /// Not started because a prerequisite did not succeed
    Skipped { blocked_by: String },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded)
    }

    /// Returns a display label for the outcome
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Succeeded => "ok",
            TaskOutcome::Failed { .. } => "FAILED",
            TaskOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// Result of one task in an invocation
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task: String,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
    pub duration_ms: i64,
}

/// Summary of a whole build invocation
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub requested: Vec<String>,
    pub results: Vec<TaskResult>,
    pub first_failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BuildReport {
    pub fn new(requested: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            requested,
            results: Vec::new(),
            first_failure: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Records a task result, remembering the first failure
    pub fn record(&mut self, task: &str, outcome: TaskOutcome, duration_ms: i64) {
        if matches!(outcome, TaskOutcome::Failed { .. }) && self.first_failure.is_none() {
            self.first_failure = Some(task.to_string());
        }
        self.results.push(TaskResult {
            task: task.to_string(),
            outcome,
            duration_ms,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Returns true if every scheduled task succeeded
    pub fn is_success(&self) -> bool {
        self.first_failure.is_none() && self.results.iter().all(|r| r.outcome.is_success())
    }

    pub fn outcome(&self, task: &str) -> Option<&TaskOutcome> {
        self.results.iter().find(|r| r.task == task).map(|r| &r.outcome)
    }

    /// Names of tasks that actually ran, in execution order
    pub fn executed(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !matches!(r.outcome, TaskOutcome::Skipped { .. }))
            .map(|r| r.task.as_str())
            .collect()
    }
}
