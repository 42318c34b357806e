//! Run lifecycle, progress and outcome types

use serde::{Deserialize, Serialize};

use super::message::MessageId;
use crate::impl_state_strings;

/// Caller-visible state of one sweep run.
///
/// `Idle → Enumerating → Executing → {Completed | Cancelled | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Enumerating,
    Executing,
    Completed,
    Cancelled,
    Failed,
}

impl_state_strings!(RunState {
    Idle => "idle",
    Enumerating => "enumerating",
    Executing => "executing",
    Completed => "completed",
    Cancelled => "cancelled",
    Failed => "failed",
});

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use RunState::{Cancelled, Completed, Enumerating, Executing, Failed, Idle};

        matches!(
            (self, next),
            (Idle, Enumerating)
                | (Enumerating, Executing | Completed | Cancelled | Failed)
                | (Executing, Completed | Cancelled | Failed)
        )
    }
}

/// Progress reported by the batch engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion ratio in `[0, 1]`; an empty run counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Result of applying the mutation to one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Failed { reason: String },
    Skipped,
}

/// A per-item failure kept for programmatic inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub id: MessageId,
    pub reason: String,
}

/// Summary of one run.
///
/// `succeeded + failed + skipped == total` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub state: RunState,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

impl RunResult {
    /// Result for a run that never reached execution.
    pub fn empty(state: RunState) -> Self {
        Self { state, total: 0, succeeded: 0, failed: 0, skipped: 0, failures: Vec::new() }
    }

    /// Identifiers for which a request was actually issued.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}
