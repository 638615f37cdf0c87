//! Run reports

use crate::stage::StageError;
use jackpot_core::Epoch;
use std::fmt;
use std::time::Duration;

/// How a stage settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The action resolved
    Completed,
    /// The timer won the race
    TimedOut(Duration),
    /// The action failed or panicked
    Failed(StageError),
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed)
    }
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Completed => f.write_str("completed"),
            StageOutcome::TimedOut(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
            StageOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Outcome of one stage in a run
#[derive(Debug, Clone)]
pub struct StageReport {
    pub index: usize,
    pub id: String,
    pub outcome: StageOutcome,
    pub elapsed: Duration,
}

/// Outcome of one `start_sequence` call
#[derive(Debug, Clone)]
pub struct SequenceReport {
    pub epoch: Epoch,
    pub stages: Vec<StageReport>,
    /// The run reached the end and marked the sequence complete
    pub completed: bool,
    /// A reset or newer start took over before the run finished
    pub superseded: bool,
    pub elapsed: Duration,
}

impl SequenceReport {
    pub fn timed_out(&self) -> impl Iterator<Item = &StageReport> + '_ {
        self.stages
            .iter()
            .filter(|s| matches!(s.outcome, StageOutcome::TimedOut(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &StageReport> + '_ {
        self.stages
            .iter()
            .filter(|s| matches!(s.outcome, StageOutcome::Failed(_)))
    }

    /// Every stage ran and resolved on its own
    pub fn is_clean(&self) -> bool {
        self.completed && self.stages.iter().all(|s| s.outcome.is_completed())
    }
}
