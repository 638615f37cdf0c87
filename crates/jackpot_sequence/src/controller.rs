//! Sequence controller
//!
//! Drives a [`StageRegistry`] against a [`ControlsMap`]. Stages run one at a
//! time in registry order. Before a stage's action starts, its index is
//! published so observers can make the stage's components eligible for
//! rendering; the action then runs against tracked controls, raced against
//! the stage's timeout if it has one.
//!
//! Failures are soft: a failing, panicking or timed-out stage is logged and
//! the next stage runs. Whatever happens, the playing flag is cleared before
//! `start_sequence` returns (or its future is dropped).

use crate::report::{SequenceReport, StageOutcome, StageReport};
use crate::stage::{Stage, StageError, StageRegistry};
use crate::state::{SequenceCell, SequenceState};
use crate::tracked::TrackedControls;
use futures::FutureExt;
use jackpot_core::{ComponentId, ControlsMap, Epoch};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs a fixed list of stages once per start
#[derive(Clone)]
pub struct SequenceController {
    stages: Arc<StageRegistry>,
    controls: ControlsMap,
    cell: Arc<SequenceCell>,
}

impl SequenceController {
    /// Create a controller; every control starts hidden
    pub fn new(stages: StageRegistry, controls: ControlsMap) -> Self {
        controls.hide_all();
        Self {
            stages: Arc::new(stages),
            controls,
            cell: Arc::new(SequenceCell::new()),
        }
    }

    /// Run every stage once, in order
    ///
    /// Resolves after the last stage settles, or early at a stage boundary
    /// if a reset or newer start superseded this run.
    pub async fn start_sequence(&self) -> SequenceReport {
        let epoch = self.cell.begin_run();
        self.controls.hide_all();
        info!(%epoch, stages = self.stages.len(), "animation sequence started");

        let mut guard = RunGuard {
            cell: &self.cell,
            epoch,
            finished: false,
        };
        let tracked = TrackedControls::new(self.controls.clone(), Arc::clone(&self.cell), epoch);
        let started = Instant::now();
        let mut reports = Vec::with_capacity(self.stages.len());
        let mut superseded = false;

        for (index, stage) in self.stages.iter().enumerate() {
            if !self.cell.enter_stage(epoch, index, stage.id()) {
                superseded = true;
                break;
            }
            info!(stage = stage.id(), index, "animation stage changed");

            let stage_started = Instant::now();
            let outcome = run_stage(stage, tracked.clone()).await;
            let elapsed = stage_started.elapsed();

            match &outcome {
                StageOutcome::Completed => {
                    debug!(stage = stage.id(), ?elapsed, "stage completed")
                }
                StageOutcome::TimedOut(limit) => warn!(
                    stage = stage.id(),
                    timeout_ms = limit.as_millis() as u64,
                    "stage timed out, moving on to the next stage"
                ),
                StageOutcome::Failed(err) => {
                    error!(stage = stage.id(), error = %err, "stage failed, moving on to the next stage")
                }
            }

            reports.push(StageReport {
                index,
                id: stage.id().to_string(),
                outcome,
                elapsed,
            });
        }

        if !superseded && !self.cell.finish_run(epoch) {
            superseded = true;
        }
        guard.finished = true;
        drop(guard);

        let report = SequenceReport {
            epoch,
            stages: reports,
            completed: !superseded,
            superseded,
            elapsed: started.elapsed(),
        };

        if superseded {
            warn!(%epoch, ran = report.stages.len(), "animation sequence superseded");
        } else {
            info!(
                %epoch,
                elapsed_ms = report.elapsed.as_millis() as u64,
                timed_out = report.timed_out().count(),
                failed = report.failed().count(),
                "animation sequence complete"
            );
        }
        report
    }

    /// Back to the initial state: nothing playing, nothing complete, all hidden
    ///
    /// Work still in flight from an earlier start keeps running but can no
    /// longer change this controller's state.
    pub fn reset_sequence(&self) {
        let epoch = self.cell.reset();
        self.controls.hide_all();
        debug!(%epoch, "animation sequence reset");
    }

    /// Whether `id` was last requested visible
    pub fn should_show_component(&self, id: ComponentId) -> bool {
        self.cell.read(|state| state.shows(id))
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SequenceState {
        self.cell.snapshot()
    }

    /// Receiver that wakes on every published state change
    pub fn subscribe(&self) -> watch::Receiver<SequenceState> {
        self.cell.subscribe()
    }

    /// A run is in progress
    pub fn is_playing(&self) -> bool {
        self.cell.read(SequenceState::is_playing)
    }

    /// The last run went through every stage
    pub fn is_complete(&self) -> bool {
        self.cell.read(SequenceState::is_complete)
    }

    /// Index of the stage most recently entered; `None` before the first
    pub fn current_index(&self) -> Option<usize> {
        self.cell.read(SequenceState::current_index)
    }

    /// Epoch of the latest start or reset
    pub fn epoch(&self) -> Epoch {
        self.cell.read(SequenceState::epoch)
    }

    /// Stages in execution order
    pub fn stages(&self) -> &StageRegistry {
        &self.stages
    }

    /// The untracked controls
    pub fn controls(&self) -> &ControlsMap {
        &self.controls
    }
}

/// Clears the playing flag on every exit path of a run
struct RunGuard<'a> {
    cell: &'a SequenceCell,
    epoch: Epoch,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let cleared = self.cell.end_run(self.epoch);
        if self.finished {
            return;
        }
        if std::thread::panicking() {
            error!(epoch = %self.epoch, cleared, "animation sequence aborted by panic");
        } else {
            warn!(epoch = %self.epoch, cleared, "animation sequence dropped before it finished");
        }
    }
}

async fn run_stage(stage: &Stage, controls: TrackedControls) -> StageOutcome {
    let execute = AssertUnwindSafe(async move { stage.execute(controls).await }).catch_unwind();

    let settled = match stage.timeout() {
        Some(limit) => match tokio::time::timeout(limit, execute).await {
            Ok(settled) => settled,
            Err(_) => return StageOutcome::TimedOut(limit),
        },
        None => execute.await,
    };

    match settled {
        Ok(Ok(())) => StageOutcome::Completed,
        Ok(Err(err)) => StageOutcome::Failed(err),
        Err(payload) => StageOutcome::Failed(StageError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Total of every declared stage timeout
///
/// Upper bound on a run whose stages all time out; stages without a
/// timeout make the bound unknown.
pub fn timeout_budget(stages: &StageRegistry) -> Option<Duration> {
    stages
        .iter()
        .map(Stage::timeout)
        .try_fold(Duration::ZERO, |total, timeout| Some(total + timeout?))
}
