//! Tracked controls
//!
//! The adapter handed to stage actions. Every request made through it is
//! recorded in the sequence's visible set before it is delegated, so
//! visibility has a single source of truth. The adapter is bound to the
//! epoch of the run that created it: once that run is superseded, requests
//! are refused instead of being recorded or delegated.

use crate::state::SequenceCell;
use async_trait::async_trait;
use jackpot_core::{ComponentId, ControlError, ControlHandle, ControlsMap, Epoch, SharedControl, VisualState};
use std::sync::Arc;

/// Controls map wrapped for one run
#[derive(Clone)]
pub struct TrackedControls {
    controls: ControlsMap,
    cell: Arc<SequenceCell>,
    epoch: Epoch,
}

impl TrackedControls {
    pub(crate) fn new(controls: ControlsMap, cell: Arc<SequenceCell>, epoch: Epoch) -> Self {
        Self {
            controls,
            cell,
            epoch,
        }
    }

    /// Tracked handle for `id`
    pub fn get(&self, id: ComponentId) -> Result<TrackedControl, ControlError> {
        let inner = Arc::clone(self.controls.get(id)?);
        Ok(TrackedControl {
            id,
            inner,
            cell: Arc::clone(&self.cell),
            epoch: self.epoch,
        })
    }
}

/// One tracked control handle
#[derive(Clone)]
pub struct TrackedControl {
    id: ComponentId,
    inner: SharedControl,
    cell: Arc<SequenceCell>,
    epoch: Epoch,
}

impl TrackedControl {
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

#[async_trait]
impl ControlHandle for TrackedControl {
    async fn transition_to(&self, state: VisualState) -> Result<(), ControlError> {
        if !self.cell.record_visibility(self.epoch, self.id, state) {
            tracing::debug!(component = %self.id, %state, epoch = %self.epoch, "stale transition refused");
            return Err(ControlError::Interrupted(self.id));
        }
        self.inner.transition_to(state).await
    }

    fn set_immediate(&self, state: VisualState) {
        if !self.cell.record_visibility(self.epoch, self.id, state) {
            tracing::debug!(component = %self.id, %state, epoch = %self.epoch, "stale snap refused");
            return;
        }
        self.inner.set_immediate(state);
    }
}
