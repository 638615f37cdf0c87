//! Sequence state
//!
//! The state lives inside a `watch` channel: the controller mutates it in
//! place and every mutation that changes something wakes subscribers, which
//! is the re-render signal for presentation. Each mutation made on behalf of
//! a run carries that run's epoch and is discarded when the epoch is stale.

use jackpot_core::{ComponentId, Epoch, VisualState};
use rustc_hash::FxHashSet;
use tokio::sync::watch;

/// Observable state of a sequence controller
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceState {
    pub(crate) epoch: Epoch,
    pub(crate) current_index: Option<usize>,
    pub(crate) current_stage: Option<String>,
    pub(crate) is_playing: bool,
    pub(crate) is_complete: bool,
    pub(crate) visible: FxHashSet<ComponentId>,
}

impl SequenceState {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Index of the active (or last run) stage; `None` before the first stage
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_stage(&self) -> Option<&str> {
        self.current_stage.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn shows(&self, id: ComponentId) -> bool {
        self.visible.contains(&id)
    }

    /// Visible components, sorted
    pub fn visible_components(&self) -> Vec<ComponentId> {
        let mut ids: Vec<_> = self.visible.iter().copied().collect();
        ids.sort();
        ids
    }

    fn clear(&mut self) {
        self.current_index = None;
        self.current_stage = None;
        self.is_playing = false;
        self.is_complete = false;
        self.visible.clear();
    }
}

/// Shared, epoch-guarded state cell
pub(crate) struct SequenceCell {
    tx: watch::Sender<SequenceState>,
}

impl SequenceCell {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(SequenceState::default());
        Self { tx }
    }

    pub(crate) fn snapshot(&self) -> SequenceState {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SequenceState> {
        self.tx.subscribe()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&SequenceState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Open a new run: playing, not complete, nothing visible
    pub(crate) fn begin_run(&self) -> Epoch {
        let mut epoch = Epoch::INITIAL;
        self.tx.send_modify(|state| {
            state.clear();
            state.epoch = state.epoch.next();
            state.is_playing = true;
            epoch = state.epoch;
        });
        epoch
    }

    /// Back to the initial state under a new epoch
    pub(crate) fn reset(&self) -> Epoch {
        let mut epoch = Epoch::INITIAL;
        self.tx.send_modify(|state| {
            state.clear();
            state.epoch = state.epoch.next();
            epoch = state.epoch;
        });
        epoch
    }

    /// Publish the stage about to run; `false` if the run was superseded
    pub(crate) fn enter_stage(&self, epoch: Epoch, index: usize, id: &str) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            accepted = true;
            state.current_index = Some(index);
            state.current_stage = Some(id.to_string());
            true
        });
        accepted
    }

    /// Record a requested visual state; `false` if the epoch is stale
    pub(crate) fn record_visibility(&self, epoch: Epoch, id: ComponentId, requested: VisualState) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            accepted = true;
            match requested {
                VisualState::Visible => state.visible.insert(id),
                VisualState::Hidden => state.visible.remove(&id),
            }
        });
        accepted
    }

    /// Mark the run complete and stopped in one step
    pub(crate) fn finish_run(&self, epoch: Epoch) -> bool {
        self.tx.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            state.is_complete = true;
            state.is_playing = false;
            true
        })
    }

    /// Clear the playing flag if this run still owns it
    pub(crate) fn end_run(&self, epoch: Epoch) -> bool {
        self.tx.send_if_modified(|state| {
            if state.epoch != epoch || !state.is_playing {
                return false;
            }
            state.is_playing = false;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_epoch_is_ignored() {
        let cell = SequenceCell::new();
        let first = cell.begin_run();
        let second = cell.reset();
        assert!(second > first);

        assert!(!cell.enter_stage(first, 0, "late"));
        assert!(!cell.record_visibility(first, ComponentId::Dice, VisualState::Visible));
        assert!(!cell.finish_run(first));

        let state = cell.snapshot();
        assert_eq!(state.current_index(), None);
        assert!(!state.shows(ComponentId::Dice));
        assert!(!state.is_complete());
    }

    #[test]
    fn test_finish_clears_playing_atomically() {
        let cell = SequenceCell::new();
        let mut rx = cell.subscribe();
        let epoch = cell.begin_run();
        assert!(cell.snapshot().is_playing());

        assert!(cell.finish_run(epoch));
        rx.borrow_and_update();

        let state = cell.snapshot();
        assert!(state.is_complete());
        assert!(!state.is_playing());

        // Already stopped: nothing to publish
        assert!(!cell.end_run(epoch));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_visibility_follows_last_request() {
        let cell = SequenceCell::new();
        let epoch = cell.begin_run();

        cell.record_visibility(epoch, ComponentId::Amount, VisualState::Visible);
        cell.record_visibility(epoch, ComponentId::Dice, VisualState::Visible);
        cell.record_visibility(epoch, ComponentId::Amount, VisualState::Hidden);

        assert_eq!(cell.snapshot().visible_components(), vec![ComponentId::Dice]);
    }
}
