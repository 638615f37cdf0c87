//! Replay trigger
//!
//! The "play" button. A press while a run is in progress (or while a press
//! is still settling) is ignored. Otherwise the controller is reset, the
//! reset hooks run so components can restore their own initial state, and a
//! fresh run starts after a short settle delay.

use crate::controller::SequenceController;
use crate::report::SequenceReport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Default gap between the reset and the new start
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(50);

type ResetHook = Box<dyn Fn() + Send + Sync>;

/// What a press did
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    /// A run was already in progress
    Ignored,
    /// A fresh run was started and ran to its end
    Played(SequenceReport),
}

impl TriggerOutcome {
    pub fn report(&self) -> Option<&SequenceReport> {
        match self {
            TriggerOutcome::Played(report) => Some(report),
            TriggerOutcome::Ignored => None,
        }
    }
}

/// Replay button bound to one controller
#[derive(Clone)]
pub struct Trigger {
    controller: SequenceController,
    settle: Duration,
    arming: Arc<AtomicBool>,
    on_reset: Arc<Mutex<Vec<ResetHook>>>,
}

impl Trigger {
    pub fn new(controller: SequenceController) -> Self {
        Self {
            controller,
            settle: DEFAULT_SETTLE,
            arming: Arc::new(AtomicBool::new(false)),
            on_reset: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Run `hook` after every accepted press resets the controller
    pub fn on_reset<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_reset.lock().unwrap().push(Box::new(hook));
    }

    /// Whether a press would be accepted right now
    pub fn is_enabled(&self) -> bool {
        !self.controller.is_playing() && !self.arming.load(Ordering::SeqCst)
    }

    /// Reset and replay
    pub async fn press(&self) -> TriggerOutcome {
        if self.controller.is_playing()
            || self
                .arming
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
        {
            debug!("replay ignored, sequence in progress");
            return TriggerOutcome::Ignored;
        }

        let _armed = Disarm(&self.arming);
        self.controller.reset_sequence();
        for hook in self.on_reset.lock().unwrap().iter() {
            hook();
        }
        info!(settle_ms = self.settle.as_millis() as u64, "replaying sequence");

        tokio::time::sleep(self.settle).await;
        TriggerOutcome::Played(self.controller.start_sequence().await)
    }

    pub fn controller(&self) -> &SequenceController {
        &self.controller
    }
}

struct Disarm<'a>(&'a AtomicBool);

impl Drop for Disarm<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{Stage, StageRegistry};
    use crate::tracked::TrackedControls;
    use jackpot_core::ControlsMap;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::Instant;

    fn controller(run_for: Duration) -> SequenceController {
        let stages = StageRegistry::new().with(Stage::new("wait", move |_controls: TrackedControls| async move {
            tokio::time::sleep(run_for).await;
            Ok(())
        }));
        SequenceController::new(stages, ControlsMap::builder().build())
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_resets_then_plays_after_settle() {
        let trigger = Trigger::new(controller(Duration::from_millis(100)));
        let resets = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&resets);
        trigger.on_reset(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        let start = Instant::now();
        let outcome = trigger.press().await;

        assert_eq!(start.elapsed(), Duration::from_millis(150));
        assert!(outcome.report().is_some_and(SequenceReport::is_clean));
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert!(trigger.controller().is_complete());
        assert!(trigger.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_while_playing_is_ignored() {
        let trigger = Trigger::new(controller(Duration::from_secs(1)));
        let first = trigger.clone();
        let handle = tokio::spawn(async move { first.press().await });

        // Still settling
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!trigger.is_enabled());
        assert!(matches!(trigger.press().await, TriggerOutcome::Ignored));

        // Now playing
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(trigger.controller().is_playing());
        assert!(matches!(trigger.press().await, TriggerOutcome::Ignored));

        assert!(matches!(handle.await.unwrap(), TriggerOutcome::Played(_)));
        assert!(trigger.is_enabled());
    }
}
