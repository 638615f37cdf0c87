//! Show phases
//!
//! Named phases of the jackpot show, driven by a [`StateMachine`]. Each
//! phase lists the components eligible for rendering, so presentation asks
//! "does the current phase include this component" instead of chaining
//! comparisons against stage names.

use crate::component::ComponentId;
use crate::epoch::Epoch;
use crate::fsm::{StateId, StateMachine};
use smallvec::SmallVec;

/// Phase state identifiers
pub mod phase_states {
    use crate::fsm::StateId;

    /// Nothing on screen
    pub const IDLE: StateId = 0;
    /// Aperture, background and dice entering
    pub const REVEAL: StateId = 1;
    /// Amount counting up
    pub const COUNTING: StateId = 2;
    /// Particle burst
    pub const BURST: StateId = 3;
    /// Sequence finished, final frame held
    pub const COMPLETE: StateId = 4;
}

/// Phase event identifiers
pub mod phase_events {
    /// The next stage started
    pub const ADVANCE: u32 = 0;
    /// The last stage settled
    pub const FINISH: u32 = 1;
    /// Everything back to hidden
    pub const RESET: u32 = 2;
}

/// Show phase enum for pattern matching
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShowPhase {
    Idle,
    Reveal,
    Counting,
    Burst,
    Complete,
}

impl ShowPhase {
    pub fn from_state_id(id: StateId) -> Option<Self> {
        match id {
            phase_states::IDLE => Some(ShowPhase::Idle),
            phase_states::REVEAL => Some(ShowPhase::Reveal),
            phase_states::COUNTING => Some(ShowPhase::Counting),
            phase_states::BURST => Some(ShowPhase::Burst),
            phase_states::COMPLETE => Some(ShowPhase::Complete),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShowPhase::Idle => "idle",
            ShowPhase::Reveal => "reveal",
            ShowPhase::Counting => "counting",
            ShowPhase::Burst => "burst",
            ShowPhase::Complete => "complete",
        }
    }

    /// Phase entered when stage `index` starts
    pub fn for_stage(index: usize) -> Self {
        match index {
            0 => ShowPhase::Reveal,
            1 => ShowPhase::Counting,
            _ => ShowPhase::Burst,
        }
    }

    /// Components eligible for rendering in this phase
    pub fn components(self) -> SmallVec<[ComponentId; 6]> {
        use ComponentId::*;

        let mut out = SmallVec::new();
        if self >= ShowPhase::Reveal {
            out.extend([Aperture, Background, Dice]);
        }
        if self >= ShowPhase::Counting {
            out.push(Amount);
        }
        if self >= ShowPhase::Burst {
            out.push(Projectile);
        }
        out
    }

    /// Whether `id` may be rendered in this phase
    pub fn shows(self, id: ComponentId) -> bool {
        self.components().contains(&id)
    }
}

impl std::fmt::Display for ShowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// State machine tracking the show phase of one controller
#[derive(Debug)]
pub struct ShowPhaseMachine {
    fsm: StateMachine,
    epoch: Epoch,
}

impl ShowPhaseMachine {
    pub fn new() -> Self {
        use phase_events::*;
        use phase_states::*;

        let mut builder = StateMachine::builder(IDLE)
            .on(IDLE, ADVANCE, REVEAL)
            .on(REVEAL, ADVANCE, COUNTING)
            .on(COUNTING, ADVANCE, BURST)
            .on(BURST, FINISH, COMPLETE)
            .on_any(RESET, IDLE);
        for state in [IDLE, REVEAL, COUNTING, BURST, COMPLETE] {
            builder = builder.on_enter(state, log_phase_entered);
        }
        let fsm = builder.build();

        Self {
            fsm,
            epoch: Epoch::INITIAL,
        }
    }

    pub fn phase(&self) -> ShowPhase {
        ShowPhase::from_state_id(self.fsm.current_state()).unwrap_or(ShowPhase::Idle)
    }

    pub fn advance(&mut self) -> Option<ShowPhase> {
        self.send(phase_events::ADVANCE)
    }

    pub fn finish(&mut self) -> Option<ShowPhase> {
        self.send(phase_events::FINISH)
    }

    pub fn reset(&mut self) -> Option<ShowPhase> {
        self.send(phase_events::RESET)
    }

    fn send(&mut self, event: u32) -> Option<ShowPhase> {
        self.fsm.send(event).and_then(ShowPhase::from_state_id)
    }

    /// Bring the phase in line with an observed sequence state
    ///
    /// Observations may skip intermediate states (watchers only see the
    /// latest value), so this sends as many events as needed. A new epoch
    /// always restarts from `Idle`.
    pub fn sync(&mut self, epoch: Epoch, stage_index: Option<usize>, is_complete: bool) -> ShowPhase {
        if epoch != self.epoch {
            self.epoch = epoch;
            if self.phase() != ShowPhase::Idle {
                self.reset();
            }
        }

        let target = match (stage_index, is_complete) {
            (_, true) => ShowPhase::Complete,
            (Some(index), false) => ShowPhase::for_stage(index),
            (None, false) => ShowPhase::Idle,
        };

        if target == ShowPhase::Idle {
            if self.phase() != ShowPhase::Idle {
                self.reset();
            }
            return self.phase();
        }

        while self.phase() < target.min(ShowPhase::Burst) && self.fsm.can_send(phase_events::ADVANCE) {
            self.advance();
        }
        if target == ShowPhase::Complete && self.fsm.can_send(phase_events::FINISH) {
            self.finish();
        }

        self.phase()
    }
}

fn log_phase_entered(from: StateId, to: StateId) {
    if let (Some(from), Some(to)) = (ShowPhase::from_state_id(from), ShowPhase::from_state_id(to)) {
        tracing::debug!(%from, phase = %to, "show phase entered");
    }
}

impl Default for ShowPhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_components_accumulate() {
        assert!(ShowPhase::Idle.components().is_empty());
        assert!(ShowPhase::Reveal.shows(ComponentId::Dice));
        assert!(!ShowPhase::Reveal.shows(ComponentId::Amount));
        assert!(ShowPhase::Counting.shows(ComponentId::Amount));
        assert!(!ShowPhase::Counting.shows(ComponentId::Projectile));
        assert_eq!(ShowPhase::Complete.components().len(), 5);
        assert!(!ShowPhase::Complete.shows(ComponentId::Lottie));
    }

    #[test]
    fn test_phase_machine_walks_table() {
        let mut machine = ShowPhaseMachine::new();
        assert_eq!(machine.phase(), ShowPhase::Idle);

        // Cannot finish before reaching the burst
        assert_eq!(machine.finish(), None);

        assert_eq!(machine.advance(), Some(ShowPhase::Reveal));
        assert_eq!(machine.advance(), Some(ShowPhase::Counting));
        assert_eq!(machine.advance(), Some(ShowPhase::Burst));
        assert_eq!(machine.advance(), None);
        assert_eq!(machine.finish(), Some(ShowPhase::Complete));
        assert_eq!(machine.reset(), Some(ShowPhase::Idle));
    }

    #[test]
    fn test_sync_skips_ahead() {
        let mut machine = ShowPhaseMachine::new();
        let run = Epoch::INITIAL.next();

        assert_eq!(machine.sync(run, Some(1), false), ShowPhase::Counting);
        assert_eq!(machine.sync(run, Some(2), true), ShowPhase::Complete);
    }

    #[test]
    fn test_sync_new_epoch_restarts() {
        let mut machine = ShowPhaseMachine::new();
        let first = Epoch::INITIAL.next();
        machine.sync(first, Some(2), false);
        assert_eq!(machine.phase(), ShowPhase::Burst);

        let second = first.next();
        assert_eq!(machine.sync(second, Some(0), false), ShowPhase::Reveal);
        assert_eq!(machine.sync(second.next(), None, false), ShowPhase::Idle);
    }

    #[test]
    fn test_sync_complete_is_stable() {
        let mut machine = ShowPhaseMachine::new();
        let run = Epoch::INITIAL.next();

        assert_eq!(machine.sync(run, Some(2), true), ShowPhase::Complete);
        assert_eq!(machine.sync(run, Some(2), true), ShowPhase::Complete);
        assert_eq!(ShowPhase::from_state_id(99), None);
    }
}
