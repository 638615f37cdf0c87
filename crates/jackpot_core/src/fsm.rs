//! Finite state machines
//!
//! Flat state machines driven by an explicit transition table. States and
//! events are plain `u32` ids so callers can define them as constants and
//! map them to richer enums at the edges.
//!
//! ```rust
//! use jackpot_core::fsm::StateMachine;
//!
//! const OFF: u32 = 0;
//! const ON: u32 = 1;
//! const TOGGLE: u32 = 0;
//!
//! let mut fsm = StateMachine::builder(OFF)
//!     .on(OFF, TOGGLE, ON)
//!     .on(ON, TOGGLE, OFF)
//!     .build();
//!
//! fsm.send(TOGGLE);
//! assert_eq!(fsm.current_state(), ON);
//! ```

use rustc_hash::FxHashMap;

/// State identifier
pub type StateId = u32;

/// Event identifier
pub type EventId = u32;

/// A single row of the transition table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

type EnterCallback = Box<dyn Fn(StateId, StateId) + Send + Sync>;

/// A state machine with a fixed transition table
pub struct StateMachine {
    current: StateId,
    table: FxHashMap<(StateId, EventId), StateId>,
    /// Events accepted from any state
    wildcard: FxHashMap<EventId, StateId>,
    on_enter: FxHashMap<StateId, Vec<EnterCallback>>,
}

impl StateMachine {
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            transitions: Vec::new(),
            wildcard: Vec::new(),
            on_enter: FxHashMap::default(),
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Target state for `event` from the current state, if any
    pub fn target(&self, event: EventId) -> Option<StateId> {
        self.table
            .get(&(self.current, event))
            .or_else(|| self.wildcard.get(&event))
            .copied()
    }

    pub fn can_send(&self, event: EventId) -> bool {
        self.target(event).is_some()
    }

    /// Send an event
    ///
    /// Returns the new state if a transition fired, `None` if the event is
    /// not accepted in the current state.
    pub fn send(&mut self, event: EventId) -> Option<StateId> {
        let to = self.target(event)?;
        let from = self.current;
        self.current = to;

        if let Some(callbacks) = self.on_enter.get(&to) {
            for callback in callbacks {
                callback(from, to);
            }
        }

        Some(to)
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("transitions", &self.table.len())
            .finish()
    }
}

/// Builder for [`StateMachine`]
pub struct StateMachineBuilder {
    initial: StateId,
    transitions: Vec<Transition>,
    wildcard: Vec<(EventId, StateId)>,
    on_enter: FxHashMap<StateId, Vec<EnterCallback>>,
}

impl StateMachineBuilder {
    /// Add a transition `from --event--> to`
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition { from, event, to });
        self
    }

    /// Accept `event` from every state, moving to `to`
    ///
    /// Explicit rows take precedence over wildcard rows.
    pub fn on_any(mut self, event: EventId, to: StateId) -> Self {
        self.wildcard.push((event, to));
        self
    }

    /// Run `callback(from, to)` whenever `state` is entered via `send`
    pub fn on_enter<F>(mut self, state: StateId, callback: F) -> Self
    where
        F: Fn(StateId, StateId) + Send + Sync + 'static,
    {
        self.on_enter
            .entry(state)
            .or_default()
            .push(Box::new(callback));
        self
    }

    pub fn build(self) -> StateMachine {
        let mut table = FxHashMap::default();
        for t in self.transitions {
            if let Some(previous) = table.insert((t.from, t.event), t.to) {
                tracing::warn!(
                    from = t.from,
                    event = t.event,
                    previous,
                    to = t.to,
                    "duplicate transition replaced"
                );
            }
        }

        StateMachine {
            current: self.initial,
            table,
            wildcard: self.wildcard.into_iter().collect(),
            on_enter: self.on_enter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const IDLE: StateId = 0;
    const HOVER: StateId = 1;
    const PRESSED: StateId = 2;

    const ENTER: EventId = 0;
    const LEAVE: EventId = 1;
    const DOWN: EventId = 2;
    const CANCEL: EventId = 3;

    fn button() -> StateMachine {
        StateMachine::builder(IDLE)
            .on(IDLE, ENTER, HOVER)
            .on(HOVER, LEAVE, IDLE)
            .on(HOVER, DOWN, PRESSED)
            .on_any(CANCEL, IDLE)
            .build()
    }

    #[test]
    fn test_fsm_transitions() {
        let mut fsm = button();
        assert_eq!(fsm.current_state(), IDLE);

        assert_eq!(fsm.send(ENTER), Some(HOVER));
        assert_eq!(fsm.send(DOWN), Some(PRESSED));
        assert_eq!(fsm.current_state(), PRESSED);
    }

    #[test]
    fn test_fsm_ignores_unknown_event() {
        let mut fsm = button();
        assert_eq!(fsm.send(DOWN), None);
        assert_eq!(fsm.current_state(), IDLE);
        assert!(!fsm.can_send(LEAVE));
    }

    #[test]
    fn test_fsm_wildcard() {
        let mut fsm = button();
        fsm.send(ENTER);
        fsm.send(DOWN);

        assert_eq!(fsm.send(CANCEL), Some(IDLE));
        assert_eq!(fsm.send(CANCEL), Some(IDLE));
    }

    #[test]
    fn test_fsm_on_enter_callback() {
        let entered = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&entered);

        let mut fsm = StateMachine::builder(IDLE)
            .on(IDLE, ENTER, HOVER)
            .on(HOVER, LEAVE, IDLE)
            .on_enter(HOVER, move |from, to| {
                assert_eq!((from, to), (IDLE, HOVER));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        fsm.send(ENTER);
        fsm.send(LEAVE);
        fsm.send(ENTER);

        assert_eq!(entered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fsm_can_send_follows_current_state() {
        let mut fsm = button();
        assert!(fsm.can_send(ENTER));
        assert!(fsm.can_send(CANCEL));

        fsm.send(ENTER);
        assert!(!fsm.can_send(ENTER));
        assert!(fsm.can_send(DOWN));
    }
}
