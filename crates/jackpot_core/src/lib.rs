//! Jackpot Core
//!
//! Foundational primitives shared by the jackpot reveal crates:
//!
//! - **Components**: the finite set of animated pieces of the show
//! - **Control Handles**: async capability to move a component between
//!   `hidden` and `visible` and learn when that settles
//! - **Controls Map**: fixed mapping from component to handle
//! - **State Machines**: small transition-table FSMs
//! - **Show Phases**: the named phases of the jackpot show and which
//!   components each phase makes eligible for rendering
//! - **Epochs**: run tags used to discard stale callbacks
//!
//! # Example
//!
//! ```rust
//! use jackpot_core::fsm::StateMachine;
//!
//! const IDLE: u32 = 0;
//! const RUNNING: u32 = 1;
//! const START: u32 = 0;
//!
//! let mut fsm = StateMachine::builder(IDLE).on(IDLE, START, RUNNING).build();
//! assert_eq!(fsm.send(START), Some(RUNNING));
//! assert_eq!(fsm.current_state(), RUNNING);
//! ```

pub mod component;
pub mod control;
pub mod epoch;
pub mod fsm;
pub mod phase;

pub use component::{ComponentId, VisualState};
pub use control::{ControlError, ControlHandle, ControlsMap, ControlsMapBuilder, SharedControl};
pub use epoch::Epoch;
pub use fsm::{EventId, StateId, StateMachine, StateMachineBuilder, Transition};
pub use phase::{ShowPhase, ShowPhaseMachine};
