//! Jackpot Sequence
//!
//! Runs a fixed, ordered list of animation stages against a map of control
//! handles, exactly once per start.
//!
//! - Stages run strictly in order; a stage may fan out to several controls
//!   and joins them itself
//! - A stage with a timeout is raced against it; timeouts and failures are
//!   logged and the sequence moves on
//! - Visibility is recorded by wrapping the controls, so stage bodies never
//!   report it by hand
//! - Every start and reset opens a new epoch; late work from an older epoch
//!   cannot write state
//!
//! # Example
//!
//! ```ignore
//! use jackpot_sequence::{SequenceController, Stage, StageRegistry};
//! use jackpot_core::{ComponentId, ControlHandle, VisualState};
//! use std::time::Duration;
//!
//! let stages = StageRegistry::new().with(
//!     Stage::new("dice", |controls| async move {
//!         controls.get(ComponentId::Dice)?.transition_to(VisualState::Visible).await?;
//!         Ok(())
//!     })
//!     .with_timeout(Duration::from_secs(2)),
//! );
//!
//! let controller = SequenceController::new(stages, controls);
//! let report = controller.start_sequence().await;
//! assert!(controller.is_complete());
//! ```

pub mod config;
pub mod controller;
pub mod report;
pub mod show;
pub mod stage;
pub mod state;
pub mod tracked;
pub mod trigger;

pub use config::{ConfigError, JackpotConfig};
pub use controller::SequenceController;
pub use report::{SequenceReport, StageOutcome, StageReport};
pub use show::{JackpotShow, ShowFrame};
pub use stage::{Stage, StageError, StageFuture, StageRegistry};
pub use state::SequenceState;
pub use tracked::{TrackedControl, TrackedControls};
pub use trigger::{Trigger, TriggerOutcome};
