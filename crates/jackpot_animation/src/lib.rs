//! Jackpot Animation
//!
//! Headless animation collaborators for the jackpot show.
//!
//! # Features
//!
//! - **Easing**: cubic easing curves for timed tweens
//! - **Interpolation**: `Interpolate` for scalars and visual props, typed keyframe tracks
//! - **Variants**: named `hidden`/`visible` targets per component with their transitions
//! - **Tween Controls**: `ControlHandle`s that tween visual props on the tokio clock
//! - **Spring Physics**: RK4-integrated springs with rest thresholds
//! - **Count-Up**: spring-driven counter reporting completion exactly once
//! - **Projectiles**: ballistic particle burst reporting each particle's landing

pub mod counter;
pub mod easing;
pub mod projectile;
pub mod spring;
pub mod tween;
pub mod values;
pub mod variant;

pub use counter::{format_amount, CountDirection, CountUp, CountUpConfig};
pub use easing::Easing;
pub use projectile::{Projectile, ProjectileBurst};
pub use spring::{Spring, SpringConfig};
pub use tween::TweenControl;
pub use values::{Interpolate, KeyframeTrack, TypedKeyframe};
pub use variant::{Repeat, Transition, Variants, VisualProps};
