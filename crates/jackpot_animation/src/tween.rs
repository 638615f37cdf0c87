//! Tween control handles
//!
//! `TweenControl` animates a component's [`VisualProps`] between its variant
//! targets on the tokio clock. The tween runs on its own task so it keeps
//! going when the caller stops waiting (a stage timing out, for example);
//! only `set_immediate` or a newer transition stops it.

use crate::values::Interpolate;
use crate::variant::{Repeat, Transition, Variants, VisualProps};
use async_trait::async_trait;
use jackpot_core::{ComponentId, ControlError, ControlHandle, VisualState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};

struct TweenState {
    props: VisualProps,
    target: VisualState,
    /// Bumped by every transition or snap; running tweens exit when it moves
    generation: u64,
    animating: bool,
}

/// A control handle that tweens visual props between variant targets
pub struct TweenControl {
    id: ComponentId,
    variants: Variants,
    frame: Duration,
    inner: Arc<Mutex<TweenState>>,
}

impl TweenControl {
    pub fn new(id: ComponentId, variants: Variants, frame: Duration) -> Self {
        Self {
            id,
            variants,
            frame,
            inner: Arc::new(Mutex::new(TweenState {
                props: variants.hidden,
                target: VisualState::Hidden,
                generation: 0,
                animating: false,
            })),
        }
    }

    /// Control using the component's preset variants, ticking at `fps`
    pub fn for_component(id: ComponentId, fps: u32) -> Self {
        Self::new(id, Variants::for_component(id), frame_duration(fps))
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn variants(&self) -> &Variants {
        &self.variants
    }

    /// Current sampled props
    pub fn props(&self) -> VisualProps {
        self.inner.lock().unwrap().props
    }

    /// State most recently requested
    pub fn target(&self) -> VisualState {
        self.inner.lock().unwrap().target
    }

    pub fn is_animating(&self) -> bool {
        self.inner.lock().unwrap().animating
    }
}

/// Frame interval for a tick rate
pub fn frame_duration(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

#[async_trait]
impl ControlHandle for TweenControl {
    async fn transition_to(&self, state: VisualState) -> Result<(), ControlError> {
        let transition = self.variants.transition_for(state);
        let to = self.variants.props_for(state);

        let (from, generation) = {
            let mut inner = self.inner.lock().unwrap();
            inner.generation += 1;
            inner.target = state;

            if transition.duration.is_zero() && !transition.is_endless() {
                inner.props = to;
                inner.animating = false;
                return Ok(());
            }

            inner.animating = true;
            (inner.props, inner.generation)
        };

        tracing::trace!(component = %self.id, %state, ?transition, "tween started");

        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(drive(
            Arc::clone(&self.inner),
            from,
            to,
            transition,
            self.frame,
            generation,
            done_tx,
        ));

        done_rx.await.map_err(|_| ControlError::Interrupted(self.id))
    }

    fn set_immediate(&self, state: VisualState) {
        let mut inner = self.inner.lock().unwrap();
        inner.generation += 1;
        inner.target = state;
        inner.props = self.variants.props_for(state);
        inner.animating = false;
    }
}

async fn drive(
    inner: Arc<Mutex<TweenState>>,
    from: VisualProps,
    to: VisualProps,
    transition: Transition,
    frame: Duration,
    generation: u64,
    done: oneshot::Sender<()>,
) {
    let start = Instant::now();
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let elapsed = start.elapsed();
        let progress = if transition.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / transition.duration.as_secs_f32()).min(1.0)
        };

        {
            let mut state = inner.lock().unwrap();
            if state.generation != generation {
                // Superseded; dropping `done` reports the interruption
                return;
            }

            let mut props = from.lerp(&to, transition.easing.apply(progress));
            if let Repeat::Forever { period } = transition.repeat {
                props.rotate = spin_angle(elapsed, period);
            }
            state.props = props;

            if progress >= 1.0 && !transition.is_endless() {
                state.animating = false;
            }
        }

        if progress >= 1.0 && !transition.is_endless() {
            let _ = done.send(());
            return;
        }
    }
}

fn spin_angle(elapsed: Duration, period: Duration) -> f32 {
    if period.is_zero() {
        return 0.0;
    }
    let turns = elapsed.as_secs_f32() / period.as_secs_f32();
    turns.fract() * 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(id: ComponentId) -> Arc<TweenControl> {
        Arc::new(TweenControl::for_component(id, 60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_settles_after_duration() {
        let background = control(ComponentId::Background);
        let start = Instant::now();

        background.transition_to(VisualState::Visible).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
        assert_eq!(background.props(), VisualProps::shown());
        assert!(!background.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_transition_resolves_immediately() {
        let amount = control(ComponentId::Amount);
        let start = Instant::now();

        amount.transition_to(VisualState::Visible).await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(amount.props().opacity, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_endless_transition_never_settles() {
        let aperture = control(ComponentId::Aperture);

        let waited =
            tokio::time::timeout(Duration::from_secs(3), aperture.transition_to(VisualState::Visible))
                .await;

        assert!(waited.is_err());
        // Entry part finished, spin keeps going
        let props = aperture.props();
        assert_eq!(props.opacity, 1.0);
        assert!(aperture.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tween_outlives_abandoned_wait() {
        let dice = control(ComponentId::Dice);

        let _ = tokio::time::timeout(
            Duration::from_millis(100),
            dice.transition_to(VisualState::Visible),
        )
        .await;
        assert!(dice.props().opacity < 1.0);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(dice.props(), VisualProps::shown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_immediate_interrupts_running_tween() {
        let dice = control(ComponentId::Dice);
        let running = Arc::clone(&dice);
        let handle =
            tokio::spawn(async move { running.transition_to(VisualState::Visible).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        dice.set_immediate(VisualState::Hidden);

        let result = handle.await.unwrap();
        assert_eq!(result, Err(ControlError::Interrupted(ComponentId::Dice)));
        assert_eq!(dice.props(), Variants::dice().hidden);
        assert_eq!(dice.target(), VisualState::Hidden);
    }

    #[test]
    fn test_spin_angle_wraps() {
        let period = Duration::from_secs(8);
        assert_eq!(spin_angle(Duration::ZERO, period), 0.0);
        assert!((spin_angle(Duration::from_secs(2), period) - 90.0).abs() < 1e-3);
        assert!((spin_angle(Duration::from_secs(10), period) - 90.0).abs() < 1e-3);
    }
}
