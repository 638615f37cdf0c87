//! The canonical jackpot show
//!
//! Wires the simulated components (tweened layers, the count-up amount and
//! the particle burst) into the three-stage sequence:
//!
//! 1. `reveal`: aperture, background and dice animate in together. The
//!    aperture keeps spinning forever, so this stage always ends on its
//!    timeout.
//! 2. `amount`: the amount overlay appears and the counter runs; the stage
//!    resolves when the counter reports the end.
//! 3. `burst`: the particle group fades in and launches, then a fixed
//!    settle delay. Landing reports are not awaited.

use crate::config::JackpotConfig;
use crate::controller::SequenceController;
use crate::stage::{Stage, StageError, StageRegistry};
use crate::trigger::{Trigger, TriggerOutcome};
use crate::tracked::TrackedControls;
use jackpot_animation::projectile::ParticleFrame;
use jackpot_animation::{CountUp, ProjectileBurst, TweenControl};
use jackpot_core::{ComponentId, ControlHandle, ControlsMap, ShowPhase, ShowPhaseMachine, VisualState};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub const REVEAL_STAGE: &str = "reveal";
pub const AMOUNT_STAGE: &str = "amount";
pub const BURST_STAGE: &str = "burst";

/// Components driven by plain tweens
const TWEENED: [ComponentId; 5] = [
    ComponentId::Aperture,
    ComponentId::Background,
    ComponentId::Dice,
    ComponentId::Lottie,
    ComponentId::Amount,
];

/// What a presenter would draw right now
#[derive(Debug, Clone)]
pub struct ShowFrame {
    pub phase: ShowPhase,
    pub stage: Option<String>,
    /// Components last requested visible
    pub visible: Vec<ComponentId>,
    /// Components the current phase renders
    pub eligible: Vec<ComponentId>,
    /// Opacity of every tweened component, in declaration order
    pub opacity: Vec<(ComponentId, f32)>,
    pub amount: String,
    pub aperture_rotation: f32,
    pub particles: Vec<ParticleFrame>,
    pub landed: usize,
    pub is_playing: bool,
    pub is_complete: bool,
}

/// The jackpot show: controller, trigger and simulated components
pub struct JackpotShow {
    config: JackpotConfig,
    controller: SequenceController,
    trigger: Trigger,
    tweens: FxHashMap<ComponentId, Arc<TweenControl>>,
    counter: CountUp,
    burst: Arc<ProjectileBurst>,
    phase: Mutex<ShowPhaseMachine>,
}

impl JackpotShow {
    /// Build the show; the receiver yields particle ids as they land
    pub fn new(config: JackpotConfig) -> (Self, mpsc::UnboundedReceiver<String>) {
        let fps = config.render.fps;
        let (landed_tx, landed_rx) = mpsc::unbounded_channel();

        let tweens: FxHashMap<_, _> = TWEENED
            .iter()
            .map(|&id| (id, Arc::new(TweenControl::for_component(id, fps))))
            .collect();
        let burst = Arc::new(ProjectileBurst::fountain(fps).on_complete(landed_tx));
        let counter = CountUp::new(config.count_up());

        let mut builder = ControlsMap::builder();
        for id in TWEENED {
            builder = builder.insert(id, tweens[&id].clone());
        }
        let controls = builder.insert(ComponentId::Projectile, burst.clone()).build();

        let controller = SequenceController::new(canonical_stages(&config, &counter), controls);
        let trigger = Trigger::new(controller.clone()).with_settle(config.trigger_delay());
        let hook_counter = counter.clone();
        trigger.on_reset(move || hook_counter.reset());

        let show = Self {
            config,
            controller,
            trigger,
            tweens,
            counter,
            burst,
            phase: Mutex::new(ShowPhaseMachine::new()),
        };
        (show, landed_rx)
    }

    /// Press the replay button
    pub async fn play(&self) -> TriggerOutcome {
        self.trigger.press().await
    }

    /// Reset the sequence and the counter
    pub fn reset(&self) {
        self.controller.reset_sequence();
        self.counter.reset();
    }

    /// Current phase, synced from the controller state
    pub fn phase(&self) -> ShowPhase {
        let state = self.controller.snapshot();
        self.phase
            .lock()
            .unwrap()
            .sync(state.epoch(), state.current_index(), state.is_complete())
    }

    pub fn frame(&self) -> ShowFrame {
        let phase = self.phase();
        let state = self.controller.snapshot();
        let opacity = TWEENED
            .iter()
            .map(|id| (*id, self.tweens[id].props().opacity))
            .chain(std::iter::once((ComponentId::Projectile, self.burst.opacity())))
            .collect();

        ShowFrame {
            phase,
            stage: state.current_stage().map(str::to_string),
            visible: state.visible_components(),
            eligible: phase.components().to_vec(),
            opacity,
            amount: self.counter.text(),
            aperture_rotation: self.tweens[&ComponentId::Aperture].props().rotate,
            particles: self.burst.frames(),
            landed: self.burst.landed_count(),
            is_playing: state.is_playing(),
            is_complete: state.is_complete(),
        }
    }

    pub fn config(&self) -> &JackpotConfig {
        &self.config
    }

    pub fn controller(&self) -> &SequenceController {
        &self.controller
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn counter(&self) -> &CountUp {
        &self.counter
    }

    pub fn burst(&self) -> &ProjectileBurst {
        &self.burst
    }

    pub fn tween(&self, id: ComponentId) -> Option<&TweenControl> {
        self.tweens.get(&id).map(Arc::as_ref)
    }
}

/// The reveal, amount and burst stages
pub fn canonical_stages(config: &JackpotConfig, counter: &CountUp) -> StageRegistry {
    let counter = counter.clone();
    let settle = config.stages.burst_settle();

    StageRegistry::new()
        .with(Stage::new(REVEAL_STAGE, reveal).with_timeout(config.stages.reveal_timeout()))
        .with(
            Stage::new(AMOUNT_STAGE, move |controls: TrackedControls| amount(controls, counter.clone()))
                .with_timeout(config.stages.amount_timeout()),
        )
        .with(
            Stage::new(BURST_STAGE, move |controls: TrackedControls| burst(controls, settle))
                .with_timeout(config.stages.burst_timeout()),
        )
}

async fn reveal(controls: TrackedControls) -> Result<(), StageError> {
    let aperture = controls.get(ComponentId::Aperture)?;
    let background = controls.get(ComponentId::Background)?;
    let dice = controls.get(ComponentId::Dice)?;

    futures::try_join!(
        aperture.transition_to(VisualState::Visible),
        background.transition_to(VisualState::Visible),
        dice.transition_to(VisualState::Visible),
    )?;
    Ok(())
}

async fn amount(controls: TrackedControls, counter: CountUp) -> Result<(), StageError> {
    controls
        .get(ComponentId::Amount)?
        .transition_to(VisualState::Visible)
        .await?;

    let (done_tx, done_rx) = oneshot::channel();
    counter.start(done_tx);
    done_rx.await.map_err(|_| StageError::CallbackDropped)
}

async fn burst(controls: TrackedControls, settle: Duration) -> Result<(), StageError> {
    controls
        .get(ComponentId::Projectile)?
        .transition_to(VisualState::Visible)
        .await?;
    tokio::time::sleep(settle).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> JackpotConfig {
        let mut config = JackpotConfig::default();
        config.counter.to = 500.0;
        config
    }

    #[test]
    fn test_canonical_stage_order() {
        let config = JackpotConfig::default();
        let counter = CountUp::new(config.count_up());
        let stages = canonical_stages(&config, &counter);

        assert_eq!(stages.ids(), vec![REVEAL_STAGE, AMOUNT_STAGE, BURST_STAGE]);
        assert_eq!(stages.get(0).unwrap().timeout(), Some(Duration::from_secs(2)));
        assert_eq!(stages.get(1).unwrap().timeout(), Some(Duration::from_secs(900)));
        assert_eq!(stages.get(2).unwrap().timeout(), Some(Duration::from_secs(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_show_is_idle_and_hidden() {
        let (show, _landed) = JackpotShow::new(quick_config());
        let frame = show.frame();

        assert_eq!(frame.phase, ShowPhase::Idle);
        assert!(frame.visible.is_empty());
        assert!(frame.eligible.is_empty());
        assert!(frame.amount.is_empty());
        assert!(frame.opacity.iter().all(|(_, opacity)| *opacity == 0.0));
        assert!(show.trigger().is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_counter() {
        let (show, _landed) = JackpotShow::new(quick_config());
        show.play().await;
        assert!(show.counter().is_finished());

        show.reset();
        assert!(!show.counter().is_started());
        assert!(show.counter().text().is_empty());
        assert_eq!(show.phase(), ShowPhase::Idle);
    }
}
