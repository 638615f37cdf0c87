//! Projectile particles
//!
//! Coins thrown along ballistic arcs when the burst becomes visible. Each
//! particle's progress runs linearly from 0 to 1 over the flight time and
//! its landing is reported on the burst's completion channel. Nothing waits
//! on those reports: the show paces the burst with a fixed settle delay.

use crate::tween::{frame_duration, TweenControl};
use crate::values::KeyframeTrack;
use crate::variant::Variants;
use async_trait::async_trait;
use jackpot_core::{ComponentId, ControlError, ControlHandle, VisualState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// Gravity in m/s²
const GRAVITY: f32 = 9.8;
/// 1 m = 10 px
const PIXELS_PER_METER: f32 = 10.0;
const FLIGHT: Duration = Duration::from_secs(2);

/// One coin on a ballistic arc
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub id: String,
    /// Initial speed in m/s
    pub v0: f32,
    /// Launch angle in degrees, counter-clockwise from +x
    pub angle: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub size: f32,
    pub color: String,
}

impl Projectile {
    pub fn new(id: impl Into<String>, v0: f32, angle: f32) -> Self {
        Self {
            id: id.into(),
            v0,
            angle,
            start_x: 0.0,
            start_y: 300.0,
            size: 16.0,
            color: "gold".to_string(),
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.start_x = x;
        self.start_y = y;
        self
    }

    pub fn sized(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Screen position at `progress` (y grows downwards)
    pub fn position(&self, progress: f32) -> (f32, f32) {
        let radians = self.angle.to_radians();
        let vx = self.v0 * radians.cos();
        let vy = self.v0 * radians.sin();

        let x = self.start_x + vx * progress * PIXELS_PER_METER;
        let rise = vy * progress - 0.5 * GRAVITY * progress * progress;
        let y = self.start_y - rise * PIXELS_PER_METER;
        (x, y)
    }

    /// Opacity at `progress`: pop in, linger, fade out
    pub fn opacity(&self, progress: f32) -> f32 {
        opacity_track().sample(progress).unwrap_or(0.0)
    }
}

fn opacity_track() -> KeyframeTrack<f32> {
    KeyframeTrack::linear([(0.0, 0.0), (0.01, 1.0), (0.7, 0.8), (1.0, 0.0)])
}

/// Sampled particle for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleFrame {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub landed: bool,
}

struct BurstState {
    generation: u64,
    launched: bool,
    progress: Vec<f32>,
}

/// Control handle for the particle burst
///
/// Turning the burst visible fades the group in and launches every particle
/// (once per hide). Hiding grounds the particles; flights still in the air
/// stop without reporting.
pub struct ProjectileBurst {
    particles: Arc<Vec<Projectile>>,
    group: TweenControl,
    frame: Duration,
    state: Arc<Mutex<BurstState>>,
    completions: Option<mpsc::UnboundedSender<String>>,
}

impl ProjectileBurst {
    pub fn new(particles: Vec<Projectile>, fps: u32) -> Self {
        let count = particles.len();
        let frame = frame_duration(fps);
        Self {
            particles: Arc::new(particles),
            group: TweenControl::new(ComponentId::Projectile, Variants::projectile(), frame),
            frame,
            state: Arc::new(Mutex::new(BurstState {
                generation: 0,
                launched: false,
                progress: vec![0.0; count],
            })),
            completions: None,
        }
    }

    /// The six-coin fountain of the jackpot show
    pub fn fountain(fps: u32) -> Self {
        let particles = vec![
            Projectile::new("projectile-1", 10.0, 45.0).at(120.0, 220.0).sized(16.0),
            Projectile::new("projectile-2", 8.0, 60.0)
                .at(140.0, 220.0)
                .sized(14.0)
                .colored("#ff9933"),
            Projectile::new("projectile-3", 12.0, 30.0)
                .at(160.0, 220.0)
                .sized(12.0)
                .colored("#ffcc33"),
            Projectile::new("projectile-4", 10.0, 120.0).at(120.0, 220.0).sized(16.0),
            Projectile::new("projectile-5", 8.0, 140.0)
                .at(140.0, 220.0)
                .sized(14.0)
                .colored("#ff9933"),
            Projectile::new("projectile-6", 12.0, 160.0)
                .at(160.0, 220.0)
                .sized(12.0)
                .colored("#ffcc33"),
        ];
        Self::new(particles, fps)
    }

    /// Report each particle's id on `tx` when it lands
    pub fn on_complete(mut self, tx: mpsc::UnboundedSender<String>) -> Self {
        self.completions = Some(tx);
        self
    }

    pub fn particles(&self) -> &[Projectile] {
        &self.particles
    }

    pub fn is_launched(&self) -> bool {
        self.state.lock().unwrap().launched
    }

    /// Group opacity
    pub fn opacity(&self) -> f32 {
        self.group.props().opacity
    }

    pub fn landed_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.progress.iter().filter(|p| **p >= 1.0).count()
    }

    /// Sample every particle
    pub fn frames(&self) -> Vec<ParticleFrame> {
        let state = self.state.lock().unwrap();
        self.particles
            .iter()
            .zip(state.progress.iter())
            .map(|(particle, &progress)| {
                let (x, y) = particle.position(progress);
                ParticleFrame {
                    id: particle.id.clone(),
                    x,
                    y,
                    opacity: if state.launched {
                        particle.opacity(progress)
                    } else {
                        0.0
                    },
                    landed: progress >= 1.0,
                }
            })
            .collect()
    }

    fn launch(&self) {
        let generation = {
            let mut state = self.state.lock().unwrap();
            if state.launched {
                return;
            }
            state.launched = true;
            state.generation
        };

        tracing::debug!(particles = self.particles.len(), "burst launched");
        for index in 0..self.particles.len() {
            tokio::spawn(fly(
                Arc::clone(&self.state),
                Arc::clone(&self.particles),
                index,
                generation,
                self.frame,
                self.completions.clone(),
            ));
        }
    }

    fn ground(&self) {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.launched = false;
        state.progress.iter_mut().for_each(|p| *p = 0.0);
    }
}

async fn fly(
    state: Arc<Mutex<BurstState>>,
    particles: Arc<Vec<Projectile>>,
    index: usize,
    generation: u64,
    frame: Duration,
    completions: Option<mpsc::UnboundedSender<String>>,
) {
    let start = Instant::now();
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let progress = (start.elapsed().as_secs_f32() / FLIGHT.as_secs_f32()).min(1.0);

        {
            let mut state = state.lock().unwrap();
            if state.generation != generation {
                return;
            }
            state.progress[index] = progress;
        }

        if progress >= 1.0 {
            let id = particles[index].id.clone();
            tracing::trace!(particle = %id, "particle landed");
            if let Some(tx) = completions {
                let _ = tx.send(id);
            }
            return;
        }
    }
}

#[async_trait]
impl ControlHandle for ProjectileBurst {
    async fn transition_to(&self, state: VisualState) -> Result<(), ControlError> {
        match state {
            VisualState::Visible => self.launch(),
            VisualState::Hidden => self.ground(),
        }
        self.group.transition_to(state).await
    }

    fn set_immediate(&self, state: VisualState) {
        if state == VisualState::Hidden {
            self.ground();
        }
        self.group.set_immediate(state);
    }
}
