//! Variants
//!
//! A variant set names the `hidden` and `visible` targets of one component
//! together with the transition used to reach `visible`. The presets mirror
//! the jackpot show's components.

use crate::easing::Easing;
use jackpot_core::{ComponentId, VisualState};
use std::time::Duration;

/// Visual properties a tween can drive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualProps {
    pub opacity: f32,
    pub scale: f32,
    /// Rotation in degrees
    pub rotate: f32,
    /// Vertical offset in pixels
    pub y: f32,
}

impl VisualProps {
    pub const fn new(opacity: f32, scale: f32, rotate: f32, y: f32) -> Self {
        Self {
            opacity,
            scale,
            rotate,
            y,
        }
    }

    /// Fully opaque, unscaled, unrotated
    pub const fn shown() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.0)
    }

    /// Transparent but otherwise neutral
    pub const fn faded() -> Self {
        Self::new(0.0, 1.0, 0.0, 0.0)
    }
}

impl Default for VisualProps {
    fn default() -> Self {
        Self::faded()
    }
}

/// Repeat behavior of a transition
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Repeat {
    /// Play once and settle
    #[default]
    Never,
    /// Loop the rotation forever with the given period; never settles
    Forever { period: Duration },
}

/// Timing of a transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
    pub repeat: Repeat,
}

impl Transition {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            repeat: Repeat::Never,
        }
    }

    /// Settle on the very first frame
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Easing::Linear)
    }

    pub fn ease_out_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms), Easing::EaseOut)
    }

    pub fn repeat_forever(mut self, period: Duration) -> Self {
        self.repeat = Repeat::Forever { period };
        self
    }

    pub fn is_endless(&self) -> bool {
        matches!(self.repeat, Repeat::Forever { .. })
    }

    /// The same timing without the repeat
    pub fn once(mut self) -> Self {
        self.repeat = Repeat::Never;
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::instant()
    }
}

/// Named targets for one component
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Variants {
    pub hidden: VisualProps,
    pub visible: VisualProps,
    /// Transition used when moving to `visible`
    pub enter: Transition,
}

impl Variants {
    pub fn new(hidden: VisualProps, visible: VisualProps, enter: Transition) -> Self {
        Self {
            hidden,
            visible,
            enter,
        }
    }

    pub fn props_for(&self, state: VisualState) -> VisualProps {
        match state {
            VisualState::Hidden => self.hidden,
            VisualState::Visible => self.visible,
        }
    }

    /// Transition used when moving to `state`
    ///
    /// Exits reuse the entry timing but never repeat.
    pub fn transition_for(&self, state: VisualState) -> Transition {
        match state {
            VisualState::Visible => self.enter,
            VisualState::Hidden => self.enter.once(),
        }
    }

    /// Fade in over 0.4s while scaling up, then spin every 8s forever
    pub fn aperture() -> Self {
        Self::new(
            VisualProps::new(0.0, 0.8, 0.0, 0.0),
            VisualProps::shown(),
            Transition::ease_out_ms(400).repeat_forever(Duration::from_secs(8)),
        )
    }

    pub fn background() -> Self {
        Self::new(
            VisualProps::new(0.0, 0.8, 0.0, 0.0),
            VisualProps::shown(),
            Transition::ease_out_ms(500),
        )
    }

    /// Rise 20px while fading in
    pub fn dice() -> Self {
        Self::new(
            VisualProps::new(0.0, 1.0, 0.0, 20.0),
            VisualProps::shown(),
            Transition::ease_out_ms(700),
        )
    }

    pub fn lottie() -> Self {
        Self::new(
            VisualProps::new(0.0, 0.9, 0.0, 0.0),
            VisualProps::shown(),
            Transition::ease_out_ms(1000),
        )
    }

    pub fn amount() -> Self {
        Self::new(VisualProps::faded(), VisualProps::shown(), Transition::instant())
    }

    pub fn projectile() -> Self {
        Self::new(
            VisualProps::faded(),
            VisualProps::shown(),
            Transition::ease_out_ms(500),
        )
    }

    /// Preset for a component
    pub fn for_component(id: ComponentId) -> Self {
        match id {
            ComponentId::Aperture => Self::aperture(),
            ComponentId::Background => Self::background(),
            ComponentId::Dice => Self::dice(),
            ComponentId::Lottie => Self::lottie(),
            ComponentId::Amount => Self::amount(),
            ComponentId::Projectile => Self::projectile(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_aperture_is_endless() {
        for id in ComponentId::ALL {
            let endless = Variants::for_component(id).enter.is_endless();
            assert_eq!(endless, id == ComponentId::Aperture, "{id}");
        }
    }

    #[test]
    fn test_exit_never_repeats() {
        let aperture = Variants::aperture();
        assert!(aperture.transition_for(VisualState::Visible).is_endless());
        assert!(!aperture.transition_for(VisualState::Hidden).is_endless());
    }

    #[test]
    fn test_props_for_state() {
        let dice = Variants::dice();
        assert_eq!(dice.props_for(VisualState::Hidden).y, 20.0);
        assert_eq!(dice.props_for(VisualState::Visible), VisualProps::shown());
    }
}
