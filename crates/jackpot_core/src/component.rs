//! Animated components and their visual states

use std::fmt;

/// Identifier of one animated piece of the jackpot show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentId {
    /// Rotating light aperture behind everything else
    Aperture,
    /// Bonus background panel
    Background,
    /// Dice group
    Dice,
    /// Vector overlay animation
    Lottie,
    /// Coin-count display
    Amount,
    /// Particle burst
    Projectile,
}

impl ComponentId {
    /// All components in render order (back to front)
    pub const ALL: [ComponentId; 6] = [
        ComponentId::Aperture,
        ComponentId::Background,
        ComponentId::Lottie,
        ComponentId::Projectile,
        ComponentId::Dice,
        ComponentId::Amount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentId::Aperture => "aperture",
            ComponentId::Background => "background",
            ComponentId::Dice => "dice",
            ComponentId::Lottie => "lottie",
            ComponentId::Amount => "amount",
            ComponentId::Projectile => "projectile",
        }
    }

    /// Parse a component from its lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two named visual states every component moves between
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisualState {
    #[default]
    Hidden,
    Visible,
}

impl VisualState {
    pub fn is_visible(self) -> bool {
        matches!(self, VisualState::Visible)
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualState::Hidden => f.write_str("hidden"),
            VisualState::Visible => f.write_str("visible"),
        }
    }
}
