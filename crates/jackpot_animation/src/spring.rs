//! Spring physics animation
//!
//! RK4-integrated spring used by the count-up display. Rest thresholds are
//! part of the configuration so large counters settle as crisply as small
//! ones. The state is `f64` so the step size stays above the float spacing
//! near targets in the hundreds of millions.

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Distance from target under which the spring may rest
    pub rest_delta: f64,
    /// Speed under which the spring may rest
    pub rest_speed: f64,
}

impl SpringConfig {
    pub fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            rest_delta: 0.5,
            rest_speed: 5.0,
        }
    }

    pub fn with_rest(mut self, rest_delta: f64, rest_speed: f64) -> Self {
        self.rest_delta = rest_delta;
        self.rest_speed = rest_speed;
        self
    }

    /// Spring tuned for counting across `range`
    ///
    /// Damping grows with the log of the range and stiffness with its square
    /// root (capped), which keeps the count duration roughly stable from
    /// tens to tens of thousands.
    pub fn count_up(range: f64) -> Self {
        let range = range.abs();
        let damping = 60.0 + (range + 10.0).log10() * 10.0;
        let stiffness = (50.0 + range.sqrt() * 2.0).min(180.0);
        Self::new(stiffness, damping, 1.0).with_rest(0.1, 0.1)
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }
}

/// A spring-based animator
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f64) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Within the rest thresholds of the target
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
    }

    /// Step the simulation by `dt` seconds using RK4 integration
    ///
    /// Once settled, or once a step stops moving the value, it snaps exactly
    /// onto the target.
    pub fn step(&mut self, dt: f64) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.value + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        let previous = self.value;
        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;

        // A step that no longer moves the value is as close as the float gets
        if self.is_settled() || self.value == previous {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn acceleration(&self, x: f64, v: f64) -> f64 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_settles_exactly_on_target() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0);
        spring.set_target(100.0);

        for _ in 0..120 {
            spring.step(1.0 / 60.0);
        }

        assert!(spring.is_settled());
        assert_eq!(spring.value(), 100.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_count_up_config_scales_with_range() {
        let small = SpringConfig::count_up(90.0);
        let large = SpringConfig::count_up(9999.0);

        assert!(large.damping > small.damping);
        assert!(large.stiffness >= small.stiffness);
        assert_eq!(large.stiffness, 180.0);
        assert!((small.damping - 80.0).abs() < 1e-4);
        assert_eq!(large.rest_delta, 0.1);
    }

    #[test]
    fn test_count_up_spring_does_not_overshoot() {
        let config = SpringConfig::count_up(9999.0);
        assert!(config.is_overdamped());

        let mut spring = Spring::new(config, 0.0);
        spring.set_target(9999.0);
        for _ in 0..(60 * 30) {
            spring.step(1.0 / 60.0);
            assert!(spring.value() <= 9999.0 + 1e-3);
        }
        assert_eq!(spring.value(), 9999.0);
    }

    #[test]
    fn test_spring_rk4_stability() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0);
        spring.set_target(1000.0);

        for _ in 0..100 {
            spring.step(0.1);
            assert!(spring.value() < 2000.0);
            assert!(spring.value() > -500.0);
        }
    }

    #[test]
    fn test_default_spring_is_underdamped() {
        assert!(SpringConfig::default().is_underdamped());
    }

    #[test]
    fn test_large_count_up_reaches_target() {
        for target in [1_000_000.0, 100_000_000.0] {
            let mut spring = Spring::new(SpringConfig::count_up(target), 0.0);
            spring.set_target(target);
            for _ in 0..(60 * 60) {
                spring.step(1.0 / 60.0);
            }
            assert!(spring.is_settled(), "stalled short of {target}");
            assert_eq!(spring.value(), target);
        }
    }
}
