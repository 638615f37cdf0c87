//! Animatable value types
//!
//! Linear interpolation for scalars and visual props, plus typed keyframe
//! tracks sampled by normalized progress.

use crate::easing::Easing;
use crate::variant::VisualProps;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

// ============================================================================
// VisualProps Implementation
// ============================================================================

impl Interpolate for VisualProps {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        VisualProps {
            opacity: self.opacity.lerp(&other.opacity, t),
            scale: self.scale.lerp(&other.scale, t),
            rotate: self.rotate.lerp(&other.rotate, t),
            y: self.y.lerp(&other.y, t),
        }
    }
}

// ============================================================================
// Keyframe tracks
// ============================================================================

/// A keyframe holding a value of type T
#[derive(Clone, Debug)]
pub struct TypedKeyframe<T: Interpolate> {
    /// Position in normalized progress (0.0 to 1.0)
    pub time: f32,
    pub value: T,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

impl<T: Interpolate> TypedKeyframe<T> {
    pub fn new(time: f32, value: T, easing: Easing) -> Self {
        Self { time, value, easing }
    }

    pub fn linear(time: f32, value: T) -> Self {
        Self::new(time, value, Easing::Linear)
    }
}

/// Piecewise keyframe track sampled by normalized progress
#[derive(Clone, Debug)]
pub struct KeyframeTrack<T: Interpolate> {
    keyframes: Vec<TypedKeyframe<T>>,
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Build a track; keyframes are sorted by time
    pub fn new(mut keyframes: Vec<TypedKeyframe<T>>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keyframes }
    }

    /// Linear track through `(time, value)` pairs
    pub fn linear<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f32, T)>,
    {
        Self::new(
            points
                .into_iter()
                .map(|(time, value)| TypedKeyframe::linear(time, value))
                .collect(),
        )
    }

    /// Sample the track at `progress`
    ///
    /// Progress before the first keyframe or after the last holds the end
    /// value. Returns `None` for an empty track.
    pub fn sample(&self, progress: f32) -> Option<T> {
        let first = self.keyframes.first()?;
        if progress <= first.time {
            return Some(first.value.clone());
        }

        for pair in self.keyframes.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if progress <= to.time {
                let span = to.time - from.time;
                let local = if span > 0.0 {
                    (progress - from.time) / span
                } else {
                    1.0
                };
                return Some(from.value.lerp(&to.value, to.easing.apply(local)));
            }
        }

        self.keyframes.last().map(|k| k.value.clone())
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_f32_lerp() {
        assert_eq!(0.0f32.lerp(&10.0, 0.25), 2.5);
        assert_eq!(4.0f32.lerp(&-4.0, 1.0), -4.0);
    }

    #[test]
    fn test_props_lerp() {
        let a = VisualProps::new(0.0, 0.8, 0.0, 20.0);
        let b = VisualProps::new(1.0, 1.0, 360.0, 0.0);
        let mid = a.lerp(&b, 0.5);
        assert!(close(mid.opacity, 0.5));
        assert!(close(mid.scale, 0.9));
        assert!(close(mid.rotate, 180.0));
        assert!(close(mid.y, 10.0));
    }

    #[test]
    fn test_track_sampling() {
        let track = KeyframeTrack::linear([(0.0, 0.0f32), (0.5, 1.0), (1.0, 0.0)]);
        assert_eq!(track.sample(-1.0), Some(0.0));
        assert!(close(track.sample(0.25).unwrap(), 0.5));
        assert!(close(track.sample(0.75).unwrap(), 0.5));
        assert_eq!(track.sample(2.0), Some(0.0));
    }

    #[test]
    fn test_empty_track() {
        let track: KeyframeTrack<f32> = KeyframeTrack::new(Vec::new());
        assert!(track.is_empty());
        assert_eq!(track.sample(0.5), None);
    }
}
