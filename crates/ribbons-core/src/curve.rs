//! Thickness and color modulation over trail length and point lifetime.
//!
//! The tessellator only sees [`Sampler`]s. Hosts can pass closures or use the
//! serializable keyframe types ([`Curve`], [`Gradient`]) carried in presets.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// A function of a normalized parameter `t` in `[0, 1]`.
pub trait Sampler<T> {
    fn sample(&self, t: f32) -> T;
}

impl<T, F> Sampler<T> for F
where
    F: Fn(f32) -> T,
{
    fn sample(&self, t: f32) -> T {
        self(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
}

/// Piecewise-linear keyframes, clamped outside the first and last key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframes<T> {
    keys: Vec<Key<T>>,
}

/// Scalar keyframes, used for thickness multipliers.
pub type Curve = Keyframes<f32>;
/// RGBA keyframes, used for color multipliers.
pub type Gradient = Keyframes<Vec4>;

impl<T> Keyframes<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    pub fn new(mut keys: Vec<Key<T>>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn constant(value: T) -> Self {
        Self::new(vec![Key { time: 0.0, value }])
    }

    pub fn linear(start: T, end: T) -> Self {
        Self::new(vec![
            Key {
                time: 0.0,
                value: start,
            },
            Key {
                time: 1.0,
                value: end,
            },
        ])
    }

    /// Copy with keys in ascending time; deserialized presets may be unordered.
    pub fn sorted(&self) -> Self {
        Self::new(self.keys.clone())
    }

    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    /// Returns `None` for an empty key list.
    pub fn evaluate(&self, t: f32) -> Option<T> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if t <= first.time {
            return Some(first.value);
        }
        if t >= last.time {
            return Some(last.value);
        }
        let upper = self.keys.partition_point(|key| key.time <= t);
        let a = &self.keys[upper - 1];
        let b = &self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return Some(b.value);
        }
        let s = (t - a.time) / span;
        Some(a.value + (b.value - a.value) * s)
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::constant(Vec4::ONE)
    }
}

impl Sampler<f32> for Curve {
    fn sample(&self, t: f32) -> f32 {
        self.evaluate(t).unwrap_or(1.0)
    }
}

impl Sampler<Vec4> for Gradient {
    fn sample(&self, t: f32) -> Vec4 {
        self.evaluate(t).unwrap_or(Vec4::ONE)
    }
}

/// The four modulation curves as they appear in a preset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSet {
    pub thickness_over_length: Curve,
    pub thickness_over_time: Curve,
    pub color_over_length: Gradient,
    pub color_over_time: Gradient,
}

pub type ScalarSampler = Box<dyn Sampler<f32> + Send + Sync>;
pub type ColorSampler = Box<dyn Sampler<Vec4> + Send + Sync>;

/// Samplers consulted by the tessellator.
///
/// Length-keyed samplers receive 0 at the head and 1 at the tail; time-keyed
/// samplers receive 0 for a newborn point and 1 for a dying one.
pub struct SamplerSet {
    pub thickness_over_length: ScalarSampler,
    pub thickness_over_time: ScalarSampler,
    pub color_over_length: ColorSampler,
    pub color_over_time: ColorSampler,
}

impl From<&CurveSet> for SamplerSet {
    fn from(curves: &CurveSet) -> Self {
        Self {
            thickness_over_length: Box::new(curves.thickness_over_length.sorted()),
            thickness_over_time: Box::new(curves.thickness_over_time.sorted()),
            color_over_length: Box::new(curves.color_over_length.sorted()),
            color_over_time: Box::new(curves.color_over_time.sorted()),
        }
    }
}

impl Default for SamplerSet {
    fn default() -> Self {
        Self::from(&CurveSet::default())
    }
}

impl fmt::Debug for SamplerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerSet").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_interpolates_between_keys() {
        let curve = Curve::new(vec![
            Key {
                time: 1.0,
                value: 0.0,
            },
            Key {
                time: 0.0,
                value: 2.0,
            },
        ]);
        assert_relative_eq!(curve.sample(0.25), 1.5);
        assert_relative_eq!(curve.sample(-1.0), 2.0);
        assert_relative_eq!(curve.sample(3.0), 0.0);
    }

    #[test]
    fn test_empty_curve_samples_identity() {
        let curve = Curve::new(Vec::new());
        assert_relative_eq!(curve.sample(0.5), 1.0);
    }

    #[test]
    fn test_gradient_fades_alpha() {
        let gradient = Gradient::linear(Vec4::ONE, Vec4::new(1.0, 1.0, 1.0, 0.0));
        assert_relative_eq!(gradient.sample(0.5).w, 0.5);
    }

    #[test]
    fn test_closures_are_samplers() {
        let samplers = SamplerSet {
            thickness_over_length: Box::new(|t: f32| 1.0 - t),
            ..SamplerSet::default()
        };
        assert_relative_eq!(samplers.thickness_over_length.sample(0.25), 0.75);
        assert_relative_eq!(samplers.thickness_over_time.sample(0.25), 1.0);
    }

    #[test]
    fn test_curve_set_parses_from_toml() {
        let text = r#"
            [thickness_over_length]
            keys = [{ time = 0.0, value = 1.0 }, { time = 1.0, value = 0.0 }]
        "#;
        let curves: CurveSet = toml::from_str(text).unwrap();
        assert_relative_eq!(curves.thickness_over_length.sample(0.5), 0.5);
        assert_relative_eq!(curves.color_over_time.sample(0.5).x, 1.0);
    }
}
