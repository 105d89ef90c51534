//! The moving object a trail follows, and its smoothed velocity.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Anchor transform pushed by the host once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorState {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl AnchorState {
    pub fn new(position: Vec3, forward: Vec3, right: Vec3, up: Vec3) -> Self {
        Self {
            position,
            forward,
            right,
            up,
        }
    }

    /// Anchor at `position` with the default axes (forward = -Z, right = +X, up = +Y).
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::NEG_Z, Vec3::X, Vec3::Y)
    }

    /// Anchor at `position` with axes rotated by `rotation`.
    pub fn from_rotation(position: Vec3, rotation: Quat) -> Self {
        Self::new(
            position,
            rotation * Vec3::NEG_Z,
            rotation * Vec3::X,
            rotation * Vec3::Y,
        )
    }

    /// Re-express this anchor in the space described by `transform`.
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        Self {
            position: transform.transform_point3(self.position),
            forward: transform.transform_vector3(self.forward).normalize_or_zero(),
            right: transform.transform_vector3(self.right).normalize_or_zero(),
            up: transform.transform_vector3(self.up).normalize_or_zero(),
        }
    }
}

impl Default for AnchorState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Exponentially smoothed anchor velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityEstimator {
    previous_position: Vec3,
    velocity: Vec3,
}

impl VelocityEstimator {
    pub fn new(position: Vec3) -> Self {
        Self {
            previous_position: position,
            velocity: Vec3::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Folds the newest anchor position into the estimate.
    ///
    /// `smoothing` weights the previous estimate: 0 tracks the raw velocity,
    /// 1 never changes. Non-positive `dt` keeps the estimate untouched, but
    /// the stored position always advances.
    pub fn update(&mut self, position: Vec3, dt: f32, smoothing: f32) -> Vec3 {
        if dt > 0.0 {
            let raw = (position - self.previous_position) / dt;
            self.velocity = raw.lerp(self.velocity, smoothing);
        }
        self.previous_position = position;
        self.velocity
    }

    pub fn reset(&mut self, position: Vec3) {
        *self = Self::new(position);
    }
}
