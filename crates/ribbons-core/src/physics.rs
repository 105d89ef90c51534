//! Fixed-rate gravity and damping for trail points.

use crate::config::PhysicsConfig;
use crate::point::TrailPoint;

/// Integrates one fixed step over every point.
///
/// Damping is applied as `(1 - damping)^dt` so it does not depend on the tick
/// rate.
pub fn integrate(points: &mut [TrailPoint], dt: f32, config: &PhysicsConfig) {
    let retention = (1.0 - config.damping.clamp(0.0, 1.0)).powf(dt);
    for point in points.iter_mut() {
        point.velocity += config.gravity * dt;
        point.velocity *= retention;
        point.position += point.velocity * dt;
    }
}

/// Upper bound on fixed steps released by a single [`FixedStepper::advance`].
pub const MAX_STEPS_PER_ADVANCE: u32 = 64;

/// Whole fixed steps that fit in `time`, counted without repeated subtraction
/// so huge spans relative to `step` stay finite. Saturates at `u32::MAX`.
pub fn whole_steps(time: f32, step: f32) -> u32 {
    if time.is_nan() || step.is_nan() || time <= 0.0 || step <= 0.0 {
        return 0;
    }
    (time / step).floor() as u32
}

/// Accumulates frame time and releases it in fixed-size steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStepper {
    accumulated: f32,
}

impl FixedStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of whole fixed steps available after adding `dt`; may be zero.
    ///
    /// At most [`MAX_STEPS_PER_ADVANCE`] steps are released; a backlog beyond
    /// that is dropped rather than replayed on later frames.
    pub fn advance(&mut self, dt: f32, step: f32) -> u32 {
        self.accumulated += dt.max(0.0);
        let steps = whole_steps(self.accumulated, step);
        if steps >= MAX_STEPS_PER_ADVANCE {
            self.accumulated = 0.0;
            return MAX_STEPS_PER_ADVANCE;
        }
        self.accumulated = (self.accumulated - steps as f32 * step).max(0.0);
        steps
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}
