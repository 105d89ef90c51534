use glam::Vec3;

use crate::anchor::AnchorState;
use crate::config::EmissionConfig;
use crate::point::TrailPoint;

/// Appends new points at the anchor on a time and spacing schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    accumulated: f32,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    /// Advances the interval timer and emits at most one point.
    ///
    /// Spacing is measured against the second-newest point: the newest one is
    /// the head, which tracks the anchor. The timer only restarts when a point
    /// is actually appended.
    pub fn step(
        &mut self,
        points: &mut Vec<TrailPoint>,
        dt: f32,
        anchor: &AnchorState,
        anchor_velocity: Vec3,
        config: &EmissionConfig,
    ) -> bool {
        self.accumulated += dt;
        if self.accumulated < config.time_interval || !config.emit {
            return false;
        }

        let spaced = match points.len() {
            0 | 1 => true,
            n => anchor.position.distance(points[n - 2].position) >= config.min_distance,
        };
        if !spaced {
            return false;
        }

        points.push(TrailPoint::new(
            anchor.position,
            config.initial_velocity + anchor_velocity * config.inertia,
            anchor.right,
            anchor.forward,
            config.initial_color,
            config.initial_thickness,
            config.duration,
        ));
        self.accumulated = 0.0;
        true
    }
}
