//! Scripted anchor paths and orbiting cameras.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use ribbons_core::{AnchorState, ViewerState};
use ribbons_platform::{AnchorSource, Result, ViewerSource};

use crate::cli::PathKind;

/// Look-ahead used to orient the anchor along its direction of travel.
const HEADING_PROBE: f32 = 0.01;

pub struct ScriptedAnchor {
    path: PathKind,
}

impl ScriptedAnchor {
    pub fn new(path: PathKind) -> Self {
        Self { path }
    }

    fn position_at(&self, t: f32) -> Vec3 {
        match self.path {
            PathKind::Lissajous => Vec3::new((t * 1.3).sin() * 2.0, (t * 2.6).sin(), 0.0),
            PathKind::Helix => Vec3::new(t.cos() * 1.5, t * 0.3, t.sin() * 1.5),
            PathKind::Line => Vec3::new(t * 2.0, 0.0, 0.0),
        }
    }
}

impl AnchorSource for ScriptedAnchor {
    fn anchor(&mut self, time: f32) -> Result<AnchorState> {
        let position = self.position_at(time);
        let heading = self.position_at(time + HEADING_PROBE) - position;
        let forward = heading.try_normalize().unwrap_or(Vec3::NEG_Z);
        let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
        Ok(AnchorState::from_rotation(position, rotation))
    }
}

/// Cameras evenly spaced on a slowly rotating ring.
pub struct OrbitViewers {
    count: usize,
    radius: f32,
    rate: f32,
}

impl OrbitViewers {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            radius: 6.0,
            rate: 0.2,
        }
    }
}

impl ViewerSource for OrbitViewers {
    fn viewers(&mut self, time: f32) -> Result<Vec<ViewerState>> {
        Ok((0..self.count)
            .map(|i| {
                let angle = TAU * i as f32 / self.count as f32 + time * self.rate;
                let position = Vec3::new(angle.cos() * self.radius, 1.0, angle.sin() * self.radius);
                ViewerState::at(position)
            })
            .collect())
    }
}
