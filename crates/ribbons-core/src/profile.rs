use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrailError};

/// 2D cross-section swept along the trail to build a tube-like mesh.
///
/// `vertices` holds `segments + 1` entries; the last one closes the loop (or
/// ends an open profile) and gets its own texture coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile", into = "RawProfile")]
pub struct CrossSectionProfile {
    segments: usize,
    vertices: Vec<Vec2>,
}

#[derive(Serialize, Deserialize)]
struct RawProfile {
    segments: usize,
    vertices: Vec<Vec2>,
}

impl CrossSectionProfile {
    pub fn new(segments: usize, vertices: Vec<Vec2>) -> Result<Self> {
        if segments == 0 {
            return Err(TrailError::InvalidProfile(
                "a profile needs at least one segment".into(),
            ));
        }
        if vertices.len() != segments + 1 {
            return Err(TrailError::InvalidProfile(format!(
                "expected {} vertices for {} segments, got {}",
                segments + 1,
                segments,
                vertices.len()
            )));
        }
        Ok(Self { segments, vertices })
    }

    /// Closed unit circle.
    pub fn circle(segments: usize) -> Self {
        let segments = segments.max(3);
        let vertices = (0..=segments)
            .map(|j| {
                let angle = TAU * j as f32 / segments as f32;
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect();
        Self { segments, vertices }
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }
}

impl TryFrom<RawProfile> for CrossSectionProfile {
    type Error = TrailError;

    fn try_from(raw: RawProfile) -> Result<Self> {
        Self::new(raw.segments, raw.vertices)
    }
}

impl From<CrossSectionProfile> for RawProfile {
    fn from(profile: CrossSectionProfile) -> Self {
        Self {
            segments: profile.segments,
            vertices: profile.vertices,
        }
    }
}
