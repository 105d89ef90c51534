use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};

/// A camera (or any observer) the trail is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    pub position: Vec3,
    /// Layers this viewer sees; tested against the trail's layer bits.
    pub culling_mask: u32,
}

impl ViewerState {
    pub fn new(position: Vec3, culling_mask: u32) -> Self {
        Self {
            position,
            culling_mask,
        }
    }

    /// Viewer seeing every layer.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, u32::MAX)
    }

    pub fn sees(&self, layer: u32) -> bool {
        self.culling_mask & layer != 0
    }

    pub fn transformed(&self, transform: &Affine3A) -> Self {
        Self {
            position: transform.transform_point3(self.position),
            ..*self
        }
    }
}
