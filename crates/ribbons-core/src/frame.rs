use glam::Vec3;

use crate::anchor::AnchorState;

/// Rotation-minimizing frame carried along a polyline.
///
/// Propagated with the double reflection method: one reflection across the
/// bisector plane of the step, a second across the bisector plane of the
/// tangent change. Unlike a Frenet frame it does not flip at inflections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFrame {
    pub position: Vec3,
    pub normal: Vec3,
    pub bitangent: Vec3,
    pub tangent: Vec3,
}

/// Guards the reflection denominators against zero-length steps.
const REFLECTION_EPSILON: f32 = 0.00001;
/// |cos| above which the seed tangent counts as parallel to the seed normal.
const PARALLEL_COSINE: f32 = 0.9999;
const SEED_NUDGE: f32 = 0.01;

impl CurveFrame {
    pub fn new(position: Vec3, normal: Vec3, bitangent: Vec3, tangent: Vec3) -> Self {
        Self {
            position,
            normal,
            bitangent,
            tangent,
        }
    }

    /// Seeds a frame at `point`, heading towards `next`, oriented by the anchor.
    ///
    /// A tangent that is degenerate or almost parallel to the anchor's forward
    /// axis is nudged along the anchor's right axis so the frame stays valid.
    pub fn seed(point: Vec3, next: Vec3, anchor: &AnchorState) -> Self {
        let mut tangent = (next - point).normalize_or_zero();
        if tangent == Vec3::ZERO || tangent.dot(anchor.forward).abs() > PARALLEL_COSINE {
            tangent = (tangent + anchor.right * SEED_NUDGE).normalize_or_zero();
        }
        Self::new(point, anchor.forward, anchor.up, tangent)
    }

    /// Moves the frame to `position` with the new `tangent` and returns the
    /// transported normal.
    pub fn transport(&mut self, tangent: Vec3, position: Vec3) -> Vec3 {
        let step = position - self.position;
        let c1 = step.dot(step) + REFLECTION_EPSILON;
        let reflected_normal = self.normal - step * (2.0 / c1 * step.dot(self.normal));
        let reflected_tangent = self.tangent - step * (2.0 / c1 * step.dot(self.tangent));

        let turn = tangent - reflected_tangent;
        let c2 = turn.dot(turn) + REFLECTION_EPSILON;
        let normal = reflected_normal - turn * (2.0 / c2 * turn.dot(reflected_normal));

        self.normal = normal;
        self.bitangent = tangent.cross(normal);
        self.tangent = tangent;
        self.position = position;
        normal
    }
}
