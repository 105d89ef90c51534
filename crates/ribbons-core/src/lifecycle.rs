//! Aging, head pinning and pruning of trail points.

use crate::anchor::AnchorState;
use crate::point::TrailPoint;

/// Keeps the head glued to the anchor while emitting.
///
/// With emission off the head is marked discontinuous instead and stays
/// where the simulation left it, so the ribbon breaks there.
pub fn pin_head(points: &mut [TrailPoint], anchor: &AnchorState, emitting: bool) {
    let Some(head) = points.last_mut() else {
        return;
    };
    if !emitting {
        head.discontinuous = true;
    }
    if !head.discontinuous {
        head.position = anchor.position;
        head.tangent = anchor.right;
        head.normal = anchor.forward;
    }
}

/// Subtracts `dt` from every life and removes dead points, newest first.
///
/// Without smoothing a dead point goes immediately. With smoothing it waits
/// until the two points after it (indices clamped to the current last one)
/// are dead too, so the spline keeps enough control points at the tail.
/// Returns how many points were removed.
pub fn age_and_prune(points: &mut Vec<TrailPoint>, dt: f32, smoothness: u32) -> usize {
    let before = points.len();
    for i in (0..points.len()).rev() {
        points[i].life -= dt;
        if points[i].life > 0.0 {
            continue;
        }
        if smoothness <= 1 {
            points.remove(i);
            continue;
        }
        let last = points.len() - 1;
        let next = points[(i + 1).min(last)].life;
        let after = points[(i + 2).min(last)].life;
        if next <= 0.0 && after <= 0.0 {
            points.remove(i);
        }
    }
    before - points.len()
}
