//! Trail point record and the interpolation helpers that operate on it.

use std::ops::{Add, Mul, Sub};

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A single sample of the trail.
///
/// Points live in one ordered sequence, oldest at index 0 and the head
/// (newest) at the end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub position: Vec3,
    pub velocity: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub color: Vec4,
    /// Multiplier applied on top of the trail thickness.
    pub thickness: f32,
    /// Remaining life in seconds.
    pub life: f32,
    /// Forces a break in the rendered ribbon after this point.
    pub discontinuous: bool,
}

impl TrailPoint {
    pub fn new(
        position: Vec3,
        velocity: Vec3,
        tangent: Vec3,
        normal: Vec3,
        color: Vec4,
        thickness: f32,
        life: f32,
    ) -> Self {
        Self {
            position,
            velocity,
            tangent,
            normal,
            color,
            thickness,
            life,
            discontinuous: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Virtual control point mirrored through `edge`, away from `adjacent`.
    ///
    /// Every field becomes `edge + (edge - adjacent)`. Only used to pad the
    /// ends of a run before spline interpolation.
    pub fn reflect(edge: &TrailPoint, adjacent: &TrailPoint) -> TrailPoint {
        fn mirror<T>(e: T, a: T) -> T
        where
            T: Copy + Add<Output = T> + Sub<Output = T>,
        {
            e + (e - a)
        }

        TrailPoint {
            position: mirror(edge.position, adjacent.position),
            velocity: mirror(edge.velocity, adjacent.velocity),
            tangent: mirror(edge.tangent, adjacent.tangent),
            normal: mirror(edge.normal, adjacent.normal),
            color: mirror(edge.color, adjacent.color),
            thickness: mirror(edge.thickness, adjacent.thickness),
            life: mirror(edge.life, adjacent.life),
            discontinuous: false,
        }
    }

    /// Component-wise Catmull-Rom interpolation between `p1` and `p2`.
    pub fn catmull_rom(
        p0: &TrailPoint,
        p1: &TrailPoint,
        p2: &TrailPoint,
        p3: &TrailPoint,
        t: f32,
    ) -> TrailPoint {
        TrailPoint {
            position: catmull_rom(p0.position, p1.position, p2.position, p3.position, t),
            velocity: catmull_rom(p0.velocity, p1.velocity, p2.velocity, p3.velocity, t),
            tangent: catmull_rom(p0.tangent, p1.tangent, p2.tangent, p3.tangent, t),
            normal: catmull_rom(p0.normal, p1.normal, p2.normal, p3.normal, t),
            color: catmull_rom(p0.color, p1.color, p2.color, p3.color, t),
            thickness: catmull_rom(p0.thickness, p1.thickness, p2.thickness, p3.thickness, t),
            life: catmull_rom(p0.life, p1.life, p2.life, p3.life, t),
            discontinuous: false,
        }
    }
}

/// Uniform Catmull-Rom spline through `p1` (t = 0) and `p2` (t = 1).
pub fn catmull_rom<T>(p0: T, p1: T, p2: T, p3: T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    let t2 = t * t;
    let t3 = t2 * t;
    let a = p1 * 2.0;
    let b = (p2 - p0) * t;
    let c = (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2;
    let d = (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3;
    (a + b + c + d) * 0.5
}
