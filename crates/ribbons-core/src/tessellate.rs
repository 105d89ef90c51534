//! Ribbon geometry generation.
//!
//! Each renderable run is walked once to compute a [`Section`] per point
//! (orientation, thickness, color, texture V), then turned into either a flat
//! two-vertex strip or a swept cross-section tube.
//!
//! Walk order decides draw order: with [`Sorting::OldestOnTop`] the walk
//! starts at the head so older sections are emitted last, and the reverse
//! for [`Sorting::NewestOnTop`].

use glam::{Quat, Vec3, Vec4};
use tracing::trace;

use crate::anchor::AnchorState;
use crate::config::{Alignment, RenderConfig, Sorting, TextureMode, EPSILON};
use crate::curve::SamplerSet;
use crate::frame::CurveFrame;
use crate::mesh::TrailMesh;
use crate::point::TrailPoint;
use crate::profile::CrossSectionProfile;
use crate::segment::{run_length, runs};
use crate::smoothing::smooth;

/// Lower bound for the corner correction denominator.
const MIN_CORNER_COSINE: f32 = 0.1;
/// Corners flatter than this (radians) get no fan.
const MIN_FAN_ANGLE: f32 = 0.001;

/// Everything the tessellator reads besides the points themselves.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams<'a> {
    pub render: &'a RenderConfig,
    /// Point lifetime, for the normalized-life curves.
    pub duration: f32,
    pub samplers: &'a SamplerSet,
    /// Orients the transported frame in velocity alignment.
    pub anchor: &'a AnchorState,
    pub viewer_position: Vec3,
}

/// Per-point data shared by both geometry modes.
#[derive(Debug, Clone, Copy)]
struct Section {
    position: Vec3,
    tangent: Vec3,
    normal: Vec3,
    bitangent: Vec3,
    prev_dir: Vec3,
    next_dir: Vec3,
    thickness: f32,
    color: Vec4,
    v: f32,
    endpoint: bool,
}

/// Rebuilds `mesh` from the whole point sequence.
///
/// Runs are split at discontinuities, smoothed, then tessellated one after
/// another into the same buffers. Fewer than two points yield an empty mesh.
pub fn build_mesh(points: &[TrailPoint], params: &TessellationParams<'_>, mesh: &mut TrailMesh) {
    mesh.clear();
    if points.len() < 2 {
        return;
    }
    let mut run_count = 0;
    for run in runs(points) {
        let run = smooth(run, params.render.smoothness);
        tessellate_run(&run, params, mesh);
        run_count += 1;
    }
    trace!(
        runs = run_count,
        vertices = mesh.vertex_count(),
        indices = mesh.indices.len(),
        "trail mesh rebuilt"
    );
}

/// Appends the geometry of one discontinuity-free run to `mesh`.
pub fn tessellate_run(run: &[TrailPoint], params: &TessellationParams<'_>, mesh: &mut TrailMesh) {
    if run.len() < 2 {
        return;
    }
    let walk: Vec<&TrailPoint> = match params.render.sorting {
        Sorting::OldestOnTop => run.iter().rev().collect(),
        Sorting::NewestOnTop => run.iter().collect(),
    };
    let sections = sections(&walk, run_length(run), params);
    match &params.render.profile {
        Some(profile) => sweep_profile(&sections, profile, params.render, mesh),
        None => flat_ribbon(&sections, params.render, mesh),
    }
}

fn sections(walk: &[&TrailPoint], length: f32, params: &TessellationParams<'_>) -> Vec<Section> {
    let render = params.render;
    let samplers = params.samplers;
    let n = walk.len();
    let length = length.max(EPSILON);

    let mut frame = CurveFrame::seed(walk[0].position, walk[1].position, params.anchor);
    // distance from the head grows along the walk only when the walk starts there
    let (head_offset, head_sign) = match render.sorting {
        Sorting::OldestOnTop => (0.0, 1.0),
        Sorting::NewestOnTop => (length, -1.0),
    };
    let tile_offset = match render.texture_mode {
        TextureMode::Stretch => 0.0,
        TextureMode::Tile => render.tile_anchor * length,
    };

    let mut walked = 0.0;
    let mut sections = Vec::with_capacity(n);
    for k in 0..n {
        let point = walk[k];
        let next = walk[(k + 1).min(n - 1)];
        let prev = walk[k.saturating_sub(1)];
        let next_v = next.position - point.position;
        let prev_v = point.position - prev.position;
        let section_length = if k + 1 == n {
            prev_v.length()
        } else {
            next_v.length()
        };
        let next_dir = next_v.normalize_or_zero();
        let prev_dir = prev_v.normalize_or_zero();

        let tangent = match render.alignment {
            Alignment::Local => point.tangent,
            _ => next_dir + prev_dir,
        }
        .normalize_or_zero();
        let normal = match render.alignment {
            Alignment::Local => point.normal,
            Alignment::View => params.viewer_position - point.position,
            Alignment::Velocity => frame.transport(tangent, point.position),
        }
        .normalize_or_zero();
        let bitangent = match render.alignment {
            Alignment::Velocity => frame.bitangent,
            _ => tangent.cross(normal),
        }
        .normalize_or_zero();

        let from_head = head_offset + head_sign * walked;
        let normalized_length = (from_head / length).clamp(0.0, 1.0);
        let normalized_life = (1.0 - point.life / params.duration).clamp(0.0, 1.0);
        let v = render.uv_factor
            * match render.texture_mode {
                TextureMode::Stretch => from_head / length,
                TextureMode::Tile => from_head - tile_offset,
            };
        walked += section_length;

        let thickness = render.thickness
            * point.thickness
            * samplers.thickness_over_time.sample(normalized_life)
            * samplers.thickness_over_length.sample(normalized_length);
        let color = point.color
            * samplers.color_over_time.sample(normalized_life)
            * samplers.color_over_length.sample(normalized_length);

        sections.push(Section {
            position: point.position,
            tangent,
            normal,
            bitangent,
            prev_dir,
            next_dir,
            thickness,
            color,
            v,
            endpoint: k == 0 || k + 1 == n,
        });
    }
    sections
}

fn texcoord(render: &RenderConfig, u: f32, v: f32, thickness: f32) -> Vec4 {
    if render.projective_uv && thickness > EPSILON {
        let q = 1.0 / thickness;
        Vec4::new(u * q, v * q, 0.0, q)
    } else {
        Vec4::new(u, v, 0.0, 1.0)
    }
}

fn push(mesh: &mut TrailMesh, render: &RenderConfig, s: &Section, position: Vec3, u: f32) -> u32 {
    mesh.push_vertex(
        position,
        s.normal,
        s.tangent.extend(1.0),
        texcoord(render, u, s.v, s.thickness),
        s.color,
    )
}

/// Bitangent of the straight section leaving (or entering) along `dir`,
/// with `dir` flattened into the section's (bitangent, tangent) plane.
fn section_bitangent(s: &Section, dir: Vec3) -> Vec3 {
    let flattened = s.bitangent * dir.dot(s.bitangent) + s.tangent * dir.dot(s.tangent);
    flattened.cross(s.normal).normalize_or_zero()
}

/// Outer-corner fan of a flat-ribbon section.
struct Fan {
    /// +1 when the path bends towards +bitangent, -1 otherwise.
    side: f32,
    start: Vec3,
    step: Quat,
    steps: u32,
    /// Sign of the rotation about the normal; decides triangle winding.
    rotation: f32,
}

/// Corner handling for one section: corrected half-width plus an optional fan.
fn corner(s: &Section, roundness: u32) -> (f32, Option<Fan>) {
    let next_bitangent = section_bitangent(s, s.next_dir);
    let corrected = s.thickness / s.bitangent.dot(next_bitangent).max(MIN_CORNER_COSINE);
    if roundness == 0 || s.normal == Vec3::ZERO {
        return (corrected, None);
    }

    let bend = s.next_dir.dot(s.bitangent);
    let prev_bitangent = section_bitangent(s, s.prev_dir);
    let angle = prev_bitangent.dot(next_bitangent).clamp(-1.0, 1.0).acos();
    if bend.abs() <= EPSILON || angle < MIN_FAN_ANGLE {
        return (corrected, None);
    }

    let side = bend.signum();
    let rotation = prev_bitangent.cross(next_bitangent).dot(s.normal).signum();
    let fan = Fan {
        side,
        start: -prev_bitangent * side * s.thickness,
        step: Quat::from_axis_angle(s.normal, rotation * angle / roundness as f32),
        steps: roundness,
        rotation,
    };
    (corrected, Some(fan))
}

fn flat_ribbon(sections: &[Section], render: &RenderConfig, mesh: &mut TrailMesh) {
    let hq_corners = render.high_quality_corners && render.alignment != Alignment::Local;
    let width = render.uv_width_factor;
    let mut previous: Option<[u32; 2]> = None;

    for s in sections {
        let (half_width, fan) = if hq_corners && !s.endpoint {
            corner(s, render.corner_roundness)
        } else {
            (s.thickness, None)
        };

        let (entry, exit) = match fan {
            None => {
                let offset = s.bitangent * half_width;
                let pair = [
                    push(mesh, render, s, s.position + offset, 0.0),
                    push(mesh, render, s, s.position - offset, width),
                ];
                (pair, pair)
            }
            Some(fan) => {
                let inner_u = if fan.side > 0.0 { 0.0 } else { width };
                let outer_u = width - inner_u;
                let inner = push(
                    mesh,
                    render,
                    s,
                    s.position + s.bitangent * fan.side * half_width,
                    inner_u,
                );
                let mut offset = fan.start;
                let first = push(mesh, render, s, s.position + offset, outer_u);
                let mut last = first;
                for _ in 0..fan.steps {
                    offset = fan.step * offset;
                    let vertex = push(mesh, render, s, s.position + offset, outer_u);
                    if fan.rotation < 0.0 {
                        mesh.push_triangle(inner, vertex, last);
                    } else {
                        mesh.push_triangle(inner, last, vertex);
                    }
                    last = vertex;
                }
                if fan.side > 0.0 {
                    ([inner, first], [inner, last])
                } else {
                    ([first, inner], [last, inner])
                }
            }
        };

        if let Some([a0, a1]) = previous {
            mesh.push_triangle(a0, entry[0], a1);
            mesh.push_triangle(a1, entry[0], entry[1]);
        }
        previous = Some(exit);
    }
}

fn sweep_profile(
    sections: &[Section],
    profile: &CrossSectionProfile,
    render: &RenderConfig,
    mesh: &mut TrailMesh,
) {
    let segments = profile.segments() as u32;
    let mut previous: Option<u32> = None;

    for s in sections {
        let base = mesh.next_index();
        for (j, vertex) in profile.vertices().iter().enumerate() {
            // profile y follows the normal, not the tangent: a ring spanned by the travel tangent lies flat along the path
            let offset = (s.bitangent * vertex.x + s.normal * vertex.y) * s.thickness;
            let u = render.uv_width_factor * j as f32 / segments as f32;
            mesh.push_vertex(
                s.position + offset,
                offset.try_normalize().unwrap_or(s.normal),
                s.tangent.extend(1.0),
                texcoord(render, u, s.v, s.thickness),
                s.color,
            );
        }
        if let Some(prev) = previous {
            for j in 0..segments {
                let (a, b) = (prev + j, prev + j + 1);
                let (c, d) = (base + j, base + j + 1);
                mesh.push_triangle(a, c, b);
                mesh.push_triangle(b, c, d);
            }
        }
        previous = Some(base);
    }
}
