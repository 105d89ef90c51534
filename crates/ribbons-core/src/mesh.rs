//! Output buffers produced by tessellation.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Interleaved vertex layout for direct GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TrailVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 4],
    pub color: [f32; 4],
}

/// Fully rebuilt every time a viewer renders the trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// xyz tangent, w handedness.
    pub tangents: Vec<Vec4>,
    /// (u, v) in xy; zw carry the projective divisor when enabled.
    pub uvs: Vec<Vec4>,
    pub colors: Vec<Vec4>,
    pub indices: Vec<u32>,
}

impl TrailMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every buffer, keeping allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.tangents.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index the next pushed vertex will get.
    pub(crate) fn next_index(&self) -> u32 {
        self.positions.len() as u32
    }

    pub(crate) fn push_vertex(
        &mut self,
        position: Vec3,
        normal: Vec3,
        tangent: Vec4,
        uv: Vec4,
        color: Vec4,
    ) -> u32 {
        let index = self.next_index();
        self.positions.push(position);
        self.normals.push(normal);
        self.tangents.push(tangent);
        self.uvs.push(uv);
        self.colors.push(color);
        index
    }

    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }

    pub fn vertices(&self) -> Vec<TrailVertex> {
        (0..self.vertex_count())
            .map(|i| TrailVertex {
                position: self.positions[i].to_array(),
                normal: self.normals[i].to_array(),
                tangent: self.tangents[i].to_array(),
                uv: self.uvs[i].to_array(),
                color: self.colors[i].to_array(),
            })
            .collect()
    }

    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertices()).to_vec()
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
