//! Trail presets: serializable configuration plus the boundary clamping rules.

use std::fs;
use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::curve::CurveSet;
use crate::error::{Result, TrailError};
use crate::profile::CrossSectionProfile;

/// Smallest duration, fixed step and length accepted anywhere in the pipeline.
pub const EPSILON: f32 = 0.00001;
pub const MAX_SMOOTHNESS: u32 = 8;
pub const MAX_CORNER_ROUNDNESS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationSpace {
    #[default]
    World,
    /// Points live in the space of a parent transform supplied by the host.
    Local,
}

/// How the ribbon's facing normal is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Face the viewer.
    #[default]
    View,
    /// Rotation-minimizing frame transported along the path.
    Velocity,
    /// Use the normal and tangent stored on each point.
    Local,
}

/// Draw order of overlapping ribbon sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sorting {
    #[default]
    OldestOnTop,
    NewestOnTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureMode {
    /// V spans [0, 1] over the whole run.
    #[default]
    Stretch,
    /// V grows with world-space length.
    Tile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    pub emit: bool,
    /// Lifetime of every emitted point, in seconds.
    pub duration: f32,
    /// Minimum time between emissions.
    pub time_interval: f32,
    /// Minimum distance to the second-newest point before emitting.
    pub min_distance: f32,
    pub initial_velocity: Vec3,
    /// Fraction of the anchor velocity inherited by new points.
    pub inertia: f32,
    pub velocity_smoothing: f32,
    pub initial_color: Vec4,
    pub initial_thickness: f32,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            emit: true,
            duration: 2.0,
            time_interval: 0.025,
            min_distance: 0.025,
            initial_velocity: Vec3::ZERO,
            inertia: 0.0,
            velocity_smoothing: 0.75,
            initial_color: Vec4::ONE,
            initial_thickness: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub enabled: bool,
    pub gravity: Vec3,
    pub damping: f32,
    /// Seconds simulated synchronously before the first frame.
    pub warm_up: f32,
    pub fixed_step: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            damping: 0.75,
            warm_up: 0.0,
            fixed_step: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub space: SimulationSpace,
    pub alignment: Alignment,
    pub sorting: Sorting,
    pub texture_mode: TextureMode,
    pub thickness: f32,
    /// Spline samples per control segment; 1 disables smoothing.
    pub smoothness: u32,
    pub high_quality_corners: bool,
    pub corner_roundness: u32,
    pub uv_factor: f32,
    pub uv_width_factor: f32,
    pub tile_anchor: f32,
    pub projective_uv: bool,
    /// Bitmask tested against each viewer's culling mask.
    pub layer: u32,
    pub profile: Option<CrossSectionProfile>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            space: SimulationSpace::World,
            alignment: Alignment::View,
            sorting: Sorting::OldestOnTop,
            texture_mode: TextureMode::Stretch,
            thickness: 0.1,
            smoothness: 1,
            high_quality_corners: false,
            corner_roundness: 5,
            uv_factor: 1.0,
            uv_width_factor: 1.0,
            tile_anchor: 1.0,
            projective_uv: false,
            layer: 1,
            profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub name: String,
    pub emission: EmissionConfig,
    pub physics: PhysicsConfig,
    pub render: RenderConfig,
    pub curves: CurveSet,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            emission: EmissionConfig::default(),
            physics: PhysicsConfig::default(),
            render: RenderConfig::default(),
            curves: CurveSet::default(),
        }
    }
}

impl TrailConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a preset, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(TrailError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Clamps every field into its supported range.
    ///
    /// Invalid values are corrected rather than rejected; each correction is
    /// logged.
    pub fn sanitized(mut self) -> Self {
        let emission = &mut self.emission;
        emission.duration = at_least("emission.duration", emission.duration, EPSILON);
        emission.time_interval = at_least("emission.time_interval", emission.time_interval, 0.0);
        emission.min_distance = at_least("emission.min_distance", emission.min_distance, 0.0);
        emission.inertia = unit("emission.inertia", emission.inertia);
        emission.velocity_smoothing = unit("emission.velocity_smoothing", emission.velocity_smoothing);

        let physics = &mut self.physics;
        physics.damping = unit("physics.damping", physics.damping);
        physics.warm_up = at_least("physics.warm_up", physics.warm_up, 0.0);
        physics.fixed_step = at_least("physics.fixed_step", physics.fixed_step, EPSILON);

        let render = &mut self.render;
        render.thickness = at_least("render.thickness", render.thickness, 0.0);
        render.smoothness = within("render.smoothness", render.smoothness, 1, MAX_SMOOTHNESS);
        render.corner_roundness = within(
            "render.corner_roundness",
            render.corner_roundness,
            0,
            MAX_CORNER_ROUNDNESS,
        );
        render.tile_anchor = unit("render.tile_anchor", render.tile_anchor);
        self
    }
}

fn at_least(field: &str, value: f32, min: f32) -> f32 {
    // NaN falls through to the minimum as well
    if value >= min {
        return value;
    }
    warn!(field, value, corrected = min, "config value out of range");
    min
}

fn unit(field: &str, value: f32) -> f32 {
    let corrected = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if corrected != value {
        warn!(field, value, corrected, "config value out of range");
    }
    corrected
}

fn within(field: &str, value: u32, min: u32, max: u32) -> u32 {
    let corrected = value.clamp(min, max);
    if corrected != value {
        warn!(field, value, corrected, "config value out of range");
    }
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_already_sane() {
        let config = TrailConfig::default();
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let mut config = TrailConfig::default();
        config.emission.duration = -3.0;
        config.emission.inertia = 4.0;
        config.emission.velocity_smoothing = -1.0;
        config.physics.damping = f32::NAN;
        config.physics.warm_up = -1.0;
        config.physics.fixed_step = 0.0;
        config.render.smoothness = 0;
        config.render.corner_roundness = 40;

        let config = config.sanitized();
        assert_eq!(config.emission.duration, EPSILON);
        assert_eq!(config.emission.inertia, 1.0);
        assert_eq!(config.emission.velocity_smoothing, 0.0);
        assert_eq!(config.physics.damping, 0.0);
        assert_eq!(config.physics.warm_up, 0.0);
        assert_eq!(config.physics.fixed_step, EPSILON);
        assert_eq!(config.render.smoothness, 1);
        assert_eq!(config.render.corner_roundness, MAX_CORNER_ROUNDNESS);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = TrailConfig::from_toml_str(
            r#"
            name = "sword"

            [emission]
            duration = 0.5

            [render]
            alignment = "velocity"
            sorting = "newest_on_top"
            smoothness = 4
            profile = { segments = 1, vertices = [[-1.0, 0.0], [1.0, 0.0]] }
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "sword");
        assert_eq!(config.emission.duration, 0.5);
        assert!(config.emission.emit);
        assert_eq!(config.render.alignment, Alignment::Velocity);
        assert_eq!(config.render.sorting, Sorting::NewestOnTop);
        assert_eq!(config.render.smoothness, 4);
        assert_eq!(config.render.profile.as_ref().map(|p| p.segments()), Some(1));
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_json_presets_are_accepted() {
        let config =
            TrailConfig::from_json_str(r#"{"physics":{"enabled":true,"gravity":[0,-1,0]}}"#)
                .unwrap();
        assert!(config.physics.enabled);
        assert_eq!(config.physics.gravity, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("ribbons-config-test.yaml");
        std::fs::write(&path, "name: nope").unwrap();
        let err = TrailConfig::load(&path).unwrap_err();
        assert!(matches!(err, TrailError::UnsupportedFormat(_)));
        let _ = std::fs::remove_file(path);
    }
}
