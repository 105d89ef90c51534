//! Ribbons core engine: platform-agnostic trail simulation and ribbon tessellation.
//!
//! A [`TrailEngine`] owns one trail. Each frame the host feeds it the anchor
//! pose, then asks for a [`TrailMesh`] per viewer.

pub mod anchor;
pub mod config;
pub mod curve;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod mesh;
pub mod physics;
pub mod point;
pub mod profile;
pub mod segment;
pub mod smoothing;
pub mod tessellate;
pub mod viewer;

pub use anchor::{AnchorState, VelocityEstimator};
pub use config::{
    Alignment, EmissionConfig, PhysicsConfig, RenderConfig, SimulationSpace, Sorting,
    TextureMode, TrailConfig,
};
pub use curve::{Curve, CurveSet, Gradient, Keyframes, Sampler, SamplerSet};
pub use engine::TrailEngine;
pub use error::{Result, TrailError};
pub use mesh::{TrailMesh, TrailVertex};
pub use point::TrailPoint;
pub use profile::CrossSectionProfile;
pub use viewer::ViewerState;
