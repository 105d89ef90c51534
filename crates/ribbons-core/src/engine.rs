use glam::{Affine3A, Vec3};
use tracing::{debug, trace};

use crate::anchor::{AnchorState, VelocityEstimator};
use crate::config::{SimulationSpace, TrailConfig};
use crate::curve::SamplerSet;
use crate::emitter::Emitter;
use crate::lifecycle::{age_and_prune, pin_head};
use crate::mesh::TrailMesh;
use crate::physics::{self, FixedStepper};
use crate::point::TrailPoint;
use crate::tessellate::{build_mesh, TessellationParams};
use crate::viewer::ViewerState;

/// One trail: its point sequence plus the simulation state that drives it.
///
/// The host calls [`update`](Self::update) once per frame and
/// [`render_for_viewer`](Self::render_for_viewer) once per viewer. Rendering
/// only reads the points, so viewers can be processed in any order.
#[derive(Debug)]
pub struct TrailEngine {
    config: TrailConfig,
    samplers: SamplerSet,
    points: Vec<TrailPoint>,
    /// Latest anchor, in simulation space.
    anchor: AnchorState,
    velocity: VelocityEstimator,
    emitter: Emitter,
    stepper: FixedStepper,
    parent: Affine3A,
}

impl TrailEngine {
    /// Creates the trail at `anchor` and runs the configured warm-up.
    pub fn new(config: TrailConfig, anchor: AnchorState) -> Self {
        let config = config.sanitized();
        let samplers = SamplerSet::from(&config.curves);
        let mut engine = Self {
            config,
            samplers,
            points: Vec::new(),
            anchor,
            velocity: VelocityEstimator::new(anchor.position),
            emitter: Emitter::new(),
            stepper: FixedStepper::new(),
            parent: Affine3A::IDENTITY,
        };
        engine.warm_up(|_| {});
        engine
    }

    /// Replaces the curve samplers built from the preset.
    pub fn with_samplers(mut self, samplers: SamplerSet) -> Self {
        self.samplers = samplers;
        self
    }

    pub fn set_samplers(&mut self, samplers: SamplerSet) {
        self.samplers = samplers;
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Swaps the preset; samplers are rebuilt from its curves.
    pub fn set_config(&mut self, config: TrailConfig) {
        self.config = config.sanitized();
        self.samplers = SamplerSet::from(&self.config.curves);
    }

    pub fn set_emit(&mut self, emit: bool) {
        self.config.emission.emit = emit;
    }

    /// Parent transform for [`SimulationSpace::Local`]; ignored in world space.
    pub fn set_parent_transform(&mut self, parent: Affine3A) {
        self.parent = parent;
    }

    /// Oldest first, head last.
    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn anchor_velocity(&self) -> Vec3 {
        self.velocity.velocity()
    }

    /// Drops every point and restarts the emission and physics timers.
    pub fn clear(&mut self) {
        debug!(dropped = self.points.len(), "trail cleared");
        self.points.clear();
        self.emitter.reset();
        self.stepper.reset();
        self.velocity.reset(self.anchor.position);
    }

    fn to_simulation_space(&self, anchor: &AnchorState) -> AnchorState {
        match self.config.render.space {
            SimulationSpace::World => *anchor,
            SimulationSpace::Local => anchor.transformed(&self.parent.inverse()),
        }
    }

    /// Simulates `physics.warm_up` seconds at the fixed step against the
    /// current anchor, before anything is rendered.
    pub fn warm_up<F>(&mut self, mut on_points_updated: F)
    where
        F: FnMut(&mut [TrailPoint]),
    {
        let step = self.config.physics.fixed_step;
        let steps = physics::whole_steps(self.config.physics.warm_up, step);
        for _ in 0..steps {
            if self.config.physics.enabled {
                physics::integrate(&mut self.points, step, &self.config.physics);
            }
            self.emitter.step(
                &mut self.points,
                step,
                &self.anchor,
                self.velocity.velocity(),
                &self.config.emission,
            );
            self.finish_tick(step, &mut on_points_updated);
        }
        if steps > 0 {
            debug!(steps, points = self.points.len(), "warm-up finished");
        }
    }

    /// Advances the trail by one frame of `dt` seconds.
    ///
    /// `on_points_updated` sees the points after aging and pruning.
    /// Negative `dt` is treated as zero.
    pub fn update<F>(&mut self, dt: f32, anchor: &AnchorState, mut on_points_updated: F)
    where
        F: FnMut(&mut [TrailPoint]),
    {
        let dt = dt.max(0.0);
        self.anchor = self.to_simulation_space(anchor);
        let velocity = self.velocity.update(
            self.anchor.position,
            dt,
            self.config.emission.velocity_smoothing,
        );
        self.emitter.step(
            &mut self.points,
            dt,
            &self.anchor,
            velocity,
            &self.config.emission,
        );

        let physics = &self.config.physics;
        let steps = self.stepper.advance(dt, physics.fixed_step);
        if physics.enabled {
            for _ in 0..steps {
                physics::integrate(&mut self.points, physics.fixed_step, physics);
            }
        }

        self.finish_tick(dt, &mut on_points_updated);
    }

    fn finish_tick<F>(&mut self, dt: f32, on_points_updated: &mut F)
    where
        F: FnMut(&mut [TrailPoint]),
    {
        pin_head(&mut self.points, &self.anchor, self.config.emission.emit);
        let pruned = age_and_prune(&mut self.points, dt, self.config.render.smoothness);
        if pruned > 0 {
            trace!(pruned, alive = self.points.len(), "points pruned");
        }
        on_points_updated(&mut self.points);
    }

    /// Tessellates the trail for one viewer.
    ///
    /// Returns `None` when the viewer's culling mask excludes the trail layer.
    pub fn render_for_viewer(&self, viewer: &ViewerState) -> Option<TrailMesh> {
        let mut mesh = TrailMesh::new();
        self.render_into(viewer, &mut mesh).then_some(mesh)
    }

    /// Like [`render_for_viewer`](Self::render_for_viewer) but reuses `mesh`.
    /// Returns whether the viewer sees the trail; `mesh` is cleared either way.
    pub fn render_into(&self, viewer: &ViewerState, mesh: &mut TrailMesh) -> bool {
        if !viewer.sees(self.config.render.layer) {
            trace!(mask = viewer.culling_mask, "trail culled for viewer");
            mesh.clear();
            return false;
        }
        let viewer_position = match self.config.render.space {
            SimulationSpace::World => viewer.position,
            SimulationSpace::Local => viewer.transformed(&self.parent.inverse()).position,
        };
        let params = TessellationParams {
            render: &self.config.render,
            duration: self.config.emission.duration,
            samplers: &self.samplers,
            anchor: &self.anchor,
            viewer_position,
        };
        build_mesh(&self.points, &params, mesh);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn moving_config() -> TrailConfig {
        let mut config = TrailConfig::default();
        config.emission.time_interval = 0.0;
        config.emission.min_distance = 0.0;
        config
    }

    #[test]
    fn test_head_tracks_anchor() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        for i in 1..=10 {
            let anchor = AnchorState::at(Vec3::new(i as f32 * 0.1, 0.0, 0.0));
            engine.update(0.016, &anchor, |_| {});
            let head = engine.points().last().unwrap();
            assert_eq!(head.position, anchor.position);
        }
        assert_eq!(engine.points().len(), 10);
    }

    #[test]
    fn test_callback_sees_points_after_lifecycle() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        let mut seen = Vec::new();
        engine.update(0.1, &AnchorState::default(), |points| {
            seen.push(points.len());
            for p in points.iter_mut() {
                p.color.w = 0.5;
            }
        });
        assert_eq!(seen, vec![1]);
        assert_relative_eq!(engine.points()[0].life, 1.9);
        assert_relative_eq!(engine.points()[0].color.w, 0.5);
    }

    #[test]
    fn test_disabling_emission_breaks_the_head() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        engine.update(0.1, &AnchorState::at(Vec3::X), |_| {});
        engine.update(0.1, &AnchorState::at(Vec3::X * 2.0), |_| {});
        engine.set_emit(false);
        engine.update(0.1, &AnchorState::at(Vec3::X * 3.0), |_| {});
        let head = engine.points().last().unwrap();
        assert!(head.discontinuous);
        assert_eq!(head.position, Vec3::X * 2.0);
    }

    #[test]
    fn test_culled_viewer_gets_no_mesh() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        for i in 1..5 {
            engine.update(0.1, &AnchorState::at(Vec3::X * i as f32), |_| {});
        }
        let hidden = ViewerState::new(Vec3::Z * 5.0, 0b10);
        assert!(engine.render_for_viewer(&hidden).is_none());

        let visible = ViewerState::at(Vec3::Z * 5.0);
        let mesh = engine.render_for_viewer(&visible).unwrap();
        assert_eq!(mesh.vertex_count(), 2 * engine.points().len());
    }

    #[test]
    fn test_rendering_does_not_touch_points() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        for i in 1..6 {
            let angle = i as f32 * 0.4;
            let anchor = AnchorState::at(Vec3::new(angle.cos(), angle.sin(), 0.0));
            engine.update(0.05, &anchor, |_| {});
        }
        let before = engine.points().to_vec();
        let a = engine.render_for_viewer(&ViewerState::at(Vec3::Z * 4.0));
        let b = engine.render_for_viewer(&ViewerState::at(Vec3::Y * 4.0));
        let again = engine.render_for_viewer(&ViewerState::at(Vec3::Z * 4.0));
        assert_eq!(engine.points(), before.as_slice());
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn test_local_space_follows_parent() {
        let mut config = moving_config();
        config.render.space = SimulationSpace::Local;
        let mut engine = TrailEngine::new(config, AnchorState::default());
        engine.set_parent_transform(Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        engine.update(0.1, &AnchorState::at(Vec3::new(11.0, 0.0, 0.0)), |_| {});
        assert_relative_eq!(engine.points()[0].position.x, 1.0);
    }

    #[test]
    fn test_clear_empties_trail() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        engine.update(0.1, &AnchorState::at(Vec3::X), |_| {});
        engine.clear();
        assert!(engine.points().is_empty());
        assert!(engine
            .render_for_viewer(&ViewerState::at(Vec3::Z))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_negative_dt_never_restores_life() {
        let mut engine = TrailEngine::new(moving_config(), AnchorState::default());
        engine.update(0.1, &AnchorState::default(), |_| {});
        engine.set_emit(false);
        engine.update(-0.5, &AnchorState::default(), |_| {});
        assert_eq!(engine.points().len(), 1);
        assert_relative_eq!(engine.points()[0].life, 1.9);
    }

    #[test]
    fn test_huge_frame_time_finishes() {
        let mut config = moving_config();
        config.physics.enabled = true;
        config.physics.fixed_step = 0.00001;
        let mut engine = TrailEngine::new(config, AnchorState::default());
        engine.update(0.1, &AnchorState::at(Vec3::X), |_| {});
        engine.update(1.0e6, &AnchorState::at(Vec3::X * 2.0), |_| {});
        assert!(engine.points().is_empty());
        engine.update(0.1, &AnchorState::at(Vec3::X * 3.0), |_| {});
        assert_eq!(engine.points().len(), 1);
    }

    #[test]
    fn test_warm_up_runs_whole_fixed_steps() {
        let mut config = moving_config();
        config.emission.duration = 10.0;
        config.physics.warm_up = 1.0;
        config.physics.fixed_step = 0.25;
        let mut engine = TrailEngine::new(config, AnchorState::default());
        let mut ticks = 0;
        engine.warm_up(|_| ticks += 1);
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_physics_runs_at_fixed_rate() {
        let mut config = moving_config();
        config.emission.emit = false;
        config.physics.enabled = true;
        config.physics.damping = 0.0;
        config.physics.gravity = Vec3::new(0.0, -1.0, 0.0);
        config.physics.fixed_step = 0.02;
        let mut engine = TrailEngine::new(config, AnchorState::default());
        engine.set_emit(true);
        engine.update(0.0, &AnchorState::default(), |_| {});
        engine.set_emit(false);
        // shorter than one fixed step: no integration yet
        engine.update(0.01, &AnchorState::default(), |_| {});
        assert_eq!(engine.points()[0].velocity, Vec3::ZERO);
        engine.update(0.04, &AnchorState::default(), |_| {});
        assert_relative_eq!(engine.points()[0].velocity.y, -0.04, epsilon = 1e-5);
    }
}
