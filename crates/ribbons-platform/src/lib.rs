//! Host integration traits so `ribbons-core` stays independent of any engine or window system.

use glam::Affine3A;
use ribbons_core::{AnchorState, TrailEngine, TrailMesh, ViewerState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Pose of the object the trail follows.
pub trait AnchorSource: Send {
    fn anchor(&mut self, time: f32) -> Result<AnchorState>;

    /// Transform of the trail's parent, used by local-space trails.
    fn parent_transform(&self, _time: f32) -> Affine3A {
        Affine3A::IDENTITY
    }
}

/// Cameras the trail is drawn for this frame.
pub trait ViewerSource: Send {
    fn viewers(&mut self, time: f32) -> Result<Vec<ViewerState>>;
}

/// Consumer of the per-viewer meshes (GPU upload, file export, ...).
pub trait MeshSink: Send {
    fn submit(&mut self, frame: u64, viewer: usize, mesh: &TrailMesh) -> Result<()>;
    fn finish(&mut self, _stats: &[FrameStats]) -> Result<()> {
        Ok(())
    }
}

/// Frame time source; `None` ends the run.
pub trait FrameClock {
    fn tick(&mut self) -> Option<f32>;
}

/// Fixed `dt` for a set number of frames, for offline runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    dt: f32,
    remaining: u64,
}

impl FixedClock {
    pub fn new(dt: f32, frames: u64) -> Self {
        Self {
            dt,
            remaining: frames,
        }
    }
}

impl FrameClock for FixedClock {
    fn tick(&mut self) -> Option<f32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.dt)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub frame: u64,
    pub time: f32,
    pub points: usize,
    pub viewers: usize,
    pub culled: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Runs the update then render loop until the clock stops.
pub fn drive(
    engine: &mut TrailEngine,
    anchors: &mut dyn AnchorSource,
    viewers: &mut dyn ViewerSource,
    sink: &mut dyn MeshSink,
    clock: &mut dyn FrameClock,
) -> Result<Vec<FrameStats>> {
    let mut stats = Vec::new();
    let mut mesh = TrailMesh::new();
    let mut time = 0.0;
    let mut frame = 0u64;

    while let Some(dt) = clock.tick() {
        time += dt;
        engine.set_parent_transform(anchors.parent_transform(time));
        let anchor = anchors.anchor(time)?;
        engine.update(dt, &anchor, |_| {});

        let mut frame_stats = FrameStats {
            frame,
            time,
            points: engine.points().len(),
            ..FrameStats::default()
        };
        for (index, viewer) in viewers.viewers(time)?.iter().enumerate() {
            frame_stats.viewers += 1;
            if !engine.render_into(viewer, &mut mesh) {
                frame_stats.culled += 1;
                continue;
            }
            frame_stats.vertices += mesh.vertex_count();
            frame_stats.triangles += mesh.triangle_count();
            sink.submit(frame, index, &mesh)?;
        }
        debug!(
            frame,
            points = frame_stats.points,
            triangles = frame_stats.triangles,
            "frame done"
        );
        stats.push(frame_stats);
        frame += 1;
    }

    info!(frames = frame, "run finished");
    sink.finish(&stats)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use ribbons_core::TrailConfig;

    struct Line;
    impl AnchorSource for Line {
        fn anchor(&mut self, time: f32) -> Result<AnchorState> {
            Ok(AnchorState::at(Vec3::new(time, 0.0, 0.0)))
        }
    }

    struct TwoViewers;
    impl ViewerSource for TwoViewers {
        fn viewers(&mut self, _time: f32) -> Result<Vec<ViewerState>> {
            Ok(vec![
                ViewerState::at(Vec3::Z * 5.0),
                ViewerState::new(Vec3::Y * 5.0, 0),
            ])
        }
    }

    #[derive(Default)]
    struct Counting {
        submitted: Vec<(u64, usize)>,
        finished: bool,
    }
    impl MeshSink for Counting {
        fn submit(&mut self, frame: u64, viewer: usize, _mesh: &TrailMesh) -> Result<()> {
            self.submitted.push((frame, viewer));
            Ok(())
        }
        fn finish(&mut self, _stats: &[FrameStats]) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_fixed_clock_counts_down() {
        let mut clock = FixedClock::new(0.5, 2);
        assert_eq!(clock.tick(), Some(0.5));
        assert_eq!(clock.tick(), Some(0.5));
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn test_drive_skips_culled_viewers() {
        let mut config = TrailConfig::default();
        config.emission.time_interval = 0.0;
        config.emission.min_distance = 0.0;
        let mut engine = TrailEngine::new(config, AnchorState::default());
        let mut sink = Counting::default();
        let stats = drive(
            &mut engine,
            &mut Line,
            &mut TwoViewers,
            &mut sink,
            &mut FixedClock::new(0.1, 4),
        )
        .unwrap();

        assert_eq!(stats.len(), 4);
        assert!(stats.iter().all(|s| s.viewers == 2 && s.culled == 1));
        assert_eq!(stats[3].points, 4);
        assert_eq!(stats[3].vertices, 8);
        assert_eq!(sink.submitted, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert!(sink.finished);
    }
}
