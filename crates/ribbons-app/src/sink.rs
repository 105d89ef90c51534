//! Mesh sinks for offline runs.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use ribbons_core::TrailMesh;
use ribbons_platform::{FrameStats, MeshSink, Result};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct Export<'a> {
    preset: &'a str,
    frame: u64,
    meshes: &'a [TrailMesh],
    stats: &'a [FrameStats],
}

/// Keeps the meshes of the latest frame and writes them out when the run ends.
pub struct JsonExport {
    path: Option<PathBuf>,
    preset: String,
    frame: u64,
    meshes: Vec<TrailMesh>,
}

impl JsonExport {
    pub fn new(path: Option<PathBuf>, preset: impl Into<String>) -> Self {
        Self {
            path,
            preset: preset.into(),
            frame: 0,
            meshes: Vec::new(),
        }
    }
}

impl MeshSink for JsonExport {
    fn submit(&mut self, frame: u64, _viewer: usize, mesh: &TrailMesh) -> Result<()> {
        if frame != self.frame {
            self.meshes.clear();
            self.frame = frame;
        }
        self.meshes.push(mesh.clone());
        Ok(())
    }

    fn finish(&mut self, stats: &[FrameStats]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let writer = BufWriter::new(File::create(path)?);
        let export = Export {
            preset: &self.preset,
            frame: self.frame,
            meshes: &self.meshes,
            stats,
        };
        serde_json::to_writer_pretty(writer, &export)?;
        info!(path = %path.display(), meshes = self.meshes.len(), "meshes exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_frame_is_kept() {
        let mut sink = JsonExport::new(None, "test");
        sink.submit(0, 0, &TrailMesh::new()).unwrap();
        sink.submit(0, 1, &TrailMesh::new()).unwrap();
        sink.submit(1, 0, &TrailMesh::new()).unwrap();
        assert_eq!(sink.meshes.len(), 1);
        assert_eq!(sink.frame, 1);
        sink.finish(&[]).unwrap();
    }

    #[test]
    fn test_export_writes_json() {
        let path = std::env::temp_dir().join("ribbons-export-test.json");
        let mut sink = JsonExport::new(Some(path.clone()), "test");
        sink.submit(3, 0, &TrailMesh::new()).unwrap();
        sink.finish(&[FrameStats::default()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["frame"], 3);
        assert_eq!(value["preset"], "test");
        assert_eq!(value["meshes"].as_array().unwrap().len(), 1);
        let _ = std::fs::remove_file(path);
    }
}
