use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the configuration and asset boundary.
///
/// Simulation and tessellation never fail; degenerate input is absorbed by
/// numeric guards instead.
#[derive(Error, Debug)]
pub enum TrailError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid TOML preset: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON preset: {0}")]
    Json(#[from] serde_json::Error),

    /// Preset path whose extension is neither `.toml` nor `.json`.
    #[error("unsupported preset format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("invalid cross-section profile: {0}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, TrailError>;
