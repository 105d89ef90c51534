//! Command-line interface for the ribbons demo driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ribbons")]
#[command(about = "Simulate and tessellate motion trails offline", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a trail behind a scripted anchor and report mesh statistics
    Simulate {
        /// Trail preset (.toml or .json); built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to simulate
        #[arg(short, long, default_value_t = 600)]
        frames: u64,

        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Number of cameras orbiting the trail
        #[arg(long, default_value_t = 2)]
        viewers: usize,

        /// Path the anchor follows
        #[arg(long, value_enum, default_value_t = PathKind::Lissajous)]
        path: PathKind,

        /// Write the final frame's meshes and per-frame stats as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default preset
    Preset {
        /// Output format
        #[arg(long, value_enum, default_value_t = PresetFormat::Toml)]
        format: PresetFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PathKind {
    /// Figure-eight curve in the XY plane
    Lissajous,
    /// Rising helix around the Y axis
    Helix,
    /// Straight line along the X axis
    Line,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PresetFormat {
    Toml,
    Json,
}
