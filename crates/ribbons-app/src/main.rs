mod cli;
mod script;
mod sink;

use clap::Parser;
use ribbons_core::{TrailConfig, TrailEngine};
use ribbons_platform::{drive, AnchorSource, FixedClock, Result};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Cli, Commands, PresetFormat};
use crate::script::{OrbitViewers, ScriptedAnchor};
use crate::sink::JsonExport;

fn main() {
    let cli = Cli::parse();

    // Init logging; RUST_LOG wins over the verbosity flags
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    if let Err(e) = run(cli.command) {
        error!("ribbons error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Simulate {
            config,
            frames,
            dt,
            viewers,
            path,
            output,
        } => {
            let config = match config {
                Some(file) => {
                    info!(file = %file.display(), "loading preset");
                    TrailConfig::load(file)?
                }
                None => TrailConfig::default(),
            };
            info!(preset = %config.name, frames, dt, ?path, "simulation starting");

            let mut anchors = ScriptedAnchor::new(path);
            let mut cameras = OrbitViewers::new(viewers);
            let mut sink = JsonExport::new(output, config.name.clone());
            let start = anchors.anchor(0.0)?;
            let mut engine = TrailEngine::new(config, start);
            let stats = drive(
                &mut engine,
                &mut anchors,
                &mut cameras,
                &mut sink,
                &mut FixedClock::new(dt, frames),
            )?;

            let peak_points = stats.iter().map(|s| s.points).max().unwrap_or(0);
            let total_triangles: usize = stats.iter().map(|s| s.triangles).sum();
            let culled: usize = stats.iter().map(|s| s.culled).sum();
            info!(
                peak_points,
                average_triangles = total_triangles / stats.len().max(1),
                culled,
                "simulation finished"
            );
            Ok(())
        }
        Commands::Preset { format } => {
            let config = TrailConfig::default();
            let text = match format {
                PresetFormat::Toml => toml::to_string_pretty(&config)?,
                PresetFormat::Json => serde_json::to_string_pretty(&config)?,
            };
            println!("{text}");
            Ok(())
        }
    }
}
