use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::globe::SceneSettings;
use crate::interaction::InteractionSettings;

/// Interactive terminal globe with country markers
#[derive(Parser, Debug)]
#[command(name = "tui-globe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive terminal globe with country markers and fly-to", long_about = None)]
pub struct Cli {
    /// NDJSON records, one country per line
    #[arg(short, long, default_value = "data/dots.ndjson")]
    pub data: PathBuf,

    /// Log file (the terminal is taken by the UI)
    #[arg(long, default_value = "tui-globe.log")]
    pub log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Heading change per braille pixel of drag, in radians
    #[arg(long, default_value_t = 0.02)]
    pub sensitivity: f64,

    /// Tilt change per wheel notch, in degrees
    #[arg(long, default_value_t = 10.0)]
    pub tilt_step: f64,

    /// Fly-to duration in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub fly_duration: u64,

    /// Marker pick radius in globe units (globe radius is 5)
    #[arg(long, default_value_t = 0.15)]
    pub hit_radius: f64,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Convert a world-boundaries GeoJSON FeatureCollection to NDJSON records
    Convert {
        /// GeoJSON input
        input: PathBuf,
        /// NDJSON output
        output: PathBuf,
    },
}

/// Settings for one viewer session
#[derive(Clone, Debug)]
pub struct GlobeConfig {
    pub data: PathBuf,
    pub interaction: InteractionSettings,
    pub scene: SceneSettings,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data/dots.ndjson"),
            interaction: InteractionSettings::default(),
            scene: SceneSettings::default(),
        }
    }
}

impl From<&Cli> for GlobeConfig {
    fn from(cli: &Cli) -> Self {
        let interaction = InteractionSettings {
            drag_sensitivity: cli.sensitivity,
            tilt_step: cli.tilt_step.to_radians(),
            fly_duration: Duration::from_millis(cli.fly_duration),
            ..InteractionSettings::default()
        };
        let scene = SceneSettings {
            hit_radius: cli.hit_radius,
            ..SceneSettings::default()
        };
        Self {
            data: cli.data.clone(),
            interaction,
            scene,
        }
    }
}
