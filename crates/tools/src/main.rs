use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tools::{load_config, parse_bbox, parse_floats, parse_lonlat, run_clamp, run_mesh, run_scene};
use tracing_subscriber::EnvFilter;
use viewer::ViewPreset;

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn map features and mesh files into framed 3D scenes")]
struct Args {
    /// JSON file overriding scene defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a scene from a GeoJSON FeatureCollection
    Scene {
        /// Bounding box: west,south,east,north
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,

        /// GeoJSON input file
        #[arg(long)]
        input: PathBuf,

        /// Write the structure volumes as mesh text
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Load a mesh file and report its framing
    Mesh {
        file: PathBuf,

        /// Rotation in degrees: x,y,z
        #[arg(long, allow_hyphen_values = true)]
        rotate: Option<String>,

        /// Center horizontally and rest on y = 0
        #[arg(long)]
        ground: bool,

        /// default | top | front
        #[arg(long, default_value = "default")]
        preset: String,
    },

    /// Preview the clamped region of a drag from anchor to live point
    Clamp {
        /// lon,lat
        #[arg(long, allow_hyphen_values = true)]
        anchor: String,

        /// lon,lat
        #[arg(long, allow_hyphen_values = true)]
        live: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let json = match args.command {
        Command::Scene { bbox, input, out } => {
            let region = parse_bbox(&bbox)?;
            let geojson =
                fs::read_to_string(&input).map_err(|e| format!("read {input:?}: {e}"))?;
            let summary = run_scene(&region, &geojson, config, out.as_deref())?;
            serde_json::to_string_pretty(&summary)
        }
        Command::Mesh {
            file,
            rotate,
            ground,
            preset,
        } => {
            let text = fs::read_to_string(&file).map_err(|e| format!("read {file:?}: {e}"))?;
            let rotate = rotate
                .as_deref()
                .map(|r| parse_floats::<3>(r, "rotate"))
                .transpose()?;
            let preset: ViewPreset = preset.parse()?;
            let summary = run_mesh(&text, rotate, ground, preset, config)?;
            serde_json::to_string_pretty(&summary)
        }
        Command::Clamp { anchor, live } => {
            let anchor = parse_lonlat(&anchor, "anchor")?;
            let live = parse_lonlat(&live, "live")?;
            let summary = run_clamp(anchor, live, &config)?;
            serde_json::to_string_pretty(&summary)
        }
    }
    .map_err(|e| format!("encode summary: {e}"))?;
    println!("{json}");
    Ok(())
}
