//! sheath-gen - off-hand scabbard generator
//!
//! Reads weapon records and meshes (loose or archived) and writes meshes with
//! a hidden mirrored `ScbLeft` scabbard.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheath_gen::{MeshTransform, ModelClassification, Pipeline, Settings, inspect};
use sheath_scene::SceneGraph;
use sheath_shared::fs::{MAX_SCENE_BYTES, read_file_with_limit, write_file_creating_dirs};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "sheath-gen")]
#[command(about = "Off-hand scabbard generator for weapon meshes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate scabbards for every weapon in the records
    Run {
        /// Path to settings.toml
        #[arg(default_value = "settings.toml")]
        settings: PathBuf,

        /// Input folder (overrides settings)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output folder (overrides settings)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also process two-handed melee weapons
        #[arg(long)]
        two_handed: bool,
    },

    /// Validate settings without processing
    Check {
        /// Path to settings.toml
        #[arg(default_value = "settings.toml")]
        settings: PathBuf,
    },

    /// Mirror the scabbard of a single scene file
    Mirror {
        /// Input scene file
        input: PathBuf,

        /// Output scene file
        #[arg(short, long)]
        output: PathBuf,

        /// Model classification (refined from the mesh's Prn tag)
        #[arg(short, long, default_value = "Unknown")]
        classification: ModelClassification,

        /// Accept two-handed melee meshes
        #[arg(long)]
        two_handed: bool,
    },

    /// Print the block tree of a scene file
    Inspect {
        /// Input scene file
        input: PathBuf,
    },
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn load_scene(path: &Path) -> Result<SceneGraph> {
    let bytes = read_file_with_limit(path, MAX_SCENE_BYTES)?;
    SceneGraph::from_bytes(&bytes)
        .with_context(|| format!("Failed to load scene: {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            settings,
            input,
            output,
            two_handed,
        } => {
            let mut config = Settings::load(&settings)?;
            if let Some(input) = input {
                config.meshes.input_folder = input;
            }
            if let Some(output) = output {
                config.meshes.output_folder = output;
            }
            config.meshes.accept_two_handed |= two_handed;
            config.validate()?;

            init_logging(config.diagnostics.log_file.as_deref())?;
            tracing::info!("Generating scabbards from {:?}", settings);
            Pipeline::new(&config).run()?;
        }

        Commands::Check { settings } => {
            init_logging(None)?;
            tracing::info!("Checking settings {:?}", settings);
            let config = Settings::load(&settings)?;
            config.validate()?;
            tracing::info!("Settings are valid!");
        }

        Commands::Mirror {
            input,
            output,
            classification,
            two_handed,
        } => {
            init_logging(None)?;
            tracing::info!("Mirroring {:?} -> {:?}", input, output);
            let bytes = read_file_with_limit(&input, MAX_SCENE_BYTES)?;
            let mesh_path = input.to_string_lossy();
            match sheath_gen::transform_mesh(&bytes, &mesh_path, classification, two_handed)? {
                MeshTransform::Mirrored(graph) => {
                    write_file_creating_dirs(&output, &graph.to_bytes())?;
                    tracing::info!("Done!");
                }
                MeshTransform::Skipped(reason) => {
                    anyhow::bail!("Skipped {}: {}", input.display(), reason);
                }
            }
        }

        Commands::Inspect { input } => {
            let graph = load_scene(&input)?;
            print!("{}", inspect::describe(&graph));
        }
    }

    Ok(())
}
