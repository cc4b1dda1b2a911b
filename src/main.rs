//! levelkit - level authoring tools

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use levelkit::optimize::default_output_path;
use levelkit::{convert_file, generate_walls_file, optimize_dir, optimize_file, Config};

/// Level authoring tools: wall merging, levelData.js conversion, wall generation
#[derive(Parser)]
#[command(name = "levelkit", version, about)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge adjacent walls in a level file, or in every level under a directory
    Merge {
        /// Level JSON file or directory
        input: PathBuf,
        /// Output file (single file only)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a level file to a levelData.js module
    Convert {
        /// Level JSON file
        input: PathBuf,
        /// Output .js file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write colors as 0xrrggbb
        #[arg(long)]
        hex_colors: bool,
        /// Leave out the built-in levels
        #[arg(long)]
        no_builtin: bool,
    },
    /// Add perimeter walls around every ground collider
    Walls {
        /// Level JSON file
        input: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Wall height
        #[arg(long)]
        height: Option<f64>,
        /// Wall thickness
        #[arg(long)]
        thickness: Option<f64>,
    },
    /// Write the default config file
    Config {
        /// Output path
        #[arg(short, long, default_value = levelkit::config::LOCAL_CONFIG)]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();
}

fn load_config(config_path: Option<&Path>) -> Config {
    if let Some(path) = config_path {
        match Config::load_from_file(path) {
            Ok(config) => {
                tracing::info!("Loaded config: {}", path.display());
                return config;
            }
            Err(e) => tracing::warn!("Could not load config {}: {:#}", path.display(), e),
        }
    }
    Config::load()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    let start = Instant::now();

    match cli.command {
        Commands::Merge { input, output } => {
            if input.is_dir() {
                if output.is_some() {
                    anyhow::bail!("--output cannot be used with a directory: {}", input.display());
                }
                let summary = optimize_dir(&input, &config.merge.suffix)?;
                tracing::info!(
                    "Merged {} walls into {} walls across {} files",
                    summary.walls_before,
                    summary.walls_after,
                    summary.files
                );
                if !summary.failed.is_empty() {
                    anyhow::bail!("{} of {} files failed", summary.failed.len(), summary.files);
                }
            } else {
                let output =
                    output.unwrap_or_else(|| default_output_path(&input, &config.merge.suffix));
                optimize_file(&input, &output)?;
                tracing::info!(
                    "Wall merging complete. Replace {} with {} when ready.",
                    input.display(),
                    output.display()
                );
            }
        }

        Commands::Convert {
            input,
            output,
            hex_colors,
            no_builtin,
        } => {
            // Command-line flags win over the config file
            let mut convert = config.convert.clone();
            convert.hex_colors |= hex_colors;
            if no_builtin {
                convert.include_builtin_levels = false;
            }

            let output = output.unwrap_or_else(|| input.with_extension("js"));
            convert_file(&input, &output, &convert)?;
        }

        Commands::Walls {
            input,
            output,
            height,
            thickness,
        } => {
            let mut walls = config.walls.clone();
            if let Some(h) = height {
                walls.height = h;
            }
            if let Some(t) = thickness {
                walls.thickness = t;
            }

            let output = output.unwrap_or_else(|| default_output_path(&input, &walls.suffix));
            generate_walls_file(&input, &output, &walls)?;
        }

        Commands::Config { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("File already exists: {}\nUse --force to overwrite", output.display());
            }

            Config::default().save_to_file(&output)?;
            println!("Wrote default config to {}\n", output.display());
            print!("{}", Config::default_toml());
        }
    }

    tracing::debug!("Finished in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
