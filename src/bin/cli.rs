// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! LDraw geometry CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ldraw_geometry::ldraw::{Color, ColorTable, GeometryData, PipelineCaches};
use ldraw_geometry::{export_ldraw, import_part, ExportOptions, ExportScene, ImportOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ldraw-geometry")]
#[command(about = "LDraw part meshing and line export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a part mesh from parsed geometry (JSON)
    Import {
        /// Geometry JSON file
        input: PathBuf,

        /// Color for faces that inherit (code 16)
        #[arg(short, long, default_value = "16")]
        color: String,

        /// Write the imported part as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Import options (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a scene (JSON) as an LDraw file
    Export {
        /// Scene JSON file
        input: PathBuf,

        /// Output .ldr/.dat file
        #[arg(short, long)]
        output: PathBuf,

        /// Export options (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Color table (JSON list of {code, name})
        #[arg(long)]
        colors: Option<PathBuf>,
    },

    /// Print default options as TOML
    Defaults {
        /// Print export options instead of import options
        #[arg(long)]
        export: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Import {
            input,
            color,
            output,
            config,
        } => import_command(input, color, output.as_deref(), config.as_deref()),
        Commands::Export {
            input,
            output,
            config,
            colors,
        } => export_command(input, output, config.as_deref(), colors.as_deref()),
        Commands::Defaults { export } => {
            let text = if *export {
                toml::to_string_pretty(&ExportOptions::default())?
            } else {
                toml::to_string_pretty(&ImportOptions::default())?
            };
            print!("{}", text);
            Ok(())
        }
        Commands::Version => {
            println!("ldraw-geometry v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

fn import_command(input: &Path, color: &str, output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let options = match config {
        Some(path) => ImportOptions::from_file(path)?,
        None => ImportOptions::default(),
    };
    let geometry: GeometryData = read_json(input)?;

    let mut caches = PipelineCaches::new();
    let start = std::time::Instant::now();
    let part = import_part(&geometry, color, &options, &mut caches)?;
    let elapsed = start.elapsed();

    println!("{} {}", "Imported".green().bold(), part.name.cyan());
    println!("  {} {}", "Vertices:".bright_black(), part.mesh.vertex_count());
    println!("  {} {}", "Polygons:".bright_black(), part.mesh.polygon_count());
    println!("  {} {}", "Materials:".bright_black(), part.mesh.materials.len());
    println!("  {} {}", "Sharp edges:".bright_black(), part.sharp_edges);
    println!("  {} {}", "Conditional lines:".bright_black(), part.conditional_lines);
    if let Some(edge_mesh) = &part.edge_mesh {
        println!(
            "  {} {} ({} unmatched vertices)",
            "Edge lines:".bright_black(),
            edge_mesh.line_count(),
            edge_mesh.independent_vertex_count()
        );
    }
    println!("  {} {:.2?}", "Time:".bright_black(), elapsed);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&part)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path.display()))?;
        println!("  {} {}", "Output:".bright_black(), path.display().to_string().cyan());
    }

    Ok(())
}

fn export_command(input: &Path, output: &Path, config: Option<&Path>, colors: Option<&Path>) -> Result<()> {
    let options = match config {
        Some(path) => ExportOptions::from_file(path)?,
        None => ExportOptions::default(),
    };
    let scene: ExportScene = read_json(input)?;

    let mut table = ColorTable::with_defaults();
    if let Some(path) = colors {
        let loaded: Vec<Color> = read_json(path)?;
        for color in loaded {
            table.insert(color);
        }
    }

    match export_ldraw(output, &scene, &options, &table) {
        Ok(lines) => {
            println!(
                "{} {} ({} lines)",
                "Exported".green().bold(),
                output.display().to_string().cyan(),
                lines
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}
