//! `slamply`: convert SLAM CSV output into PLY files

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slamply_core::{Bounded, Rgb};
use slamply_io::{
    convert_session, Delimiter, OutputPlacement, PlyReader, PointCloudExport, SessionOptions,
    TableOptions, TrajectoryExport,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// `EX_DATAERR` from sysexits.h
const EXIT_INPUT_FORMAT: u8 = 65;

#[derive(Parser, Debug)]
#[command(name = "slamply", version, about = "Convert SLAM point clouds and camera trajectories to PLY")]
struct Cli {
    #[command(flatten)]
    table: TableArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Field delimiter of input tables: comma, space, tab or semicolon
    #[arg(long, default_value = "comma", global = true)]
    delimiter: Delimiter,

    /// Leading lines to discard before data rows
    #[arg(long, default_value_t = 1, global = true)]
    header_lines: usize,
}

impl TableArgs {
    fn options(&self) -> TableOptions {
        TableOptions::csv()
            .with_delimiter(self.delimiter)
            .with_header_lines(self.header_lines)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a map point CSV (x, y, z in the first three columns)
    PointCloud {
        input: PathBuf,
        /// Output path, defaults to the input with a .ply extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a camera trajectory CSV (translation in columns 5 to 7)
    Trajectory {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Vertex color as R,G,B
        #[arg(long, default_value_t = Rgb::LIGHT_GREEN)]
        color: Rgb,
    },
    /// Convert every SLAM output of a demo session directory
    Session {
        session_dir: PathBuf,
        /// Write everything into this directory
        #[arg(long, conflicts_with_all = ["alongside", "subdir"])]
        output_dir: Option<PathBuf>,
        /// Write next to each source CSV
        #[arg(long, conflicts_with = "subdir")]
        alongside: bool,
        /// Per-episode output subdirectory
        #[arg(long, default_value = "ply")]
        subdir: String,
        /// Trajectory vertex color as R,G,B
        #[arg(long, default_value_t = Rgb::LIGHT_GREEN)]
        color: Rgb,
    },
    /// Summarise the vertices of a PLY file
    Inspect { path: PathBuf },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn default_output(input: &Path, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| input.with_extension("ply"))
}

fn placement(output_dir: Option<PathBuf>, alongside: bool, subdir: String) -> OutputPlacement {
    match (output_dir, alongside) {
        (Some(dir), _) => OutputPlacement::Directory(dir),
        (None, true) => OutputPlacement::Alongside,
        (None, false) => OutputPlacement::EpisodeSubdir(subdir),
    }
}

fn inspect(path: &Path) -> Result<()> {
    let vertices = PlyReader::read_vertices(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("format:     {:?}", vertices.format);
    println!("vertices:   {}", vertices.declared_count);
    println!("properties: {}", vertices.property_names.join(" "));
    match vertices.positions.bounding_box() {
        Some((min, max)) => {
            println!("min:        {:.6} {:.6} {:.6}", min.x, min.y, min.z);
            println!("max:        {:.6} {:.6} {:.6}", max.x, max.y, max.z);
        }
        None => println!("bounds:     (empty)"),
    }
    let colors = vertices.distinct_colors();
    if !colors.is_empty() {
        let listed: Vec<String> = colors.iter().map(Rgb::to_string).collect();
        println!("colors:     {}", listed.join(" "));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let table = cli.table.options();

    match cli.command {
        Command::PointCloud { input, output } => {
            let output = default_output(&input, output);
            let summary = PointCloudExport::new()
                .with_table(table)
                .export(&input, &output)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            info!("{} vertices -> {}", summary.vertex_count, summary.output.display());
        }
        Command::Trajectory { input, output, color } => {
            let output = default_output(&input, output);
            let summary = TrajectoryExport::new()
                .with_table(table)
                .with_color(color)
                .export(&input, &output)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            info!("{} vertices -> {}", summary.vertex_count, summary.output.display());
        }
        Command::Session {
            session_dir,
            output_dir,
            alongside,
            subdir,
            color,
        } => {
            let options = SessionOptions::new()
                .with_placement(placement(output_dir, alongside, subdir))
                .with_point_cloud(PointCloudExport::new().with_table(table.clone()))
                .with_trajectory(TrajectoryExport::new().with_table(table).with_color(color));
            let report = convert_session(&session_dir, &options)
                .with_context(|| format!("Failed to convert session {}", session_dir.display()))?;
            for summary in &report.converted {
                println!("{} ({} vertices)", summary.output.display(), summary.vertex_count);
            }
        }
        Command::Inspect { path } => inspect(&path)?,
    }

    Ok(())
}

/// Malformed input gets its own status so scripts can tell it apart from
/// I/O trouble
fn exit_status(err: &anyhow::Error) -> u8 {
    let input_format = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<slamply_core::Error>())
        .any(slamply_core::Error::is_input_format);
    if input_format {
        EXIT_INPUT_FORMAT
    } else {
        1
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::from(exit_status(&err))
        }
    }
}
