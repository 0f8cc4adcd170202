use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use drawdims_core::extent::compute_extent_3d;
use drawdims_core::report::DimensionsReport;
use drawdims_import_dxf::ImportConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "drawdims")]
#[command(about = "Measure the bounding-box dimensions of DXF drawings, STEP models and STL meshes.")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Dims {
        input: PathBuf,
        /// Print the full report as JSON instead of the one-line summary.
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        expand_inserts: bool,
        #[arg(long, default_value_t = 8)]
        max_insert_depth: usize,
        /// Stop expanding block references after this many placements.
        #[arg(long, default_value_t = 100_000)]
        max_insert_cells: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.cmd {
        Command::Dims {
            input,
            json,
            report,
            expand_inserts,
            max_insert_depth,
            max_insert_cells,
        } => {
            let cfg = ImportConfig {
                expand_inserts,
                max_insert_depth,
                max_insert_cells,
            };
            dims(&input, json, report.as_deref(), &cfg)
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // Logs go to stderr so stdout stays machine-readable.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dims(input: &Path, json: bool, report: Option<&Path>, cfg: &ImportConfig) -> Result<()> {
    ensure_input_file(input)?;

    let ext = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let report_data = match ext.as_str() {
        "dxf" => {
            let drawing = drawdims_import_dxf::import_dxf(input, cfg)?;
            DimensionsReport::for_drawing("dxf", &drawing)
        }
        "stl" => {
            let vertices = drawdims_import_stl::load_stl_vertices(input)
                .with_context(|| format!("read STL: {input:?}"))?;
            let count = vertices.len();
            DimensionsReport::for_mesh("stl", count, compute_extent_3d(vertices))
        }
        "step" | "stp" => {
            let vertices = drawdims_import_step::load_step_vertices(input)
                .with_context(|| format!("read STEP: {input:?}"))?;
            let count = vertices.len();
            DimensionsReport::for_mesh("step", count, compute_extent_3d(vertices))
        }
        "iges" | "igs" => bail!(
            "IGES models must be exported to STEP or STL by a CAD kernel first; pass that file instead."
        ),
        _ => bail!("Unsupported input extension: .{ext}"),
    };
    info!(input = %input.display(), skipped = report_data.skipped, "measured input");

    let json_text = serde_json::to_string_pretty(&report_data).context("serialize report")?;
    if let Some(path) = report {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(path, &json_text).with_context(|| format!("write report: {path:?}"))?;
    }

    if json {
        println!("{json_text}");
    } else {
        println!("{}", report_data.text);
    }
    Ok(())
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
