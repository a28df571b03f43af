use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use stubclimate::{
    config::{CliOverrides, GeneratorConfig},
    process,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate yearly stub climate CSVs (2025-2045) from one ERA5 base file"
)]
struct Args {
    /// YAML config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base CSV; defaults to the resolution tier's ERA5 filename
    #[arg(long)]
    input: Option<PathBuf>,

    /// Defaults to the input file's directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Use the high-resolution file names instead of the 0.5 degree ones
    #[arg(long)]
    high_res: bool,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON manifest of the run
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) build config ─────────────────────────────────────────────
    let args = Args::parse();
    let config = GeneratorConfig::with_overrides(
        args.config.as_deref(),
        CliOverrides {
            input: args.input,
            output_dir: args.output_dir,
            high_res: args.high_res,
            seed: args.seed,
        },
    )?;
    info!(resolution = config.resolution.as_str(), "configured");

    // ─── 3) generate ─────────────────────────────────────────────────
    let Some(summary) = process::run(&config)? else {
        return Ok(());
    };

    if let Some(path) = &args.summary_json {
        summary.write_json(path)?;
        info!("wrote run summary to {}", path.display());
    }
    Ok(())
}
