// src/bin/verify_outputs.rs

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use stubclimate::{
    config::{CliOverrides, GeneratorConfig},
    process::resolve_output_dir,
    table::ClimateTable,
    verify::{check_outputs, find_stray_outputs},
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Check generated yearly stub files against their base table"
)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    high_res: bool,
}

fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = GeneratorConfig::with_overrides(
        args.config.as_deref(),
        CliOverrides {
            input: args.input,
            output_dir: args.output_dir,
            high_res: args.high_res,
            seed: None,
        },
    )?;

    // 1) Load the base table
    let input = config.input_path();
    let source = ClimateTable::read_csv(&input)?;
    let output_dir = resolve_output_dir(&input, config.output_dir.as_deref());
    let naming = config.naming();
    info!(
        "checking {} years in {} against {} ({} rows)",
        config.years().count(),
        output_dir.display(),
        input.display(),
        source.rows.len()
    );

    // 2) In parallel: read back each expected year file
    let checks = check_outputs(&source, &naming, config.years(), &output_dir)?;

    // 3) Anything matching the template outside the year range
    let stray = find_stray_outputs(&output_dir, &naming, config.years())?;
    for path in &stray {
        warn!("unexpected output file {}", path.display());
    }

    // 4) Print summary table
    let expected = source.rows.len();
    println!(
        "\n{: <35} {:>10} {:>10} {:>8}",
        "File", "Rows", "Delta", "Headers"
    );
    println!("{:-<66}", "");
    let mut failures = 0;
    for check in &checks {
        let name = check
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let (rows, delta) = match check.rows {
            Some(n) => (n.to_string(), (n as isize - expected as isize).to_string()),
            None => ("missing".to_string(), "-".to_string()),
        };
        let headers = if check.headers_match { "ok" } else { "DIFF" };
        println!("{: <35} {:>10} {:>10} {:>8}", name, rows, delta, headers);
        if !check.is_ok(expected) {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} year files failed verification", failures, checks.len());
    }
    println!("\nAll {} year files match the base table.", checks.len());
    Ok(())
}
