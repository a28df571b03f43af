// src/process/mod.rs
use anyhow::{Context, Result};
use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::{
    config::GeneratorConfig,
    summary::{RunSummary, YearSummary},
    table::ClimateTable,
};

pub mod year;

pub use year::{AdjustedYear, YearProcessor};

/// The input file's directory, or `.` when it has none.
pub fn resolve_output_dir(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = output_dir {
        return dir.to_path_buf();
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read `input` and write one adjusted file per configured year.
///
/// Years are processed in order on a single thread, all drawing from `rng`.
#[tracing::instrument(level = "info", skip(input, config, rng), fields(input = %input.display()))]
pub fn process_climate_data<R: Rng + ?Sized>(
    input: &Path,
    output_dir: Option<&Path>,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Vec<YearSummary>> {
    println!("Reading data from {}...", input.display());
    let source = ClimateTable::read_csv(input)?;

    let output_dir = resolve_output_dir(input, output_dir);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let processor = YearProcessor::new(&source, config, &output_dir)
        .with_context(|| format!("preparing {}", input.display()))?;

    let mut years = Vec::new();
    for year in config.years() {
        years.push(processor.process_year(year, rng)?);
    }

    println!(
        "\nProcessing complete! Generated {} files for years {}-{}.",
        years.len(),
        config.start_year,
        config.end_year
    );
    Ok(years)
}

/// Entry point shared by the binary: existence check, seeding, generation.
///
/// A missing input file is reported on the console and yields `Ok(None)`.
pub fn run(config: &GeneratorConfig) -> Result<Option<RunSummary>> {
    config.validate()?;

    let input = config.input_path();
    if !input.exists() {
        println!("Error: Input file '{}' not found.", input.display());
        println!("Please make sure the file exists and pass its path with --input.");
        return Ok(None);
    }

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "seeding generator");
    let mut rng = StdRng::seed_from_u64(seed);

    let years = process_climate_data(&input, config.output_dir.as_deref(), config, &mut rng)?;

    Ok(Some(RunSummary {
        output_dir: resolve_output_dir(&input, config.output_dir.as_deref()),
        input,
        seed,
        generated_at: Utc::now(),
        years,
    }))
}
