use anyhow::{Context, Result};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    config::{GeneratorConfig, NamingStrategy},
    model::{symmetric_uniform, temperature_increase},
    summary::YearSummary,
    table::{apply_year_stamp, ClimateTable},
};

/// One year's table before it is written out.
#[derive(Debug)]
pub struct AdjustedYear {
    pub year: i32,
    pub gradient_strength: f64,
    /// Per-row model delta plus noise, in row order.
    pub adjustments: Vec<f64>,
    pub table: ClimateTable,
}

/// Applies the warming curve to a source table, one target year at a time.
///
/// The source is never mutated: each year works on its own clone.
pub struct YearProcessor<'a> {
    source: &'a ClimateTable,
    config: &'a GeneratorConfig,
    naming: NamingStrategy,
    output_dir: PathBuf,
    temperature_idx: usize,
    stamp_columns: Vec<usize>,
    latitudes: Vec<f64>,
    temperatures: Vec<f64>,
}

impl<'a> YearProcessor<'a> {
    /// Resolve the columns the model needs. Missing or non-numeric columns are errors.
    pub fn new(
        source: &'a ClimateTable,
        config: &'a GeneratorConfig,
        output_dir: &Path,
    ) -> Result<Self> {
        let latitude_idx = source.column_index(&config.latitude_column)?;
        let temperature_idx = source.column_index(&config.temperature_column)?;
        let stamp_columns = config
            .stamp_columns
            .iter()
            .map(|name| source.column_index(name))
            .collect::<Result<Vec<_>>>()?;

        let latitudes = source
            .numeric_column(latitude_idx)
            .context("reading latitudes")?;
        let temperatures = source
            .numeric_column(temperature_idx)
            .context("reading temperatures")?;

        Ok(Self {
            source,
            config,
            naming: config.naming(),
            output_dir: output_dir.to_path_buf(),
            temperature_idx,
            stamp_columns,
            latitudes,
            temperatures,
        })
    }

    pub fn output_path(&self, year: i32) -> PathBuf {
        self.output_dir.join(self.naming.output_filename(year))
    }

    /// Build the adjusted table for `year` without touching disk.
    ///
    /// Draw order is fixed: one gradient jitter, then one noise sample per row.
    pub fn adjust_year<R: Rng + ?Sized>(&self, year: i32, rng: &mut R) -> Result<AdjustedYear> {
        let years_since_start = year - self.config.start_year;
        let gradient_strength = self.config.gradient.sample(years_since_start, rng);

        let adjustments: Vec<f64> = self
            .latitudes
            .iter()
            .map(|&latitude| {
                let delta =
                    temperature_increase(latitude, self.config.max_increase, gradient_strength);
                delta + symmetric_uniform(rng, self.config.noise_amplitude)
            })
            .collect();

        let adjusted: Vec<f64> = self
            .temperatures
            .iter()
            .zip(&adjustments)
            .map(|(t, a)| t + a)
            .collect();

        let mut table = self.source.clone();
        table.set_numeric_column(self.temperature_idx, &adjusted)?;
        apply_year_stamp(
            &mut table,
            &self.stamp_columns,
            &self.config.source_year,
            year,
        );

        debug!(year, gradient_strength, rows = adjustments.len(), "adjusted year");
        Ok(AdjustedYear {
            year,
            gradient_strength,
            adjustments,
            table,
        })
    }

    /// Adjust, write and report one year.
    pub fn process_year<R: Rng + ?Sized>(&self, year: i32, rng: &mut R) -> Result<YearSummary> {
        println!("Processing year {}...", year);

        let adjusted = self.adjust_year(year, rng)?;
        let path = self.output_path(year);
        adjusted
            .table
            .write_csv(&path)
            .with_context(|| format!("writing year {}", year))?;

        let summary = YearSummary::from_adjustments(
            year,
            adjusted.gradient_strength,
            &adjusted.adjustments,
            path,
        );
        println!("{}", summary.report_line());
        Ok(summary)
    }
}
