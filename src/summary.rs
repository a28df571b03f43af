use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Statistics for one generated year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub gradient_strength: f64,
    /// Mean of the per-row adjustments (model delta plus noise), °C.
    pub mean_adjustment: f64,
    pub max_adjustment: f64,
    pub rows: usize,
    pub path: PathBuf,
}

impl YearSummary {
    /// Build from the raw adjustment vector. NaN anywhere makes both stats NaN.
    pub fn from_adjustments(
        year: i32,
        gradient_strength: f64,
        adjustments: &[f64],
        path: PathBuf,
    ) -> Self {
        let mean_adjustment = if adjustments.is_empty() {
            f64::NAN
        } else {
            adjustments.iter().sum::<f64>() / adjustments.len() as f64
        };
        let max_adjustment = adjustments
            .iter()
            .copied()
            .reduce(|a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) })
            .unwrap_or(f64::NAN);

        Self {
            year,
            gradient_strength,
            mean_adjustment,
            max_adjustment,
            rows: adjustments.len(),
            path,
        }
    }

    /// The console line printed after each year is written.
    pub fn report_line(&self) -> String {
        format!(
            "  Year {}: Gradient strength = {:.3}, Avg increase = {:.2}°C, Max increase = {:.2}°C",
            self.year, self.gradient_strength, self.mean_adjustment, self.max_adjustment
        )
    }
}

/// Manifest of a whole generation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Seed the run was drawn from; rerunning with it reproduces every file.
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    pub years: Vec<YearSummary>,
}

impl RunSummary {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating summary file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).context("serializing run summary")?;
        writer.flush()?;
        Ok(())
    }
}
