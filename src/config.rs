use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use crate::model::{validate_finite, validate_half_width, GradientSchedule};

/// Placeholder substituted with the target year in output filename templates.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Which flavour of ERA5 stub data we are generating from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    High,
    /// 0.5 degree grid.
    #[default]
    HalfDegree,
}

impl Resolution {
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::High => "high",
            Resolution::HalfDegree => "half_degree",
        }
    }

    pub fn from_high_res(high_res: bool) -> Self {
        if high_res {
            Resolution::High
        } else {
            Resolution::HalfDegree
        }
    }
}

/// Input filename and output filename template for one resolution tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingStrategy {
    pub input_file: String,
    /// Must contain `{year}`.
    pub output_template: String,
}

impl NamingStrategy {
    pub fn for_resolution(resolution: Resolution) -> Self {
        match resolution {
            Resolution::High => Self {
                input_file: "era5_data_2024_01_02_monthly_area_celsius_january.csv".into(),
                output_template: "{year}_data_january.csv".into(),
            },
            Resolution::HalfDegree => Self {
                input_file: "era5_data_2024_01_02_monthly_area_celsius_january_05res.csv".into(),
                output_template: "{year}_data_january_05res.csv".into(),
            },
        }
    }

    pub fn output_filename(&self, year: i32) -> String {
        self.output_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    /// Regex matching any filename this template can produce, capturing the year.
    pub fn output_regex(&self) -> Result<Regex> {
        let (prefix, suffix) = self
            .output_template
            .split_once(YEAR_PLACEHOLDER)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "output template '{}' has no {} placeholder",
                    self.output_template,
                    YEAR_PLACEHOLDER
                )
            })?;
        let pattern = format!(
            r"^{}(\d{{4}}){}$",
            regex::escape(prefix),
            regex::escape(suffix)
        );
        Regex::new(&pattern).with_context(|| format!("compiling output pattern {}", pattern))
    }
}

/// Command-line values shared by both binaries; set fields win over the config file.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub high_res: bool,
    pub seed: Option<u64>,
}

/// Everything the generator needs to know, loadable from YAML.
///
/// Unset fields fall back to the values the stub data has always been
/// produced with: years 2025..=2045, a 40°C polar scale and ±0.5°C noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub resolution: Resolution,
    /// Overrides the tier's naming when set.
    pub naming: Option<NamingStrategy>,
    /// Overrides the tier's input filename when set.
    pub input: Option<PathBuf>,
    /// Defaults to the input file's directory.
    pub output_dir: Option<PathBuf>,
    pub start_year: i32,
    pub end_year: i32,
    /// Year text rewritten in the stamp columns.
    pub source_year: String,
    pub stamp_columns: Vec<String>,
    pub latitude_column: String,
    pub temperature_column: String,
    pub max_increase: f64,
    pub noise_amplitude: f64,
    pub gradient: GradientSchedule,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            naming: None,
            input: None,
            output_dir: None,
            start_year: 2025,
            end_year: 2045,
            source_year: "2024".into(),
            stamp_columns: vec!["valid_time".into()],
            latitude_column: "latitude".into(),
            temperature_column: "t2m".into(),
            max_increase: 40.0,
            noise_amplitude: 0.5,
            gradient: GradientSchedule::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load a YAML config file; missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Load `config_file` (or start from defaults) and apply command-line overrides.
    pub fn with_overrides(config_file: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if overrides.high_res {
            config.resolution = Resolution::High;
        }
        if overrides.input.is_some() {
            config.input = overrides.input;
        }
        if overrides.output_dir.is_some() {
            config.output_dir = overrides.output_dir;
        }
        if overrides.seed.is_some() {
            config.seed = overrides.seed;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn naming(&self) -> NamingStrategy {
        self.naming
            .clone()
            .unwrap_or_else(|| NamingStrategy::for_resolution(self.resolution))
    }

    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.naming().input_file))
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// Reject settings that would make sampling or naming panic or misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            bail!(
                "start_year {} is after end_year {}",
                self.start_year,
                self.end_year
            );
        }
        if self.source_year.is_empty() {
            bail!("source_year must not be empty");
        }
        if !self.naming().output_template.contains(YEAR_PLACEHOLDER) {
            bail!(
                "output template '{}' has no {} placeholder",
                self.naming().output_template,
                YEAR_PLACEHOLDER
            );
        }
        validate_finite("max_increase", self.max_increase)?;
        validate_half_width("noise_amplitude", self.noise_amplitude)?;
        self.gradient.validate()
    }
}
