use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{symmetric_uniform, validate_finite, validate_half_width};

/// Per-year gradient strength: a linear ramp plus jitter, clipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradientSchedule {
    /// Strength in the first generated year.
    pub base: f64,
    /// Strength added over `ramp_years`.
    pub ramp: f64,
    pub ramp_years: f64,
    /// Half-width of the uniform jitter.
    pub jitter: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for GradientSchedule {
    fn default() -> Self {
        Self {
            base: 0.7,
            ramp: 3.0,
            ramp_years: 20.0,
            jitter: 0.1,
            min: 0.5,
            max: 8.0,
        }
    }
}

impl GradientSchedule {
    pub fn base_strength(&self, years_since_start: i32) -> f64 {
        self.base + (years_since_start as f64 / self.ramp_years) * self.ramp
    }

    /// One draw: `clip(base_strength + U(-jitter, jitter), min, max)`.
    pub fn sample<R: Rng + ?Sized>(&self, years_since_start: i32, rng: &mut R) -> f64 {
        let strength = self.base_strength(years_since_start) + symmetric_uniform(rng, self.jitter);
        strength.clamp(self.min, self.max)
    }

    pub fn validate(&self) -> Result<()> {
        validate_finite("gradient.base", self.base)?;
        validate_finite("gradient.ramp", self.ramp)?;
        validate_finite("gradient.ramp_years", self.ramp_years)?;
        if self.ramp_years <= 0.0 {
            bail!("gradient.ramp_years must be > 0, got {}", self.ramp_years);
        }
        validate_half_width("gradient.jitter", self.jitter)?;
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            bail!(
                "gradient clip bounds [{}, {}] are not ordered",
                self.min,
                self.max
            );
        }
        Ok(())
    }
}
