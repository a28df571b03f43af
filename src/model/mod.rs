//! Latitude-dependent temperature deviation model.

pub mod gradient;

pub use gradient::GradientSchedule;

use anyhow::{bail, Result};
use rand::Rng;

/// Polar deviation (°C) at `gradient_strength = 1` when no scale is given.
pub const DEFAULT_MAX_INCREASE: f64 = 10.0;

/// Temperature delta for a point at `latitude` degrees.
///
/// `|latitude| / 90` is squared so the deviation grows quickly towards the
/// poles, then scaled by `max_increase` and `gradient_strength`. The result is
/// negated: the stub data cools towards the poles. Latitudes outside
/// [-90, 90] are not rejected.
pub fn temperature_increase(latitude: f64, max_increase: f64, gradient_strength: f64) -> f64 {
    let normalized_lat = latitude.abs() / 90.0;
    let increase = max_increase * normalized_lat.powi(2) * gradient_strength;
    -increase
}

/// Draw from U(-half_width, half_width); zero width yields exactly 0.
pub fn symmetric_uniform<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}

/// Half-widths fed to [`symmetric_uniform`] must be finite, non-negative and
/// span a finite range, or `gen_range` panics.
pub fn validate_half_width(name: &str, half_width: f64) -> Result<()> {
    if !half_width.is_finite() || half_width < 0.0 || !(2.0 * half_width).is_finite() {
        bail!(
            "{} must be a finite value >= 0 with a finite range, got {}",
            name,
            half_width
        );
    }
    Ok(())
}

pub fn validate_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        bail!("{} must be finite, got {}", name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_at_equator() {
        assert_eq!(temperature_increase(0.0, 40.0, 3.7), 0.0);
        assert_eq!(temperature_increase(0.0, DEFAULT_MAX_INCREASE, 1.0), 0.0);
    }

    #[test]
    fn test_pole_equals_negative_max() {
        assert_eq!(temperature_increase(90.0, 40.0, 1.0), -40.0);
        assert_eq!(temperature_increase(-90.0, DEFAULT_MAX_INCREASE, 1.0), -10.0);
    }

    #[test]
    fn test_symmetric_in_latitude() {
        for lat in [0.5, 12.0, 33.3, 45.0, 67.25, 89.9] {
            assert_eq!(
                temperature_increase(lat, 40.0, 2.2),
                temperature_increase(-lat, 40.0, 2.2)
            );
        }
    }

    #[test]
    fn test_monotonic_in_abs_latitude() {
        let mut prev = temperature_increase(0.0, 40.0, 1.5);
        for step in 1..=90 {
            let next = temperature_increase(step as f64, 40.0, 1.5);
            assert!(next < prev, "lat {} gave {} >= {}", step, next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_bounds_at_clip_strengths() {
        let max_increase = 40.0;
        for lat in [-90.0_f64, -60.0, -10.0, 0.0, 30.0, 75.0, 90.0] {
            let scale = (lat / 90.0).powi(2);
            for strength in [0.5, 8.0] {
                let delta = temperature_increase(lat, max_increase, strength);
                assert!(delta <= -max_increase * 0.5 * scale + 1e-12);
                assert!(delta >= -max_increase * 8.0 * scale - 1e-12);
            }
        }
    }

    #[test]
    fn test_out_of_range_latitude_is_accepted() {
        // 180° normalizes to 2, so the delta is four times the polar value.
        assert_eq!(temperature_increase(180.0, 10.0, 1.0), -40.0);
    }

    #[test]
    fn test_symmetric_uniform_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let n = symmetric_uniform(&mut rng, 0.5);
            assert!((-0.5..0.5).contains(&n));
        }
        assert_eq!(symmetric_uniform(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn test_half_width_validation() {
        assert!(validate_half_width("noise", 0.0).is_ok());
        assert!(validate_half_width("noise", 0.5).is_ok());
        assert!(validate_half_width("noise", -0.1).is_err());
        assert!(validate_half_width("noise", f64::NAN).is_err());
        assert!(validate_half_width("noise", f64::INFINITY).is_err());
        // finite, but -h..h spans more than f64::MAX
        assert!(validate_half_width("noise", 1e308).is_err());
    }
}
