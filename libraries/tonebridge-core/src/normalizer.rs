//! Linear mapping between native parameter units and `[0, 1]`

use serde::{Deserialize, Serialize};

use crate::error::{EffectError, Result};

/// Affine map between a backend's native integer range and `[0, 1]`.
///
/// Out-of-range inputs are not clamped in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterNormalizer {
    min: i32,
    max: i32,
}

impl ParameterNormalizer {
    /// Fails with `InvalidRange` unless `min < max`.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min >= max {
            return Err(EffectError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// `(value - min) / (max - min)`
    pub fn normalize(&self, value: i32) -> f32 {
        let span = f64::from(self.max) - f64::from(self.min);
        ((f64::from(value) - f64::from(self.min)) / span) as f32
    }

    /// `round(value * (max - min) + min)`, saturating at the `i32` bounds
    pub fn denormalize(&self, value: f32) -> i32 {
        let span = f64::from(self.max) - f64::from(self.min);
        (f64::from(value) * span + f64::from(self.min)).round() as i32
    }

    /// Whether `value` lies inside `[min, max]`
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_inverted_ranges() {
        assert_eq!(
            ParameterNormalizer::new(0, 0),
            Err(EffectError::InvalidRange { min: 0, max: 0 })
        );
        assert!(ParameterNormalizer::new(10, -10).is_err());
    }

    #[test]
    fn test_endpoints_and_midpoint() {
        let n = ParameterNormalizer::new(-1500, 1500).unwrap();
        assert_eq!(n.normalize(-1500), 0.0);
        assert_eq!(n.normalize(1500), 1.0);
        assert_eq!(n.normalize(0), 0.5);
        assert_eq!(n.denormalize(0.5), 0);
        assert_eq!(n.denormalize(1.0), 1500);
    }

    #[test]
    fn test_out_of_range_is_not_clamped() {
        let n = ParameterNormalizer::new(0, 1000).unwrap();
        assert_eq!(n.normalize(2000), 2.0);
        assert_eq!(n.normalize(-500), -0.5);
        assert_eq!(n.denormalize(1.5), 1500);
        assert!(!n.contains(1001));
    }

    #[test]
    fn test_denormalize_rounds_to_nearest() {
        let n = ParameterNormalizer::new(0, 3).unwrap();
        assert_eq!(n.denormalize(0.49), 1);
        assert_eq!(n.denormalize(0.51), 2);
    }
}
