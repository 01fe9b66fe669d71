//! Single-parameter effects

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::{FieldReader, FieldWriter};
use super::SettingsFields;
use crate::error::SettingsParseError;

type ParseResult<T> = std::result::Result<T, SettingsParseError>;

/// Bass boost strength in per-mille
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BassBoostSettings {
    pub strength: i16,
}

impl BassBoostSettings {
    pub const STRENGTH_RANGE: (i32, i32) = (0, 1000);
}

impl SettingsFields for BassBoostSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("strength", self.strength)
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        Ok(Self {
            strength: input.next("strength")?,
        })
    }
}

/// Virtualizer strength in per-mille
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VirtualizerSettings {
    pub strength: i16,
}

impl VirtualizerSettings {
    pub const STRENGTH_RANGE: (i32, i32) = (0, 1000);
}

impl SettingsFields for VirtualizerSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("strength", self.strength)
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        Ok(Self {
            strength: input.next("strength")?,
        })
    }
}

/// Loudness enhancer target gain in millibel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoudnessEnhancerSettings {
    pub target_gain_mb: i32,
}

impl LoudnessEnhancerSettings {
    pub const TARGET_GAIN_RANGE: (i32, i32) = (0, 1000);
}

impl SettingsFields for LoudnessEnhancerSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("targetGainmB", self.target_gain_mb)
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        Ok(Self {
            target_gain_mb: input.next("targetGainmB")?,
        })
    }
}

/// Pre-amp linear gain; `1.0` is unity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreAmpSettings {
    pub level: f32,
}

impl PreAmpSettings {
    /// Span of the logarithmic UI control
    pub const UI_RANGE_DB: f32 = 40.0;

    /// Map the linear level onto the `[0, 1]` UI control.
    pub fn ui_level(&self) -> f32 {
        if self.level <= 0.0 {
            return 0.0;
        }
        (self.level.log10() * 20.0 / Self::UI_RANGE_DB + 1.0).max(0.0)
    }

    /// Inverse of [`PreAmpSettings::ui_level`].
    pub fn from_ui_level(ui: f32) -> Self {
        if ui <= 0.0 {
            return Self { level: 0.0 };
        }
        Self {
            level: 10f32.powf(Self::UI_RANGE_DB * (ui - 1.0) / 20.0),
        }
    }
}

impl Default for PreAmpSettings {
    fn default() -> Self {
        Self { level: 1.0 }
    }
}

impl SettingsFields for PreAmpSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("level", self.level)
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        let level = input.next_with("level", |level: f32| {
            (level.is_finite() && level >= 0.0).then_some(level)
        })?;
        Ok(Self { level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_amp_ui_mapping() {
        assert_eq!(PreAmpSettings { level: 1.0 }.ui_level(), 1.0);
        assert_eq!(PreAmpSettings { level: 0.0 }.ui_level(), 0.0);

        // -20 dB sits half-way along the 40 dB control
        let half = PreAmpSettings { level: 0.1 }.ui_level();
        assert!((half - 0.5).abs() < 1e-6);

        let back = PreAmpSettings::from_ui_level(0.5).level;
        assert!((back - 0.1).abs() < 1e-6);
        assert_eq!(PreAmpSettings::from_ui_level(0.0).level, 0.0);
    }

    #[test]
    fn test_pre_amp_below_range_clamps_ui_to_zero() {
        assert_eq!(PreAmpSettings { level: 0.001 }.ui_level(), 0.0);
    }

    #[test]
    fn test_pre_amp_defaults_to_unity() {
        assert_eq!(PreAmpSettings::default().level, 1.0);
    }
}
