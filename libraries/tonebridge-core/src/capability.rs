//! Capability tables
//!
//! A [`CapabilityTable`] describes what one backend can do for one effect
//! type. It is produced once by probing the engine and never mutated
//! afterwards. An unsupported effect is represented by a table with
//! `supported == false` and no bands or presets, which is a valid value
//! rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::{EffectError, Result};
use crate::normalizer::ParameterNormalizer;
use crate::settings::SettingsSnapshot;
use crate::types::{BackendKind, EffectType};

/// One factory preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetInfo {
    pub id: u16,
    pub name: String,
    /// Settings the engine reports after selecting this preset
    pub settings: SettingsSnapshot,
}

/// Static capabilities of one effect type on one backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityTable {
    pub effect: EffectType,
    pub backend: BackendKind,
    pub supported: bool,
    pub num_bands: u16,
    /// Ordered by preset id
    pub presets: Vec<PresetInfo>,
    /// Per-band center frequency in milli-hertz
    pub center_freqs_mhz: Vec<u32>,
    /// Band level range in millibel
    pub level_range: Option<(i16, i16)>,
    /// Settings of a freshly created instance
    pub default_settings: Option<SettingsSnapshot>,
}

impl CapabilityTable {
    /// Queryable "not supported" table
    pub fn unsupported(effect: EffectType, backend: BackendKind) -> Self {
        Self {
            effect,
            backend,
            supported: false,
            num_bands: 0,
            presets: Vec::new(),
            center_freqs_mhz: Vec::new(),
            level_range: None,
            default_settings: None,
        }
    }

    pub fn num_presets(&self) -> usize {
        self.presets.len()
    }

    pub fn preset(&self, id: u16) -> Option<&PresetInfo> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn center_frequency(&self, band: usize) -> Option<u32> {
        self.center_freqs_mhz.get(band).copied()
    }

    /// Normalizer over the band level range
    pub fn level_normalizer(&self) -> Result<ParameterNormalizer> {
        let (min, max) = self.level_range.ok_or_else(|| {
            EffectError::Unsupported(format!("{} on {} has no band level range", self.effect, self.backend))
        })?;
        ParameterNormalizer::new(i32::from(min), i32::from(max))
    }

    /// Fail with `Unsupported` unless the backend provides this effect.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.supported {
            Ok(())
        } else {
            Err(EffectError::Unsupported(format!(
                "{} is not available on the {} backend",
                self.effect, self.backend
            )))
        }
    }
}
