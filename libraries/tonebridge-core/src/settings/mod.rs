//! Typed settings snapshots
//!
//! A [`SettingsSnapshot`] is the full parameter state of one effect
//! instance. Each effect has its own struct; the snapshot is the tagged
//! union over them. The canonical text form is the backend settings string
//! (`Tag;key=value;...`), produced by `Display` and consumed by
//! [`SettingsSnapshot::parse`].

mod codec;
mod equalizer;
mod reverb;
mod scalar;
mod visualizer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SettingsParseError;
use crate::types::EffectType;

use codec::{FieldReader, FieldWriter};

pub use equalizer::{EqualizerSettings, PresetSelection};
pub use reverb::{EnvironmentalReverbSettings, PresetReverbSettings, ReverbParam, ReverbPreset};
pub use scalar::{BassBoostSettings, LoudnessEnhancerSettings, PreAmpSettings, VirtualizerSettings};
pub use visualizer::{
    HqVisualizerSettings, MeasurementMode, ScalingMode, VisualizerSettings, WindowType,
};

/// Field-level encoding shared by every settings struct
pub(crate) trait SettingsFields: Sized {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result;
    fn read_fields(input: &mut FieldReader<'_>) -> Result<Self, SettingsParseError>;
}

/// Full parameter state of one effect instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "settings", rename_all = "snake_case")]
pub enum SettingsSnapshot {
    BassBoost(BassBoostSettings),
    Equalizer(EqualizerSettings),
    Virtualizer(VirtualizerSettings),
    Visualizer(VisualizerSettings),
    LoudnessEnhancer(LoudnessEnhancerSettings),
    PresetReverb(PresetReverbSettings),
    EnvironmentalReverb(EnvironmentalReverbSettings),
    HqEqualizer(EqualizerSettings),
    HqVisualizer(HqVisualizerSettings),
    PreAmp(PreAmpSettings),
}

impl SettingsSnapshot {
    /// Effect type this snapshot configures
    pub fn effect_type(&self) -> EffectType {
        match self {
            SettingsSnapshot::BassBoost(_) => EffectType::BassBoost,
            SettingsSnapshot::Equalizer(_) => EffectType::Equalizer,
            SettingsSnapshot::Virtualizer(_) => EffectType::Virtualizer,
            SettingsSnapshot::Visualizer(_) => EffectType::Visualizer,
            SettingsSnapshot::LoudnessEnhancer(_) => EffectType::LoudnessEnhancer,
            SettingsSnapshot::PresetReverb(_) => EffectType::PresetReverb,
            SettingsSnapshot::EnvironmentalReverb(_) => EffectType::EnvironmentalReverb,
            SettingsSnapshot::HqEqualizer(_) => EffectType::HqEqualizer,
            SettingsSnapshot::HqVisualizer(_) => EffectType::HqVisualizer,
            SettingsSnapshot::PreAmp(_) => EffectType::PreAmp,
        }
    }

    /// Parse the backend settings string of `effect`.
    pub fn parse(effect: EffectType, input: &str) -> Result<Self, SettingsParseError> {
        let mut reader = FieldReader::open(input, effect.settings_tag())?;
        let snapshot = match effect {
            EffectType::BassBoost => Self::BassBoost(SettingsFields::read_fields(&mut reader)?),
            EffectType::Equalizer => Self::Equalizer(SettingsFields::read_fields(&mut reader)?),
            EffectType::Virtualizer => {
                Self::Virtualizer(SettingsFields::read_fields(&mut reader)?)
            }
            EffectType::Visualizer => Self::Visualizer(SettingsFields::read_fields(&mut reader)?),
            EffectType::LoudnessEnhancer => {
                Self::LoudnessEnhancer(SettingsFields::read_fields(&mut reader)?)
            }
            EffectType::PresetReverb => {
                Self::PresetReverb(SettingsFields::read_fields(&mut reader)?)
            }
            EffectType::EnvironmentalReverb => {
                Self::EnvironmentalReverb(SettingsFields::read_fields(&mut reader)?)
            }
            EffectType::HqEqualizer => {
                Self::HqEqualizer(SettingsFields::read_fields(&mut reader)?)
            }
            EffectType::HqVisualizer => {
                Self::HqVisualizer(SettingsFields::read_fields(&mut reader)?)
            }
            EffectType::PreAmp => Self::PreAmp(SettingsFields::read_fields(&mut reader)?),
        };
        reader.finish()?;
        Ok(snapshot)
    }

    /// Equalizer or high-quality equalizer settings
    pub fn as_equalizer(&self) -> Option<&EqualizerSettings> {
        match self {
            SettingsSnapshot::Equalizer(eq) | SettingsSnapshot::HqEqualizer(eq) => Some(eq),
            _ => None,
        }
    }

    pub fn as_equalizer_mut(&mut self) -> Option<&mut EqualizerSettings> {
        match self {
            SettingsSnapshot::Equalizer(eq) | SettingsSnapshot::HqEqualizer(eq) => Some(eq),
            _ => None,
        }
    }
}

impl fmt::Display for SettingsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = FieldWriter::open(f, self.effect_type().settings_tag())?;
        match self {
            SettingsSnapshot::BassBoost(s) => s.write_fields(&mut out),
            SettingsSnapshot::Equalizer(s) | SettingsSnapshot::HqEqualizer(s) => {
                s.write_fields(&mut out)
            }
            SettingsSnapshot::Virtualizer(s) => s.write_fields(&mut out),
            SettingsSnapshot::Visualizer(s) => s.write_fields(&mut out),
            SettingsSnapshot::LoudnessEnhancer(s) => s.write_fields(&mut out),
            SettingsSnapshot::PresetReverb(s) => s.write_fields(&mut out),
            SettingsSnapshot::EnvironmentalReverb(s) => s.write_fields(&mut out),
            SettingsSnapshot::HqVisualizer(s) => s.write_fields(&mut out),
            SettingsSnapshot::PreAmp(s) => s.write_fields(&mut out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<SettingsSnapshot> {
        vec![
            SettingsSnapshot::BassBoost(BassBoostSettings { strength: 1000 }),
            SettingsSnapshot::Equalizer(EqualizerSettings::new(
                PresetSelection::Preset(3),
                vec![0, 0, 0, 0, 0],
            )),
            SettingsSnapshot::HqEqualizer(EqualizerSettings::new(
                PresetSelection::Custom,
                vec![300, -200, 0, 1500, -1500, 10, 20, 30, 40, 50],
            )),
            SettingsSnapshot::Virtualizer(VirtualizerSettings { strength: 0 }),
            SettingsSnapshot::LoudnessEnhancer(LoudnessEnhancerSettings { target_gain_mb: 750 }),
            SettingsSnapshot::PresetReverb(PresetReverbSettings {
                preset: ReverbPreset::LargeHall,
            }),
            SettingsSnapshot::EnvironmentalReverb(EnvironmentalReverbSettings::default()),
            SettingsSnapshot::PreAmp(PreAmpSettings { level: 0.125 }),
            SettingsSnapshot::Visualizer(VisualizerSettings {
                scaling_mode: ScalingMode::AsPlayed,
                measurement_mode: MeasurementMode::PeakRms,
            }),
            SettingsSnapshot::HqVisualizer(HqVisualizerSettings {
                window: WindowType::Blackman,
                apply_window_to_waveform: true,
            }),
        ]
    }

    #[test]
    fn test_every_effect_parses_its_own_text_form() {
        for snapshot in samples() {
            let text = snapshot.to_string();
            let parsed = SettingsSnapshot::parse(snapshot.effect_type(), &text).unwrap();
            assert_eq!(parsed, snapshot, "text form: {}", text);
        }
    }

    #[test]
    fn test_equalizer_text_form() {
        let snapshot = SettingsSnapshot::Equalizer(EqualizerSettings::new(
            PresetSelection::Custom,
            vec![300, 0, -100],
        ));
        assert_eq!(
            snapshot.to_string(),
            "Equalizer;curPreset=-1;numBands=3;band1Level=300;band2Level=0;band3Level=-100"
        );
    }

    #[test]
    fn test_tag_must_match_requested_effect() {
        let err = SettingsSnapshot::parse(EffectType::HqEqualizer, "Equalizer;curPreset=0;numBands=0")
            .unwrap_err();
        assert!(matches!(err, SettingsParseError::WrongTag { .. }));
    }

    #[test]
    fn test_trailing_field_is_rejected() {
        let err = SettingsSnapshot::parse(EffectType::BassBoost, "BassBoost;strength=1;extra=2")
            .unwrap_err();
        assert_eq!(err, SettingsParseError::TrailingField("extra=2".into()));
    }

    #[test]
    fn test_serde_tagging() {
        let snapshot = SettingsSnapshot::BassBoost(BassBoostSettings { strength: 10 });
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["effect"], "bass_boost");
        assert_eq!(json["settings"]["strength"], 10);
    }

    #[test]
    fn test_equalizer_accessors() {
        let mut snapshot = SettingsSnapshot::HqEqualizer(EqualizerSettings::flat(10));
        assert_eq!(snapshot.as_equalizer().map(|eq| eq.num_bands()), Some(10));
        assert!(snapshot.as_equalizer_mut().is_some());
        assert!(SettingsSnapshot::PreAmp(PreAmpSettings::default())
            .as_equalizer()
            .is_none());
    }
}
