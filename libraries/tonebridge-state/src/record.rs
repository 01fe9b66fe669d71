//! Per-effect persisted state
//!
//! A [`StateRecord`] is everything a store keeps for one effect type apart
//! from the enabled flag: the settings snapshot plus any host-side fields
//! the engine does not know about (capture flags, the selected
//! environment). Host-side fields are persisted as fixed-width values ahead
//! of the settings string.

use std::fmt;

use serde::{Deserialize, Serialize};
use tonebridge_core::{
    BassBoostSettings, CapabilityTable, EffectType, EnvironmentalReverbSettings, EqualizerSettings,
    HqVisualizerSettings, LoudnessEnhancerSettings, PreAmpSettings, PresetReverbSettings,
    SettingsSnapshot, VirtualizerSettings, VisualizerSettings,
};

use crate::error::{Result, StateError};
use crate::persist;

/// State kept for one effect type
pub trait StateRecord: Clone + PartialEq + fmt::Debug + Default + Send + 'static {
    const EFFECT: EffectType;

    /// Full settings snapshot handed to the engine
    fn snapshot(&self) -> SettingsSnapshot;

    /// Replace the engine settings. Fails with `EffectMismatch` for another
    /// effect's snapshot.
    fn set_snapshot(&mut self, snapshot: SettingsSnapshot) -> Result<()>;

    /// Host-side fields, in persisted order
    fn write_fields(&self, _out: &mut Vec<u8>) {}

    fn read_fields(&mut self, _input: &mut &[u8]) -> Result<()> {
        Ok(())
    }

    /// State of a fresh store: the first factory preset for equalizers,
    /// otherwise the probed defaults, otherwise the engine defaults.
    fn initial(caps: &CapabilityTable) -> Result<Self> {
        let mut record = Self::default();
        let first_preset = match Self::EFFECT {
            EffectType::Equalizer | EffectType::HqEqualizer => {
                caps.presets.first().map(|p| p.settings.clone())
            }
            _ => None,
        };
        if let Some(snapshot) = first_preset.or_else(|| caps.default_settings.clone()) {
            record.set_snapshot(snapshot)?;
        }
        Ok(record)
    }
}

fn mismatch(expected: EffectType, found: &SettingsSnapshot) -> StateError {
    StateError::EffectMismatch {
        expected,
        found: found.effect_type(),
    }
}

macro_rules! settings_record {
    ($(#[$meta:meta])* $record:ident($settings:ty) => $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        pub struct $record {
            pub settings: $settings,
        }

        impl StateRecord for $record {
            const EFFECT: EffectType = EffectType::$variant;

            fn snapshot(&self) -> SettingsSnapshot {
                SettingsSnapshot::$variant(Clone::clone(&self.settings))
            }

            fn set_snapshot(&mut self, snapshot: SettingsSnapshot) -> Result<()> {
                match snapshot {
                    SettingsSnapshot::$variant(settings) => {
                        self.settings = settings;
                        Ok(())
                    }
                    other => Err(mismatch(Self::EFFECT, &other)),
                }
            }
        }
    };
}

settings_record!(
    /// Platform equalizer
    EqualizerRecord(EqualizerSettings) => Equalizer
);
settings_record!(
    /// Ten-band pipeline equalizer
    HqEqualizerRecord(EqualizerSettings) => HqEqualizer
);
settings_record!(BassBoostRecord(BassBoostSettings) => BassBoost);
settings_record!(VirtualizerRecord(VirtualizerSettings) => Virtualizer);
settings_record!(LoudnessEnhancerRecord(LoudnessEnhancerSettings) => LoudnessEnhancer);
settings_record!(PresetReverbRecord(PresetReverbSettings) => PresetReverb);
settings_record!(PreAmpRecord(PreAmpSettings) => PreAmp);

/// Environmental reverb parameters plus the named environment they came
/// from, if any
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentalReverbRecord {
    pub settings: EnvironmentalReverbSettings,
    /// Index into the named environments. Cleared by parameter edits
    /// through the store; replacing the whole snapshot leaves it alone.
    pub environment: Option<u16>,
}

impl StateRecord for EnvironmentalReverbRecord {
    const EFFECT: EffectType = EffectType::EnvironmentalReverb;

    fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::EnvironmentalReverb(self.settings)
    }

    fn set_snapshot(&mut self, snapshot: SettingsSnapshot) -> Result<()> {
        match snapshot {
            SettingsSnapshot::EnvironmentalReverb(settings) => {
                self.settings = settings;
                Ok(())
            }
            other => Err(mismatch(Self::EFFECT, &other)),
        }
    }

    fn write_fields(&self, out: &mut Vec<u8>) {
        persist::write_i32(out, self.environment.map_or(-1, i32::from));
    }

    fn read_fields(&mut self, input: &mut &[u8]) -> Result<()> {
        let raw = persist::read_i32(input)?;
        self.environment = match raw {
            -1 => None,
            index if (0..EnvironmentalReverbSettings::PRESET_COUNT as i32).contains(&index) => {
                Some(index as u16)
            }
            other => {
                return Err(StateError::InvalidField {
                    field: "environment",
                    value: i64::from(other),
                })
            }
        };
        Ok(())
    }
}

/// Shared by both visualizers: which captures the host has switched on
pub trait CaptureRecord: StateRecord {
    fn capture_waveform(&self) -> bool;

    fn set_capture_waveform(&mut self, enabled: bool);

    fn capture_fft(&self) -> bool;

    fn set_capture_fft(&mut self, enabled: bool);
}

macro_rules! capture_record {
    ($(#[$meta:meta])* $record:ident($settings:ty) => $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        pub struct $record {
            pub settings: $settings,
            pub capture_waveform: bool,
            pub capture_fft: bool,
        }

        impl StateRecord for $record {
            const EFFECT: EffectType = EffectType::$variant;

            fn snapshot(&self) -> SettingsSnapshot {
                SettingsSnapshot::$variant(self.settings)
            }

            fn set_snapshot(&mut self, snapshot: SettingsSnapshot) -> Result<()> {
                match snapshot {
                    SettingsSnapshot::$variant(settings) => {
                        self.settings = settings;
                        Ok(())
                    }
                    other => Err(mismatch(Self::EFFECT, &other)),
                }
            }

            fn write_fields(&self, out: &mut Vec<u8>) {
                persist::write_flag(out, self.capture_waveform);
                persist::write_flag(out, self.capture_fft);
            }

            fn read_fields(&mut self, input: &mut &[u8]) -> Result<()> {
                self.capture_waveform = persist::read_flag(input, "capture_waveform")?;
                self.capture_fft = persist::read_flag(input, "capture_fft")?;
                Ok(())
            }
        }

        impl CaptureRecord for $record {
            fn capture_waveform(&self) -> bool {
                self.capture_waveform
            }

            fn set_capture_waveform(&mut self, enabled: bool) {
                self.capture_waveform = enabled;
            }

            fn capture_fft(&self) -> bool {
                self.capture_fft
            }

            fn set_capture_fft(&mut self, enabled: bool) {
                self.capture_fft = enabled;
            }
        }
    };
}

capture_record!(VisualizerRecord(VisualizerSettings) => Visualizer);
capture_record!(
    /// High-quality visualizer; the FFT window lives in the settings
    HqVisualizerRecord(HqVisualizerSettings) => HqVisualizer
);

/// Records carrying equalizer bands
pub trait BandRecord: StateRecord {
    fn bands(&self) -> &EqualizerSettings;

    fn bands_mut(&mut self) -> &mut EqualizerSettings;
}

impl BandRecord for EqualizerRecord {
    fn bands(&self) -> &EqualizerSettings {
        &self.settings
    }

    fn bands_mut(&mut self) -> &mut EqualizerSettings {
        &mut self.settings
    }
}

impl BandRecord for HqEqualizerRecord {
    fn bands(&self) -> &EqualizerSettings {
        &self.settings
    }

    fn bands_mut(&mut self) -> &mut EqualizerSettings {
        &mut self.settings
    }
}

/// Records with a single 0..1000 strength
pub trait StrengthRecord: StateRecord {
    const STRENGTH_RANGE: (i32, i32);

    fn strength(&self) -> i16;

    fn set_strength(&mut self, strength: i16);
}

impl StrengthRecord for BassBoostRecord {
    const STRENGTH_RANGE: (i32, i32) = BassBoostSettings::STRENGTH_RANGE;

    fn strength(&self) -> i16 {
        self.settings.strength
    }

    fn set_strength(&mut self, strength: i16) {
        self.settings.strength = strength;
    }
}

impl StrengthRecord for VirtualizerRecord {
    const STRENGTH_RANGE: (i32, i32) = VirtualizerSettings::STRENGTH_RANGE;

    fn strength(&self) -> i16 {
        self.settings.strength
    }

    fn set_strength(&mut self, strength: i16) {
        self.settings.strength = strength;
    }
}
