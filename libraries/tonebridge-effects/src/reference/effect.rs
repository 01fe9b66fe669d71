//! Table-driven effect instance

use tonebridge_core::{
    BassBoostSettings, EffectError, EffectType, EnvironmentalReverbSettings, EqualizerSettings,
    HqVisualizerSettings, LoudnessEnhancerSettings, PreAmpSettings, PresetReverbSettings,
    PresetSelection, Result, SettingsSnapshot, VirtualizerSettings, VisualizerSettings,
};

use super::presets::{
    BAND_LEVEL_RANGE, EQUALIZER_CENTER_FREQS, EQUALIZER_PRESETS, HQ_EQUALIZER_CENTER_FREQS,
    HQ_EQUALIZER_PRESETS, PRESET_NAMES,
};
use super::EngineStats;
use crate::engine::EngineEffect;

#[derive(Debug, Clone, Copy)]
enum BandModel {
    Standard,
    HighQuality,
}

impl BandModel {
    fn for_effect(effect: EffectType) -> Option<Self> {
        match effect {
            EffectType::Equalizer => Some(BandModel::Standard),
            EffectType::HqEqualizer => Some(BandModel::HighQuality),
            _ => None,
        }
    }

    fn center_freqs(self) -> &'static [u32] {
        match self {
            BandModel::Standard => &EQUALIZER_CENTER_FREQS,
            BandModel::HighQuality => &HQ_EQUALIZER_CENTER_FREQS,
        }
    }

    fn preset(self, id: u16) -> Option<&'static [i16]> {
        let id = usize::from(id);
        match self {
            BandModel::Standard => EQUALIZER_PRESETS.get(id).map(|p| p.as_slice()),
            BandModel::HighQuality => HQ_EQUALIZER_PRESETS.get(id).map(|p| p.as_slice()),
        }
    }

    fn settings_for(self, id: u16) -> Option<EqualizerSettings> {
        self.preset(id)
            .map(|levels| EqualizerSettings::new(PresetSelection::Preset(id), levels.to_vec()))
    }
}

fn initial_settings(effect: EffectType) -> SettingsSnapshot {
    let first_preset = |model: BandModel| {
        model
            .settings_for(0)
            .unwrap_or_else(|| EqualizerSettings::flat(model.center_freqs().len()))
    };
    match effect {
        EffectType::BassBoost => SettingsSnapshot::BassBoost(BassBoostSettings::default()),
        EffectType::Equalizer => SettingsSnapshot::Equalizer(first_preset(BandModel::Standard)),
        EffectType::Virtualizer => SettingsSnapshot::Virtualizer(VirtualizerSettings::default()),
        EffectType::Visualizer => SettingsSnapshot::Visualizer(VisualizerSettings::default()),
        EffectType::LoudnessEnhancer => {
            SettingsSnapshot::LoudnessEnhancer(LoudnessEnhancerSettings::default())
        }
        EffectType::PresetReverb => SettingsSnapshot::PresetReverb(PresetReverbSettings::default()),
        EffectType::EnvironmentalReverb => {
            SettingsSnapshot::EnvironmentalReverb(EnvironmentalReverbSettings::default())
        }
        EffectType::HqEqualizer => {
            SettingsSnapshot::HqEqualizer(first_preset(BandModel::HighQuality))
        }
        EffectType::HqVisualizer => SettingsSnapshot::HqVisualizer(HqVisualizerSettings::default()),
        EffectType::PreAmp => SettingsSnapshot::PreAmp(PreAmpSettings::default()),
    }
}

fn out_of_range(what: &str, value: impl std::fmt::Display) -> EffectError {
    EffectError::IllegalArgument(format!("{} out of range: {}", what, value))
}

/// In-memory effect instance that stores its parameters without
/// processing audio
pub(crate) struct ReferenceEffect {
    effect: EffectType,
    bands: Option<BandModel>,
    enabled: bool,
    settings: SettingsSnapshot,
    stats: EngineStats,
    released: bool,
}

impl ReferenceEffect {
    pub(crate) fn new(effect: EffectType, stats: EngineStats) -> Self {
        stats.record_effect_created();
        Self::counted(effect, stats)
    }

    /// Instance whose creation `stats` has already counted
    pub(crate) fn counted(effect: EffectType, stats: EngineStats) -> Self {
        Self {
            effect,
            bands: BandModel::for_effect(effect),
            enabled: false,
            settings: initial_settings(effect),
            stats,
            released: false,
        }
    }

    fn check_live(&self) -> Result<()> {
        if self.released {
            return Err(EffectError::IllegalState(format!(
                "{} instance already released",
                self.effect
            )));
        }
        Ok(())
    }

    fn band_model(&self) -> Result<BandModel> {
        self.check_live()?;
        self.bands
            .ok_or_else(|| EffectError::Unsupported(format!("{} has no bands", self.effect)))
    }

    fn validate(&self, settings: &SettingsSnapshot) -> Result<()> {
        if settings.effect_type() != self.effect {
            return Err(EffectError::IllegalArgument(format!(
                "{} settings applied to {}",
                settings.effect_type(),
                self.effect
            )));
        }

        match settings {
            SettingsSnapshot::Equalizer(eq) | SettingsSnapshot::HqEqualizer(eq) => {
                let model = self.band_model()?;
                if eq.num_bands() != model.center_freqs().len() {
                    return Err(out_of_range("band count", eq.num_bands()));
                }
                let (min, max) = BAND_LEVEL_RANGE;
                if let Some(level) = eq.band_levels().iter().find(|l| !(min..=max).contains(*l)) {
                    return Err(out_of_range("band level", level));
                }
                if let Some(id) = eq.cur_preset().preset_id() {
                    if model.preset(id).is_none() {
                        return Err(out_of_range("preset", id));
                    }
                }
            }
            SettingsSnapshot::BassBoost(BassBoostSettings { strength })
            | SettingsSnapshot::Virtualizer(VirtualizerSettings { strength }) => {
                if !(0..=1000).contains(strength) {
                    return Err(out_of_range("strength", strength));
                }
            }
            SettingsSnapshot::PreAmp(PreAmpSettings { level }) => {
                if !level.is_finite() || *level < 0.0 {
                    return Err(out_of_range("pre-amp level", level));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl EngineEffect for ReferenceEffect {
    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.check_live()?;
        self.enabled = enabled;
        Ok(())
    }

    fn enabled(&self) -> Result<bool> {
        self.check_live()?;
        Ok(self.enabled)
    }

    fn settings(&self) -> Result<SettingsSnapshot> {
        self.check_live()?;
        Ok(self.settings.clone())
    }

    fn set_settings(&mut self, settings: &SettingsSnapshot) -> Result<()> {
        self.check_live()?;
        self.validate(settings)?;
        let mut settings = settings.clone();
        if let (Some(model), Some(eq)) = (self.bands, settings.as_equalizer_mut()) {
            // a concrete preset wins over the submitted band levels
            if let Some(preset) = eq.cur_preset().preset_id().and_then(|id| model.settings_for(id)) {
                *eq = preset;
            }
        }
        self.settings = settings;
        Ok(())
    }

    fn num_presets(&self) -> Result<u16> {
        self.check_live()?;
        Ok(if self.bands.is_some() {
            PRESET_NAMES.len() as u16
        } else {
            0
        })
    }

    fn preset_name(&self, preset: u16) -> Result<String> {
        self.band_model()?;
        PRESET_NAMES
            .get(usize::from(preset))
            .map(|name| (*name).to_string())
            .ok_or_else(|| out_of_range("preset", preset))
    }

    fn use_preset(&mut self, preset: u16) -> Result<()> {
        let model = self.band_model()?;
        let settings = model
            .settings_for(preset)
            .ok_or_else(|| out_of_range("preset", preset))?;
        if let Some(eq) = self.settings.as_equalizer_mut() {
            *eq = settings;
        }
        Ok(())
    }

    fn num_bands(&self) -> Result<u16> {
        self.check_live()?;
        Ok(self
            .bands
            .map(|model| model.center_freqs().len() as u16)
            .unwrap_or(0))
    }

    fn center_freq(&self, band: u16) -> Result<u32> {
        let model = self.band_model()?;
        model
            .center_freqs()
            .get(usize::from(band))
            .copied()
            .ok_or_else(|| out_of_range("band", band))
    }

    fn band_level_range(&self) -> Result<(i16, i16)> {
        self.band_model()?;
        Ok(BAND_LEVEL_RANGE)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.record_effect_released();
        }
    }
}
