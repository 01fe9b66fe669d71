//! Settings stores
//!
//! A [`StateStore`] holds the host's view of one effect: whether it is
//! enabled and its full settings, independent of any live engine instance.
//! UI-facing accessors speak normalized `[0, 1]` values and convert through
//! the capability table the store was built from.

use std::sync::Arc;

use tracing::debug;

use tonebridge_core::{
    CapabilityTable, EffectError, EnvironmentalReverbSettings, LoudnessEnhancerSettings,
    MeasurementMode, ParameterNormalizer, PreAmpSettings, PresetSelection, ReverbParam,
    ReverbPreset, ScalingMode, SettingsSnapshot, WindowType,
};

use crate::error::{Result, StateError};
use crate::persist;
use crate::record::{
    BandRecord, BassBoostRecord, CaptureRecord, EnvironmentalReverbRecord, EqualizerRecord,
    HqEqualizerRecord, HqVisualizerRecord, LoudnessEnhancerRecord, PreAmpRecord,
    PresetReverbRecord, StateRecord, StrengthRecord, VirtualizerRecord, VisualizerRecord,
};

/// Enabled flag plus record for one effect type
#[derive(Debug, Clone, PartialEq)]
pub struct StateStore<R: StateRecord> {
    enabled: bool,
    record: R,
    caps: Arc<CapabilityTable>,
}

pub type EqualizerStore = StateStore<EqualizerRecord>;
pub type HqEqualizerStore = StateStore<HqEqualizerRecord>;
pub type BassBoostStore = StateStore<BassBoostRecord>;
pub type VirtualizerStore = StateStore<VirtualizerRecord>;
pub type LoudnessEnhancerStore = StateStore<LoudnessEnhancerRecord>;
pub type PresetReverbStore = StateStore<PresetReverbRecord>;
pub type EnvironmentalReverbStore = StateStore<EnvironmentalReverbRecord>;
pub type PreAmpStore = StateStore<PreAmpRecord>;
pub type VisualizerStore = StateStore<VisualizerRecord>;
pub type HqVisualizerStore = StateStore<HqVisualizerRecord>;

impl<R: StateRecord> StateStore<R> {
    /// Disabled store holding the initial state for `caps`.
    pub fn new(caps: Arc<CapabilityTable>) -> Result<Self> {
        check_caps::<R>(&caps)?;
        let record = R::initial(&caps)?;
        Ok(Self {
            enabled: false,
            record,
            caps,
        })
    }

    pub fn capabilities(&self) -> &Arc<CapabilityTable> {
        &self.caps
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn settings(&self) -> SettingsSnapshot {
        self.record.snapshot()
    }

    /// Replace the settings. An equalizer snapshot naming a concrete
    /// preset takes that preset's bands from the capability table.
    pub fn set_settings(&mut self, settings: SettingsSnapshot) -> Result<()> {
        let settings = resolve_preset::<R>(settings, &self.caps)?;
        self.record.set_snapshot(settings)
    }

    /// Persist as a versioned record.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        persist::write_header(&mut out, R::EFFECT);
        persist::write_flag(&mut out, self.enabled);
        self.record.write_fields(&mut out);
        persist::write_settings(&mut out, &self.record.snapshot());
        out
    }

    /// Restore a record written by [`StateStore::serialize`].
    ///
    /// Equalizer records whose band count disagrees with a supported `caps`
    /// are rejected.
    pub fn deserialize(bytes: &[u8], caps: Arc<CapabilityTable>) -> Result<Self> {
        check_caps::<R>(&caps)?;

        let mut input = bytes;
        let effect = persist::read_header(&mut input)?;
        if effect != R::EFFECT {
            return Err(StateError::EffectMismatch {
                expected: R::EFFECT,
                found: effect,
            });
        }
        let enabled = persist::read_flag(&mut input, "enabled")?;
        let mut record = R::default();
        record.read_fields(&mut input)?;
        let snapshot = persist::read_settings(&mut input, effect)?;
        persist::finish(input)?;

        if let Some(eq) = snapshot.as_equalizer() {
            if caps.supported && eq.num_bands() != usize::from(caps.num_bands) {
                return Err(StateError::InvalidField {
                    field: "numBands",
                    value: eq.num_bands() as i64,
                });
            }
        }
        record.set_snapshot(resolve_preset::<R>(snapshot, &caps)?)?;

        debug!(effect = %effect, enabled, len = bytes.len(), "Restored effect state");
        Ok(Self {
            enabled,
            record,
            caps,
        })
    }
}

fn check_caps<R: StateRecord>(caps: &CapabilityTable) -> Result<()> {
    if caps.effect == R::EFFECT {
        Ok(())
    } else {
        Err(StateError::EffectMismatch {
            expected: R::EFFECT,
            found: caps.effect,
        })
    }
}

fn resolve_preset<R: StateRecord>(
    mut snapshot: SettingsSnapshot,
    caps: &CapabilityTable,
) -> Result<SettingsSnapshot> {
    if snapshot.effect_type() != R::EFFECT {
        return Err(StateError::EffectMismatch {
            expected: R::EFFECT,
            found: snapshot.effect_type(),
        });
    }
    if let Some(eq) = snapshot.as_equalizer_mut() {
        eq.resolve_preset(caps)?;
    }
    Ok(snapshot)
}

fn normalizer(range: (i32, i32)) -> Result<ParameterNormalizer> {
    Ok(ParameterNormalizer::new(range.0, range.1)?)
}

// ===== Equalizers =====

impl<R: BandRecord> StateStore<R> {
    pub fn num_bands(&self) -> usize {
        self.record.bands().num_bands()
    }

    pub fn cur_preset(&self) -> PresetSelection {
        self.record.bands().cur_preset()
    }

    /// Normalized level of `band`
    pub fn band_level(&self, band: usize) -> Result<f32> {
        let n = self.caps.level_normalizer()?;
        let level = self
            .record
            .bands()
            .band_level(band)
            .ok_or_else(|| band_out_of_range(band, self.num_bands()))?;
        Ok(n.normalize(i32::from(level)))
    }

    /// Set `band` from a normalized level, clamped to the band range. The
    /// selected preset becomes custom.
    pub fn set_band_level(&mut self, band: usize, value: f32) -> Result<()> {
        let n = self.caps.level_normalizer()?;
        let level = n.denormalize(value).clamp(n.min(), n.max());
        self.record.bands_mut().set_band_level(band, level as i16)?;
        Ok(())
    }

    /// Overwrite every band with preset `id` from the capability table.
    pub fn use_preset(&mut self, id: u16) -> Result<()> {
        self.caps.ensure_supported()?;
        self.record.bands_mut().use_preset(&self.caps, id)?;
        Ok(())
    }
}

fn band_out_of_range(band: usize, num_bands: usize) -> EffectError {
    EffectError::IllegalArgument(format!("band {} out of range ({} bands)", band, num_bands))
}

// ===== Strength effects =====

impl<R: StrengthRecord> StateStore<R> {
    /// Normalized strength
    pub fn strength(&self) -> Result<f32> {
        Ok(normalizer(R::STRENGTH_RANGE)?.normalize(i32::from(self.record.strength())))
    }

    /// Clamped to the strength range
    pub fn set_strength(&mut self, value: f32) -> Result<()> {
        let n = normalizer(R::STRENGTH_RANGE)?;
        let strength = n.denormalize(value).clamp(n.min(), n.max());
        self.record.set_strength(strength as i16);
        Ok(())
    }
}

impl LoudnessEnhancerStore {
    /// Normalized target gain
    pub fn target_gain(&self) -> Result<f32> {
        let n = normalizer(LoudnessEnhancerSettings::TARGET_GAIN_RANGE)?;
        Ok(n.normalize(self.record.settings.target_gain_mb))
    }

    pub fn set_target_gain(&mut self, value: f32) -> Result<()> {
        let n = normalizer(LoudnessEnhancerSettings::TARGET_GAIN_RANGE)?;
        self.record.settings.target_gain_mb = n.denormalize(value).clamp(n.min(), n.max());
        Ok(())
    }
}

// ===== Reverbs =====

impl EnvironmentalReverbStore {
    /// Normalized value of `param`. Parameters the engine fixes at zero are
    /// `Unsupported`.
    pub fn param(&self, param: ReverbParam) -> Result<f32> {
        let n = reverb_normalizer(param)?;
        Ok(n.normalize(self.record.settings.param(param)))
    }

    /// Set `param` from a normalized value; the selected environment is
    /// forgotten.
    pub fn set_param(&mut self, param: ReverbParam, value: f32) -> Result<()> {
        let n = reverb_normalizer(param)?;
        self.record.settings.set_param(param, n.denormalize(value));
        self.record.environment = None;
        Ok(())
    }

    pub fn environment(&self) -> Option<u16> {
        self.record.environment
    }

    pub fn environment_name(&self) -> Option<&'static str> {
        let index = self.record.environment?;
        EnvironmentalReverbSettings::preset(usize::from(index)).map(|(name, _)| name)
    }

    /// Load named environment `index`.
    pub fn use_environment(&mut self, index: u16) -> Result<()> {
        let (name, settings) = EnvironmentalReverbSettings::preset(usize::from(index)).ok_or_else(|| {
            EffectError::IllegalArgument(format!(
                "environment {} out of range ({} environments)",
                index,
                EnvironmentalReverbSettings::PRESET_COUNT
            ))
        })?;
        debug!(index, name, "Selected reverb environment");
        self.record.settings = settings;
        self.record.environment = Some(index);
        Ok(())
    }
}

fn reverb_normalizer(param: ReverbParam) -> Result<ParameterNormalizer> {
    let (min, max) = param.range();
    ParameterNormalizer::new(min, max).map_err(|_| {
        StateError::Effect(EffectError::Unsupported(format!(
            "reverb parameter {:?} is fixed at {}",
            param, min
        )))
    })
}

impl PresetReverbStore {
    pub fn preset(&self) -> ReverbPreset {
        self.record.settings.preset
    }

    pub fn set_preset(&mut self, preset: ReverbPreset) {
        self.record.settings.preset = preset;
    }
}

// ===== Pre-amp =====

impl PreAmpStore {
    /// Linear gain
    pub fn level(&self) -> f32 {
        self.record.settings.level
    }

    /// Logarithmic UI level in `[0, 1]`
    pub fn ui_level(&self) -> f32 {
        self.record.settings.ui_level()
    }

    pub fn set_ui_level(&mut self, ui: f32) -> Result<()> {
        if !ui.is_finite() {
            return Err(EffectError::IllegalArgument(format!("pre-amp UI level {}", ui)).into());
        }
        self.record.settings = PreAmpSettings::from_ui_level(ui.min(1.0));
        Ok(())
    }
}

// ===== Visualizers =====

impl<R: CaptureRecord> StateStore<R> {
    pub fn capture_waveform(&self) -> bool {
        self.record.capture_waveform()
    }

    pub fn set_capture_waveform(&mut self, enabled: bool) {
        self.record.set_capture_waveform(enabled);
    }

    pub fn capture_fft(&self) -> bool {
        self.record.capture_fft()
    }

    pub fn set_capture_fft(&mut self, enabled: bool) {
        self.record.set_capture_fft(enabled);
    }
}

impl VisualizerStore {
    pub fn scaling_mode(&self) -> ScalingMode {
        self.record.settings.scaling_mode
    }

    pub fn set_scaling_mode(&mut self, mode: ScalingMode) {
        self.record.settings.scaling_mode = mode;
    }

    pub fn measurement_mode(&self) -> MeasurementMode {
        self.record.settings.measurement_mode
    }

    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) {
        self.record.settings.measurement_mode = mode;
    }
}

impl HqVisualizerStore {
    pub fn window(&self) -> WindowType {
        self.record.settings.window
    }

    pub fn set_window(&mut self, window: WindowType) {
        self.record.settings.window = window;
    }

    pub fn apply_window_to_waveform(&self) -> bool {
        self.record.settings.apply_window_to_waveform
    }

    pub fn set_apply_window_to_waveform(&mut self, apply: bool) {
        self.record.settings.apply_window_to_waveform = apply;
    }
}
