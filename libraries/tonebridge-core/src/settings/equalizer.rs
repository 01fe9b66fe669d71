use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::{FieldReader, FieldWriter};
use super::SettingsFields;
use crate::capability::CapabilityTable;
use crate::error::{EffectError, Result, SettingsParseError};

/// Selected equalizer preset, or the custom sentinel once a band was
/// hand-edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetSelection {
    #[default]
    Custom,
    Preset(u16),
}

impl PresetSelection {
    /// Raw value in the settings string; the sentinel is `-1`.
    pub fn to_raw(self) -> i32 {
        match self {
            PresetSelection::Custom => -1,
            PresetSelection::Preset(id) => i32::from(id),
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 => Some(PresetSelection::Custom),
            _ => u16::try_from(raw).ok().map(PresetSelection::Preset),
        }
    }

    pub fn preset_id(self) -> Option<u16> {
        match self {
            PresetSelection::Custom => None,
            PresetSelection::Preset(id) => Some(id),
        }
    }
}

/// Band levels (millibel) plus the selected preset.
///
/// Editing a band clears the preset to [`PresetSelection::Custom`];
/// selecting a preset overwrites every band from the capability table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EqualizerSettings {
    cur_preset: PresetSelection,
    band_levels: Vec<i16>,
}

impl EqualizerSettings {
    pub fn new(cur_preset: PresetSelection, band_levels: Vec<i16>) -> Self {
        Self {
            cur_preset,
            band_levels,
        }
    }

    /// All bands at 0 mB, no preset selected
    pub fn flat(num_bands: usize) -> Self {
        Self::new(PresetSelection::Custom, vec![0; num_bands])
    }

    pub fn cur_preset(&self) -> PresetSelection {
        self.cur_preset
    }

    pub fn num_bands(&self) -> usize {
        self.band_levels.len()
    }

    pub fn band_levels(&self) -> &[i16] {
        &self.band_levels
    }

    pub fn band_level(&self, band: usize) -> Option<i16> {
        self.band_levels.get(band).copied()
    }

    /// Set one band and clear the selected preset.
    pub fn set_band_level(&mut self, band: usize, level: i16) -> Result<()> {
        let num_bands = self.band_levels.len();
        let slot = self.band_levels.get_mut(band).ok_or_else(|| {
            EffectError::IllegalArgument(format!(
                "band {} out of range ({} bands)",
                band, num_bands
            ))
        })?;
        *slot = level;
        self.cur_preset = PresetSelection::Custom;
        Ok(())
    }

    /// Overwrite every band with the defaults of preset `id`.
    pub fn use_preset(&mut self, caps: &CapabilityTable, id: u16) -> Result<()> {
        let preset = caps.preset(id).ok_or_else(|| {
            EffectError::IllegalArgument(format!(
                "preset {} out of range ({} presets)",
                id,
                caps.presets.len()
            ))
        })?;
        let defaults = preset.settings.as_equalizer().ok_or_else(|| {
            EffectError::IllegalArgument(format!("preset {} of {} has no band levels", id, caps.effect))
        })?;

        self.band_levels = defaults.band_levels.clone();
        self.cur_preset = PresetSelection::Preset(id);
        Ok(())
    }

    /// Reload the bands of the selected preset, discarding the submitted
    /// levels. Custom settings are left alone.
    pub fn resolve_preset(&mut self, caps: &CapabilityTable) -> Result<()> {
        match self.cur_preset {
            PresetSelection::Preset(id) => self.use_preset(caps, id),
            PresetSelection::Custom => Ok(()),
        }
    }
}

impl SettingsFields for EqualizerSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("curPreset", self.cur_preset.to_raw())?;
        out.field("numBands", self.band_levels.len())?;
        for (i, level) in self.band_levels.iter().enumerate() {
            out.field(&format!("band{}Level", i + 1), level)?;
        }
        Ok(())
    }

    fn read_fields(input: &mut FieldReader<'_>) -> std::result::Result<Self, SettingsParseError> {
        let cur_preset = input.next_with("curPreset", PresetSelection::from_raw)?;
        let num_bands: u16 = input.next("numBands")?;
        let band_levels = (1..=num_bands)
            .map(|band| input.next(&format!("band{}Level", band)))
            .collect::<std::result::Result<Vec<i16>, _>>()?;

        Ok(Self {
            cur_preset,
            band_levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::PresetInfo;
    use crate::settings::SettingsSnapshot;
    use crate::types::{BackendKind, EffectType};

    fn caps_with_presets() -> CapabilityTable {
        let mut caps = CapabilityTable::unsupported(EffectType::Equalizer, BackendKind::Session);
        caps.supported = true;
        caps.num_bands = 3;
        caps.presets = vec![
            PresetInfo {
                id: 0,
                name: "Normal".into(),
                settings: SettingsSnapshot::Equalizer(EqualizerSettings::new(
                    PresetSelection::Preset(0),
                    vec![300, 0, 300],
                )),
            },
            PresetInfo {
                id: 1,
                name: "Rock".into(),
                settings: SettingsSnapshot::Equalizer(EqualizerSettings::new(
                    PresetSelection::Preset(1),
                    vec![500, -100, 50],
                )),
            },
        ];
        caps
    }

    #[test]
    fn test_sentinel_raw_encoding() {
        assert_eq!(PresetSelection::Custom.to_raw(), -1);
        assert_eq!(PresetSelection::from_raw(-1), Some(PresetSelection::Custom));
        assert_eq!(PresetSelection::from_raw(7), Some(PresetSelection::Preset(7)));
        assert_eq!(PresetSelection::from_raw(-2), None);
        assert_eq!(PresetSelection::from_raw(70_000), None);
    }

    #[test]
    fn test_band_edit_clears_preset() {
        let mut eq = EqualizerSettings::new(PresetSelection::Preset(1), vec![500, -100, 50]);
        eq.set_band_level(1, 200).unwrap();

        assert_eq!(eq.cur_preset(), PresetSelection::Custom);
        assert_eq!(eq.band_levels(), &[500, 200, 50]);
    }

    #[test]
    fn test_use_preset_overwrites_every_band() {
        let caps = caps_with_presets();
        let mut eq = EqualizerSettings::new(PresetSelection::Custom, vec![1, 2, 3]);

        eq.use_preset(&caps, 1).unwrap();
        assert_eq!(eq.cur_preset(), PresetSelection::Preset(1));
        assert_eq!(eq.band_levels(), &[500, -100, 50]);
    }

    #[test]
    fn test_unknown_preset_leaves_settings_untouched() {
        let caps = caps_with_presets();
        let mut eq = EqualizerSettings::new(PresetSelection::Custom, vec![1, 2, 3]);

        assert!(matches!(
            eq.use_preset(&caps, 9),
            Err(EffectError::IllegalArgument(_))
        ));
        assert_eq!(eq.band_levels(), &[1, 2, 3]);
    }

    #[test]
    fn test_resolve_preset_discards_edited_bands() {
        let caps = caps_with_presets();
        let mut eq = EqualizerSettings::new(PresetSelection::Preset(1), vec![700, 700, 700]);

        eq.resolve_preset(&caps).unwrap();
        assert_eq!(eq.cur_preset(), PresetSelection::Preset(1));
        assert_eq!(eq.band_levels(), &[500, -100, 50]);

        let mut custom = EqualizerSettings::new(PresetSelection::Custom, vec![700, 700, 700]);
        custom.resolve_preset(&caps).unwrap();
        assert_eq!(custom.band_levels(), &[700, 700, 700]);

        let mut unknown = EqualizerSettings::new(PresetSelection::Preset(9), vec![1, 2, 3]);
        assert!(matches!(
            unknown.resolve_preset(&caps),
            Err(EffectError::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_band_out_of_range() {
        let mut eq = EqualizerSettings::flat(2);
        let err = eq.set_band_level(2, 0).unwrap_err();
        assert_eq!(
            err,
            EffectError::IllegalArgument("band 2 out of range (2 bands)".into())
        );
        assert_eq!(eq.band_levels(), &[0, 0]);
    }
}
