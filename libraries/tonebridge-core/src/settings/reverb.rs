//! Preset and environmental reverb

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::{FieldReader, FieldWriter};
use super::SettingsFields;
use crate::error::SettingsParseError;

type ParseResult<T> = std::result::Result<T, SettingsParseError>;

/// Named rooms of the preset reverb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverbPreset {
    #[default]
    None,
    SmallRoom,
    MediumRoom,
    LargeRoom,
    MediumHall,
    LargeHall,
    Plate,
}

impl ReverbPreset {
    pub const ALL: [ReverbPreset; 7] = [
        ReverbPreset::None,
        ReverbPreset::SmallRoom,
        ReverbPreset::MediumRoom,
        ReverbPreset::LargeRoom,
        ReverbPreset::MediumHall,
        ReverbPreset::LargeHall,
        ReverbPreset::Plate,
    ];

    pub fn to_raw(self) -> i16 {
        self as i16
    }

    pub fn from_raw(raw: i16) -> Option<Self> {
        usize::try_from(raw).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresetReverbSettings {
    pub preset: ReverbPreset,
}

impl SettingsFields for PresetReverbSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("preset", self.preset.to_raw())
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        Ok(Self {
            preset: input.next_with("preset", ReverbPreset::from_raw)?,
        })
    }
}

/// The ten environmental reverb parameters, in settings-string order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverbParam {
    RoomLevel,
    RoomHfLevel,
    DecayTime,
    DecayHfRatio,
    ReflectionsLevel,
    ReflectionsDelay,
    ReverbLevel,
    ReverbDelay,
    Diffusion,
    Density,
}

impl ReverbParam {
    pub const ALL: [ReverbParam; 10] = [
        ReverbParam::RoomLevel,
        ReverbParam::RoomHfLevel,
        ReverbParam::DecayTime,
        ReverbParam::DecayHfRatio,
        ReverbParam::ReflectionsLevel,
        ReverbParam::ReflectionsDelay,
        ReverbParam::ReverbLevel,
        ReverbParam::ReverbDelay,
        ReverbParam::Diffusion,
        ReverbParam::Density,
    ];

    /// Range the engine implements. Reflections and reverb delay are fixed
    /// at zero.
    pub fn range(self) -> (i32, i32) {
        match self {
            ReverbParam::RoomLevel | ReverbParam::RoomHfLevel => (-9000, 0),
            ReverbParam::DecayTime => (100, 7000),
            ReverbParam::DecayHfRatio => (100, 2000),
            ReverbParam::ReverbLevel => (-9000, 2000),
            ReverbParam::Diffusion | ReverbParam::Density => (0, 1000),
            ReverbParam::ReflectionsLevel
            | ReverbParam::ReflectionsDelay
            | ReverbParam::ReverbDelay => (0, 0),
        }
    }

    fn key(self) -> &'static str {
        match self {
            ReverbParam::RoomLevel => "roomLevel",
            ReverbParam::RoomHfLevel => "roomHFLevel",
            ReverbParam::DecayTime => "decayTime",
            ReverbParam::DecayHfRatio => "decayHFRatio",
            ReverbParam::ReflectionsLevel => "reflectionsLevel",
            ReverbParam::ReflectionsDelay => "reflectionsDelay",
            ReverbParam::ReverbLevel => "reverbLevel",
            ReverbParam::ReverbDelay => "reverbDelay",
            ReverbParam::Diffusion => "diffusion",
            ReverbParam::Density => "density",
        }
    }

    /// Millisecond parameters are 32-bit, the rest are 16-bit.
    fn is_wide(self) -> bool {
        matches!(
            self,
            ReverbParam::DecayTime | ReverbParam::ReflectionsDelay | ReverbParam::ReverbDelay
        )
    }
}

/// Environmental reverb parameters in native units (mB, ms, per-mille)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalReverbSettings {
    pub room_level: i16,
    pub room_hf_level: i16,
    pub decay_time: i32,
    pub decay_hf_ratio: i16,
    pub reflections_level: i16,
    pub reflections_delay: i32,
    pub reverb_level: i16,
    pub reverb_delay: i32,
    pub diffusion: i16,
    pub density: i16,
}

/// Named environments: room level, room HF level, decay time, decay HF
/// ratio, reflections level, reflections delay, reverb level, reverb delay,
/// diffusion, density.
static ENVIRONMENT_PRESETS: [(&str, [i32; 10]); EnvironmentalReverbSettings::PRESET_COUNT] = [
    ("Default", [-32768, 0, 1000, 500, -32768, 20, -32768, 40, 1000, 1000]),
    ("Generic", [-1000, -100, 1490, 830, -2602, 7, 200, 11, 1000, 1000]),
    ("Padded Cell", [-1000, -6000, 170, 100, -1204, 1, 207, 2, 1000, 1000]),
    ("Room", [-1000, -454, 400, 830, -1646, 2, 53, 3, 1000, 1000]),
    ("Bathroom", [-1000, -1200, 1490, 540, -370, 7, 1030, 11, 1000, 600]),
    ("Living Room", [-1000, -6000, 500, 100, -1376, 3, -1104, 4, 1000, 1000]),
    ("Stone Room", [-1000, -300, 2310, 640, -711, 12, 83, 17, 1000, 1000]),
    ("Auditorium", [-1000, -476, 4320, 590, -789, 20, -289, 30, 1000, 1000]),
    ("Concert Hall", [-1000, -500, 3920, 700, -1230, 20, -2, 29, 1000, 1000]),
    ("Cave", [-1000, 0, 2910, 1300, -602, 15, -302, 22, 1000, 1000]),
    ("Arena", [-1000, -698, 7240, 330, -1166, 20, 16, 30, 1000, 1000]),
    ("Hangar", [-1000, -1000, 10050, 230, -602, 20, 198, 30, 1000, 1000]),
    ("Carpeted Hallway", [-1000, -4000, 300, 100, -1831, 2, -1630, 30, 1000, 1000]),
    ("Hallway", [-1000, -300, 1490, 590, -1219, 7, 441, 11, 1000, 1000]),
    ("Stone Corridor", [-1000, -237, 2700, 790, -1214, 13, 395, 20, 1000, 1000]),
    ("Alley", [-1000, -270, 1490, 860, -1204, 7, -4, 11, 1000, 1000]),
    ("Forest", [-1000, -3300, 1490, 540, -2560, 162, -613, 88, 790, 1000]),
    ("City", [-1000, -800, 1490, 670, -2273, 7, -2217, 11, 500, 1000]),
    ("Mountains", [-1000, -2500, 1490, 210, -2780, 300, -2014, 100, 270, 1000]),
    ("Quarry", [-1000, -1000, 1490, 830, -32768, 61, 500, 25, 1000, 1000]),
    ("Plain", [-1000, -2000, 1490, 500, -2466, 179, -2514, 100, 210, 1000]),
    ("Parking Lot", [-1000, 0, 1650, 1500, -1363, 8, -1153, 12, 1000, 1000]),
    ("Sewer Pipe", [-1000, -1000, 2810, 140, 429, 14, 648, 21, 800, 600]),
    ("Underwater", [-1000, -4000, 1490, 100, -449, 7, 1700, 11, 1000, 1000]),
    ("Small Room", [-1000, -600, 1100, 830, -400, 5, 500, 10, 1000, 1000]),
    ("Medium Room", [-1000, -600, 1300, 830, -1000, 20, -200, 20, 1000, 1000]),
    ("Large Room", [-1000, -600, 1500, 830, -1600, 5, -1000, 40, 1000, 1000]),
    ("Medium Hall", [-1000, -600, 1800, 700, -1300, 15, -800, 30, 1000, 1000]),
    ("Large Hall", [-1000, -600, 1800, 700, -2000, 30, -1400, 60, 1000, 1000]),
    ("Plate", [-1000, -200, 1300, 900, 0, 2, 0, 10, 1000, 750]),
];

impl EnvironmentalReverbSettings {
    /// Number of named environments
    pub const PRESET_COUNT: usize = 30;

    /// Named environment `index`, clipped to the implemented ranges
    pub fn preset(index: usize) -> Option<(&'static str, Self)> {
        let (name, values) = ENVIRONMENT_PRESETS.get(index)?;
        let mut settings = Self::default();
        for (param, value) in ReverbParam::ALL.into_iter().zip(values) {
            settings.set_param(param, *value);
        }
        Some((*name, settings))
    }

    pub fn param(&self, param: ReverbParam) -> i32 {
        match param {
            ReverbParam::RoomLevel => i32::from(self.room_level),
            ReverbParam::RoomHfLevel => i32::from(self.room_hf_level),
            ReverbParam::DecayTime => self.decay_time,
            ReverbParam::DecayHfRatio => i32::from(self.decay_hf_ratio),
            ReverbParam::ReflectionsLevel => i32::from(self.reflections_level),
            ReverbParam::ReflectionsDelay => self.reflections_delay,
            ReverbParam::ReverbLevel => i32::from(self.reverb_level),
            ReverbParam::ReverbDelay => self.reverb_delay,
            ReverbParam::Diffusion => i32::from(self.diffusion),
            ReverbParam::Density => i32::from(self.density),
        }
    }

    /// Set a parameter, clipping it into [`ReverbParam::range`].
    pub fn set_param(&mut self, param: ReverbParam, value: i32) {
        let (min, max) = param.range();
        let value = value.clamp(min, max);
        // every range lies inside i16 for the narrow parameters
        let narrow = value as i16;
        match param {
            ReverbParam::RoomLevel => self.room_level = narrow,
            ReverbParam::RoomHfLevel => self.room_hf_level = narrow,
            ReverbParam::DecayTime => self.decay_time = value,
            ReverbParam::DecayHfRatio => self.decay_hf_ratio = narrow,
            ReverbParam::ReflectionsLevel => self.reflections_level = narrow,
            ReverbParam::ReflectionsDelay => self.reflections_delay = value,
            ReverbParam::ReverbLevel => self.reverb_level = narrow,
            ReverbParam::ReverbDelay => self.reverb_delay = value,
            ReverbParam::Diffusion => self.diffusion = narrow,
            ReverbParam::Density => self.density = narrow,
        }
    }
}

impl Default for EnvironmentalReverbSettings {
    fn default() -> Self {
        Self {
            room_level: -9000,
            room_hf_level: 0,
            decay_time: 1000,
            decay_hf_ratio: 500,
            reflections_level: 0,
            reflections_delay: 0,
            reverb_level: -9000,
            reverb_delay: 0,
            diffusion: 1000,
            density: 1000,
        }
    }
}

impl SettingsFields for EnvironmentalReverbSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        for param in ReverbParam::ALL {
            out.field(param.key(), self.param(param))?;
        }
        Ok(())
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        let mut settings = Self::default();
        for param in ReverbParam::ALL {
            let value = if param.is_wide() {
                input.next::<i32>(param.key())?
            } else {
                i32::from(input.next::<i16>(param.key())?)
            };
            // raw assignment keeps out-of-range values intact for round-trips
            match param {
                ReverbParam::RoomLevel => settings.room_level = value as i16,
                ReverbParam::RoomHfLevel => settings.room_hf_level = value as i16,
                ReverbParam::DecayTime => settings.decay_time = value,
                ReverbParam::DecayHfRatio => settings.decay_hf_ratio = value as i16,
                ReverbParam::ReflectionsLevel => settings.reflections_level = value as i16,
                ReverbParam::ReflectionsDelay => settings.reflections_delay = value,
                ReverbParam::ReverbLevel => settings.reverb_level = value as i16,
                ReverbParam::ReverbDelay => settings.reverb_delay = value,
                ReverbParam::Diffusion => settings.diffusion = value as i16,
                ReverbParam::Density => settings.density = value as i16,
            }
        }
        Ok(settings)
    }
}
