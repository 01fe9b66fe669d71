//! Visualizer capture settings

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::{FieldReader, FieldWriter};
use super::SettingsFields;
use crate::error::SettingsParseError;

type ParseResult<T> = std::result::Result<T, SettingsParseError>;

/// How captured waveform data is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    #[default]
    Normalized,
    AsPlayed,
}

impl ScalingMode {
    pub fn to_raw(self) -> i32 {
        match self {
            ScalingMode::Normalized => 0,
            ScalingMode::AsPlayed => 1,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(ScalingMode::Normalized),
            1 => Some(ScalingMode::AsPlayed),
            _ => None,
        }
    }
}

/// Level measurements taken alongside capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementMode {
    #[default]
    None,
    PeakRms,
}

impl MeasurementMode {
    pub fn to_raw(self) -> i32 {
        match self {
            MeasurementMode::None => 0,
            MeasurementMode::PeakRms => 1,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(MeasurementMode::None),
            1 => Some(MeasurementMode::PeakRms),
            _ => None,
        }
    }
}

/// FFT window of the high-quality visualizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Rectangular,
    #[default]
    Hann,
    Hamming,
    Blackman,
    FlatTop,
}

impl WindowType {
    pub const ALL: [WindowType; 5] = [
        WindowType::Rectangular,
        WindowType::Hann,
        WindowType::Hamming,
        WindowType::Blackman,
        WindowType::FlatTop,
    ];

    pub fn to_raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualizerSettings {
    pub scaling_mode: ScalingMode,
    pub measurement_mode: MeasurementMode,
}

impl SettingsFields for VisualizerSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("scalingMode", self.scaling_mode.to_raw())?;
        out.field("measurementMode", self.measurement_mode.to_raw())
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        Ok(Self {
            scaling_mode: input.next_with("scalingMode", ScalingMode::from_raw)?,
            measurement_mode: input.next_with("measurementMode", MeasurementMode::from_raw)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HqVisualizerSettings {
    pub window: WindowType,
    /// Apply the window to the waveform capture as well as the FFT
    pub apply_window_to_waveform: bool,
}

impl SettingsFields for HqVisualizerSettings {
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> fmt::Result {
        out.field("windowType", self.window.to_raw())?;
        out.flag("windowForWaveform", self.apply_window_to_waveform)
    }

    fn read_fields(input: &mut FieldReader<'_>) -> ParseResult<Self> {
        Ok(Self {
            window: input.next_with("windowType", WindowType::from_raw)?,
            apply_window_to_waveform: input.next_flag("windowForWaveform")?,
        })
    }
}
