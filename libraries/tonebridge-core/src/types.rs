//! Effect catalogue and binding identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EffectError;

/// The fixed catalogue of supported effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    BassBoost,
    Equalizer,
    Virtualizer,
    Visualizer,
    LoudnessEnhancer,
    PresetReverb,
    EnvironmentalReverb,
    HqEqualizer,
    HqVisualizer,
    PreAmp,
}

impl EffectType {
    /// Every effect type, in catalogue order
    pub const ALL: [EffectType; 10] = [
        EffectType::BassBoost,
        EffectType::Equalizer,
        EffectType::Virtualizer,
        EffectType::Visualizer,
        EffectType::LoudnessEnhancer,
        EffectType::PresetReverb,
        EffectType::EnvironmentalReverb,
        EffectType::HqEqualizer,
        EffectType::HqVisualizer,
        EffectType::PreAmp,
    ];

    /// Stable snake-case name used in configuration and on the command line
    pub fn name(self) -> &'static str {
        match self {
            EffectType::BassBoost => "bass_boost",
            EffectType::Equalizer => "equalizer",
            EffectType::Virtualizer => "virtualizer",
            EffectType::Visualizer => "visualizer",
            EffectType::LoudnessEnhancer => "loudness_enhancer",
            EffectType::PresetReverb => "preset_reverb",
            EffectType::EnvironmentalReverb => "environmental_reverb",
            EffectType::HqEqualizer => "hq_equalizer",
            EffectType::HqVisualizer => "hq_visualizer",
            EffectType::PreAmp => "pre_amp",
        }
    }

    /// Leading tag of the backend settings string
    pub fn settings_tag(self) -> &'static str {
        match self {
            EffectType::BassBoost => "BassBoost",
            EffectType::Equalizer => "Equalizer",
            EffectType::Virtualizer => "Virtualizer",
            EffectType::Visualizer => "Visualizer",
            EffectType::LoudnessEnhancer => "LoudnessEnhancer",
            EffectType::PresetReverb => "PresetReverb",
            EffectType::EnvironmentalReverb => "EnvironmentalReverb",
            EffectType::HqEqualizer => "HQEqualizer",
            EffectType::HqVisualizer => "HQVisualizer",
            EffectType::PreAmp => "PreAmp",
        }
    }

    /// Stable byte identifying the effect in persisted records
    pub fn wire_tag(self) -> u8 {
        match self {
            EffectType::BassBoost => 1,
            EffectType::Equalizer => 2,
            EffectType::Virtualizer => 3,
            EffectType::Visualizer => 4,
            EffectType::LoudnessEnhancer => 5,
            EffectType::PresetReverb => 6,
            EffectType::EnvironmentalReverb => 7,
            EffectType::HqEqualizer => 8,
            EffectType::HqVisualizer => 9,
            EffectType::PreAmp => 10,
        }
    }

    /// Inverse of [`EffectType::wire_tag`]
    pub fn from_wire_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.wire_tag() == tag)
    }

    /// Auxiliary effects attach to the global output mix rather than a
    /// single session.
    pub fn is_auxiliary(self) -> bool {
        matches!(
            self,
            EffectType::PresetReverb | EffectType::EnvironmentalReverb
        )
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectType {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == wanted)
            .ok_or_else(|| EffectError::IllegalArgument(format!("unknown effect type: {}", s)))
    }
}

/// Numeric audio-session identifier of the platform backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i32);

impl SessionId {
    /// Session 0: the global output mix
    pub const GLOBAL_MIX: SessionId = SessionId(0);

    /// Validate and wrap a raw session id
    pub fn new(raw: i32) -> Result<Self, EffectError> {
        if raw < 0 {
            return Err(EffectError::IllegalArgument(format!(
                "invalid audio session id: {}",
                raw
            )));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn is_global_mix(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for SessionId {
    type Error = EffectError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// Which engine realizes an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Platform effect engine bound to an audio session
    Session,
    /// Shared native processing pipeline bound to one context
    Pipeline,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Session => f.write_str("session"),
            BackendKind::Pipeline => f.write_str("pipeline"),
        }
    }
}
