//! Category and event id catalogue
//!
//! Control categories (1xx) carry requests towards an effect; notify
//! categories (2xx) report state changes back to observers. Event ids are
//! scoped to their category.

use tonebridge_core::EffectType;

pub mod category {
    pub const NONE: i32 = 0;
    pub const NAVIGATION: i32 = 10;

    pub const PLAYER_CONTROL: i32 = 100;
    pub const BASS_BOOST: i32 = 101;
    pub const VIRTUALIZER: i32 = 102;
    pub const EQUALIZER: i32 = 103;
    pub const LOUDNESS_ENHANCER: i32 = 104;
    pub const ENVIRONMENTAL_REVERB: i32 = 105;
    pub const PRESET_REVERB: i32 = 106;
    pub const VISUALIZER: i32 = 107;
    pub const HQ_EQUALIZER: i32 = 108;
    pub const PRE_AMP: i32 = 109;
    pub const HQ_VISUALIZER: i32 = 110;

    pub const NOTIFY_PLAYER_CONTROL: i32 = 200;
    pub const NOTIFY_BASS_BOOST: i32 = 201;
    pub const NOTIFY_VIRTUALIZER: i32 = 202;
    pub const NOTIFY_EQUALIZER: i32 = 203;
    pub const NOTIFY_LOUDNESS_ENHANCER: i32 = 204;
    pub const NOTIFY_ENVIRONMENTAL_REVERB: i32 = 205;
    pub const NOTIFY_PRESET_REVERB: i32 = 206;
    pub const NOTIFY_VISUALIZER: i32 = 207;
    pub const NOTIFY_HQ_EQUALIZER: i32 = 208;
    pub const NOTIFY_PRE_AMP: i32 = 209;
    pub const NOTIFY_HQ_VISUALIZER: i32 = 210;

    /// Offset between a control category and its notify category
    pub const NOTIFY_OFFSET: i32 = 100;
}

/// Notify events of the enable-able effects
pub mod effect_event {
    pub const ENABLED_STATE_UPDATED: i32 = 0;
    /// arg1: preset id, `-1` for custom
    pub const PRESET_UPDATED: i32 = 1;
    /// arg2: normalized strength (f32)
    pub const STRENGTH_UPDATED: i32 = 1;
    /// arg2: normalized target gain (f32)
    pub const TARGET_GAIN_UPDATED: i32 = 1;
    /// arg2: UI level (f32)
    pub const LEVEL_UPDATED: i32 = 1;
    /// arg1: band
    pub const BAND_LEVEL_UPDATED: i32 = 2;
    /// arg1: parameter index, [`PARAM_INDEX_ALL`] after a preset change
    pub const PARAMETER_UPDATED: i32 = 2;

    pub const PARAM_INDEX_ALL: i32 = 10;
}

/// Notify events of both visualizers
pub mod visualizer_event {
    pub const WAVEFORM_ENABLED_STATE_UPDATED: i32 = 0;
    pub const FFT_ENABLED_STATE_UPDATED: i32 = 1;
    pub const SCALING_MODE_UPDATED: i32 = 2;
    pub const MEASUREMENT_MODE_UPDATED: i32 = 3;
    /// arg1: window type
    pub const WINDOW_TYPE_UPDATED: i32 = 2;
}

pub mod player_event {
    /// arg1: player id, arg2: state
    pub const PLAYER_STATE_CHANGED: i32 = 0;
    pub const PLAYER_INFO: i32 = 1;
    pub const PLAYER_ERROR: i32 = 2;
    /// extras: [`EXTRA_OPERATION`], [`EXTRA_ERROR`]
    pub const EXCEPTION_OCCURRED: i32 = 3;

    pub const EXTRA_OPERATION: &str = "operation";
    pub const EXTRA_ERROR: &str = "error";
}

/// Control category of `effect`
pub fn control_category(effect: EffectType) -> i32 {
    match effect {
        EffectType::BassBoost => category::BASS_BOOST,
        EffectType::Virtualizer => category::VIRTUALIZER,
        EffectType::Equalizer => category::EQUALIZER,
        EffectType::LoudnessEnhancer => category::LOUDNESS_ENHANCER,
        EffectType::EnvironmentalReverb => category::ENVIRONMENTAL_REVERB,
        EffectType::PresetReverb => category::PRESET_REVERB,
        EffectType::Visualizer => category::VISUALIZER,
        EffectType::HqEqualizer => category::HQ_EQUALIZER,
        EffectType::PreAmp => category::PRE_AMP,
        EffectType::HqVisualizer => category::HQ_VISUALIZER,
    }
}

/// Notify category of `effect`
pub fn notify_category(effect: EffectType) -> i32 {
    control_category(effect) + category::NOTIFY_OFFSET
}
