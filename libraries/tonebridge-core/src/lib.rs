//! Tonebridge Core
//!
//! Backend-agnostic vocabulary for the Tonebridge audio-effects layer.
//!
//! Every other crate in the workspace speaks in these types: the effect
//! catalogue, the binding identifiers, the normalized parameter model, the
//! typed settings snapshots and the capability tables produced by probing
//! an engine.
//!
//! # Architecture
//!
//! ```text
//! EffectType ──► CapabilityTable ──► PresetInfo ──► SettingsSnapshot
//!                      │                                  │
//!                      └──► ParameterNormalizer ◄─────────┘
//! ```
//!
//! - **Types**: `EffectType`, `SessionId`, `BackendKind`
//! - **Normalization**: `ParameterNormalizer` maps native units onto `[0, 1]`
//! - **Settings**: `SettingsSnapshot`, one typed struct per effect, with a
//!   canonical `Tag;key=value` text form
//! - **Capabilities**: immutable per-effect, per-backend description
//! - **Error Handling**: `EffectError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use tonebridge_core::{EffectType, ParameterNormalizer, SettingsSnapshot};
//!
//! let normalizer = ParameterNormalizer::new(-1500, 1500).unwrap();
//! assert_eq!(normalizer.normalize(0), 0.5);
//!
//! let snapshot = SettingsSnapshot::parse(EffectType::BassBoost, "BassBoost;strength=600").unwrap();
//! assert_eq!(snapshot.to_string(), "BassBoost;strength=600");
//! ```

#![forbid(unsafe_code)]

pub mod capability;
pub mod error;
pub mod normalizer;
pub mod settings;
pub mod types;

pub use capability::{CapabilityTable, PresetInfo};
pub use error::{EffectError, Result, SettingsParseError};
pub use normalizer::ParameterNormalizer;
pub use settings::{
    BassBoostSettings, EnvironmentalReverbSettings, EqualizerSettings, HqVisualizerSettings,
    LoudnessEnhancerSettings, MeasurementMode, PreAmpSettings, PresetReverbSettings,
    PresetSelection, ReverbParam, ReverbPreset, ScalingMode, SettingsSnapshot,
    VirtualizerSettings, VisualizerSettings, WindowType,
};
pub use types::{BackendKind, EffectType, SessionId};
