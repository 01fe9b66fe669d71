//! Tonebridge State
//!
//! Host-side effect state: what each effect is set to while no instance is
//! alive, how that state is persisted, and how edits reach a live instance.
//!
//! - **Records**: [`StateRecord`] per effect type, the settings snapshot
//!   plus host-only fields
//! - **Stores**: [`StateStore`] with normalized accessors and versioned
//!   `serialize`/`deserialize`
//! - **Persistence**: [`persist`], byte framing shared by records and bare
//!   snapshots
//! - **Controller**: [`EffectController`] applies edits to store, engine and
//!   observers in one step
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tonebridge_core::{BackendKind, CapabilityTable, EffectType};
//! use tonebridge_state::BassBoostStore;
//!
//! let caps = Arc::new(CapabilityTable::unsupported(EffectType::BassBoost, BackendKind::Session));
//! let mut store = BassBoostStore::new(Arc::clone(&caps)).unwrap();
//! store.set_enabled(true);
//! store.set_strength(0.5).unwrap();
//!
//! let restored = BassBoostStore::deserialize(&store.serialize(), caps).unwrap();
//! assert_eq!(restored, store);
//! ```

#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod persist;
pub mod record;
pub mod store;

pub use controller::EffectController;
pub use error::{Result, StateError};
pub use persist::{decode_snapshot, encode_snapshot, peek_effect, FORMAT_VERSION};
pub use record::{
    BandRecord, BassBoostRecord, CaptureRecord, EnvironmentalReverbRecord, EqualizerRecord,
    HqEqualizerRecord, HqVisualizerRecord, LoudnessEnhancerRecord, PreAmpRecord,
    PresetReverbRecord, StateRecord, StrengthRecord, VirtualizerRecord, VisualizerRecord,
};
pub use store::{
    BassBoostStore, EnvironmentalReverbStore, EqualizerStore, HqEqualizerStore, HqVisualizerStore,
    LoudnessEnhancerStore, PreAmpStore, PresetReverbStore, StateStore, VirtualizerStore,
    VisualizerStore,
};
