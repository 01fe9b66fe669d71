//! Tonebridge Effects
//!
//! Effect runtime: one [`EffectHandle`] interface over two engines.
//!
//! # Architecture
//!
//! ```text
//!                      EffectFactory ── BackendPolicy
//!                     /      │      \
//!        SessionEffect   PipelineContext   CapabilityProbe (cached, coalescing)
//!              │               │                  │
//!       SessionEngine    PipelineEngine ◄─────────┘
//! ```
//!
//! The engines are external collaborators reached through the traits in
//! [`engine`]. The [`reference`] module implements both in-process with
//! the stock capability tables and construction counters.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tonebridge_core::{EffectType, SessionId};
//! use tonebridge_effects::reference::{ReferencePipelineEngine, ReferenceSessionEngine};
//! use tonebridge_effects::{CapabilityProbe, EffectFactory, FactoryConfig};
//!
//! let probe = Arc::new(CapabilityProbe::new(
//!     Arc::new(ReferenceSessionEngine::new()),
//!     Arc::new(ReferencePipelineEngine::new()),
//! ));
//! let mut factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();
//!
//! let mut eq = factory.create(EffectType::Equalizer, SessionId::new(5).unwrap()).unwrap();
//! eq.set_band_level(0, 600).unwrap();
//! eq.release().unwrap();
//!
//! factory.release();
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod factory;
pub mod handle;
pub mod pipeline;
pub mod player;
pub mod probe;
pub mod reference;
pub mod session;

pub use config::{
    BackendPolicy, ContextParams, FactoryConfig, HqEqualizerImpl, PolicyPreset, ResamplerQuality,
    SinkBackend,
};
pub use engine::{EngineContext, EngineEffect, PipelineEngine, SessionEngine};
pub use factory::{Binding, EffectFactory};
pub use handle::EffectHandle;
pub use pipeline::{PipelineContext, PipelineEffect};
pub use player::PlayerHandle;
pub use probe::CapabilityProbe;
pub use session::SessionEffect;
