//! Engine seam
//!
//! The DSP engines are external collaborators. Tonebridge only needs a
//! narrow create/control/release surface from them, expressed by these
//! traits. Two engines exist: the platform engine, which attaches effects
//! to audio sessions, and the native pipeline, which hosts effects inside
//! one processing context.

use tonebridge_core::{EffectError, EffectType, Result, SessionId, SettingsSnapshot};

use crate::config::ContextParams;

/// Control surface of one effect instance inside an engine
pub trait EngineEffect: Send {
    fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    fn enabled(&self) -> Result<bool>;

    fn settings(&self) -> Result<SettingsSnapshot>;

    /// An equalizer snapshot naming a concrete preset loads that preset's
    /// bands; the submitted levels are ignored.
    fn set_settings(&mut self, settings: &SettingsSnapshot) -> Result<()>;

    fn num_presets(&self) -> Result<u16> {
        Ok(0)
    }

    fn preset_name(&self, preset: u16) -> Result<String> {
        Err(EffectError::Unsupported(format!("no preset {}", preset)))
    }

    fn use_preset(&mut self, preset: u16) -> Result<()> {
        Err(EffectError::Unsupported(format!("no preset {}", preset)))
    }

    fn num_bands(&self) -> Result<u16> {
        Ok(0)
    }

    /// Center frequency of `band` in milli-hertz
    fn center_freq(&self, band: u16) -> Result<u32> {
        Err(EffectError::Unsupported(format!("no band {}", band)))
    }

    /// Band level range in millibel
    fn band_level_range(&self) -> Result<(i16, i16)> {
        Err(EffectError::Unsupported("no band levels".into()))
    }

    /// Free the engine-side instance. Called at most once.
    fn release(&mut self);
}

/// Platform engine: effects bound to audio sessions
pub trait SessionEngine: Send + Sync {
    /// `Unsupported` when the device lacks the effect, `ResourceExhausted`
    /// when the instance limit is reached.
    fn create_effect(&self, effect: EffectType, session: SessionId) -> Result<Box<dyn EngineEffect>>;
}

/// Native processing pipeline
pub trait PipelineEngine: Send + Sync {
    fn open_context(&self, params: &ContextParams) -> Result<Box<dyn EngineContext>>;
}

/// One live processing context of the native pipeline
pub trait EngineContext: Send {
    fn create_effect(&mut self, effect: EffectType) -> Result<Box<dyn EngineEffect>>;

    /// Start a player inside the context and return its audio session.
    fn open_player(&mut self) -> Result<SessionId>;

    /// Free the context. Called at most once, after every effect is released.
    fn release(&mut self);
}
