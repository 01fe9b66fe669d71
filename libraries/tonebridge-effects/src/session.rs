//! Session-bound effect variant

use tonebridge_core::{BackendKind, EffectType, Result, SessionId, SettingsSnapshot};
use tracing::debug;

use crate::engine::{EngineEffect, SessionEngine};
use crate::handle::{check_settings_type, released_error, EffectHandle};

/// Effect attached to an audio session of the platform engine.
///
/// Any number of instances may share a session; releasing one leaves the
/// others untouched. Dropping an unreleased handle releases it.
pub struct SessionEffect {
    effect: EffectType,
    session: SessionId,
    engine: Option<Box<dyn EngineEffect>>,
}

impl SessionEffect {
    /// Create the effect on `session`.
    ///
    /// Fails with `Unsupported` or `ResourceExhausted` as reported by the
    /// engine.
    pub fn create(engine: &dyn SessionEngine, effect: EffectType, session: SessionId) -> Result<Self> {
        let instance = engine.create_effect(effect, session)?;
        debug!(effect = %effect, session = session.get(), "Created session effect");
        Ok(Self {
            effect,
            session,
            engine: Some(instance),
        })
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    fn engine(&self) -> Result<&dyn EngineEffect> {
        self.engine
            .as_deref()
            .ok_or_else(|| released_error(self.effect))
    }

    fn engine_mut(&mut self) -> Result<&mut (dyn EngineEffect + 'static)> {
        let effect = self.effect;
        self.engine
            .as_deref_mut()
            .ok_or_else(|| released_error(effect))
    }
}

impl EffectHandle for SessionEffect {
    fn effect_type(&self) -> EffectType {
        self.effect
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Session
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.engine_mut()?.set_enabled(enabled)
    }

    fn is_enabled(&self) -> Result<bool> {
        self.engine()?.enabled()
    }

    fn settings(&self) -> Result<SettingsSnapshot> {
        self.engine()?.settings()
    }

    fn set_settings(&mut self, settings: &SettingsSnapshot) -> Result<()> {
        check_settings_type(self.effect, settings)?;
        self.engine_mut()?.set_settings(settings)
    }

    fn use_preset(&mut self, preset: u16) -> Result<()> {
        self.engine_mut()?.use_preset(preset)
    }

    fn band_center_frequency(&self, band: u16) -> Result<u32> {
        self.engine()?.center_freq(band)
    }

    fn release(&mut self) -> Result<()> {
        let mut instance = self.engine.take().ok_or_else(|| released_error(self.effect))?;
        instance.release();
        debug!(effect = %self.effect, session = self.session.get(), "Released session effect");
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.engine.is_none()
    }
}

impl Drop for SessionEffect {
    fn drop(&mut self) {
        if let Some(mut instance) = self.engine.take() {
            instance.release();
        }
    }
}

impl std::fmt::Debug for SessionEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEffect")
            .field("effect", &self.effect)
            .field("session", &self.session)
            .field("released", &self.engine.is_none())
            .finish()
    }
}
