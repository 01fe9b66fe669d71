//! Pipeline context and pipeline-bound effects
//!
//! The native pipeline hosts at most one live instance per effect type in a
//! context. Effect instances are owned by the context and addressed by the
//! handles through a slot id, so the context can invalidate every handle at
//! once when its owner tears it down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tonebridge_core::{
    BackendKind, EffectError, EffectType, Result, SessionId, SettingsSnapshot,
};
use tracing::{debug, info, warn};

use crate::config::ContextParams;
use crate::engine::{EngineContext, EngineEffect, PipelineEngine};
use crate::handle::{check_settings_type, released_error, EffectHandle};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Slot {
    id: u64,
    engine: Box<dyn EngineEffect>,
}

struct ContextState {
    engine: Option<Box<dyn EngineContext>>,
    effects: HashMap<EffectType, Slot>,
    next_slot: u64,
}

impl ContextState {
    fn release_effects(&mut self) -> usize {
        let count = self.effects.len();
        for (_, mut slot) in self.effects.drain() {
            slot.engine.release();
        }
        count
    }
}

impl Drop for ContextState {
    fn drop(&mut self) {
        self.release_effects();
        if let Some(mut engine) = self.engine.take() {
            engine.release();
        }
    }
}

struct ContextShared {
    id: u64,
    state: Mutex<ContextState>,
}

impl ContextShared {
    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared processing context of the native pipeline.
///
/// Cloning yields another reference to the same context.
#[derive(Clone)]
pub struct PipelineContext {
    shared: Arc<ContextShared>,
}

impl PipelineContext {
    pub fn open(engine: &dyn PipelineEngine, params: &ContextParams) -> Result<Self> {
        let context = engine.open_context(params)?;
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        info!(context = id, effects = params.effects.len(), "Opened pipeline context");

        Ok(Self {
            shared: Arc::new(ContextShared {
                id,
                state: Mutex::new(ContextState {
                    engine: Some(context),
                    effects: HashMap::new(),
                    next_slot: 1,
                }),
            }),
        })
    }

    /// Process-unique identifier
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn is_released(&self) -> bool {
        self.shared.lock().engine.is_none()
    }

    /// Effect types with an outstanding handle
    pub fn live_effects(&self) -> Vec<EffectType> {
        let mut live: Vec<_> = self.shared.lock().effects.keys().copied().collect();
        live.sort();
        live
    }

    /// Create the single instance of `effect` in this context.
    pub fn create_effect(&self, effect: EffectType) -> Result<PipelineEffect> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        let context = state.engine.as_mut().ok_or_else(|| {
            EffectError::IllegalState(format!("pipeline context {} already released", self.shared.id))
        })?;
        if state.effects.contains_key(&effect) {
            return Err(EffectError::AlreadyExists(effect));
        }

        let instance = context.create_effect(effect)?;
        let slot = state.next_slot;
        state.next_slot += 1;
        state.effects.insert(
            effect,
            Slot {
                id: slot,
                engine: instance,
            },
        );
        debug!(context = self.shared.id, effect = %effect, "Created pipeline effect");

        Ok(PipelineEffect {
            context: Arc::clone(&self.shared),
            effect,
            slot,
            released: false,
        })
    }

    /// Start a player inside the context.
    pub fn open_player(&self) -> Result<SessionId> {
        let mut state = self.shared.lock();
        let context = state.engine.as_mut().ok_or_else(|| {
            EffectError::IllegalState(format!("pipeline context {} already released", self.shared.id))
        })?;
        context.open_player()
    }

    /// Release the context.
    ///
    /// Fails with `IllegalState` while effect handles are outstanding. A
    /// second call after a successful release is a no-op.
    pub fn release(&self) -> Result<()> {
        let mut state = self.shared.lock();
        if state.engine.is_none() {
            return Ok(());
        }
        if !state.effects.is_empty() {
            let mut live: Vec<_> = state.effects.keys().map(|e| e.name()).collect();
            live.sort_unstable();
            return Err(EffectError::IllegalState(format!(
                "pipeline context {} still has live effects: {}",
                self.shared.id,
                live.join(", ")
            )));
        }

        if let Some(mut engine) = state.engine.take() {
            engine.release();
        }
        info!(context = self.shared.id, "Released pipeline context");
        Ok(())
    }

    /// Release every effect instance, invalidating their handles, then the
    /// context itself. Returns the number of invalidated handles.
    pub(crate) fn invalidate_all(&self) -> usize {
        let mut state = self.shared.lock();
        let invalidated = state.release_effects();
        if invalidated > 0 {
            warn!(
                context = self.shared.id,
                handles = invalidated,
                "Invalidated outstanding pipeline effects"
            );
        }
        if let Some(mut engine) = state.engine.take() {
            engine.release();
            info!(context = self.shared.id, "Released pipeline context");
        }
        invalidated
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("id", &self.shared.id)
            .finish()
    }
}

/// Effect hosted by a [`PipelineContext`]
pub struct PipelineEffect {
    context: Arc<ContextShared>,
    effect: EffectType,
    slot: u64,
    released: bool,
}

impl PipelineEffect {
    pub fn context_id(&self) -> u64 {
        self.context.id
    }

    fn with_engine<T>(&self, op: impl FnOnce(&mut dyn EngineEffect) -> Result<T>) -> Result<T> {
        if self.released {
            return Err(released_error(self.effect));
        }
        let mut state = self.context.lock();
        match state.effects.get_mut(&self.effect) {
            Some(slot) if slot.id == self.slot => op(slot.engine.as_mut()),
            _ => Err(EffectError::IllegalState(format!(
                "{} handle was invalidated by its pipeline context",
                self.effect
            ))),
        }
    }
}

impl EffectHandle for PipelineEffect {
    fn effect_type(&self) -> EffectType {
        self.effect
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Pipeline
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.with_engine(|fx| fx.set_enabled(enabled))
    }

    fn is_enabled(&self) -> Result<bool> {
        self.with_engine(|fx| fx.enabled())
    }

    fn settings(&self) -> Result<SettingsSnapshot> {
        self.with_engine(|fx| fx.settings())
    }

    fn set_settings(&mut self, settings: &SettingsSnapshot) -> Result<()> {
        check_settings_type(self.effect, settings)?;
        self.with_engine(|fx| fx.set_settings(settings))
    }

    fn use_preset(&mut self, preset: u16) -> Result<()> {
        self.with_engine(|fx| fx.use_preset(preset))
    }

    fn band_center_frequency(&self, band: u16) -> Result<u32> {
        self.with_engine(|fx| fx.center_freq(band))
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Err(released_error(self.effect));
        }
        self.released = true;

        let mut state = self.context.lock();
        let owned = matches!(state.effects.get(&self.effect), Some(slot) if slot.id == self.slot);
        if owned {
            if let Some(mut slot) = state.effects.remove(&self.effect) {
                slot.engine.release();
            }
            debug!(context = self.context.id, effect = %self.effect, "Released pipeline effect");
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for PipelineEffect {
    fn drop(&mut self) {
        if !self.released {
            let _ = EffectHandle::release(self);
        }
    }
}

impl std::fmt::Debug for PipelineEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEffect")
            .field("context", &self.context.id)
            .field("effect", &self.effect)
            .field("released", &self.released)
            .finish()
    }
}
