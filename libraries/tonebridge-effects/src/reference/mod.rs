//! Reference engines
//!
//! In-process implementations of both engine traits. They reproduce the
//! stock capability tables (5-band platform equalizer, 10-band
//! high-quality equalizer, ten presets each) without processing audio, and
//! count every construction and release so callers can observe resource
//! discipline. Capability gaps and instance limits are configurable.

mod effect;
pub mod presets;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tonebridge_core::{EffectError, EffectType, Result, SessionId};
use tracing::debug;

use crate::config::ContextParams;
use crate::engine::{EngineContext, EngineEffect, PipelineEngine, SessionEngine};
use effect::ReferenceEffect;

static NEXT_PLAYER_SESSION: AtomicI32 = AtomicI32::new(1);

#[derive(Debug, Default)]
struct Counters {
    effects_created: AtomicUsize,
    effects_released: AtomicUsize,
    contexts_opened: AtomicUsize,
    contexts_released: AtomicUsize,
}

/// Construction and release counters shared by an engine and its instances
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    counters: Arc<Counters>,
}

impl EngineStats {
    pub fn effects_created(&self) -> usize {
        self.counters.effects_created.load(Ordering::SeqCst)
    }

    pub fn effects_released(&self) -> usize {
        self.counters.effects_released.load(Ordering::SeqCst)
    }

    pub fn live_effects(&self) -> usize {
        self.effects_created() - self.effects_released()
    }

    pub fn contexts_opened(&self) -> usize {
        self.counters.contexts_opened.load(Ordering::SeqCst)
    }

    pub fn contexts_released(&self) -> usize {
        self.counters.contexts_released.load(Ordering::SeqCst)
    }

    pub fn live_contexts(&self) -> usize {
        self.contexts_opened() - self.contexts_released()
    }

    fn record_effect_created(&self) {
        self.counters.effects_created.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a new effect unless `limit` instances are already live.
    fn try_record_effect_created(&self, limit: usize) -> bool {
        let released = &self.counters.effects_released;
        self.counters
            .effects_created
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |created| {
                let live = created.saturating_sub(released.load(Ordering::SeqCst));
                (live < limit).then_some(created + 1)
            })
            .is_ok()
    }

    fn record_effect_released(&self) {
        self.counters.effects_released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Platform engine stand-in
#[derive(Debug, Clone)]
pub struct ReferenceSessionEngine {
    supported: BTreeSet<EffectType>,
    instance_limit: Option<usize>,
    create_delay: Option<Duration>,
    stats: EngineStats,
}

impl ReferenceSessionEngine {
    pub fn new() -> Self {
        Self {
            supported: BTreeSet::from([
                EffectType::BassBoost,
                EffectType::Equalizer,
                EffectType::Virtualizer,
                EffectType::Visualizer,
                EffectType::LoudnessEnhancer,
                EffectType::PresetReverb,
                EffectType::EnvironmentalReverb,
            ]),
            instance_limit: None,
            create_delay: None,
            stats: EngineStats::default(),
        }
    }

    /// Remove `effect` from the supported set
    pub fn without(mut self, effect: EffectType) -> Self {
        self.supported.remove(&effect);
        self
    }

    /// Refuse creation with `ResourceExhausted` beyond `limit` live instances
    pub fn with_instance_limit(mut self, limit: usize) -> Self {
        self.instance_limit = Some(limit);
        self
    }

    /// Stall every construction, widening race windows in tests
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }
}

impl Default for ReferenceSessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine for ReferenceSessionEngine {
    fn create_effect(&self, effect: EffectType, session: SessionId) -> Result<Box<dyn EngineEffect>> {
        if !self.supported.contains(&effect) {
            return Err(EffectError::Unsupported(format!(
                "platform engine has no {}",
                effect
            )));
        }
        match self.instance_limit {
            Some(limit) if !self.stats.try_record_effect_created(limit) => {
                return Err(EffectError::ResourceExhausted(format!(
                    "platform engine instance limit ({}) reached",
                    limit
                )));
            }
            Some(_) => {}
            None => self.stats.record_effect_created(),
        }
        if let Some(delay) = self.create_delay {
            std::thread::sleep(delay);
        }

        debug!(effect = %effect, session = session.get(), "Reference session effect created");
        Ok(Box::new(ReferenceEffect::counted(effect, self.stats.clone())))
    }
}

/// Native pipeline stand-in
#[derive(Debug, Clone)]
pub struct ReferencePipelineEngine {
    supported: BTreeSet<EffectType>,
    available: bool,
    create_delay: Option<Duration>,
    stats: EngineStats,
}

impl ReferencePipelineEngine {
    pub fn new() -> Self {
        Self {
            supported: EffectType::ALL
                .into_iter()
                .filter(|effect| *effect != EffectType::LoudnessEnhancer)
                .collect(),
            available: true,
            create_delay: None,
            stats: EngineStats::default(),
        }
    }

    pub fn without(mut self, effect: EffectType) -> Self {
        self.supported.remove(&effect);
        self
    }

    /// Refuse every context with `Unsupported`, as on a device without the
    /// native pipeline
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }
}

impl Default for ReferencePipelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineEngine for ReferencePipelineEngine {
    fn open_context(&self, params: &ContextParams) -> Result<Box<dyn EngineContext>> {
        if !self.available {
            return Err(EffectError::Unsupported(
                "native pipeline not available on this device".into(),
            ));
        }
        if let Some(delay) = self.create_delay {
            std::thread::sleep(delay);
        }

        self.stats.counters.contexts_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ReferenceContext {
            params: params.clone(),
            supported: self.supported.clone(),
            stats: self.stats.clone(),
            released: false,
        }))
    }
}

struct ReferenceContext {
    params: ContextParams,
    supported: BTreeSet<EffectType>,
    stats: EngineStats,
    released: bool,
}

impl ReferenceContext {
    fn check_live(&self) -> Result<()> {
        if self.released {
            return Err(EffectError::IllegalState("context already released".into()));
        }
        Ok(())
    }
}

impl EngineContext for ReferenceContext {
    fn create_effect(&mut self, effect: EffectType) -> Result<Box<dyn EngineEffect>> {
        self.check_live()?;
        if !self.supported.contains(&effect) {
            return Err(EffectError::Unsupported(format!("pipeline has no {}", effect)));
        }
        if !self.params.enables(effect) {
            return Err(EffectError::Unsupported(format!(
                "{} is not enabled in this context",
                effect
            )));
        }
        Ok(Box::new(ReferenceEffect::new(effect, self.stats.clone())))
    }

    fn open_player(&mut self) -> Result<SessionId> {
        self.check_live()?;
        SessionId::new(NEXT_PLAYER_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.counters.contexts_released.fetch_add(1, Ordering::SeqCst);
        }
    }
}
