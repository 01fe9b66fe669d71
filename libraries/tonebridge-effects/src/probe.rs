//! Capability discovery
//!
//! Capabilities are discovered by standing up a throwaway instance of the
//! effect (on the global-mix session, or inside a dedicated probe context),
//! reading everything back and releasing it again. The result is cached per
//! (backend, effect type) for the lifetime of the probe, and concurrent
//! requests for the same key wait for the single probe in flight.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use tonebridge_core::{
    BackendKind, CapabilityTable, EffectError, EffectType, PresetInfo, Result, SessionId,
};
use tracing::{debug, info, warn};

use crate::config::ContextParams;
use crate::engine::{EngineContext, EngineEffect, PipelineEngine, SessionEngine};

type ProbeKey = (BackendKind, EffectType);
type ProbeSlot = Arc<Mutex<Option<Arc<CapabilityTable>>>>;

/// Cached, coalescing capability probe over both engines.
///
/// The cache lives in the probe instance. Build one per process and share
/// it as an `Arc<CapabilityProbe>` between every factory and store so each
/// (backend, effect) pair is probed once.
pub struct CapabilityProbe {
    session: Arc<dyn SessionEngine>,
    pipeline: Arc<dyn PipelineEngine>,
    slots: Mutex<HashMap<ProbeKey, ProbeSlot>>,
}

impl CapabilityProbe {
    pub fn new(session: Arc<dyn SessionEngine>, pipeline: Arc<dyn PipelineEngine>) -> Self {
        Self {
            session,
            pipeline,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn session_engine(&self) -> &dyn SessionEngine {
        self.session.as_ref()
    }

    pub fn pipeline_engine(&self) -> &dyn PipelineEngine {
        self.pipeline.as_ref()
    }

    /// Capabilities of `effect` on `backend`.
    ///
    /// The first call probes the engine; later calls return the cached
    /// table. An effect the engine does not support yields an unsupported
    /// table. Other engine failures are returned and not cached.
    pub fn capabilities(&self, effect: EffectType, backend: BackendKind) -> Result<Arc<CapabilityTable>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry((backend, effect)).or_default())
        };

        // Held across the probe so concurrent callers wait for its result.
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = cached.as_ref() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.run_probe(effect, backend)?);
        *cached = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Whether a table for this key is already cached
    pub fn is_cached(&self, effect: EffectType, backend: BackendKind) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(&(backend, effect)) {
                Some(slot) => Arc::clone(slot),
                None => return false,
            }
        };
        let cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        cached.is_some()
    }

    fn run_probe(&self, effect: EffectType, backend: BackendKind) -> Result<CapabilityTable> {
        debug!(effect = %effect, backend = %backend, "Probing capabilities");
        let result = match backend {
            BackendKind::Session => self.probe_session(effect),
            BackendKind::Pipeline => self.probe_pipeline(effect),
        };

        match result {
            Ok(table) => {
                info!(
                    effect = %effect,
                    backend = %backend,
                    bands = table.num_bands,
                    presets = table.presets.len(),
                    "Capability probe complete"
                );
                Ok(table)
            }
            Err(EffectError::Unsupported(reason)) => {
                warn!(effect = %effect, backend = %backend, reason = %reason, "Effect not supported");
                Ok(CapabilityTable::unsupported(effect, backend))
            }
            Err(err) => Err(err),
        }
    }

    fn probe_session(&self, effect: EffectType) -> Result<CapabilityTable> {
        let mut instance = Transient::new(self.session.create_effect(effect, SessionId::GLOBAL_MIX)?);
        read_table(effect, BackendKind::Session, &mut **instance)
    }

    fn probe_pipeline(&self, effect: EffectType) -> Result<CapabilityTable> {
        let mut context = Transient::new(self.pipeline.open_context(&ContextParams::for_probe(effect))?);
        // declared after the context so it is released first
        let mut instance = Transient::new(context.create_effect(effect)?);
        read_table(effect, BackendKind::Pipeline, &mut **instance)
    }
}

impl std::fmt::Debug for CapabilityProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CapabilityProbe")
            .field("keys", &slots.len())
            .finish()
    }
}

fn read_table(
    effect: EffectType,
    backend: BackendKind,
    instance: &mut dyn EngineEffect,
) -> Result<CapabilityTable> {
    let default_settings = instance.settings()?;

    let mut presets = Vec::new();
    for id in 0..instance.num_presets()? {
        instance.use_preset(id)?;
        presets.push(PresetInfo {
            id,
            name: instance.preset_name(id)?,
            settings: instance.settings()?,
        });
    }

    let num_bands = instance.num_bands()?;
    let center_freqs_mhz = (0..num_bands)
        .map(|band| instance.center_freq(band))
        .collect::<Result<Vec<_>>>()?;
    let level_range = if num_bands > 0 {
        Some(instance.band_level_range()?)
    } else {
        None
    };

    Ok(CapabilityTable {
        effect,
        backend,
        supported: true,
        num_bands,
        presets,
        center_freqs_mhz,
        level_range,
        default_settings: Some(default_settings),
    })
}

/// Engine resource released when the probe scope ends, on every path
trait Releasable {
    fn release_now(&mut self);
}

impl Releasable for Box<dyn EngineEffect> {
    fn release_now(&mut self) {
        self.release();
    }
}

impl Releasable for Box<dyn EngineContext> {
    fn release_now(&mut self) {
        self.release();
    }
}

struct Transient<T: Releasable>(T);

impl<T: Releasable> Transient<T> {
    fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T: Releasable> Deref for Transient<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Releasable> DerefMut for Transient<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Releasable> Drop for Transient<T> {
    fn drop(&mut self) {
        self.0.release_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferencePipelineEngine, ReferenceSessionEngine};

    fn probe_with(session: ReferenceSessionEngine, pipeline: ReferencePipelineEngine) -> CapabilityProbe {
        CapabilityProbe::new(Arc::new(session), Arc::new(pipeline))
    }

    #[test]
    fn test_session_equalizer_table() {
        let probe = probe_with(ReferenceSessionEngine::new(), ReferencePipelineEngine::new());
        let caps = probe.capabilities(EffectType::Equalizer, BackendKind::Session).unwrap();

        assert!(caps.supported);
        assert_eq!(caps.num_bands, 5);
        assert_eq!(caps.center_freqs_mhz.len(), 5);
        assert_eq!(caps.level_range, Some((-1500, 1500)));
        assert_eq!(caps.num_presets(), 10);
        assert_eq!(caps.presets[0].name, "Normal");
        assert_eq!(
            caps.presets[3].settings.as_equalizer().map(|eq| eq.band_levels().to_vec()),
            Some(vec![0, 0, 0, 0, 0])
        );
    }

    #[test]
    fn test_probe_releases_transient_resources() {
        let session = ReferenceSessionEngine::new();
        let pipeline = ReferencePipelineEngine::new();
        let session_stats = session.stats();
        let pipeline_stats = pipeline.stats();
        let probe = probe_with(session, pipeline);

        probe.capabilities(EffectType::BassBoost, BackendKind::Session).unwrap();
        probe.capabilities(EffectType::HqEqualizer, BackendKind::Pipeline).unwrap();

        assert_eq!(session_stats.live_effects(), 0);
        assert_eq!(pipeline_stats.live_effects(), 0);
        assert_eq!(pipeline_stats.live_contexts(), 0);
        assert_eq!(pipeline_stats.contexts_opened(), 1);
    }

    #[test]
    fn test_unsupported_effect_yields_empty_table() {
        let probe = probe_with(
            ReferenceSessionEngine::new(),
            ReferencePipelineEngine::new().without(EffectType::Visualizer),
        );
        let caps = probe.capabilities(EffectType::Visualizer, BackendKind::Pipeline).unwrap();

        assert!(!caps.supported);
        assert_eq!(caps.num_bands, 0);
        assert!(caps.presets.is_empty());
        assert!(probe.is_cached(EffectType::Visualizer, BackendKind::Pipeline));
    }

    #[test]
    fn test_results_are_cached() {
        let session = ReferenceSessionEngine::new();
        let stats = session.stats();
        let probe = probe_with(session, ReferencePipelineEngine::new());

        let first = probe.capabilities(EffectType::Virtualizer, BackendKind::Session).unwrap();
        let second = probe.capabilities(EffectType::Virtualizer, BackendKind::Session).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(stats.effects_created(), 1);
    }

    #[test]
    fn test_transient_failure_is_not_cached() {
        let session = ReferenceSessionEngine::new().with_instance_limit(0);
        let probe = probe_with(session, ReferencePipelineEngine::new());

        let err = probe
            .capabilities(EffectType::BassBoost, BackendKind::Session)
            .unwrap_err();
        assert!(err.is_transient());
        assert!(!probe.is_cached(EffectType::BassBoost, BackendKind::Session));
    }
}
