//! Capability Probe Coalescing Tests
//!
//! Concurrent requests for the same (backend, effect) key must share a
//! single probe. The reference engines stall each construction so every
//! thread arrives while the first probe is still in flight, and their
//! counters show how many transient instances were actually built.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tonebridge_core::{BackendKind, EffectType};
use tonebridge_effects::reference::{ReferencePipelineEngine, ReferenceSessionEngine};
use tonebridge_effects::CapabilityProbe;

// ============================================================================
// TEST UTILITIES
// ============================================================================

const THREADS: usize = 8;

/// Construction delay, long enough for every thread to hit the probe
const CREATE_DELAY: Duration = Duration::from_millis(50);

/// Run `THREADS` concurrent capability requests released by a barrier
fn probe_concurrently(
    probe: &Arc<CapabilityProbe>,
    effect: EffectType,
    backend: BackendKind,
) -> Vec<Arc<tonebridge_core::CapabilityTable>> {
    let barrier = Arc::new(Barrier::new(THREADS));
    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let probe = Arc::clone(probe);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                probe.capabilities(effect, backend).unwrap()
            })
        })
        .collect();

    workers.into_iter().map(|w| w.join().unwrap()).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_concurrent_session_probes_construct_once() {
    let session = ReferenceSessionEngine::new().with_create_delay(CREATE_DELAY);
    let stats = session.stats();
    let probe = Arc::new(CapabilityProbe::new(
        Arc::new(session),
        Arc::new(ReferencePipelineEngine::new()),
    ));

    let tables = probe_concurrently(&probe, EffectType::Equalizer, BackendKind::Session);

    assert_eq!(stats.effects_created(), 1);
    assert_eq!(stats.live_effects(), 0);
    assert!(tables.iter().all(|t| Arc::ptr_eq(t, &tables[0])));
    assert_eq!(tables[0].num_bands, 5);
}

#[test]
fn test_concurrent_pipeline_probes_open_one_context() {
    let pipeline = ReferencePipelineEngine::new().with_create_delay(CREATE_DELAY);
    let stats = pipeline.stats();
    let probe = Arc::new(CapabilityProbe::new(
        Arc::new(ReferenceSessionEngine::new()),
        Arc::new(pipeline),
    ));

    let tables = probe_concurrently(&probe, EffectType::HqEqualizer, BackendKind::Pipeline);

    assert_eq!(stats.contexts_opened(), 1);
    assert_eq!(stats.effects_created(), 1);
    assert_eq!(stats.live_contexts(), 0);
    assert!(tables.iter().all(|t| Arc::ptr_eq(t, &tables[0])));
    assert_eq!(tables[0].num_bands, 10);
}

#[test]
fn test_distinct_keys_probe_independently() {
    let session = ReferenceSessionEngine::new();
    let stats = session.stats();
    let probe = Arc::new(CapabilityProbe::new(
        Arc::new(session),
        Arc::new(ReferencePipelineEngine::new()),
    ));

    let barrier = Arc::new(Barrier::new(3));
    let workers: Vec<_> = [EffectType::BassBoost, EffectType::Virtualizer, EffectType::Equalizer]
        .into_iter()
        .map(|effect| {
            let probe = Arc::clone(&probe);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                probe.capabilities(effect, BackendKind::Session).unwrap()
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(stats.effects_created(), 3);
    assert!(probe.is_cached(EffectType::BassBoost, BackendKind::Session));
    assert!(!probe.is_cached(EffectType::BassBoost, BackendKind::Pipeline));
}
